use std::process::ExitCode;

fn main() -> ExitCode {
    lifetime_check::projects::cli::start_cli()
}
