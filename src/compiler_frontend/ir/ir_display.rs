//! Human readable dump of IR functions.
//!
//! Used by `ir_log!` and the `dump` CLI command. The format is for people,
//! it is not parsed back.

use crate::compiler_frontend::ir::ir_nodes::{
    ConstantValue, IrFunction, IrModule, IrOperation, IrOperationKind, IrRegion,
};
use std::fmt::Write;

const INDENT: &str = "  ";

pub fn display_module(module: &IrModule) -> String {
    let mut out = String::new();
    for function in &module.functions {
        out.push_str(&display_function(function));
        out.push('\n');
    }
    out
}

pub fn display_function(function: &IrFunction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "func @{} ({}) {{", function.name, function.id);
    write_region_contents(&mut out, &function.body, 1);
    out.push_str("}\n");
    out
}

fn write_region_contents(out: &mut String, region: &IrRegion, depth: usize) {
    for (block_index, block) in region.blocks.iter().enumerate() {
        if region.blocks.len() > 1 {
            let _ = writeln!(out, "{}^bb{}:", INDENT.repeat(depth.saturating_sub(1)), block_index);
        }

        for operation in &block.operations {
            write_operation(out, operation, depth);
        }
    }
}

fn write_nested_region(out: &mut String, label: &str, region: &IrRegion, depth: usize) {
    let _ = writeln!(out, "{}{} {{", INDENT.repeat(depth), label);
    write_region_contents(out, region, depth + 1);
    let _ = writeln!(
        out,
        "{}}} // closes at {}:{}",
        INDENT.repeat(depth),
        region.location.end_pos.line_number,
        region.location.end_pos.char_column
    );
}

fn write_operation(out: &mut String, operation: &IrOperation, depth: usize) {
    let pad = INDENT.repeat(depth);
    let line = operation.location.start_pos.line_number;

    match &operation.kind {
        IrOperationKind::Declare {
            address,
            name,
            is_pointer,
            init,
        } => {
            let ty = if *is_pointer { "ptr" } else { "value" };
            let _ = writeln!(
                out,
                "{pad}{address} = declare \"{name}\" : {ty}, {} // line {line}",
                init.as_str()
            );
        }

        IrOperationKind::Store { address, value } => {
            let _ = writeln!(out, "{pad}store {value}, {address} // line {line}");
        }

        IrOperationKind::Load {
            result,
            address,
            is_deref,
        } => {
            let deref = if *is_deref { " deref" } else { "" };
            let _ = writeln!(out, "{pad}{result} = load{deref} {address} // line {line}");
        }

        IrOperationKind::Constant { result, value } => {
            let value = match value {
                ConstantValue::NullPtr => String::from("nullptr"),
                ConstantValue::Int(int) => int.to_string(),
                ConstantValue::Bool(boolean) => boolean.to_string(),
            };
            let _ = writeln!(out, "{pad}{result} = const {value}");
        }

        IrOperationKind::Cast {
            result,
            source,
            kind,
        } => {
            let _ = writeln!(out, "{pad}{result} = cast({kind:?}, {source})");
        }

        IrOperationKind::PtrStride {
            result,
            base,
            stride,
        } => {
            let _ = writeln!(out, "{pad}{result} = ptr_stride({base}, {stride})");
        }

        IrOperationKind::Scope { body } => {
            write_nested_region(out, "scope", body, depth);
        }

        IrOperationKind::If {
            then_region,
            else_region,
        } => {
            write_nested_region(out, "if", then_region, depth);
            if let Some(else_region) = else_region {
                write_nested_region(out, "else", else_region, depth);
            }
        }

        IrOperationKind::Switch { cases } => {
            let _ = writeln!(out, "{pad}switch [");
            for (index, case) in cases.iter().enumerate() {
                write_nested_region(out, &format!("case {index}"), case, depth + 1);
            }
            let _ = writeln!(out, "{pad}]");
        }

        IrOperationKind::Loop {
            kind,
            condition,
            body,
            step,
        } => {
            let _ = writeln!(out, "{pad}loop({kind:?}) [");
            write_nested_region(out, "cond", condition, depth + 1);
            write_nested_region(out, "body", body, depth + 1);
            if let Some(step) = step {
                write_nested_region(out, "step", step, depth + 1);
            }
            let _ = writeln!(out, "{pad}]");
        }

        IrOperationKind::Yield { kind } => {
            let _ = writeln!(out, "{pad}yield {kind:?}");
        }

        IrOperationKind::Return => {
            let _ = writeln!(out, "{pad}return");
        }

        IrOperationKind::Other { name, results } => {
            let results = results
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{pad}{results} = {name}(...) // line {line}");
        }
    }
}
