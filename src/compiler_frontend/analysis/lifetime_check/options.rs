use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::return_config_error;

/// Which `pset => { .. }` remarks to emit on dereferencing loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemarkOptions(u8);

impl RemarkOptions {
    pub const NONE: Self = Self(0b00);
    pub const PSET_INVALID: Self = Self(0b01);
    pub const PSET_ALWAYS: Self = Self(0b10);
    pub const ALL: Self = Self(0b11);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "none" => Some(Self::NONE),
            "pset-invalid" => Some(Self::PSET_INVALID),
            "pset-always" => Some(Self::PSET_ALWAYS),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }
}

/// Which provenance notes get attached to invalid-use warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryOptions(u8);

impl HistoryOptions {
    pub const NONE: Self = Self(0b00);
    pub const INVALID: Self = Self(0b01);
    pub const NULL: Self = Self(0b10);
    pub const ALL: Self = Self(0b11);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "none" => Some(Self::NONE),
            "invalid" => Some(Self::INVALID),
            "null" => Some(Self::NULL),
            "all" => Some(Self::ALL),
            _ => None,
        }
    }
}

/// The two independent configuration axes of the lifetime checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifetimeCheckOptions {
    pub remarks: RemarkOptions,
    pub history: HistoryOptions,
}

impl Default for LifetimeCheckOptions {
    fn default() -> Self {
        Self {
            remarks: RemarkOptions::NONE,
            history: HistoryOptions::ALL,
        }
    }
}

impl LifetimeCheckOptions {
    pub fn new(remarks: RemarkOptions, history: HistoryOptions) -> Self {
        Self { remarks, history }
    }

    /// Builds options from keyword lists such as `["pset-invalid"]` and `["null"]`.
    ///
    /// An empty list turns the axis off. Keywords accumulate, so `all` next to a
    /// finer keyword is still `all`.
    pub fn from_option_lists<R, H>(remarks: &[R], history: &[H]) -> Result<Self, CompilerError>
    where
        R: AsRef<str>,
        H: AsRef<str>,
    {
        let mut options = Self::new(RemarkOptions::NONE, HistoryOptions::NONE);

        for keyword in remarks {
            let keyword = keyword.as_ref().trim();
            let Some(remark) = RemarkOptions::from_keyword(keyword) else {
                return_config_error!(
                    format!("Unknown lifetime check remark option '{keyword}'"),
                    ErrorLocation::default(),
                    {
                        ConfigOption => "remarks",
                        PrimarySuggestion => "Use one of: none, pset-invalid, pset-always, all",
                    }
                );
            };

            options.remarks = options.remarks.union(remark);
        }

        for keyword in history {
            let keyword = keyword.as_ref().trim();
            let Some(level) = HistoryOptions::from_keyword(keyword) else {
                return_config_error!(
                    format!("Unknown lifetime check history option '{keyword}'"),
                    ErrorLocation::default(),
                    {
                        ConfigOption => "history",
                        PrimarySuggestion => "Use one of: none, invalid, null, all",
                    }
                );
            };

            options.history = options.history.union(level);
        }

        Ok(options)
    }

    pub fn remark_pset_invalid(&self) -> bool {
        self.remarks.contains(RemarkOptions::PSET_INVALID)
    }

    pub fn remark_pset_always(&self) -> bool {
        self.remarks.contains(RemarkOptions::PSET_ALWAYS)
    }

    pub fn history_invalid(&self) -> bool {
        self.history.contains(HistoryOptions::INVALID)
    }

    pub fn history_null(&self) -> bool {
        self.history.contains(HistoryOptions::NULL)
    }
}
