use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rustc_hash::FxHashSet;

/// Verbosity of shape inference diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    /// Don't show any diagnostics.
    #[default]
    Off,
    /// Report only failed inferences.
    Warn,
    /// Report all inferences.
    Info,
}

impl FromStr for DiagnosticLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Self::Off),
            "warn" | "1" => Ok(Self::Warn),
            "info" | "2" => Ok(Self::Info),
            _ => Err(format!("Unrecognized diagnostic level \"{}\"", s)),
        }
    }
}

/// Diagnostic reporter for shape inference.
///
/// Messages are printed to stdout prefixed by the level and the node's
/// diagnostic name. Warnings are reported at most once per node.
pub struct Diagnostics {
    /// IDs of nodes against which warnings have been reported.
    warned_nodes: Mutex<FxHashSet<usize>>,
    level: DiagnosticLevel,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_level(DiagnosticLevel::Off)
    }

    pub fn with_level(level: DiagnosticLevel) -> Self {
        Self {
            warned_nodes: Mutex::new(FxHashSet::default()),
            level,
        }
    }

    /// Return true if diagnostic messages are enabled at a given level.
    pub fn enabled(&self, level: DiagnosticLevel) -> bool {
        level != DiagnosticLevel::Off && self.level >= level
    }

    /// Log a diagnostic message for a node at the [`Info`](DiagnosticLevel::Info) level.
    pub fn info(&self, node_name: &str, message: fmt::Arguments<'_>) {
        if !self.enabled(DiagnosticLevel::Info) {
            return;
        }
        self.log(DiagnosticLevel::Info, node_name, message);
    }

    /// Log a diagnostic message for a node at the [`Warn`](DiagnosticLevel::Warn) level.
    ///
    /// Returns false if the message was suppressed, either because warnings
    /// are disabled or one was already reported for this node.
    pub fn warn(&self, node_id: usize, node_name: &str, message: fmt::Arguments<'_>) -> bool {
        if !self.enabled(DiagnosticLevel::Warn) {
            return false;
        }
        let first_warning = self
            .warned_nodes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(node_id);
        if !first_warning {
            return false;
        }
        self.log(DiagnosticLevel::Warn, node_name, message);
        true
    }

    /// Return true if a warning has been reported for a node.
    pub fn was_warned(&self, node_id: usize) -> bool {
        self.warned_nodes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&node_id)
    }

    fn log(&self, level: DiagnosticLevel, node_name: &str, message: fmt::Arguments<'_>) {
        let level_char = match level {
            DiagnosticLevel::Warn => 'W',
            DiagnosticLevel::Info => 'I',
            DiagnosticLevel::Off => return,
        };
        println!("{}| {}: {}", level_char, node_name, message);
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticLevel, Diagnostics};

    #[test]
    fn test_parse_level() {
        assert_eq!("off".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Off));
        assert_eq!("WARN".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Warn));
        assert_eq!("info".parse::<DiagnosticLevel>(), Ok(DiagnosticLevel::Info));
        assert!("verbose".parse::<DiagnosticLevel>().is_err());
    }

    #[test]
    fn test_enabled() {
        let diag = Diagnostics::new();
        assert!(!diag.enabled(DiagnosticLevel::Warn));
        assert!(!diag.enabled(DiagnosticLevel::Off));

        let diag = Diagnostics::with_level(DiagnosticLevel::Warn);
        assert!(diag.enabled(DiagnosticLevel::Warn));
        assert!(!diag.enabled(DiagnosticLevel::Info));

        let diag = Diagnostics::with_level(DiagnosticLevel::Info);
        assert!(diag.enabled(DiagnosticLevel::Warn));
        assert!(diag.enabled(DiagnosticLevel::Info));
    }

    #[test]
    fn test_warn_once_per_node() {
        let diag = Diagnostics::with_level(DiagnosticLevel::Warn);
        assert!(diag.warn(1, "bag", format_args!("first")));
        assert!(!diag.warn(1, "bag", format_args!("second")));
        assert!(diag.warn(2, "other", format_args!("first")));
        assert!(diag.was_warned(1));
        assert!(!diag.was_warned(3));

        let diag = Diagnostics::new();
        assert!(!diag.warn(1, "bag", format_args!("suppressed")));
        assert!(!diag.was_warned(1));
    }
}
