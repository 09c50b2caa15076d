//! Event-emission heuristic.
//!
//! Looks for `<receiver>.<name>.<emit>(` in raw method text and reports the
//! `<name>` parts. This is a textual match only: emissions built
//! dynamically are missed and look-alike calls in strings or comments are
//! reported.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Pattern for the default `self.<signal>.emit(` form.
    static ref DEFAULT_SIGNAL_PATTERN: Regex = Regex::new(r"\bself\.(\w+)\.emit\s*\(").unwrap();
}

#[derive(Debug, Clone)]
pub struct SignalDetector {
    pattern: Regex,
}

impl SignalDetector {
    /// Detector for `<receiver>.<signal>.<emit>(`.
    pub fn new(receiver: &str, emit: &str) -> Result<Self, regex::Error> {
        if receiver == "self" && emit == "emit" {
            return Ok(Self::default());
        }
        let pattern = Regex::new(&format!(
            r"\b{}\.(\w+)\.{}\s*\(",
            regex::escape(receiver),
            regex::escape(emit)
        ))?;
        Ok(Self { pattern })
    }

    /// Signal names found in `code`, sorted and deduplicated.
    pub fn detect(&self, code: &str) -> Vec<String> {
        self.pattern
            .captures_iter(code)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_SIGNAL_PATTERN.clone(),
        }
    }
}
