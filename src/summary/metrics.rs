//! Method metrics and their aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::MethodSummary;

/// Code lines above which a method is "long".
pub const LONG_METHOD_LINES: usize = 50;

/// Code lines above which a method is "complex".
pub const COMPLEX_METHOD_LINES: usize = 20;

/// Number of entries kept in [`AggregateMetrics::long_methods`].
pub const TOP_LONG_METHODS: usize = 5;

/// Size tier of a method, a step function of its code-line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    /// Up to 20 code lines.
    Low,
    /// 21 to 50.
    Medium,
    /// 51 to 100.
    High,
    /// More than 100.
    Critical,
}

impl ComplexityTier {
    pub fn from_code_lines(code_lines: usize) -> Self {
        match code_lines {
            0..=20 => ComplexityTier::Low,
            21..=50 => ComplexityTier::Medium,
            51..=100 => ComplexityTier::High,
            _ => ComplexityTier::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
            ComplexityTier::Critical => "critical",
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lines that are neither blank nor comment-only.
pub fn count_code_lines(code: &str) -> usize {
    code.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .count()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Histogram of complexity tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl ComplexityDistribution {
    pub fn record(&mut self, tier: ComplexityTier) {
        match tier {
            ComplexityTier::Low => self.low += 1,
            ComplexityTier::Medium => self.medium += 1,
            ComplexityTier::High => self.high += 1,
            ComplexityTier::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.critical
    }
}

/// Entry of the longest-methods list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongMethod {
    pub name: String,
    /// Code lines.
    pub lines: usize,
    pub start: usize,
    pub end: usize,
}

/// Aggregates over a group of method summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub method_count: usize,
    pub class_count: usize,
    pub total_code_lines: usize,
    pub total_lines: usize,
    pub average_method_length: f64,
    pub median_method_length: usize,
    pub undocumented_count: usize,
    pub undocumented_percentage: f64,
    pub long_methods_count: usize,
    pub long_methods: Vec<LongMethod>,
    pub complexity_distribution: ComplexityDistribution,
}

impl AggregateMetrics {
    /// Aggregate `methods` in declaration order.
    pub fn from_methods<'a, I>(methods: I, class_count: usize) -> Self
    where
        I: IntoIterator<Item = &'a MethodSummary>,
    {
        let mut metrics = AggregateMetrics {
            class_count,
            ..Default::default()
        };
        let mut lengths = Vec::new();
        let mut long = Vec::new();

        for method in methods {
            metrics.method_count += 1;
            metrics.total_code_lines += method.code_lines;
            metrics.total_lines += method.total_lines;
            metrics.complexity_distribution.record(method.complexity);
            if !method.has_docstring {
                metrics.undocumented_count += 1;
            }
            if method.is_long {
                long.push(LongMethod {
                    name: method.name.clone(),
                    lines: method.code_lines,
                    start: method.start_line,
                    end: method.end_line,
                });
            }
            lengths.push(method.code_lines);
        }

        if metrics.method_count > 0 {
            let n = metrics.method_count as f64;
            metrics.average_method_length = round1(metrics.total_code_lines as f64 / n);
            metrics.undocumented_percentage = round1(metrics.undocumented_count as f64 * 100.0 / n);

            lengths.sort_unstable();
            metrics.median_method_length = lengths[lengths.len() / 2];
        }

        // Stable: equal lengths keep declaration order.
        long.sort_by(|a, b| b.lines.cmp(&a.lines));
        metrics.long_methods_count = long.len();
        long.truncate(TOP_LONG_METHODS);
        metrics.long_methods = long;

        metrics
    }
}
