//! Analysis configuration
//!
//! Strategy and projection names are validated here; an unknown strategy
//! is a fatal configuration error, while `FULL` aliases `DEMAND` with a
//! warning.

use regex::Regex;
use tracing::warn;

use crate::errors::{CallgraphError, Result};

/// Inter-procedural strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    None,
    #[default]
    OneShot,
    Demand,
}

impl Strategy {
    /// Parse a strategy name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Strategy::None),
            "ONESHOT" => Ok(Strategy::OneShot),
            "DEMAND" => Ok(Strategy::Demand),
            "FULL" => {
                warn!("strategy FULL is an alias for DEMAND");
                Ok(Strategy::Demand)
            }
            other => Err(CallgraphError::config(format!(
                "unknown strategy '{}' (expected NONE, ONESHOT, DEMAND or FULL)",
                other
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::None => "NONE",
            Strategy::OneShot => "ONESHOT",
            Strategy::Demand => "DEMAND",
        }
    }
}

/// Edge-extraction projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerKind {
    #[default]
    Static,
    NativeCalls,
    Acg,
}

impl AnalyzerKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "static" => Ok(AnalyzerKind::Static),
            "nativecalls" => Ok(AnalyzerKind::NativeCalls),
            "acg" => Ok(AnalyzerKind::Acg),
            other => Err(CallgraphError::config(format!(
                "unknown analyzer type '{}' (expected static, nativecalls or acg)",
                other
            ))),
        }
    }
}

/// Ordered `+pattern`/`-pattern` file filter; the last matching rule wins
#[derive(Debug, Default)]
pub struct FileFilter {
    rules: Vec<(bool, Regex)>,
}

impl FileFilter {
    pub fn parse(rules: &[String]) -> Result<Self> {
        let mut parsed = Vec::with_capacity(rules.len());
        for rule in rules {
            let (include, pattern) = match rule.as_bytes().first() {
                Some(b'+') => (true, &rule[1..]),
                Some(b'-') => (false, &rule[1..]),
                _ => {
                    return Err(CallgraphError::config(format!(
                        "filter rule '{}' must start with '+' or '-'",
                        rule
                    )))
                }
            };
            let regex = Regex::new(pattern).map_err(|e| {
                CallgraphError::config(format!("invalid filter pattern '{}': {}", pattern, e))
            })?;
            parsed.push((include, regex));
        }
        Ok(Self { rules: parsed })
    }

    /// Whether a path passes the filter; unmatched paths are included
    pub fn includes(&self, path: &str) -> bool {
        let mut included = true;
        for (include, regex) in &self.rules {
            if regex.is_match(path) {
                included = *include;
            }
        }
        included
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Full analysis configuration
#[derive(Debug, Default)]
pub struct AnalysisConfig {
    pub strategy: Strategy,
    pub analyzer: AnalyzerKind,
    /// serialize the flow graph for debugging
    pub dump_flow_graph: bool,
    /// emit callback statistics
    pub count_callbacks: bool,
    /// emit an AMD/RequireJS dependency graph instead of the call graph
    pub requirejs_graph: bool,
    /// report per-stage timings
    pub timings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(Strategy::parse("oneshot").unwrap(), Strategy::OneShot);
        assert_eq!(Strategy::parse("DEMAND").unwrap(), Strategy::Demand);
        assert_eq!(Strategy::parse("none").unwrap(), Strategy::None);
        // FULL aliases DEMAND
        assert_eq!(Strategy::parse("FULL").unwrap(), Strategy::Demand);
        assert!(Strategy::parse("eager").is_err());
    }

    #[test]
    fn test_default_strategy_is_oneshot() {
        assert_eq!(Strategy::default(), Strategy::OneShot);
    }

    #[test]
    fn test_analyzer_parsing() {
        assert_eq!(AnalyzerKind::parse("static").unwrap(), AnalyzerKind::Static);
        assert_eq!(
            AnalyzerKind::parse("nativecalls").unwrap(),
            AnalyzerKind::NativeCalls
        );
        assert_eq!(AnalyzerKind::parse("acg").unwrap(), AnalyzerKind::Acg);
        assert!(AnalyzerKind::parse("dynamic").is_err());
    }

    #[test]
    fn test_filter_last_match_wins() {
        let filter = FileFilter::parse(&[
            "-node_modules".to_string(),
            "+node_modules/mylib".to_string(),
        ])
        .unwrap();
        assert!(filter.includes("src/app.js"));
        assert!(!filter.includes("node_modules/other/x.js"));
        assert!(filter.includes("node_modules/mylib/x.js"));
    }

    #[test]
    fn test_filter_rejects_bad_rules() {
        assert!(FileFilter::parse(&["node_modules".to_string()]).is_err());
        assert!(FileFilter::parse(&["+[".to_string()]).is_err());
    }
}
