//! Run configuration for the `treepath` binary.
//!
//! Values come from `Config::default()`, then an optional JSON file, then
//! command-line flags. Every field in the file is optional.

use crate::parser::InputFormat;
use crate::path_finder::PathStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_INPUT: &str = "input2.txt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file path
    pub input: String,
    pub format: InputFormat,
    pub strategy: PathStrategy,
    /// Output file; `None` prints to stdout
    pub output: Option<String>,
    /// Fail the run if any record was dropped while building the tree
    pub strict: bool,
    /// 0 = warnings only, 1 = info, 2 and above = debug
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: DEFAULT_INPUT.to_string(),
            format: InputFormat::Auto,
            strategy: PathStrategy::DepthFirst,
            output: None,
            strict: false,
            verbosity: 0,
        }
    }
}

/// Command-line values layered over a loaded `Config`.
///
/// `format` and `strategy` stay as given on the command line and are parsed
/// when applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input: Option<String>,
    pub format: Option<String>,
    pub strategy: Option<String>,
    pub output: Option<String>,
    pub strict: bool,
    pub verbosity: u8,
}

impl Config {
    /// Loads a JSON config file. Missing fields keep their defaults.
    pub fn load(file_path: &str) -> Result<Self> {
        let text = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file: {}", file_path))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid config file: {}", file_path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies command-line overrides. Given values replace the file's;
    /// `strict` can only be switched on and verbosity only raised.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(format) = overrides.format {
            self.format = format.parse()
                .with_context(|| format!("Invalid -format value: {}", format))?;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy.parse()
                .with_context(|| format!("Invalid -strategy value: {}", strategy))?;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        self.strict |= overrides.strict;
        self.verbosity = self.verbosity.max(overrides.verbosity);
        Ok(self)
    }

    /// `env_logger` filter matching the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input, "input2.txt");
        assert_eq!(config.format, InputFormat::Auto);
        assert_eq!(config.strategy, PathStrategy::DepthFirst);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"strategy": "ancestor_walk", "verbosity": 2}"#).unwrap();
        assert_eq!(config.strategy, PathStrategy::AncestorWalk);
        assert_eq!(config.input, DEFAULT_INPUT);
        assert_eq!(config.log_filter(), "debug");
        assert!(!config.strict);
    }

    #[test]
    fn test_full_json() {
        let config = Config::from_json(
            r#"{"input": "tree.jsonl", "format": "jsonl", "output": "out.txt", "strict": true}"#,
        )
        .unwrap();
        assert_eq!(config.input, "tree.jsonl");
        assert_eq!(config.format, InputFormat::Jsonl);
        assert_eq!(config.output.as_deref(), Some("out.txt"));
        assert!(config.strict);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Config::from_json(r#"{"strategy": "bfs"}"#).is_err());
    }

    #[test]
    fn test_overrides_replace_given_values() {
        let file = Config::from_json(
            r#"{"input": "a.txt", "format": "text", "strategy": "depth_first", "output": "a.out"}"#,
        )
        .unwrap();
        let config = file
            .with_overrides(ConfigOverrides {
                input: Some("b.jsonl".to_string()),
                format: Some("jsonl".to_string()),
                strategy: Some("ancestor".to_string()),
                output: Some("b.out".to_string()),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.input, "b.jsonl");
        assert_eq!(config.format, InputFormat::Jsonl);
        assert_eq!(config.strategy, PathStrategy::AncestorWalk);
        assert_eq!(config.output.as_deref(), Some("b.out"));
    }

    #[test]
    fn test_overrides_keep_unset_values() {
        let file = Config::from_json(r#"{"input": "a.txt", "output": "a.out", "verbosity": 1}"#).unwrap();
        let config = file.clone().with_overrides(ConfigOverrides::default()).unwrap();
        assert_eq!(config, file);
    }

    #[test]
    fn test_overrides_strict_and_verbosity_only_increase() {
        let file = Config::from_json(r#"{"strict": true, "verbosity": 2}"#).unwrap();
        let config = file
            .with_overrides(ConfigOverrides { strict: false, verbosity: 1, ..ConfigOverrides::default() })
            .unwrap();
        assert!(config.strict);
        assert_eq!(config.verbosity, 2);

        let config = Config::default()
            .with_overrides(ConfigOverrides { strict: true, verbosity: 1, ..ConfigOverrides::default() })
            .unwrap();
        assert!(config.strict);
        assert_eq!(config.verbosity, 1);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_overrides_reject_bad_values() {
        let bad_format = ConfigOverrides { format: Some("xml".to_string()), ..ConfigOverrides::default() };
        assert!(Config::default().with_overrides(bad_format).is_err());

        let bad_strategy = ConfigOverrides { strategy: Some("bfs".to_string()), ..ConfigOverrides::default() };
        assert!(Config::default().with_overrides(bad_strategy).is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let path = env::temp_dir().join("treepath_config_test.json");
        let path = path.to_str().unwrap().to_string();
        fs::write(&path, r#"{"input": "tree.txt.br", "strategy": "ancestor_walk", "strict": true}"#)?;

        let config = Config::load(&path)?;
        assert_eq!(config.input, "tree.txt.br");
        assert_eq!(config.strategy, PathStrategy::AncestorWalk);
        assert!(config.strict);
        assert_eq!(config.output, None);

        fs::write(&path, "{not json")?;
        assert!(Config::load(&path).is_err());

        fs::remove_file(&path)?;
        assert!(Config::load(&path).is_err());
        Ok(())
    }
}
