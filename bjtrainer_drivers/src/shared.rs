pub mod autoplay;
pub mod practice;
pub mod session;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use bjtrainer::{BettingConfig, Rule};
use serde::{Deserialize, Serialize};

use crate::practice::Level;

pub const DEFAULT_CONFIG_PATH: &str = "~/.bjtrainer.yml";

/// Everything a training session is configured with. Every section and
/// every field may be left out of the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: Rule,
    pub betting: BettingConfig,
    pub simulator: ConfigSimulator,
    pub practice: ConfigPractice,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPractice {
    pub difficulty: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSimulator {
    /// Rounds to auto-play, 0 for no limit.
    pub rounds: u64,
    /// Pause between two engine calls.
    pub interval_ms: u64,
    pub seed: Option<u64>,
}

impl Default for ConfigSimulator {
    fn default() -> Self {
        ConfigSimulator {
            rounds: 100,
            interval_ms: 0,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.rule.validate().context("invalid rule section")?;
        self.betting
            .validate()
            .context("invalid betting section")?;
        Ok(())
    }
}

/// Parses YAML into a validated Config.
pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(content).context("malformed config")?
    };
    config.validate()?;
    Ok(config)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &Path) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename.display()))?;
    parse_config(&file_content).with_context(|| format!("in {}", filename.display()))
}

/// Expands the default `~/.bjtrainer.yml` to the home directory. Other paths
/// are returned as they are.
pub fn resolve_config_path(path: &str) -> anyhow::Result<PathBuf> {
    if path != DEFAULT_CONFIG_PATH {
        return Ok(PathBuf::from(path));
    }
    let Some(home_dir) = home::home_dir() else {
        bail!("cannot find home directory");
    };
    Ok(home_dir.join(".bjtrainer.yml"))
}

/// Loads the config at `path`. A missing file at the default location means
/// default settings; anywhere else it is an error.
pub fn load_config(path: &str) -> anyhow::Result<Config> {
    let resolved = resolve_config_path(path)?;
    if path == DEFAULT_CONFIG_PATH && !resolved.exists() {
        log::info!(
            "no config at {}, using default settings",
            resolved.display()
        );
        return Ok(Config::default());
    }
    if resolved.is_dir() {
        bail!("{} is a directory, not a config file", resolved.display());
    }
    parse_config_from_file(&resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bjtrainer::{BettingStrategy, EngineError};

    const TYPICAL_CONFIG: &str = "
rule:
  number_of_decks: 8
  penetration: 0.75
  dealer_stand_on_soft_17: false
  double_after_split: false
  max_splits: 1
betting:
  min_bet: 10
  max_bet: 200
  default_bet: 20
  betting_strategy: spread
simulator:
  rounds: 50
  seed: 7
practice:
  difficulty: advanced
";

    #[test]
    fn can_parse_config() {
        let config = parse_config(TYPICAL_CONFIG).unwrap();
        assert_eq!(config.rule.number_of_decks, 8);
        assert_eq!(config.rule.penetration, 0.75);
        assert!(!config.rule.dealer_stand_on_soft17);
        assert!(!config.rule.double_after_split);
        assert_eq!(config.rule.max_splits, 1);
        assert!(config.rule.burn_card);
        assert_eq!(config.betting.betting_strategy, BettingStrategy::Spread);
        assert_eq!(config.betting.min_bet, 10.0);
        assert_eq!(config.betting.default_bankroll, 1000.0);
        assert_eq!(config.simulator.rounds, 50);
        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.simulator.interval_ms, 0);
        assert_eq!(config.practice.difficulty, Level::Advanced);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
        assert_eq!(parse_config("rule: {}\n").unwrap(), Config::default());
    }

    #[test]
    fn should_return_error_for_unknown_strategy() {
        let result = parse_config("betting:\n  betting_strategy: martingale\n");
        assert!(result.is_err());
    }

    #[test]
    fn should_report_every_violation() {
        let err = parse_config("rule:\n  number_of_decks: 12\n  penetration: 0.2\n").unwrap_err();
        match err.downcast_ref::<EngineError>() {
            Some(EngineError::InvalidConfig(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn explicit_path_is_kept() {
        assert_eq!(
            resolve_config_path("/tmp/table.yml").unwrap(),
            PathBuf::from("/tmp/table.yml")
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(load_config("/nonexistent/bjtrainer/config.yml").is_err());
    }
}
