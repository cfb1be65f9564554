use crate::domain::money::{Amount, DEFAULT_MINOR_UNIT_SCALE};
use crate::domain::payment::DuePolicy;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

/// Deployment configuration read from `ledger.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Used only by the explicit bootstrap step (`contrib-ledger init`).
    pub group: Option<GroupSection>,
    #[serde(default)]
    pub ledger: LedgerSection,
}

/// The `[group]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSection {
    pub name: String,
    pub monthly_due: Decimal,
    #[serde(default)]
    pub description: String,
}

/// The `[ledger]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSection {
    /// Decimal places of the currency's minor unit.
    #[serde(default = "default_minor_unit_scale")]
    pub minor_unit_scale: u32,
    #[serde(default)]
    pub due_policy: DuePolicy,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            minor_unit_scale: DEFAULT_MINOR_UNIT_SCALE,
            due_policy: DuePolicy::default(),
        }
    }
}

fn default_minor_unit_scale() -> u32 {
    DEFAULT_MINOR_UNIT_SCALE
}

impl LedgerConfig {
    /// Load and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Load `path` if given, otherwise `ledger.toml` when present, otherwise
    /// the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LedgerError::Config(format!("failed to parse config: {e}")))?;

        if config.ledger.minor_unit_scale > 8 {
            return Err(LedgerError::Config(format!(
                "minor_unit_scale {} is too large",
                config.ledger.minor_unit_scale
            )));
        }
        if let Some(group) = &config.group {
            config.group_due(group)?;
        }
        Ok(config)
    }

    /// The validated monthly due amount of a `[group]` section.
    pub fn group_due(&self, group: &GroupSection) -> Result<Amount> {
        Amount::with_scale(group.monthly_due, self.ledger.minor_unit_scale)
            .map_err(|e| LedgerError::Config(format!("[group] monthly_due: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LedgerConfig::parse("").unwrap();
        assert!(config.group.is_none());
        assert_eq!(config.ledger.minor_unit_scale, 2);
        assert_eq!(config.ledger.due_policy, DuePolicy::Snapshot);
    }

    #[test]
    fn test_full_config() {
        let config = LedgerConfig::parse(
            r#"
            [group]
            name = "Ujirani Mwema"
            monthly_due = 5000
            description = "Neighbourhood fund"

            [ledger]
            minor_unit_scale = 0
            due_policy = "current"
            "#,
        )
        .unwrap();

        let group = config.group.as_ref().unwrap();
        assert_eq!(group.name, "Ujirani Mwema");
        assert_eq!(config.group_due(group).unwrap().value(), dec!(5000));
        assert_eq!(config.ledger.minor_unit_scale, 0);
        assert_eq!(config.ledger.due_policy, DuePolicy::Current);
    }

    #[test]
    fn test_rejects_non_positive_due() {
        let result = LedgerConfig::parse(
            r#"
            [group]
            name = "G"
            monthly_due = 0
            "#,
        );
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = LedgerConfig::parse("[ledger]\ncurrency = \"TZS\"\n");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
