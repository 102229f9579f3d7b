use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::validate::{require, FieldError, Validate};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct Alias {
    #[serde(default)]
    pub account_number: u64,
    #[serde(default)]
    pub default_region: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Validate for Alias {
    fn validate(&self) -> Result<(), FieldError> {
        require("account_number", &self.account_number)?;
        require("name", &self.name)?;
        require("role", &self.role)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Account {
    #[serde(default)]
    pub aliases: Vec<Alias>,
    #[serde(default)]
    pub aws_access_key_id: String,
    #[serde(default)]
    pub aws_secret_access_key: String,
    #[serde(default)]
    pub mfa_role: String,
}

impl Validate for Account {
    fn validate(&self) -> Result<(), FieldError> {
        require("aws_access_key_id", &self.aws_access_key_id)?;
        require("aws_secret_access_key", &self.aws_secret_access_key)?;
        require("mfa_role", &self.mfa_role)?;
        Ok(())
    }
}

/// Long-lived key material and MFA device of the account owning an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityCredentials {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub mfa_role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AliasLocation {
    account: usize,
    alias: usize,
}

#[derive(Debug, Deserialize)]
struct Document {
    accounts: Vec<Account>,
}

#[derive(Debug)]
pub(crate) struct Config {
    accounts: Vec<Account>,
    aliases: HashMap<String, AliasLocation>,
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        debug!("Loading config: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parses either the nested `accounts` schema or the flat single-account schema.
    pub(crate) fn parse(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;

        let accounts = if value.get("accounts").is_some() {
            serde_yaml::from_value::<Document>(value)?.accounts
        } else {
            debug!("No accounts list, reading flat single-account schema");
            vec![serde_yaml::from_value::<Account>(value)?]
        };

        Self::from_accounts(accounts)
    }

    pub(crate) fn from_accounts(accounts: Vec<Account>) -> Result<Self> {
        for account in &accounts {
            account.validate()?;
            for alias in &account.aliases {
                alias.validate()?;
            }
        }

        let mut aliases = HashMap::new();
        for (account_index, account) in accounts.iter().enumerate() {
            for (alias_index, alias) in account.aliases.iter().enumerate() {
                let location = AliasLocation {
                    account: account_index,
                    alias: alias_index,
                };
                if aliases.insert(alias.name.clone(), location).is_some() {
                    warn!("Alias {} is defined more than once, the last definition wins", alias.name);
                }
            }
        }

        Ok(Self { accounts, aliases })
    }

    pub(crate) fn get_alias(&self, name: &str) -> Result<(&Alias, SecurityCredentials)> {
        let location = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("alias {name} does not exist"))?;

        let account = &self.accounts[location.account];
        let credentials = SecurityCredentials {
            aws_access_key_id: account.aws_access_key_id.clone(),
            aws_secret_access_key: account.aws_secret_access_key.clone(),
            mfa_role: account.mfa_role.clone(),
        };

        Ok((&account.aliases[location.alias], credentials))
    }

    /// Alias names in no particular order.
    pub(crate) fn alias_names(&self) -> Vec<&str> {
        self.aliases.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::collections::HashSet;
    use std::io::Write;

    const NESTED: &str = r#"
accounts:
  - aws_access_key_id: AKIAPROD
    aws_secret_access_key: prod-secret
    mfa_role: arn:aws:iam::111111111111:mfa/alice
    aliases:
      - name: prod
        account_number: 111111111111
        role: admin
        default_region: eu-west-1
  - aws_access_key_id: AKIADEV
    aws_secret_access_key: dev-secret
    mfa_role: arn:aws:iam::222222222222:mfa/bob
    aliases:
      - name: dev
        account_number: 222222222222
        role: developer
"#;

    const FLAT: &str = r#"
aws_access_key_id: AKIAFLAT
aws_secret_access_key: flat-secret
mfa_role: arn:aws:iam::333333333333:mfa/carol
aliases:
  - name: legacy
    account_number: 333333333333
    role: readonly
"#;

    #[test]
    fn get_alias_returns_owning_account_credentials() {
        let config = Config::parse(NESTED).unwrap();

        let (alias, credentials) = config.get_alias("prod").unwrap();
        assert_eq!(alias.name, "prod");
        assert_eq!(alias.account_number, 111111111111);
        assert_eq!(alias.role, "admin");
        assert_eq!(alias.default_region, "eu-west-1");
        assert_eq!(
            credentials,
            SecurityCredentials {
                aws_access_key_id: "AKIAPROD".to_string(),
                aws_secret_access_key: "prod-secret".to_string(),
                mfa_role: "arn:aws:iam::111111111111:mfa/alice".to_string(),
            }
        );

        let (alias, credentials) = config.get_alias("dev").unwrap();
        assert_eq!(alias.role, "developer");
        assert_eq!(alias.default_region, "");
        assert_eq!(credentials.aws_access_key_id, "AKIADEV");
    }

    #[test]
    fn missing_alias_is_an_error() {
        let config = Config::parse(NESTED).unwrap();

        let err = config.get_alias("missing").unwrap_err();
        assert_eq!(err.to_string(), "alias missing does not exist");
    }

    #[test]
    fn alias_names_cover_every_account() {
        let config = Config::parse(NESTED).unwrap();

        let names: HashSet<&str> = config.alias_names().into_iter().collect();
        assert_eq!(names, HashSet::from(["prod", "dev"]));
    }

    #[test]
    fn parsing_twice_yields_identical_lookups() {
        let first = Config::parse(NESTED).unwrap();
        let second = Config::parse(NESTED).unwrap();

        for name in ["prod", "dev"] {
            let (a, a_creds) = first.get_alias(name).unwrap();
            let (b, b_creds) = second.get_alias(name).unwrap();
            assert_eq!(a, b);
            assert_eq!(a_creds, b_creds);
        }
    }

    #[test]
    fn flat_schema_is_one_implicit_account() {
        let config = Config::parse(FLAT).unwrap();

        let (alias, credentials) = config.get_alias("legacy").unwrap();
        assert_eq!(alias.role, "readonly");
        assert_eq!(credentials.aws_access_key_id, "AKIAFLAT");
        assert_eq!(config.alias_names(), vec!["legacy"]);
    }

    #[rstest]
    #[case::access_key(
        "accounts:\n  - aws_secret_access_key: s\n    mfa_role: m\n",
        "field aws_access_key_id must be set"
    )]
    #[case::secret_key(
        "accounts:\n  - aws_access_key_id: a\n    mfa_role: m\n",
        "field aws_secret_access_key must be set"
    )]
    #[case::mfa_role(
        "accounts:\n  - aws_access_key_id: a\n    aws_secret_access_key: s\n",
        "field mfa_role must be set"
    )]
    #[case::account_number(
        "accounts:\n  - aws_access_key_id: a\n    aws_secret_access_key: s\n    mfa_role: m\n    aliases:\n      - name: x\n        role: r\n",
        "field account_number must be set"
    )]
    #[case::alias_name(
        "accounts:\n  - aws_access_key_id: a\n    aws_secret_access_key: s\n    mfa_role: m\n    aliases:\n      - account_number: 1\n        role: r\n",
        "field name must be set"
    )]
    #[case::alias_role(
        "accounts:\n  - aws_access_key_id: a\n    aws_secret_access_key: s\n    mfa_role: m\n    aliases:\n      - account_number: 1\n        name: x\n",
        "field role must be set"
    )]
    fn missing_required_field_rejects_config(#[case] content: &str, #[case] expected: &str) {
        let err = Config::parse(content).unwrap_err();

        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn duplicate_alias_last_definition_wins() {
        let content = r#"
accounts:
  - aws_access_key_id: AKIAFIRST
    aws_secret_access_key: s
    mfa_role: m
    aliases:
      - { name: shared, account_number: 1, role: first }
  - aws_access_key_id: AKIASECOND
    aws_secret_access_key: s
    mfa_role: m
    aliases:
      - { name: shared, account_number: 2, role: second }
"#;
        let config = Config::parse(content).unwrap();

        let (alias, credentials) = config.get_alias("shared").unwrap();
        assert_eq!(alias.role, "second");
        assert_eq!(credentials.aws_access_key_id, "AKIASECOND");
        assert_eq!(config.alias_names().len(), 1);
    }

    #[test]
    fn unparsable_document_is_an_error() {
        assert!(Config::parse("accounts: [").is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NESTED.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.alias_names().len(), 2);
    }

    #[test]
    fn load_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }
}
