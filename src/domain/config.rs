use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{RequestType, stats::AmountStyle};

/// Configuration for a request desk.
///
/// Controls which request types may be submitted, how amounts are rendered and
/// how strictly the request directory is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The request types that may be submitted.
    ///
    /// If this is empty, all types are allowed.
    allowed_types: Vec<RequestType>,

    /// Symbol prefixed to monetary amounts.
    pub currency_symbol: String,

    /// Whether amounts are shown in lakh/crore units.
    pub compact_amounts: bool,

    /// Whether rejecting a request requires a non-blank reason.
    pub require_rejection_reason: bool,

    /// Whether to skip request files that cannot be parsed instead of failing
    /// the whole load.
    pub allow_unrecognised: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_types: Vec::new(),
            currency_symbol: default_currency_symbol(),
            compact_amounts: true,
            require_rejection_reason: false,
            allow_unrecognised: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the allowed types, if configured.
    #[must_use]
    pub fn allowed_types(&self) -> &[RequestType] {
        &self.allowed_types
    }

    /// Checks if a request type may be submitted.
    ///
    /// If `allowed_types` is empty, all types are allowed.
    #[must_use]
    pub fn is_type_allowed(&self, request_type: &RequestType) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.contains(request_type)
    }

    /// Adds a type to the allowed list.
    ///
    /// Returns `true` if the type was added, `false` if it already existed.
    pub fn add_type(&mut self, request_type: RequestType) -> bool {
        if self.allowed_types.contains(&request_type) {
            false
        } else {
            self.allowed_types.push(request_type);
            true
        }
    }

    /// Removes a type from the allowed list.
    ///
    /// Returns `true` if the type was removed, `false` if it wasn't listed.
    pub fn remove_type(&mut self, request_type: &RequestType) -> bool {
        if let Some(pos) = self.allowed_types.iter().position(|t| t == request_type) {
            self.allowed_types.remove(pos);
            true
        } else {
            false
        }
    }

    /// How amounts should be rendered.
    #[must_use]
    pub const fn amount_style(&self) -> AmountStyle {
        if self.compact_amounts {
            AmountStyle::Compact
        } else {
            AmountStyle::Grouped
        }
    }

    /// Reads a single key as a display string.
    ///
    /// Returns `None` for an unknown key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "allowed_types" => self
                .allowed_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            "currency_symbol" => self.currency_symbol.clone(),
            "compact_amounts" => self.compact_amounts.to_string(),
            "require_rejection_reason" => self.require_rejection_reason.to_string(),
            "allow_unrecognised" => self.allow_unrecognised.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a single key from its string form.
    ///
    /// `allowed_types` takes a comma-separated list; an empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let flag = || {
            value
                .trim()
                .parse::<bool>()
                .map_err(|_| format!("'{key}' expects true or false, got '{value}'"))
        };

        match key {
            "allowed_types" => {
                self.allowed_types = value
                    .split(',')
                    .filter(|part| !part.trim().is_empty())
                    .map(|part| part.parse::<RequestType>().map_err(|e| e.to_string()))
                    .collect::<Result<_, _>>()?;
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "compact_amounts" => self.compact_amounts = flag()?,
            "require_rejection_reason" => self.require_rejection_reason = flag()?,
            "allow_unrecognised" => self.allow_unrecognised = flag()?,
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    /// Every key accepted by [`get`](Self::get) and [`set`](Self::set).
    pub const KEYS: [&'static str; 5] = [
        "allowed_types",
        "currency_symbol",
        "compact_amounts",
        "require_rejection_reason",
        "allow_unrecognised",
    ];
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed_types: Vec<RequestType>,

        #[serde(default = "default_currency_symbol")]
        currency_symbol: String,

        #[serde(default = "default_true")]
        compact_amounts: bool,

        #[serde(default)]
        require_rejection_reason: bool,

        #[serde(default)]
        allow_unrecognised: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                allowed_types,
                currency_symbol,
                compact_amounts,
                require_rejection_reason,
                allow_unrecognised,
            } => Self {
                allowed_types,
                currency_symbol,
                compact_amounts,
                require_rejection_reason,
                allow_unrecognised,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            allowed_types: config.allowed_types,
            currency_symbol: config.currency_symbol,
            compact_amounts: config.compact_amounts,
            require_rejection_reason: config.require_rejection_reason,
            allow_unrecognised: config.allow_unrecognised,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            "_version = \"1\"\nallowed_types = [\"loan\", \"Asset\"]\ncurrency_symbol = \"Rs \"\ncompact_amounts = false\nrequire_rejection_reason = true\n"
                .as_bytes(),
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config.allowed_types(),
            &[RequestType::Loan, RequestType::Asset]
        );
        assert_eq!(config.currency_symbol, "Rs ");
        assert_eq!(config.amount_style(), AmountStyle::Grouped);
        assert!(config.require_rejection_reason);
        assert!(!config.allow_unrecognised);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ncompact_amounts = \"yes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.currency_symbol, "₹");
        assert!(actual.compact_amounts);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.add_type(RequestType::Interview);
        config.allow_unrecognised = true;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn empty_allow_list_allows_everything() {
        let mut config = Config::default();
        assert!(config.is_type_allowed(&RequestType::Grievance));

        assert!(config.add_type(RequestType::Loan));
        assert!(!config.add_type(RequestType::Loan));
        assert!(config.is_type_allowed(&RequestType::Loan));
        assert!(!config.is_type_allowed(&RequestType::Grievance));

        assert!(config.remove_type(&RequestType::Loan));
        assert!(!config.remove_type(&RequestType::Loan));
        assert!(config.is_type_allowed(&RequestType::Grievance));
    }

    #[test]
    fn set_and_get_by_key() {
        let mut config = Config::default();
        config.set("allowed_types", "loan, mrf").unwrap();
        assert_eq!(config.get("allowed_types").unwrap(), "loan,mrf");

        config.set("compact_amounts", "false").unwrap();
        assert_eq!(config.get("compact_amounts").unwrap(), "false");

        config.set("allowed_types", "").unwrap();
        assert!(config.allowed_types().is_empty());

        assert!(config.set("compact_amounts", "maybe").is_err());
        assert!(config.set("digits", "3").is_err());
        assert_eq!(config.get("digits"), None);
    }

    #[test]
    fn every_key_is_readable() {
        let config = Config::default();
        for key in Config::KEYS {
            assert!(config.get(key).is_some(), "{key}");
        }
    }
}
