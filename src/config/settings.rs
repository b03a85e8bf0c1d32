use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::generator::DEFAULT_LENGTH;
use crate::errors::{CryptHubError, Result};
use crate::vault::DEFAULT_CATEGORY;

/// User configuration, loaded from `.crypthub.toml`.
///
/// Every field has a sensible default so CryptHub works out-of-the-box
/// without any config file at all.
///
/// The Argon2 values are part of the vault contract: changing them after
/// `init` makes the existing master password (and every bundle exported
/// under the old values) fail to verify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the working directory) holding the database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Category used by `add` when none is given.
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Length of passwords produced by `generate` and `add --generate`.
    #[serde(default = "default_generator_length")]
    pub generator_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".crypthub".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_generator_length() -> usize {
    DEFAULT_LENGTH
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            default_category: default_category(),
            generator_length: default_generator_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".crypthub.toml";

    /// Load settings from `<dir>/.crypthub.toml`.
    ///
    /// A missing file yields the defaults. A file that does not parse, or
    /// whose values cannot work, is a `ConfigError`.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CryptHubError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values no vault operation could use.
    ///
    /// Argon2 cost floors are enforced by the KDF itself.
    fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CryptHubError::ConfigError("data_dir cannot be empty".into()));
        }
        if self.default_category.trim().is_empty() {
            return Err(CryptHubError::ConfigError(
                "default_category cannot be empty".into(),
            ));
        }
        if self.generator_length == 0 {
            return Err(CryptHubError::ConfigError(
                "generator_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the data directory, letting an explicit override win.
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn data_path(&self, base_dir: &Path, override_dir: Option<&str>) -> PathBuf {
        base_dir.join(override_dir.unwrap_or(&self.data_dir))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.data_dir, ".crypthub");
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.default_category, "General");
        assert_eq!(s.generator_length, 20);
    }

    #[test]
    fn default_params_match_crypto_defaults() {
        assert_eq!(
            Settings::default().argon2_params(),
            crate::crypto::Argon2Params::default()
        );
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, ".crypthub");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
data_dir = "secrets"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
default_category = "Personal"
generator_length = 32
"#;
        fs::write(tmp.path().join(".crypthub.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "secrets");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert_eq!(settings.default_category, "Personal");
        assert_eq!(settings.generator_length, 32);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".crypthub.toml"), "argon2_iterations = 1\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_iterations, 1);
        assert_eq!(settings.data_dir, ".crypthub");
        assert_eq!(settings.argon2_memory_kib, 65_536);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".crypthub.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(CryptHubError::ConfigError(_))));
    }

    #[test]
    fn load_rejects_unusable_values() {
        let tmp = TempDir::new().unwrap();
        for bad in ["generator_length = 0\n", "default_category = \"  \"\n", "data_dir = \"\"\n"] {
            fs::write(tmp.path().join(".crypthub.toml"), bad).unwrap();
            assert!(
                matches!(Settings::load(tmp.path()), Err(CryptHubError::ConfigError(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn data_path_prefers_override() {
        let s = Settings::default();
        let base = Path::new("/home/user");
        assert_eq!(s.data_path(base, None), PathBuf::from("/home/user/.crypthub"));
        assert_eq!(
            s.data_path(base, Some("/var/vault")),
            PathBuf::from("/var/vault")
        );
    }
}
