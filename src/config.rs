use serde::{Deserialize, Serialize};
use std::path::Path;

/// Caller-side policy for the command-line front end.
///
/// The codec itself has no tunables: the KDF iteration count, nonce/salt sizes
/// and payload layout are fixed so any build can extract any other build's
/// output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StegoConfig {
    /// Passwords shorter than this (in characters) are refused before embedding.
    pub min_password_len: usize,

    /// Refuse output paths with lossy extensions (JPEG destroys LSB data).
    pub require_lossless_output: bool,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            min_password_len: 8,
            require_lossless_output: true,
        }
    }
}

impl StegoConfig {
    /// Load from a TOML file. Keys left out keep their defaults; the file must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Check a password against the configured minimum length.
    pub fn check_password(&self, password: &str) -> anyhow::Result<()> {
        let len = password.chars().count();
        if len < self.min_password_len {
            anyhow::bail!(
                "Password too short: {} characters, minimum is {}",
                len,
                self.min_password_len
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = StegoConfig::default();
        assert_eq!(cfg.min_password_len, 8);
        assert!(cfg.require_lossless_output);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StegoConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
        assert!(StegoConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_password_len = 12").unwrap();
        let cfg = StegoConfig::load(file.path()).unwrap();
        assert_eq!(cfg.min_password_len, 12);
        assert!(cfg.require_lossless_output);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_password_len = \"many\"").unwrap();
        assert!(StegoConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_check_password() {
        let cfg = StegoConfig::default();
        assert!(cfg.check_password("Str0ngPass!").is_ok());
        assert!(cfg.check_password("short").is_err());
        // Counted in characters, not bytes
        assert!(cfg.check_password("ééééééé").is_err());
        assert!(cfg.check_password("éééééééé").is_ok());
    }
}
