use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for a single object store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Version written into the `%PDF-` header line.
    pub version: String,
    /// Emit the high-byte comment line after the header so transports
    /// treat the output as binary.
    pub binary_marker: bool,
    /// Branching factor of the cross-reference table's sparse array.
    pub cluster_size: usize,
    /// Terminal generation. A slot whose generation reaches it is retired.
    pub max_generation: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            binary_marker: true,
            cluster_size: 64,
            max_generation: folio_types::MAX_GENERATION,
        }
    }
}

impl StoreConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.cluster_size < 2 {
            return Err(StoreError::Config(format!(
                "cluster_size must be at least 2, got {}",
                self.cluster_size
            )));
        }
        if self.max_generation == 0 {
            return Err(StoreError::Config("max_generation must be nonzero".into()));
        }
        if self.version.is_empty() || !self.version.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(StoreError::Config(format!("invalid version {:?}", self.version)));
        }
        Ok(())
    }

    /// The header bytes written at the start of every new store.
    pub fn header(&self) -> Vec<u8> {
        let mut header = format!("%PDF-{}\n", self.version).into_bytes();
        if self.binary_marker {
            header.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::default();
        config.validate().unwrap();
        assert_eq!(config.max_generation, 65535);
        assert_eq!(config.header(), b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = StoreConfig::from_toml_str("version = \"1.7\"\nbinary_marker = false\n").unwrap();
        assert_eq!(config.version, "1.7");
        assert_eq!(config.cluster_size, 64);
        assert_eq!(config.header(), b"%PDF-1.7\n");
    }

    #[test]
    fn toml_roundtrip() {
        let config = StoreConfig {
            cluster_size: 8,
            max_generation: 4,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            StoreConfig::from_toml_str("cluster_size = 1"),
            Err(StoreError::Config(_))
        ));
        assert!(StoreConfig::from_toml_str("max_generation = 0").is_err());
        assert!(StoreConfig::from_toml_str("version = \"1.4\nx\"").is_err());
        assert!(StoreConfig::from_toml_str("cluster_size = \"many\"").is_err());
    }
}
