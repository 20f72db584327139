//! Store configuration.

/// Data-shape version compiled into this build. Bump it whenever the stored
/// record shape changes; stores written under any other version are wiped.
pub const DATA_VERSION: u32 = 2;

/// Configuration for opening a [`CharacterStore`](crate::CharacterStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Data version the store must be at after opening.
    pub data_version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_version: DATA_VERSION,
        }
    }
}

impl StoreConfig {
    /// Set the data version.
    pub fn with_data_version(mut self, version: u32) -> Self {
        self.data_version = version;
        self
    }

    /// The version marker as persisted.
    pub fn marker(&self) -> String {
        self.data_version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.data_version, DATA_VERSION);
        assert_eq!(cfg.marker(), "2");
    }

    #[test]
    fn builder_methods() {
        let cfg = StoreConfig::default().with_data_version(7);
        assert_eq!(cfg.data_version, 7);
        assert_eq!(cfg.marker(), "7");
    }
}
