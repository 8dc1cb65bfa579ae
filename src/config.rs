use crate::twothree::TraversalOrder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Key list the demo driver inserts when nothing else is configured.
pub const DEFAULT_KEYS: [i64; 26] = [
    24, 35, 40, 50, 60, 18, 22, 70, 80, 11, 14, 3, 20, 30, 46, 66, 90, 8, 5, 13, 28, 26, 32, -2,
    2, 7,
];

const DEFAULT_RANDOM_MAX: i64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for the `tree` driver, read from TOML. Every field is optional.
///
/// ```toml
/// keys = [20, 30, 40]
/// search = 30
/// delete = 20
/// orders = ["inorder"]
///
/// [random]
/// count = 50
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub keys: Vec<i64>,
    pub search: Option<i64>,
    pub delete: Option<i64>,
    pub orders: Vec<TraversalOrder>,
    pub random: Option<RandomKeys>,
    pub show_tree: bool,
}

/// Replaces `keys` with `count` keys drawn from `0..=max`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomKeys {
    pub count: usize,
    #[serde(default = "default_random_max")]
    pub max: i64,
    #[serde(default)]
    pub seed: u64,
}

fn default_random_max() -> i64 {
    DEFAULT_RANDOM_MAX
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            keys: DEFAULT_KEYS.to_vec(),
            search: None,
            delete: None,
            orders: TraversalOrder::ALL.to_vec(),
            random: None,
            show_tree: false,
        }
    }
}

impl RandomKeys {
    pub fn new(count: usize, seed: u64) -> Self {
        RandomKeys {
            count,
            max: DEFAULT_RANDOM_MAX,
            seed,
        }
    }
}

impl DriverConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Keys to insert, in insertion order. Random keys are reproducible for
    /// a given seed and never negative.
    pub fn insertion_keys(&self) -> Vec<i64> {
        match &self.random {
            None => self.keys.clone(),
            Some(random) => {
                let mut rng = StdRng::seed_from_u64(random.seed);
                let max = random.max.max(0);
                (0..random.count).map(|_| rng.gen_range(0..=max)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DriverConfig::from_toml("").unwrap();
        assert_eq!(config, DriverConfig::default());
        assert_eq!(config.insertion_keys(), DEFAULT_KEYS.to_vec());
    }

    #[test]
    fn test_parse_full_config() {
        let config = DriverConfig::from_toml(
            r#"
            keys = [20, 30, 40]
            search = 30
            delete = -2
            orders = ["inorder", "postorder"]
            show_tree = true
            "#,
        )
        .unwrap();

        assert_eq!(config.keys, vec![20, 30, 40]);
        assert_eq!(config.search, Some(30));
        assert_eq!(config.delete, Some(-2));
        assert_eq!(
            config.orders,
            vec![TraversalOrder::Inorder, TraversalOrder::Postorder]
        );
        assert!(config.show_tree);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DriverConfig::from_toml("depth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_random_keys_are_seeded() {
        let config = DriverConfig::from_toml(
            r#"
            [random]
            count = 40
            max = 99
            seed = 11
            "#,
        )
        .unwrap();

        let first = config.insertion_keys();
        let second = config.insertion_keys();
        assert_eq!(first.len(), 40);
        assert_eq!(first, second);
        assert!(first.iter().all(|k| (0..=99).contains(k)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "keys = [5, 1, 9]").unwrap();
        writeln!(file, "search = 9").unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert_eq!(config.keys, vec![5, 1, 9]);
        assert_eq!(config.search, Some(9));
    }

    #[test]
    fn test_missing_file() {
        let err = DriverConfig::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
