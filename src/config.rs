use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::core::taxonomy::{
    BUILTIN_CATEGORY_WEIGHTS, CategoryWeights, KeywordCategory, RoleTaxonomy, TaxonomyError,
    DEFAULT_CATEGORY_WEIGHT,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub taxonomy: TaxonomySettings,
    #[serde(default)]
    #[validate(nested)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Role keyword taxonomy.
///
/// Roles and categories are arrays so their order survives deserialization:
///
/// ```toml
/// [[taxonomy.roles]]
/// name = "data scientist"
///
/// [[taxonomy.roles.categories]]
/// name = "core"
/// keywords = ["python", "pandas"]
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaxonomySettings {
    #[serde(default = "builtin_roles")]
    #[validate(nested)]
    pub roles: Vec<RoleSettings>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleSettings {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub categories: Vec<CategorySettings>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategorySettings {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Default for TaxonomySettings {
    fn default() -> Self {
        Self {
            roles: builtin_roles(),
        }
    }
}

impl TaxonomySettings {
    /// Parse a standalone taxonomy document (the `[[roles]]` tables without
    /// the `taxonomy.` prefix)
    pub fn from_toml_str(raw: &str) -> Result<Self, TaxonomyError> {
        let settings: TaxonomySettings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Build the lookup table used by the scorer
    pub fn to_taxonomy(&self) -> RoleTaxonomy {
        let mut taxonomy = RoleTaxonomy::new();
        for role in &self.roles {
            let categories = role
                .categories
                .iter()
                .map(|c| KeywordCategory::new(c.name.clone(), &c.keywords))
                .collect();
            taxonomy.insert_role(&role.name, categories);
        }
        taxonomy
    }
}

fn builtin_roles() -> Vec<RoleSettings> {
    let taxonomy = RoleTaxonomy::builtin();
    taxonomy
        .roles()
        .map(|role| RoleSettings {
            name: role.to_string(),
            categories: taxonomy
                .categories(role)
                .iter()
                .map(|c| CategorySettings {
                    name: c.name().to_string(),
                    keywords: c.keywords().to_vec(),
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScoringSettings {
    #[serde(default = "default_category_weight")]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub default_category_weight: f64,
    #[serde(default = "default_category_weights")]
    pub category_weights: HashMap<String, f64>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            default_category_weight: default_category_weight(),
            category_weights: default_category_weights(),
        }
    }
}

impl ScoringSettings {
    /// Build the weight table, rejecting weights outside (0, 1]
    pub fn to_weights(&self) -> Result<CategoryWeights, TaxonomyError> {
        self.category_weights.iter().try_fold(
            CategoryWeights::new(self.default_category_weight)?,
            |weights, (category, weight)| weights.with_weight(category.clone(), *weight),
        )
    }
}

fn default_category_weight() -> f64 { DEFAULT_CATEGORY_WEIGHT }

fn default_category_weights() -> HashMap<String, f64> {
    BUILTIN_CATEGORY_WEIGHTS
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
        }
    }
}

fn default_artifact_path() -> PathBuf { PathBuf::from("ml/model_metrics.json") }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with INSIGHT__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., INSIGHT__METRICS__ARTIFACT_PATH -> metrics.artifact_path
            .add_source(
                Environment::with_prefix("INSIGHT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("INSIGHT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate and build the scorer's taxonomy and weight tables
    pub fn scoring_tables(&self) -> Result<(RoleTaxonomy, CategoryWeights), TaxonomyError> {
        self.validate()?;
        let weights = self.scoring.to_weights()?;
        Ok((self.taxonomy.to_taxonomy(), weights))
    }
}
