use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Weight used for any category without an explicit entry
pub const DEFAULT_CATEGORY_WEIGHT: f64 = 0.2;

/// Category weights shipped with the resume analyzer
pub const BUILTIN_CATEGORY_WEIGHTS: [(&str, f64); 7] = [
    ("core", 0.5),
    ("tooling", 0.2),
    ("advanced", 0.3),
    ("frontend", 0.3),
    ("backend", 0.3),
    ("bi", 0.3),
    ("stats", 0.2),
];

/// Errors raised while building taxonomy or weight tables
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Category weight for '{category}' must be in (0, 1], got {weight}")]
    WeightOutOfRange { category: String, weight: f64 },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Taxonomy parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),
}

/// A named group of keywords within one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCategory {
    name: String,
    keywords: Vec<String>,
}

impl KeywordCategory {
    /// Build a category, lower-casing and trimming its name and keywords.
    /// Empty keywords are dropped and duplicates keep their first position.
    pub fn new<N, I, K>(name: N, keywords: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .map(|kw| kw.as_ref().trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .filter(|kw| seen.insert(kw.clone()))
            .collect();

        Self {
            name: name.into().trim().to_lowercase(),
            keywords,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoleEntry {
    name: String,
    categories: Vec<KeywordCategory>,
}

/// Mapping from role to its ordered keyword categories.
///
/// Role names are trimmed when inserted, lookup only lower-cases the requested
/// role, so surrounding whitespace makes a role unknown. Iteration order follows definition order,
/// which in turn fixes the order of matched/missing keywords in results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTaxonomy {
    roles: Vec<RoleEntry>,
    index: HashMap<String, usize>,
}

impl RoleTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role, replacing any earlier role with the same lower-cased name
    pub fn insert_role<N>(&mut self, name: N, categories: Vec<KeywordCategory>)
    where
        N: AsRef<str>,
    {
        let key = name.as_ref().trim().to_lowercase();

        if let Some(&position) = self.index.get(&key) {
            tracing::warn!("Role '{}' defined more than once, keeping the later definition", key);
            self.roles[position].categories = categories;
            return;
        }

        self.index.insert(key.clone(), self.roles.len());
        self.roles.push(RoleEntry {
            name: key,
            categories,
        });
    }

    /// Builder-style variant of [`insert_role`](Self::insert_role)
    pub fn with_role<N>(mut self, name: N, categories: Vec<KeywordCategory>) -> Self
    where
        N: AsRef<str>,
    {
        self.insert_role(name, categories);
        self
    }

    /// Categories for a role; empty when the role is unknown
    pub fn categories(&self, role: &str) -> &[KeywordCategory] {
        self.index
            .get(&normalize_role(role))
            .map(|&i| self.roles[i].categories.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.index.contains_key(&normalize_role(role))
    }

    /// Role identifiers in definition order
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name.as_str())
    }

    /// Full keyword set of a role in taxonomy order
    pub fn keywords(&self, role: &str) -> Vec<&str> {
        self.categories(role)
            .iter()
            .flat_map(|c| c.keywords().iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The role keyword table shipped with the resume analyzer
    pub fn builtin() -> Self {
        Self::new()
            .with_role(
                "data scientist",
                vec![
                    KeywordCategory::new(
                        "core",
                        ["python", "machine learning", "statistics", "pandas", "numpy", "scikit-learn"],
                    ),
                    KeywordCategory::new("tooling", ["sql", "data visualization", "jupyter", "git"]),
                    KeywordCategory::new("advanced", ["deep learning", "tensorflow", "pytorch", "mlops"]),
                ],
            )
            .with_role(
                "full stack developer",
                vec![
                    KeywordCategory::new("core", ["javascript", "react", "node", "express", "mongodb"]),
                    KeywordCategory::new("frontend", ["html", "css", "tailwind", "typescript"]),
                    KeywordCategory::new("backend", ["rest api", "jwt", "docker", "testing"]),
                ],
            )
            .with_role(
                "data analyst",
                vec![
                    KeywordCategory::new("core", ["excel", "sql", "reporting", "dashboards"]),
                    KeywordCategory::new("bi", ["tableau", "power bi", "lookerstudio"]),
                    KeywordCategory::new("stats", ["a/b testing", "hypothesis testing"]),
                ],
            )
    }
}

fn normalize_role(role: &str) -> String {
    role.to_lowercase()
}

/// Fraction of the achievable score allotted to each category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeights {
    weights: HashMap<String, f64>,
    default_weight: f64,
}

impl CategoryWeights {
    /// Empty weight table where every category uses `default_weight`
    pub fn new(default_weight: f64) -> Result<Self, TaxonomyError> {
        check_weight("<default>", default_weight)?;
        Ok(Self {
            weights: HashMap::new(),
            default_weight,
        })
    }

    pub fn with_weight<N>(mut self, category: N, weight: f64) -> Result<Self, TaxonomyError>
    where
        N: Into<String>,
    {
        let category = category.into().trim().to_lowercase();
        check_weight(&category, weight)?;
        self.weights.insert(category, weight);
        Ok(self)
    }

    /// Explicit weight for the category, or the default.
    /// Category names are stored lower-cased, as `KeywordCategory` stores them.
    #[inline]
    pub fn weight_for(&self, category: &str) -> f64 {
        self.weights
            .get(category)
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn default_weight(&self) -> f64 {
        self.default_weight
    }

    pub fn builtin() -> Self {
        let weights = BUILTIN_CATEGORY_WEIGHTS
            .into_iter()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect();

        Self {
            weights,
            default_weight: DEFAULT_CATEGORY_WEIGHT,
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_weight(category: &str, weight: f64) -> Result<(), TaxonomyError> {
    if weight.is_finite() && weight > 0.0 && weight <= 1.0 {
        Ok(())
    } else {
        Err(TaxonomyError::WeightOutOfRange {
            category: category.to_string(),
            weight,
        })
    }
}
