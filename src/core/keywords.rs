use crate::core::taxonomy::{CategoryWeights, RoleTaxonomy};
use crate::models::MatchResult;

/// Score resume text against the keyword taxonomy of a target role
///
/// Scoring formula:
/// - each category's weight is split evenly across its keywords
/// - a keyword counts as matched on case-insensitive substring containment
/// - score = round(achieved / max_achievable * 100)
///
/// Unknown roles yield a zero score with empty keyword lists.
pub fn score_resume(
    taxonomy: &RoleTaxonomy,
    weights: &CategoryWeights,
    target_role: &str,
    resume_text: &str,
) -> MatchResult {
    if !taxonomy.contains_role(target_role) {
        tracing::debug!("No taxonomy entry for role '{}', scoring as zero", target_role);
        return MatchResult::empty();
    }

    let text = resume_text.to_lowercase();

    let mut matched_keywords = Vec::new();
    let mut missing_keywords = Vec::new();
    let mut achieved = 0.0;
    let mut max_score = 0.0;

    for category in taxonomy.categories(target_role) {
        let keywords = category.keywords();
        if keywords.is_empty() {
            continue;
        }

        let per_keyword_weight = weights.weight_for(category.name()) / keywords.len() as f64;

        for keyword in keywords {
            max_score += per_keyword_weight;
            if text.contains(keyword.as_str()) {
                matched_keywords.push(keyword.clone());
                achieved += per_keyword_weight;
            } else {
                missing_keywords.push(keyword.clone());
            }
        }
    }

    let score = to_percentage(achieved, max_score);

    tracing::trace!(
        "Scored role '{}': {} matched, {} missing, score {}",
        target_role,
        matched_keywords.len(),
        missing_keywords.len(),
        score
    );

    MatchResult {
        score,
        matched_keywords,
        missing_keywords,
    }
}

#[inline]
fn to_percentage(achieved: f64, max_score: f64) -> u8 {
    if max_score <= 0.0 {
        return 0;
    }
    ((achieved / max_score) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Resume scorer holding the taxonomy and weight tables it scores against
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    taxonomy: RoleTaxonomy,
    weights: CategoryWeights,
}

impl KeywordScorer {
    pub fn new(taxonomy: RoleTaxonomy, weights: CategoryWeights) -> Self {
        Self { taxonomy, weights }
    }

    pub fn with_builtin_tables() -> Self {
        Self::new(RoleTaxonomy::builtin(), CategoryWeights::builtin())
    }

    pub fn score(&self, target_role: &str, resume_text: &str) -> MatchResult {
        score_resume(&self.taxonomy, &self.weights, target_role, resume_text)
    }

    pub fn taxonomy(&self) -> &RoleTaxonomy {
        &self.taxonomy
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::with_builtin_tables()
    }
}
