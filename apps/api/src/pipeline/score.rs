//! Section-based completeness scoring for CV text.
//!
//! Five fixed semantic sections, each with a weight and a keyword set.
//! A section is present iff any of its keywords occurs as a substring
//! of the case-folded text; the total score is the sum of present
//! weights. Integer-only and deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A scored section: its name, the weight it contributes when present,
/// and the lowercase keywords that detect it.
#[derive(Debug, Clone)]
pub struct SectionDefinition {
    pub name: &'static str,
    pub weight: u32,
    pub keywords: &'static [&'static str],
}

/// The fixed section table. Weights sum to 100.
pub const SECTION_DEFINITIONS: &[SectionDefinition] = &[
    SectionDefinition {
        name: "education",
        weight: 20,
        keywords: &[
            "education", "degree", "university", "school", "college", "phd", "bachelor", "master",
        ],
    },
    SectionDefinition {
        name: "experience",
        weight: 30,
        keywords: &[
            "experience", "work", "role", "position", "employment", "job", "intern",
        ],
    },
    SectionDefinition {
        name: "skills",
        weight: 25,
        keywords: &[
            "skills", "technical", "proficiency", "programming", "languages", "expertise",
        ],
    },
    SectionDefinition {
        name: "contact",
        weight: 10,
        keywords: &["contact", "email", "phone", "address", "location", "linkedin"],
    },
    SectionDefinition {
        name: "achievements",
        weight: 15,
        keywords: &[
            "achievements", "awards", "accomplishments", "projects", "certifications",
        ],
    },
];

/// Presence and awarded weight for one section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionScore {
    pub present: bool,
    pub score: u32,
}

/// Full completeness report for one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreResult {
    pub total_score: u32,
    pub max_possible_score: u32,
    pub sections: BTreeMap<String, SectionScore>,
}

/// Scores CV text against an immutable section table injected at
/// construction. Callers are expected to have classified the text as
/// CV-like already; the scorer does not re-classify.
#[derive(Debug, Clone)]
pub struct SectionScorer {
    sections: Vec<SectionDefinition>,
}

impl Default for SectionScorer {
    fn default() -> Self {
        Self::new(SECTION_DEFINITIONS.to_vec())
    }
}

impl SectionScorer {
    pub fn new(sections: Vec<SectionDefinition>) -> Self {
        Self { sections }
    }

    /// Evaluate every section independently and report all of them.
    /// A document can be present in zero through all five.
    pub fn score(&self, text: &str) -> ScoreResult {
        let text_lower = text.to_lowercase();
        let max_possible_score = self.sections.iter().map(|s| s.weight).sum();

        let mut total_score = 0;
        let mut sections = BTreeMap::new();
        for definition in &self.sections {
            let present = definition
                .keywords
                .iter()
                .any(|keyword| text_lower.contains(keyword));
            let score = if present { definition.weight } else { 0 };
            total_score += score;

            sections.insert(definition.name.to_string(), SectionScore { present, score });
        }

        ScoreResult {
            total_score,
            max_possible_score,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_five_sections_present_scores_100() {
        let result =
            SectionScorer::default().score("education experience skills contact achievements");
        assert_eq!(result.total_score, 100);
        assert_eq!(result.max_possible_score, 100);
        assert_eq!(result.sections.len(), 5);
        assert!(result.sections.values().all(|s| s.present));
    }

    #[test]
    fn test_three_sections_score_75() {
        let result = SectionScorer::default().score("experience education skills");
        assert_eq!(result.total_score, 75);
        assert!(result.sections["experience"].present);
        assert!(result.sections["education"].present);
        assert!(result.sections["skills"].present);
        assert!(!result.sections["contact"].present);
        assert!(!result.sections["achievements"].present);
        assert_eq!(result.sections["contact"].score, 0);
        assert_eq!(result.sections["achievements"].score, 0);
    }

    #[test]
    fn test_no_sections_still_reports_all_five() {
        let result = SectionScorer::default().score("the quick brown fox");
        assert_eq!(result.total_score, 0);
        assert_eq!(result.sections.len(), 5);
        assert!(result.sections.values().all(|s| !s.present && s.score == 0));
    }

    #[test]
    fn test_empty_text_scores_zero_without_error() {
        let result = SectionScorer::default().score("");
        assert_eq!(result.total_score, 0);
        assert_eq!(result.max_possible_score, 100);
    }

    #[test]
    fn test_total_equals_sum_of_present_weights() {
        let result = SectionScorer::default().score("linkedin profile and a phd");
        let expected: u32 = result.sections.values().map(|s| s.score).sum();
        assert_eq!(result.total_score, expected);
        assert!(result.total_score <= result.max_possible_score);
    }

    #[test]
    fn test_single_section_scores_its_weight_only() {
        // "linkedin" detects contact and nothing else.
        let result = SectionScorer::default().score("linkedin");
        assert_eq!(result.total_score, 10);
        assert!(result.sections["contact"].present);
        assert!(!result.sections["experience"].present);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = SectionScorer::default();
        let text = "Work Experience at a University, contact via email";
        assert_eq!(scorer.score(text), scorer.score(text));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let result = SectionScorer::default().score("EDUCATION and EXPERIENCE");
        assert!(result.sections["education"].present);
        assert!(result.sections["experience"].present);
    }

    #[test]
    fn test_custom_section_table() {
        let scorer = SectionScorer::new(vec![SectionDefinition {
            name: "hobbies",
            weight: 40,
            keywords: &["chess"],
        }]);
        let result = scorer.score("I play chess");
        assert_eq!(result.total_score, 40);
        assert_eq!(result.max_possible_score, 40);
        assert_eq!(result.sections.len(), 1);
    }
}
