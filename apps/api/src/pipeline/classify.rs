//! Document classification — decides whether extracted text looks like
//! a résumé/CV using keyword-frequency heuristics.

/// Terms whose presence marks a document as CV-like.
const CV_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "projects",
    "certificates and awards",
    "resume",
    "curriculum vitae",
    "objective",
    "summary",
    "work history",
    "cv",
    "employment",
    "contact",
    "references",
    "qualifications",
    "achievements",
];

/// Minimum number of matched keywords for a CV classification. Chosen
/// to tolerate OCR noise: a true CV rarely carries fewer than three of
/// these terms, while other documents rarely accumulate three by chance.
const CV_KEYWORD_THRESHOLD: usize = 3;

/// Keyword-heuristic classifier. The keyword list and threshold are
/// immutable after construction, so instances are freely shareable
/// across concurrent requests.
#[derive(Debug, Clone)]
pub struct CvClassifier {
    keywords: Vec<String>,
    threshold: usize,
}

impl Default for CvClassifier {
    fn default() -> Self {
        Self::new(CV_KEYWORDS.iter().map(|k| k.to_string()).collect(), CV_KEYWORD_THRESHOLD)
    }
}

impl CvClassifier {
    /// Build a classifier over a custom keyword list. Keywords must be
    /// lowercase; matching is substring-based, not tokenized, so a
    /// keyword inside a longer word still counts.
    pub fn new(keywords: Vec<String>, threshold: usize) -> Self {
        Self { keywords, threshold }
    }

    /// True iff the case-folded text contains at least `threshold`
    /// distinct keywords as substrings.
    pub fn is_cv(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        let matches = self
            .keywords
            .iter()
            .filter(|keyword| text_lower.contains(keyword.as_str()))
            .count();
        matches >= self.threshold
    }
}
