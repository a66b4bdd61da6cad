//! Prompt complexity classification
//!
//! A heuristic, deterministic scorer over the prompt text. The resulting tier
//! is advisory: it may nudge a profile's weights but never replaces the
//! profile the caller asked for.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const QUESTION_WORDS: &[&str] = &[
    "what", "who", "where", "when", "why", "how", "which", "can", "could", "would", "should",
    "is", "are", "do", "does",
];

const REASONING_KEYWORDS: &[&str] = &[
    "analyze",
    "compare",
    "contrast",
    "evaluate",
    "explain",
    "synthesize",
    "critique",
    "assess",
    "interpret",
    "justify",
];

const MULTI_STEP_KEYWORDS: &[&str] = &[
    "step by step",
    "first",
    "then",
    "finally",
    "afterwards",
    "next",
    "following",
    "procedure",
    "process",
    "workflow",
];

const TECHNICAL_DOMAINS: &[(&str, &[&str])] = &[
    (
        "programming",
        &[
            "code",
            "function",
            "api",
            "database",
            "algorithm",
            "debug",
            "compile",
            "syntax",
        ],
    ),
    (
        "science",
        &[
            "hypothesis",
            "experiment",
            "data",
            "research",
            "theory",
            "analysis",
        ],
    ),
    (
        "math",
        &[
            "equation",
            "calculate",
            "formula",
            "probability",
            "statistics",
            "derivative",
        ],
    ),
    (
        "legal",
        &["contract", "liability", "compliance", "regulation", "statute"],
    ),
    (
        "medical",
        &["diagnosis", "symptom", "treatment", "patient", "clinical"],
    ),
    (
        "finance",
        &["investment", "portfolio", "roi", "valuation", "market"],
    ),
];

/// Complexity tier of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Simple,
    Moderate,
    Complex,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Simple => "simple",
            ComplexityTier::Moderate => "moderate",
            ComplexityTier::Complex => "complex",
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals extracted from the prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityFeatures {
    pub estimated_tokens: u32,
    pub sentence_count: u32,
    pub question_count: u32,
    pub code_blocks: u32,
    pub reasoning_keywords: u32,
    pub multi_step_keywords: u32,
    pub technical_terms: u32,
    pub domains: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_output_tokens: Option<u32>,
}

/// Result of classifying one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityAssessment {
    pub tier: ComplexityTier,
    /// Heuristic score in [0, 100]
    pub score: f64,
    /// Confidence in [0.5, 0.95]
    pub confidence: f64,
    pub features: ComplexityFeatures,
}

/// Heuristic complexity classifier.
///
/// Token thresholds control how much the prompt length contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityClassifier {
    pub short_tokens: u32,
    pub medium_tokens: u32,
    pub long_tokens: u32,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self {
            short_tokens: 50,
            medium_tokens: 200,
            long_tokens: 500,
        }
    }
}

impl ComplexityClassifier {
    /// Classify a single prompt.
    pub fn classify(&self, text: &str) -> ComplexityAssessment {
        self.classify_with_output(text, None)
    }

    /// Classify a prompt, also weighing how much output was requested.
    pub fn classify_with_output(
        &self,
        text: &str,
        requested_output_tokens: Option<u32>,
    ) -> ComplexityAssessment {
        let mut features = extract_features(text);
        features.requested_output_tokens = requested_output_tokens;

        let score = self.score(&features);
        let tier = if score >= 45.0 {
            ComplexityTier::Complex
        } else if score >= 20.0 {
            ComplexityTier::Moderate
        } else {
            ComplexityTier::Simple
        };
        let confidence = (0.5 + score / 200.0).min(0.95);

        tracing::trace!(
            tier = %tier,
            score,
            tokens = features.estimated_tokens,
            "classified prompt"
        );

        ComplexityAssessment {
            tier,
            score,
            confidence,
            features,
        }
    }

    fn score(&self, f: &ComplexityFeatures) -> f64 {
        let mut score = 0.0;

        if f.estimated_tokens > self.long_tokens {
            score += 30.0;
        } else if f.estimated_tokens > self.medium_tokens {
            score += 20.0;
        } else if f.estimated_tokens > self.short_tokens {
            score += 10.0;
        }

        score += (f.reasoning_keywords as f64 * 5.0).min(20.0);
        score += (f.multi_step_keywords as f64 * 3.0).min(15.0);
        score += (f.technical_terms as f64 * 2.0).min(10.0);
        score += (f.domains.len() as f64 * 2.5).min(5.0);
        score += (f.code_blocks as f64 * 5.0).min(10.0);

        if f.question_count > 3 {
            score += 10.0;
        } else if f.question_count > 1 {
            score += 5.0;
        }

        match f.requested_output_tokens {
            Some(n) if n >= 4096 => score += 10.0,
            Some(n) if n >= 1024 => score += 5.0,
            _ => {}
        }

        score.min(100.0)
    }
}

fn extract_features(text: &str) -> ComplexityFeatures {
    let lower = text.to_lowercase();

    let words = text.split_whitespace().count();
    let estimated_tokens = (words as f64 * 1.3) as u32;

    let sentence_count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count() as u32;

    let question_marks = lower.matches('?').count();
    let question_openers = lower
        .lines()
        .filter(|line| starts_with_question_word(line))
        .count();

    let reasoning_keywords = count_present(&lower, REASONING_KEYWORDS);
    let multi_step_keywords = count_present(&lower, MULTI_STEP_KEYWORDS);

    let mut technical_terms = 0;
    let mut domains = BTreeSet::new();
    for (domain, terms) in TECHNICAL_DOMAINS {
        let hits = count_present(&lower, terms);
        if hits > 0 {
            domains.insert(*domain);
            technical_terms += hits;
        }
    }

    ComplexityFeatures {
        estimated_tokens,
        sentence_count,
        question_count: (question_marks + question_openers) as u32,
        code_blocks: count_code_blocks(text),
        reasoning_keywords,
        multi_step_keywords,
        technical_terms,
        domains: domains.into_iter().collect(),
        requested_output_tokens: None,
    }
}

fn count_present(haystack: &str, needles: &[&str]) -> u32 {
    needles.iter().filter(|n| haystack.contains(*n)).count() as u32
}

fn starts_with_question_word(line: &str) -> bool {
    QUESTION_WORDS.iter().any(|word| {
        line.strip_prefix(word)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
    })
}

/// Count fenced (```...```) and inline (`...`) code spans.
fn count_code_blocks(text: &str) -> u32 {
    let mut count = 0;
    let mut rest = text;
    while let Some(pos) = rest.find('`') {
        let after = &rest[pos..];
        if let Some(body) = after.strip_prefix("```") {
            if let Some(end) = body.find("```") {
                count += 1;
                rest = &body[end + 3..];
                continue;
            }
        }
        let body = &after[1..];
        match body.find('`') {
            Some(end) if end > 0 => {
                count += 1;
                rest = &body[end + 1..];
            }
            _ => rest = body,
        }
    }
    count
}
