//! Feature vectorization — applies a pre-fitted TF-IDF transform to cleaned text.
//!
//! The artifact is exported from a fitted scikit-learn `TfidfVectorizer`; the
//! transform below reproduces its `transform()` for the supported options:
//! lowercasing, regex tokenization, stop words, word n-grams, (sublinear) term
//! frequency, idf weighting and l1/l2 row normalization.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::Deserialize;

use crate::errors::{ArtifactError, ClassifyError};
use crate::pipeline::artifacts::check_format_version;

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

// ────────────────────────────────────────────────────────────────────────────
// Feature vector
// ────────────────────────────────────────────────────────────────────────────

/// Dense feature vector. Its length is fixed by the vocabulary the vectorizer
/// was fitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of non-zero features.
    pub fn nnz(&self) -> usize {
        self.0.iter().filter(|v| **v != 0.0).count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Maps cleaned text to a fixed-dimension feature vector.
pub trait Vectorizer: Send + Sync {
    /// Output dimension, identical across all calls.
    fn dimension(&self) -> usize;

    fn vectorize(&self, cleaned_text: &str) -> Result<FeatureVector, ClassifyError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted artifact
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

/// On-disk form of a fitted TF-IDF transform.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfArtifact {
    pub format_version: u32,
    /// term → column index
    pub vocabulary: HashMap<String, usize>,
    /// idf weight per column
    pub idf: Vec<f64>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

// ────────────────────────────────────────────────────────────────────────────
// TfidfVectorizer
// ────────────────────────────────────────────────────────────────────────────

/// Immutable, validated TF-IDF transform. Safe to share across threads.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Norm,
}

impl TfidfVectorizer {
    /// Validates an artifact and compiles its token pattern.
    pub fn from_artifact(artifact: TfidfArtifact) -> Result<Self, ArtifactError> {
        check_format_version(artifact.format_version)?;

        let dim = artifact.idf.len();
        if dim == 0 {
            return Err(ArtifactError::Invalid("vectorizer has an empty vocabulary".into()));
        }
        if artifact.vocabulary.len() != dim {
            return Err(ArtifactError::Invalid(format!(
                "vocabulary has {} terms but idf has {} weights",
                artifact.vocabulary.len(),
                dim
            )));
        }

        let mut seen = vec![false; dim];
        for (term, &index) in &artifact.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ArtifactError::Invalid(format!(
                        "column {index} is assigned to more than one term"
                    )))
                }
                None => {
                    return Err(ArtifactError::Invalid(format!(
                        "term {term:?} maps to column {index}, outside 0..{dim}"
                    )))
                }
            }
        }

        if let Some(bad) = artifact.idf.iter().position(|w| !w.is_finite()) {
            return Err(ArtifactError::Invalid(format!("idf weight {bad} is not finite")));
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ArtifactError::Invalid(format!("token_pattern does not compile: {e}"))
        })?;
        if token_pattern.captures_len() > 2 {
            return Err(ArtifactError::Invalid(
                "token_pattern may contain at most one capturing group".into(),
            ));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        // With one capturing group the group is the token, otherwise the whole match.
        let tokens: Vec<&str> = if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .collect()
        } else {
            self.token_pattern
                .find_iter(text)
                .map(|m| m.as_str())
                .collect()
        };

        tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_owned)
            .collect()
    }

    fn ngrams(&self, tokens: Vec<String>) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        if max_n == 1 {
            return tokens;
        }

        let mut grams = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    fn term_counts(&self, text: &str) -> HashMap<usize, f64> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut counts = HashMap::new();
        for gram in self.ngrams(self.tokenize(&text)) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        counts
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn vectorize(&self, cleaned_text: &str) -> Result<FeatureVector, ClassifyError> {
        let mut values = vec![0.0; self.dimension()];

        for (index, count) in self.term_counts(cleaned_text) {
            let mut tf = if self.binary { 1.0 } else { count };
            if self.sublinear_tf {
                tf = 1.0 + tf.ln();
            }
            values[index] = tf * self.idf[index];
        }

        let norm = match self.norm {
            Norm::L2 => values.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Norm::L1 => values.iter().map(|v| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if !norm.is_finite() {
            return Err(ClassifyError::VectorizationError(format!(
                "feature norm is {norm}"
            )));
        }
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }

        Ok(FeatureVector::new(values))
    }
}
