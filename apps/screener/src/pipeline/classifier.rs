//! Classification — pre-fitted decision functions over TF-IDF feature vectors.
//!
//! Two artifact kinds are supported:
//! - `linear`: one weight row per class (logistic regression, linear SVM,
//!   one-vs-rest linear models). Highest score wins.
//! - `k_neighbors`: brute-force k-nearest-neighbours with majority vote.
//!
//! Both are immutable after load and safe for concurrent reads.

use serde::Deserialize;

use crate::errors::{ArtifactError, ClassifyError};
use crate::models::prediction::CategoryId;
use crate::pipeline::artifacts::check_format_version;
use crate::pipeline::vectorizer::FeatureVector;

/// Maps a feature vector to a category id. Same vector, same id.
pub trait Classifier: Send + Sync {
    /// Length of the feature vectors this classifier accepts.
    fn input_dimension(&self) -> usize;

    fn predict(&self, features: &FeatureVector) -> Result<CategoryId, ClassifyError>;
}

fn check_dimension(expected: usize, features: &FeatureVector) -> Result<(), ClassifyError> {
    if features.len() != expected {
        return Err(ClassifyError::InferenceError(format!(
            "expected {expected} features, got {}",
            features.len()
        )));
    }
    Ok(())
}

/// Index of the first maximum; `None` if any score is NaN.
fn argmax(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            return None;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted artifact
// ────────────────────────────────────────────────────────────────────────────

/// On-disk form of a fitted classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierArtifact {
    pub format_version: u32,
    #[serde(flatten)]
    pub model: ClassifierModel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    Linear {
        classes: Vec<CategoryId>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    KNeighbors {
        classes: Vec<CategoryId>,
        n_neighbors: usize,
        #[serde(default)]
        metric: Metric,
        samples: Vec<Vec<f64>>,
        /// index into `classes` for each sample
        labels: Vec<usize>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

impl ClassifierArtifact {
    /// Validates the artifact and builds the matching classifier.
    pub fn build(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        check_format_version(self.format_version)?;

        match self.model {
            ClassifierModel::Linear {
                classes,
                coef,
                intercept,
            } => Ok(Box::new(LinearClassifier::new(classes, coef, intercept)?)),
            ClassifierModel::KNeighbors {
                classes,
                n_neighbors,
                metric,
                samples,
                labels,
            } => Ok(Box::new(KNeighborsClassifier::new(
                classes,
                n_neighbors,
                metric,
                samples,
                labels,
            )?)),
        }
    }
}

/// Checks that every row has the same, non-zero length and returns it.
fn row_width(rows: &[Vec<f64>], what: &str) -> Result<usize, ArtifactError> {
    let width = rows
        .first()
        .map(Vec::len)
        .ok_or_else(|| ArtifactError::Invalid(format!("{what} has no rows")))?;
    if width == 0 {
        return Err(ArtifactError::Invalid(format!("{what} rows are empty")));
    }
    if let Some(i) = rows.iter().position(|r| r.len() != width) {
        return Err(ArtifactError::Invalid(format!(
            "{what} row {i} has {} columns, expected {width}",
            rows[i].len()
        )));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ArtifactError::Invalid(format!("{what} contains non-finite values")));
    }
    Ok(width)
}

// ────────────────────────────────────────────────────────────────────────────
// LinearClassifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct LinearClassifier {
    classes: Vec<CategoryId>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LinearClassifier {
    pub fn new(
        classes: Vec<CategoryId>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, ArtifactError> {
        let n_features = row_width(&coef, "coef")?;

        // A single row is a binary model scoring classes[1] against classes[0].
        let expected_classes = if coef.len() == 1 { 2 } else { coef.len() };
        if classes.len() != expected_classes {
            return Err(ArtifactError::Invalid(format!(
                "{} coef rows need {expected_classes} classes, got {}",
                coef.len(),
                classes.len()
            )));
        }
        if intercept.len() != coef.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} coef rows but {} intercepts",
                coef.len(),
                intercept.len()
            )));
        }

        Ok(Self {
            classes,
            coef,
            intercept,
            n_features,
        })
    }

    fn decision_function(&self, x: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| dot(row, x) + b)
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn input_dimension(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<CategoryId, ClassifyError> {
        check_dimension(self.n_features, features)?;
        let scores = self.decision_function(features.values());

        let index = if scores.len() == 1 {
            if scores[0].is_nan() {
                None
            } else {
                Some(usize::from(scores[0] > 0.0))
            }
        } else {
            argmax(&scores)
        };

        index
            .map(|i| self.classes[i])
            .ok_or_else(|| ClassifyError::InferenceError("decision function returned NaN".into()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KNeighborsClassifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct KNeighborsClassifier {
    classes: Vec<CategoryId>,
    n_neighbors: usize,
    metric: Metric,
    samples: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_features: usize,
}

impl KNeighborsClassifier {
    pub fn new(
        classes: Vec<CategoryId>,
        n_neighbors: usize,
        metric: Metric,
        samples: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Result<Self, ArtifactError> {
        let n_features = row_width(&samples, "samples")?;

        if classes.is_empty() {
            return Err(ArtifactError::Invalid("classifier has no classes".into()));
        }
        if labels.len() != samples.len() {
            return Err(ArtifactError::Invalid(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(ArtifactError::Invalid(format!(
                "label {bad} is outside 0..{}",
                classes.len()
            )));
        }
        if n_neighbors == 0 || n_neighbors > samples.len() {
            return Err(ArtifactError::Invalid(format!(
                "n_neighbors must be in 1..={}, got {n_neighbors}",
                samples.len()
            )));
        }

        Ok(Self {
            classes,
            n_neighbors,
            metric,
            samples,
            labels,
            n_features,
        })
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.metric {
            Metric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            Metric::Cosine => {
                let norms = dot(a, a).sqrt() * dot(b, b).sqrt();
                if norms == 0.0 {
                    1.0
                } else {
                    1.0 - dot(a, b) / norms
                }
            }
        }
    }
}

impl Classifier for KNeighborsClassifier {
    fn input_dimension(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &FeatureVector) -> Result<CategoryId, ClassifyError> {
        check_dimension(self.n_features, features)?;
        let x = features.values();

        let mut neighbours: Vec<(f64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, s)| (self.distance(x, s), i))
            .collect();
        if neighbours.iter().any(|(d, _)| d.is_nan()) {
            return Err(ClassifyError::InferenceError("distance is NaN".into()));
        }
        // Stable sort keeps sample order among equal distances.
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0.0; self.classes.len()];
        for &(_, i) in neighbours.iter().take(self.n_neighbors) {
            votes[self.labels[i]] += 1.0;
        }

        argmax(&votes)
            .map(|i| self.classes[i])
            .ok_or_else(|| ClassifyError::InferenceError("no neighbours voted".into()))
    }
}
