// Resume classification pipeline.
// bytes → extractor → normalizer → vectorizer → classifier → category resolver.
// Everything here is synchronous CPU work; callers on the async runtime must
// go through tokio::task::spawn_blocking.

pub mod artifacts;
pub mod categories;
pub mod classifier;
pub mod extractor;
pub mod normalizer;
pub mod vectorizer;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::errors::{ArtifactError, ClassifyError};
use crate::models::document::{ContentType, RawDocument};
use crate::models::prediction::{CategoryName, Prediction};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::vectorizer::Vectorizer;

/// The loaded vectorizer/classifier pair. Immutable after construction and
/// shared read-only across requests.
#[derive(Clone)]
pub struct ResumeClassifier {
    vectorizer: Arc<dyn Vectorizer>,
    classifier: Arc<dyn Classifier>,
}

impl ResumeClassifier {
    /// Pairs a vectorizer with a classifier, refusing pairs whose dimensions disagree.
    pub fn new(
        vectorizer: Arc<dyn Vectorizer>,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.dimension() != classifier.input_dimension() {
            return Err(ArtifactError::Invalid(format!(
                "vectorizer produces {} features but classifier expects {}",
                vectorizer.dimension(),
                classifier.input_dimension()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Loads both artifacts from disk. Called once at startup; errors are fatal.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self> {
        let vectorizer = artifacts::load_vectorizer(vectorizer_path).with_context(|| {
            format!("loading vectorizer artifact {}", vectorizer_path.display())
        })?;
        let classifier = artifacts::load_classifier(classifier_path).with_context(|| {
            format!("loading classifier artifact {}", classifier_path.display())
        })?;

        Ok(Self::new(Arc::new(vectorizer), Arc::from(classifier))?)
    }

    /// Classifies a resume into a category name.
    pub fn classify(
        &self,
        bytes: &[u8],
        content_type: &ContentType,
    ) -> Result<CategoryName, ClassifyError> {
        self.predict(bytes, content_type).map(|p| p.category)
    }

    pub fn classify_document(&self, document: &RawDocument) -> Result<CategoryName, ClassifyError> {
        self.classify(document.bytes(), document.content_type())
    }

    /// Runs the full pipeline, keeping the raw category id alongside the name.
    pub fn predict(
        &self,
        bytes: &[u8],
        content_type: &ContentType,
    ) -> Result<Prediction, ClassifyError> {
        let text = extractor::extract(bytes, content_type)?;
        debug!(
            content_type = content_type.as_mime(),
            bytes = bytes.len(),
            text_len = text.len(),
            "text extracted"
        );
        self.predict_text(&text)
    }

    /// Runs normalization, vectorization, classification and resolution on extracted text.
    pub fn predict_text(&self, text: &str) -> Result<Prediction, ClassifyError> {
        let cleaned = normalizer::clean(text);
        let features = self.vectorizer.vectorize(&cleaned)?;
        debug!(
            cleaned_len = cleaned.len(),
            nnz = features.nnz(),
            "text vectorized"
        );

        let category_id = self.classifier.predict(&features)?;
        let category = categories::resolve(category_id);
        debug!(%category_id, %category, "resume classified");

        Ok(Prediction {
            category_id,
            category,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::prediction::CategoryId;
    use crate::pipeline::classifier::ClassifierArtifact;
    use crate::pipeline::vectorizer::{FeatureVector, TfidfVectorizer};
    use serde_json::json;

    const TERMS: [&str; 6] = ["python", "machine", "learning", "java", "spring", "sales"];

    /// A 25-class linear model over six terms: data-science terms vote for 6,
    /// java/spring for 15, sales for 22.
    pub(crate) fn fixture_classifier() -> ResumeClassifier {
        let vocabulary: serde_json::Map<String, serde_json::Value> = TERMS
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), json!(i)))
            .collect();
        let vectorizer = TfidfVectorizer::from_artifact(
            serde_json::from_value(json!({
                "format_version": 1,
                "vocabulary": vocabulary,
                "idf": [1.5, 2.0, 2.0, 1.5, 2.5, 1.8],
            }))
            .unwrap(),
        )
        .unwrap();

        let mut coef = vec![vec![0.0; TERMS.len()]; 25];
        coef[6] = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        coef[15] = vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        coef[22] = vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let classifier = serde_json::from_value::<ClassifierArtifact>(json!({
            "format_version": 1,
            "kind": "linear",
            "classes": (0..25).collect::<Vec<i64>>(),
            "coef": coef,
            "intercept": vec![0.0; 25],
        }))
        .unwrap()
        .build()
        .unwrap();

        ResumeClassifier::new(Arc::new(vectorizer), Arc::from(classifier)).unwrap()
    }

    const DATA_SCIENCE_RESUME: &str = "Skills: Python, Machine Learning (scikit-learn), \
        Deep Learning.\nExperience: built machine-learning pipelines in python. \
        Portfolio: https://github.com/jane #datascience @jane_doe";

    #[test]
    fn test_data_science_resume_end_to_end() {
        let clf = fixture_classifier();
        let name = clf
            .classify(DATA_SCIENCE_RESUME.as_bytes(), &ContentType::PlainText)
            .unwrap();
        assert_eq!(name.as_str(), "Data Science");

        let prediction = clf
            .predict(DATA_SCIENCE_RESUME.as_bytes(), &ContentType::PlainText)
            .unwrap();
        assert_eq!(prediction.category_id, CategoryId(6));
    }

    #[test]
    fn test_java_resume_end_to_end() {
        let clf = fixture_classifier();
        let doc = RawDocument::new(
            "Java developer: Spring Boot, Spring MVC, Hibernate".as_bytes().to_vec(),
            ContentType::PlainText,
        );
        let name = clf.classify_document(&doc).unwrap();
        assert_eq!(name.as_str(), "Java Developer");
    }

    #[test]
    fn test_classify_is_deterministic() {
        let clf = fixture_classifier();
        let first = clf
            .classify(DATA_SCIENCE_RESUME.as_bytes(), &ContentType::PlainText)
            .unwrap();
        let second = clf
            .classify(DATA_SCIENCE_RESUME.as_bytes(), &ContentType::PlainText)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_resume_still_classifies() {
        // All-zero vector: every class scores 0, first class wins.
        let clf = fixture_classifier();
        let prediction = clf.predict_text("").unwrap();
        assert_eq!(prediction.category_id, CategoryId(0));
        assert_eq!(prediction.category.as_str(), "Advocate");
    }

    #[test]
    fn test_pdf_resume_end_to_end() {
        let pdf = extractor::tests::pdf_with_pages(&[None, Some("Python")]);
        let name = fixture_classifier()
            .classify(&pdf, &ContentType::Pdf)
            .unwrap();
        assert_eq!(name.as_str(), "Data Science");
    }

    #[test]
    fn test_invalid_pdf_is_extraction_error() {
        let clf = fixture_classifier();
        let err = clf
            .classify(b"definitely not a pdf", &ContentType::Pdf)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::ExtractionError(_)));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let clf = fixture_classifier();
        let err = clf
            .classify(&[0xc3, 0x28, 0xa0, 0xa1], &ContentType::PlainText)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::DecodeError(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let clf = fixture_classifier();
        let err = clf
            .classify(b"PK\x03\x04", &ContentType::from_mime("application/zip"))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::UnsupportedFormat(_)));
    }

    struct FixedVectorizer(usize);

    impl Vectorizer for FixedVectorizer {
        fn dimension(&self) -> usize {
            self.0
        }

        fn vectorize(&self, _cleaned_text: &str) -> Result<FeatureVector, ClassifyError> {
            Ok(FeatureVector::new(vec![1.0; self.0]))
        }
    }

    /// Claims one dimension but emits another, like an artifact from a different build.
    struct LyingVectorizer;

    impl Vectorizer for LyingVectorizer {
        fn dimension(&self) -> usize {
            6
        }

        fn vectorize(&self, _cleaned_text: &str) -> Result<FeatureVector, ClassifyError> {
            Ok(FeatureVector::new(vec![1.0; 3]))
        }
    }

    fn linear_over(n_features: usize) -> Arc<dyn Classifier> {
        let clf = serde_json::from_value::<ClassifierArtifact>(json!({
            "format_version": 1,
            "kind": "linear",
            "classes": [6, 15],
            "coef": [vec![1.0; n_features], vec![0.0; n_features]],
            "intercept": [0.0, 0.0],
        }))
        .unwrap()
        .build()
        .unwrap();
        Arc::from(clf)
    }

    #[test]
    fn test_rejects_mismatched_artifacts() {
        let result = ResumeClassifier::new(Arc::new(FixedVectorizer(4)), linear_over(6));
        assert!(matches!(result, Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_wrong_length_vector_is_inference_error() {
        let clf = ResumeClassifier::new(Arc::new(LyingVectorizer), linear_over(6)).unwrap();
        let err = clf.predict_text("anything").unwrap_err();
        assert!(matches!(err, ClassifyError::InferenceError(_)));
    }

    #[test]
    fn test_concurrent_reads_agree() {
        let clf = fixture_classifier();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clf = clf.clone();
                std::thread::spawn(move || {
                    clf.classify(DATA_SCIENCE_RESUME.as_bytes(), &ContentType::PlainText)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().as_str(), "Data Science");
        }
    }

    #[test]
    fn test_demo_artifacts_load_and_classify() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");
        let clf =
            ResumeClassifier::load(&root.join("tfidf.json"), &root.join("classifier.json")).unwrap();
        let name = clf
            .classify(
                b"Java developer: Spring, Hibernate, J2EE and JSP.",
                &ContentType::PlainText,
            )
            .unwrap();
        assert_eq!(name.as_str(), "Java Developer");
    }

    #[test]
    fn test_load_reports_missing_artifact() {
        let err = ResumeClassifier::load(
            Path::new("/nonexistent/tfidf.json"),
            Path::new("/nonexistent/classifier.json"),
        )
        .err()
        .unwrap();
        assert!(format!("{err:#}").contains("loading vectorizer artifact"));
    }
}
