//! Loading of the persisted vectorizer and classifier artifacts.
//!
//! Artifacts are JSON documents exported from the fitted training-time models.
//! They are read once at startup; any failure here must abort startup.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::errors::ArtifactError;
use crate::pipeline::classifier::{Classifier, ClassifierArtifact};
use crate::pipeline::vectorizer::{TfidfArtifact, TfidfVectorizer, Vectorizer};

/// The only artifact layout this build understands.
pub const FORMAT_VERSION: u32 = 1;

pub fn check_format_version(found: u32) -> Result<(), ArtifactError> {
    if found != FORMAT_VERSION {
        return Err(ArtifactError::Version {
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

pub fn load_vectorizer(path: &Path) -> Result<TfidfVectorizer, ArtifactError> {
    let vectorizer = TfidfVectorizer::from_artifact(read_json::<TfidfArtifact>(path)?)?;
    info!(
        "Loaded TF-IDF vectorizer from {} ({} features)",
        path.display(),
        vectorizer.dimension()
    );
    Ok(vectorizer)
}

pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    let classifier = read_json::<ClassifierArtifact>(path)?.build()?;
    info!(
        "Loaded classifier from {} ({} input features)",
        path.display(),
        classifier.input_dimension()
    );
    Ok(classifier)
}
