//! Classifier adapter
//!
//! Wraps the external pre-trained model behind the [`Classifier`] trait:
//! image bytes in, ranked `(breed, confidence)` list out, covering every
//! class the model supports. The production implementation
//! ([`remote::RemoteClassifier`]) validates the upload locally and delegates
//! inference to the model service. One inference attempt per request, no
//! retries; transient failure is surfaced to the caller.

use pawdentify_common::models::BreedPrediction;
use thiserror::Error;

pub mod remote;

pub use remote::RemoteClassifier;

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Upload bytes could not be decoded as an image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The model backend failed to load or is unreachable
    #[error("Classification model unavailable")]
    ModelUnavailable,

    /// Single inference attempt failed
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Black-box classification seam: image bytes -> ranked prediction list.
///
/// Implementations must return predictions sorted descending by confidence
/// and must report themselves unavailable (rather than panic) when the
/// underlying model failed to load.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Run one inference attempt over the raw upload bytes
    async fn classify(&self, image_bytes: &[u8]) -> Result<Vec<BreedPrediction>, ClassifierError>;

    /// Whether the underlying model loaded and answered its startup probe
    fn is_available(&self) -> bool;
}

/// Validate that upload bytes decode as an image
///
/// The format is sniffed from the bytes; the multipart content-type header
/// is not trusted.
pub fn validate_image(image_bytes: &[u8]) -> Result<(), ClassifierError> {
    image::load_from_memory(image_bytes)
        .map(|_| ())
        .map_err(|e| ClassifierError::InvalidImage(e.to_string()))
}
