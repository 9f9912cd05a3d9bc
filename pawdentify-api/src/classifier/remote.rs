//! HTTP client for the external inference service
//!
//! The model itself is an external artifact served behind a small HTTP
//! endpoint: `POST {base}/predict` with the raw image bytes returns
//! `{"probabilities": [f64; num_classes]}`. This client validates the upload
//! locally, posts it, and zips the probability vector with the label table
//! loaded at startup from a `class_indices.json` file (`"0": "Afghan_hound"`
//! string-keyed map, matching the model training artifact).

use pawdentify_common::models::BreedPrediction;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use super::{validate_image, Classifier, ClassifierError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("Pawdentify/", env!("CARGO_PKG_VERSION"));

/// Inference response from the model service
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    probabilities: Vec<f64>,
}

/// Production classifier adapter: local validation + remote inference
pub struct RemoteClassifier {
    http_client: reqwest::Client,
    base_url: String,
    /// Class index -> breed label, dense over [0, num_classes)
    labels: Vec<String>,
    /// Set by the startup probe; cleared when the backend stops answering
    available: AtomicBool,
}

impl RemoteClassifier {
    /// Construct the adapter from the service URL and the label table file.
    ///
    /// Fails only on local problems (unreadable or malformed label table);
    /// backend reachability is checked separately by [`Self::probe`].
    pub fn new(base_url: impl Into<String>, labels_path: &Path) -> anyhow::Result<Self> {
        let labels = load_labels(labels_path)?;
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            labels,
            available: AtomicBool::new(false),
        })
    }

    /// Startup probe. On failure the adapter reports itself unavailable and
    /// the process keeps serving; it does not crash.
    pub async fn probe(&self) {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                self.available.store(true, Ordering::Relaxed);
                info!("Model service answered probe at {}", self.base_url);
            }
            Ok(resp) => {
                self.available.store(false, Ordering::Relaxed);
                warn!("Model service probe returned {}", resp.status());
            }
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                warn!("Model service unreachable: {}", e);
            }
        }
    }

    /// Number of classes the model supports
    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }
}

#[async_trait::async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, image_bytes: &[u8]) -> Result<Vec<BreedPrediction>, ClassifierError> {
        validate_image(image_bytes)?;

        if !self.is_available() {
            return Err(ClassifierError::ModelUnavailable);
        }

        let url = format!("{}/predict", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(image_bytes.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    self.available.store(false, Ordering::Relaxed);
                    ClassifierError::ModelUnavailable
                } else {
                    ClassifierError::Inference(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ClassifierError::Inference(format!(
                "model service returned {}",
                response.status()
            )));
        }

        let inference: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        if inference.probabilities.len() != self.labels.len() {
            return Err(ClassifierError::Inference(format!(
                "probability vector length {} does not match {} labels",
                inference.probabilities.len(),
                self.labels.len()
            )));
        }

        Ok(rank_predictions(&self.labels, &inference.probabilities))
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}

/// Zip labels with probabilities and sort descending by confidence
fn rank_predictions(labels: &[String], probabilities: &[f64]) -> Vec<BreedPrediction> {
    let mut ranked: Vec<BreedPrediction> = labels
        .iter()
        .zip(probabilities.iter())
        .map(|(breed, &confidence)| BreedPrediction {
            breed: breed.clone(),
            confidence,
        })
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}

/// Load the class label table (`"0": "Afghan_hound"` style string-keyed map)
fn load_labels(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read label table {}: {}", path.display(), e))?;
    let indices: HashMap<String, String> = serde_json::from_str(&content)?;

    let mut labels = vec![String::new(); indices.len()];
    for (key, breed) in indices {
        let idx: usize = key
            .parse()
            .map_err(|_| anyhow::anyhow!("non-numeric class index {:?}", key))?;
        if idx >= labels.len() {
            anyhow::bail!("class index {} out of range for {} classes", idx, labels.len());
        }
        labels[idx] = breed;
    }
    if labels.iter().any(|l| l.is_empty()) {
        anyhow::bail!("label table has gaps");
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ranks_descending() {
        let labels = vec![
            "Afghan_hound".to_string(),
            "Beagle".to_string(),
            "Collie".to_string(),
        ];
        let ranked = rank_predictions(&labels, &[0.1, 0.7, 0.2]);
        assert_eq!(ranked[0].breed, "Beagle");
        assert_eq!(ranked[1].breed, "Collie");
        assert_eq!(ranked[2].breed, "Afghan_hound");
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn loads_string_keyed_label_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"1": "Beagle", "0": "Afghan_hound"}}"#).unwrap();

        let labels = load_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["Afghan_hound".to_string(), "Beagle".to_string()]);
    }

    #[test]
    fn rejects_label_table_with_gaps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"0": "Afghan_hound", "2": "Collie"}}"#).unwrap();

        assert!(load_labels(file.path()).is_err());
    }
}
