//! Failure classification for backend errors

use crate::backend::traits::BackendError;
use crate::config::ClassifierConfig;

/// Whether a failed attempt is worth retrying on the same backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Capacity or overload signal; retried with backoff
    Transient,
    /// Anything else; the backend is abandoned immediately
    Permanent,
}

/// Decides how a backend error is treated by the orchestrator
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, error: &BackendError) -> FailureKind;
}

impl<F> FailureClassifier for F
where
    F: Fn(&BackendError) -> FailureKind + Send + Sync,
{
    fn classify(&self, error: &BackendError) -> FailureKind {
        self(error)
    }
}

/// Matches known overload signatures by message, provider code, or HTTP status
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    signatures: Vec<String>,
    codes: Vec<u32>,
    statuses: Vec<u16>,
}

impl SignatureClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            signatures: config
                .capacity_signatures
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            codes: config.capacity_codes.clone(),
            statuses: config.capacity_statuses.clone(),
        }
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl FailureClassifier for SignatureClassifier {
    fn classify(&self, error: &BackendError) -> FailureKind {
        if error.code.is_some_and(|code| self.codes.contains(&code)) {
            return FailureKind::Transient;
        }

        if error.status.is_some_and(|status| self.statuses.contains(&status)) {
            return FailureKind::Transient;
        }

        let message = error.message.to_lowercase();
        if self.signatures.iter().any(|s| message.contains(s.as_str())) {
            return FailureKind::Transient;
        }

        FailureKind::Permanent
    }
}
