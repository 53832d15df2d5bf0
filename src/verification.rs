//! Student Verification

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;

/// An uploaded student identity document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDocument {
    /// Original file name
    pub file_name: String,

    /// File contents
    pub bytes: Vec<u8>,
}

impl StudentDocument {
    /// Create a document from a file name and its contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outcome of a verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The document proves student status
    Approved,

    /// The document was not accepted
    Rejected,
}

/// Checks student identity documents.
#[automock]
#[async_trait]
pub trait StudentVerifier: Send + Sync {
    /// Check a document. Always resolves.
    async fn verify(&self, document: &StudentDocument) -> Verdict;
}

/// Approves every document after a fixed delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedVerifier {
    latency: Duration,
}

impl SimulatedVerifier {
    /// Create a verifier answering after `latency`.
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl StudentVerifier for SimulatedVerifier {
    async fn verify(&self, _document: &StudentDocument) -> Verdict {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Verdict::Approved
    }
}
