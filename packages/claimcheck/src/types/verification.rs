//! Verification verdicts, evidence, and the verified fact set.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::claim::Claim;

/// Rendering of [`Evidence::Unavailable`]; never treated as usable evidence.
pub const SEARCH_ERROR_SENTINEL: &str = "SEARCH_API_ERROR";

/// Verdict comparing one evidence blob to one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Supports,
    Refutes,
    Neutral,
}

impl VerificationStatus {
    pub const LABELS: [&'static str; 3] = ["Supports", "Refutes", "Neutral"];

    /// Normalize a classifier label. Only an exact, case-sensitive match is
    /// accepted; everything else is `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Supports" => Self::Supports,
            "Refutes" => Self::Refutes,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supports => "Supports",
            Self::Refutes => "Refutes",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the evidence collector for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// Snippets joined by newlines; may be empty.
    Snippets(String),
    /// The provider failed after its retry budget.
    Unavailable,
}

/// False for blank text and for the search error sentinel.
pub fn is_usable_evidence(text: &str) -> bool {
    !text.trim().is_empty() && text != SEARCH_ERROR_SENTINEL
}

impl Evidence {
    /// Text worth sending to the verifier, if any.
    pub fn usable(&self) -> Option<&str> {
        match self {
            Self::Snippets(text) if is_usable_evidence(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Snippets(text) => text,
            Self::Unavailable => SEARCH_ERROR_SENTINEL,
        }
    }
}

/// A claim that reached `Supports`, with the evidence that did it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub claim: Claim,
    pub status: VerificationStatus,
    pub evidence: String,
    /// The planner query whose evidence produced the verdict.
    pub query: String,
}

/// Supported claims in claim-graph order; the Answerer's only input.
///
/// Holds at most one record per claim, and every record is `Supports`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedFactSet(Vec<VerificationRecord>);

impl VerifiedFactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a supported claim. A second record for the same claim is ignored.
    pub fn record_support(&mut self, claim: Claim, evidence: String, query: String) -> bool {
        if self.0.iter().any(|r| r.claim == claim) {
            return false;
        }
        self.0.push(VerificationRecord {
            claim,
            status: VerificationStatus::Supports,
            evidence,
            query,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VerificationRecord> {
        self.0.iter()
    }

    pub fn records(&self) -> &[VerificationRecord] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a VerifiedFactSet {
    type Item = &'a VerificationRecord;
    type IntoIter = std::slice::Iter<'a, VerificationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
