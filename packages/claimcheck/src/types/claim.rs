//! Claims and claim graphs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// A `(subject, relation, object)` assertion needed to answer a question.
///
/// Always exactly three non-empty elements. Construction rejects anything
/// else; nothing is padded or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Claim {
    subject: String,
    relation: String,
    object: String,
}

impl Claim {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Result<Self, ClaimError> {
        Self::try_from(vec![subject.into(), relation.into(), object.into()])
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn object(&self) -> &str {
        &self.object
    }
}

impl TryFrom<Vec<String>> for Claim {
    type Error = ClaimError;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        if parts.len() != 3 {
            return Err(ClaimError::WrongArity(parts.len()));
        }
        if let Some(idx) = parts.iter().position(|p| p.trim().is_empty()) {
            return Err(ClaimError::EmptyElement(idx));
        }

        let mut it = parts.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(subject), Some(relation), Some(object)) => Ok(Self {
                subject,
                relation,
                object,
            }),
            _ => Err(ClaimError::WrongArity(0)),
        }
    }
}

impl From<Claim> for Vec<String> {
    fn from(claim: Claim) -> Self {
        vec![claim.subject, claim.relation, claim.object]
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.relation, self.object)
    }
}

/// The ordered claims hypothesized for one question. Empty is a terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimGraph(Vec<Claim>);

impl ClaimGraph {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self(claims)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.0.iter()
    }

    pub fn claims(&self) -> &[Claim] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ClaimGraph {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Claim>> for ClaimGraph {
    fn from(claims: Vec<Claim>) -> Self {
        Self(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_claim() {
        let claim = Claim::new("Scott Derrickson", "nationality", "?").unwrap();
        assert_eq!(claim.subject(), "Scott Derrickson");
        assert_eq!(claim.relation(), "nationality");
        assert_eq!(claim.object(), "?");
        assert_eq!(claim.to_string(), "(Scott Derrickson, nationality, ?)");
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let two = Claim::try_from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(two, Err(ClaimError::WrongArity(2)));

        let four = Claim::try_from(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(four, Err(ClaimError::WrongArity(4)));
    }

    #[test]
    fn test_blank_element_rejected() {
        assert_eq!(Claim::new("a", "  ", "c"), Err(ClaimError::EmptyElement(1)));
        assert_eq!(Claim::new("", "b", "c"), Err(ClaimError::EmptyElement(0)));
    }

    #[test]
    fn test_serde_as_json_array() {
        let claim = Claim::new("Ed Wood", "nationality", "American").unwrap();
        let json = serde_json::to_string(&claim).unwrap();
        assert_eq!(json, r#"["Ed Wood","nationality","American"]"#);

        let bad: Result<Claim, _> = serde_json::from_str(r#"["only","two"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_graph_preserves_order() {
        let graph = ClaimGraph::new(vec![
            Claim::new("A", "nationality", "?").unwrap(),
            Claim::new("B", "nationality", "?").unwrap(),
        ]);
        let subjects: Vec<_> = graph.iter().map(Claim::subject).collect();
        assert_eq!(subjects, vec!["A", "B"]);
        assert!(!graph.is_empty());
        assert!(ClaimGraph::empty().is_empty());
    }
}
