use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClientError;

/// The closed set of note types a user can vote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "w")]
    Word,
    #[serde(rename = "o")]
    Other,
    #[serde(rename = "a")]
    Annotation,
    #[serde(rename = "ow")]
    OtherOrWord,
    #[serde(rename = "aw")]
    AnnotationOrWord,
    #[serde(rename = "ao")]
    AnnotationOrOther,
    #[serde(rename = "?")]
    Unknown,
}

impl Classification {
    pub const ALL: [Classification; 7] = [
        Classification::Word,
        Classification::Other,
        Classification::Annotation,
        Classification::OtherOrWord,
        Classification::AnnotationOrWord,
        Classification::AnnotationOrOther,
        Classification::Unknown,
    ];

    /// The wire/markup code, e.g. `"ow"`.
    pub fn code(&self) -> &'static str {
        match self {
            Classification::Word => "w",
            Classification::Other => "o",
            Classification::Annotation => "a",
            Classification::OtherOrWord => "ow",
            Classification::AnnotationOrWord => "aw",
            Classification::AnnotationOrOther => "ao",
            Classification::Unknown => "?",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Classification {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .iter()
            .copied()
            .find(|c| c.code() == s)
            .ok_or_else(|| ClientError::InvalidClassification(s.to_string()))
    }
}

/// Aggregated votes for one note, exactly as the server computed them.
///
/// Maps keep the server's key order, which is the only tie-break the
/// client ever applies when sorting badges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoteDistribution {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub votes: IndexMap<String, u64>,
    #[serde(default)]
    pub probabilities: IndexMap<String, f64>,
    /// `None` only when nobody has voted yet.
    #[serde(default)]
    pub consensus: Option<String>,
    #[serde(default)]
    pub consensus_probability: f64,
    #[serde(default)]
    pub is_contentious: bool,
}

/// Usernames per classification code, in the order the server listed them.
pub type VoterRoster = BTreeMap<String, Vec<String>>;

/// Body of `POST /vote`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteRequest {
    pub bib_id: String,
    pub note_index: usize,
    pub classification: Classification,
}

/// Body of `POST /vote-identical`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdenticalVoteRequest {
    pub note_text: String,
    pub classification: Classification,
}

/// Common `{success, error}` wrapper around every backend answer.
///
/// The rest of the body stays raw until `success` has been read, so a bad
/// display field never hides whether the vote was saved.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    pub fn open<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        if !self.success {
            return Err(ClientError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        serde_json::from_value(Value::Object(self.payload))
            .map_err(|e| ClientError::Unreadable(e.to_string()))
    }
}

/// Successful single-note vote.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteRecorded {
    #[serde(default)]
    pub distribution: Option<VoteDistribution>,
    #[serde(default)]
    pub voters: Option<VoterRoster>,
    #[serde(default)]
    pub consensus: Option<String>,
    #[serde(default)]
    pub consensus_probability: Option<f64>,
}

impl VoteRecorded {
    /// Top-level consensus fields win; the distribution's copy is the fallback.
    pub fn consensus(&self) -> Option<(&str, f64)> {
        let code = self
            .consensus
            .as_deref()
            .or_else(|| self.distribution.as_ref()?.consensus.as_deref())?;
        let probability = self
            .consensus_probability
            .or_else(|| self.distribution.as_ref().map(|d| d.consensus_probability))
            .unwrap_or(0.0);
        Some((code, probability))
    }
}

/// Successful bulk vote over every note sharing the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdenticalVoteSummary {
    #[serde(default)]
    pub total_notes: u64,
    #[serde(default)]
    pub votes_created: u64,
    #[serde(default)]
    pub votes_updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_codes_round_trip() {
        for c in Classification::ALL {
            assert_eq!(c.code().parse::<Classification>().unwrap(), c);
        }
        assert!("x".parse::<Classification>().is_err());
        assert!("W".parse::<Classification>().is_err());
    }

    #[test]
    fn vote_request_uses_wire_codes() {
        let req = VoteRequest {
            bib_id: "B100".to_string(),
            note_index: 2,
            classification: Classification::Unknown,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"bib_id": "B100", "note_index": 2, "classification": "?"})
        );
    }

    #[test]
    fn distribution_keeps_server_key_order() {
        let d: VoteDistribution = serde_json::from_str(
            r#"{"total":3,"votes":{"o":1,"w":1,"a":1},"probabilities":{"o":0.333,"w":0.333,"a":0.334},
                "consensus":"o","consensus_probability":0.333,"is_contentious":true}"#,
        )
        .unwrap();
        let keys: Vec<_> = d.votes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["o", "w", "a"]);
    }

    #[test]
    fn empty_distribution_accepts_null_consensus() {
        let d: VoteDistribution = serde_json::from_str(
            r#"{"votes":{},"total":0,"probabilities":{},"consensus":null,"consensus_probability":0.0,"is_contentious":false}"#,
        )
        .unwrap();
        assert_eq!(d.total, 0);
        assert!(d.consensus.is_none());
    }

    #[test]
    fn failed_envelope_becomes_rejection() {
        let env: Envelope =
            serde_json::from_str(r#"{"success":false,"error":"duplicate vote"}"#).unwrap();
        match env.open::<IdenticalVoteSummary>() {
            Err(ClientError::Rejected(msg)) => assert_eq!(msg, "duplicate vote"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn error_body_without_success_flag_is_rejection() {
        let env: Envelope = serde_json::from_str(r#"{"error":"Note not found"}"#).unwrap();
        assert!(matches!(env.open::<VoteRecorded>(), Err(ClientError::Rejected(_))));
    }

    #[test]
    fn confirmed_vote_with_bad_details_is_unreadable() {
        let env: Envelope = serde_json::from_str(
            r#"{"success":true,"distribution":{"total":1,"votes":{"w":1},"probabilities":{"w":null}}}"#,
        )
        .unwrap();
        let err = env.open::<VoteRecorded>().unwrap_err();
        assert!(matches!(err, ClientError::Unreadable(_)));
        assert!(!err.is_network());
    }

    #[test]
    fn recorded_consensus_prefers_top_level_fields() {
        let rec: VoteRecorded = serde_json::from_str(
            r#"{"distribution":{"total":1,"votes":{"a":1},"probabilities":{"a":1.0},
                "consensus":"a","consensus_probability":1.0,"is_contentious":false},
                "consensus":"w","consensus_probability":0.5}"#,
        )
        .unwrap();
        assert_eq!(rec.consensus(), Some(("w", 0.5)));

        let rec = VoteRecorded {
            distribution: rec.distribution,
            ..Default::default()
        };
        assert_eq!(rec.consensus(), Some(("a", 1.0)));
    }
}
