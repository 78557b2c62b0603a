use thiserror::Error;

/// Failures talking to the voting backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with `success: false` (or an `error` body).
    #[error("{0}")]
    Rejected(String),

    /// The request never completed.
    #[error("Network error: {0}")]
    Transport(String),

    /// A response arrived but could not be understood.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The server confirmed the vote but the rest of its answer did not fit.
    #[error("unreadable vote details: {0}")]
    Unreadable(String),

    #[error("Invalid classification: {0}")]
    InvalidClassification(String),
}

impl ClientError {
    /// Transport and decode failures are reported to the user the same way.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Decode(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Failures while rebuilding a card region from a confirmed vote.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("response carried no distribution")]
    MissingDistribution,

    #[error("no probability for classification '{0}'")]
    MissingProbability(String),

    #[error("distribution has {0} votes but no consensus")]
    MissingConsensus(u64),

    #[error("markup write failed")]
    Write(#[from] std::fmt::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("page has no BIB_ID")]
    MissingBibId,

    #[error("note card {0} has no vote-distribution region")]
    MissingDistribution(usize),

    #[error("bad note index '{0}'")]
    BadNoteIndex(String),
}
