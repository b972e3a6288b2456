// common/src/models/proposal.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a community proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ProposalStatus {
    New = 1,
    InReview = 2,
    InVoting = 3,
    Rejected = 4,
    Winner = 5,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub i32);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid proposal status {}", self.0)
    }
}

impl TryFrom<i32> for ProposalStatus {
    type Error = InvalidStatus;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::New),
            2 => Ok(Self::InReview),
            3 => Ok(Self::InVoting),
            4 => Ok(Self::Rejected),
            5 => Ok(Self::Winner),
            other => Err(InvalidStatus(other)),
        }
    }
}

impl From<ProposalStatus> for i32 {
    fn from(status: ProposalStatus) -> Self {
        status as i32
    }
}

/// Change applied to the proposal owned by `UpdateData::wallet`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalUpdate {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
}

/// Envelope for `PUT /proposals` and `POST /proposals/vote`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateData {
    pub wallet: String,
    pub update: ProposalUpdate,
}
