//! State enums for the verification flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which address-proofing path is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMechanism {
    /// Possession of a phone registered to the applicant.
    #[default]
    Phone,
    /// A one-time code mailed to the applicant's address.
    Gpo,
}

impl AddressMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Gpo => "gpo",
        }
    }
}

impl fmt::Display for AddressMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status returned by the device-profiling (ThreatMetrix) collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatMetrixReviewStatus {
    Pass,
    Review,
    Reject,
}

/// Why a profile is held for fraud review instead of being activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudPendingReason {
    ThreatmetrixReview,
    ThreatmetrixReject,
}

impl FraudPendingReason {
    /// Map a device-profiling status to a pending reason, if it blocks activation.
    pub fn from_review_status(status: ThreatMetrixReviewStatus) -> Option<Self> {
        match status {
            ThreatMetrixReviewStatus::Pass => None,
            ThreatMetrixReviewStatus::Review => Some(Self::ThreatmetrixReview),
            ThreatMetrixReviewStatus::Reject => Some(Self::ThreatmetrixReject),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreatmetrixReview => "threatmetrix_review",
            Self::ThreatmetrixReject => "threatmetrix_reject",
        }
    }
}

/// Whether document capture happens on this device or a handed-off phone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPath {
    Standard,
    Hybrid,
}
