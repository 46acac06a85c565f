//! Defines [`ConsentRecord`], the persisted form of a consent decision, and
//! [`ConsentState`], the tri-state derived from it on each page load.

use crate::policy::Policy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted consent decision. Serialized as a JSON object with fields
/// `consent` (boolean), `version` (string), and `timestamp` (ISO-8601
/// string), stored as a single string value under the policy's storage key.
///
/// A record is only meaningful under the policy version it was written with;
/// see [`ConsentRecord::state`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Whether the user granted analytics tracking.
    pub consent: bool,

    /// The policy version the decision was made under.
    pub version: String,

    /// When the decision was made. Informational; validity depends only on
    /// `version`.
    pub timestamp: DateTime<Utc>,
}

impl ConsentRecord {
    /// Creates a record for `consent` under `policy`'s current version,
    /// stamped with the current time.
    pub fn new(consent: bool, policy: &Policy) -> ConsentRecord {
        ConsentRecord {
            consent,
            version: policy.version.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Derives the [`ConsentState`] this record carries under `policy`. A
    /// record written under any other policy version carries no decision:
    /// bumping the version is how the site operator re-prompts every user
    /// after a material policy change.
    pub fn state(&self, policy: &Policy) -> ConsentState {
        if self.version != policy.version {
            return ConsentState::Unknown;
        }
        match self.consent {
            true => ConsentState::Granted,
            false => ConsentState::Denied,
        }
    }
}

/// The decision derived from storage at startup. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentState {
    /// No usable decision: nothing stored, storage unavailable, malformed
    /// record, or a record from a superseded policy version.
    Unknown,
    Granted,
    Denied,
}

impl ConsentState {
    /// Whether this state represents an actual decision.
    pub fn is_decided(self) -> bool {
        !matches!(self, ConsentState::Unknown)
    }

    /// The granted flag for a decided state.
    pub fn granted(self) -> Option<bool> {
        match self {
            ConsentState::Granted => Some(true),
            ConsentState::Denied => Some(false),
            ConsentState::Unknown => None,
        }
    }
}
