//! Lifecycle status catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// Lifecycle status of a repair ticket.
///
/// Variants are declared in lifecycle order, so the derived `Ord` matches
/// [`Status::rank`]:
///
/// ```text
/// NotPicked -> Picked -> InService -> Repaired -> Delivered
/// ```
///
/// The core does not restrict transitions; any status can be set from any
/// other. `Delivered` is terminal by convention.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Picked")]
    NotPicked,
    #[serde(rename = "Picked")]
    Picked,
    #[serde(rename = "In Service")]
    InService,
    #[serde(rename = "Repaired")]
    Repaired,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl Status {
    /// Every status in catalog order.
    pub const ALL: [Status; 5] = [
        Status::NotPicked,
        Status::Picked,
        Status::InService,
        Status::Repaired,
        Status::Delivered,
    ];

    /// Number of catalog entries.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the lifecycle (0..=4).
    pub fn rank(self) -> usize {
        match self {
            Status::NotPicked => 0,
            Status::Picked => 1,
            Status::InService => 2,
            Status::Repaired => 3,
            Status::Delivered => 4,
        }
    }

    /// Status at the given rank, if any.
    pub fn from_rank(rank: usize) -> Option<Status> {
        Self::ALL.get(rank).copied()
    }

    /// Wire label, as shown to customers.
    pub fn label(self) -> &'static str {
        match self {
            Status::NotPicked => "Not Picked",
            Status::Picked => "Picked",
            Status::InService => "In Service",
            Status::Repaired => "Repaired",
            Status::Delivered => "Delivered",
        }
    }

    /// Customer-facing description of the stage.
    pub fn description(self) -> &'static str {
        match self {
            Status::NotPicked => "Device to be picked up from your location",
            Status::Picked => "Device picked up from your location",
            Status::InService => "Device is being repaired at service center",
            Status::Repaired => "Repair completed and quality checked",
            Status::Delivered => "Device delivered to you",
        }
    }

    /// Returns true for the last stage of the lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Delivered)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    /// Parses a wire label. Unknown labels are rejected instead of being
    /// mapped to the first stage.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.label() == s.trim())
            .ok_or_else(|| StoreError::InvalidStatus(s.to_string()))
    }
}
