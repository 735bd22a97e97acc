//! Status-to-timeline projection.
//!
//! A ticket's progress timeline is always derived in full from its current
//! status and the instants at which each stage was reached. Nothing here is
//! stateful: projecting the same inputs twice yields identical steps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Status, StoreError};

/// One stage of the ticket lifecycle as displayed to the customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    pub status: Status,
    pub description: String,
    /// When the stage was reached, or `"Pending"` on the wire.
    #[serde(with = "pending_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    pub completed: bool,
    pub current: bool,
}

/// Instants at which each lifecycle stage was reached.
///
/// Invariant: for a ticket in status `S`, entries are present exactly for
/// ranks `0..=S.rank()`. [`ReachedAt::advance`] restores the invariant on
/// every transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReachedAt {
    stages: [Option<DateTime<Utc>>; Status::COUNT],
}

impl ReachedAt {
    /// A timeline where every stage up to `status` was reached at `at`.
    pub fn at(status: Status, at: DateTime<Utc>) -> Self {
        let mut reached = Self {
            stages: [None; Status::COUNT],
        };
        reached.advance(status, at);
        reached
    }

    /// Placeholder timeline for records that carry no transition times.
    ///
    /// Stage `r` is placed `(COUNT - r - 1)` days before `now`, so the last
    /// catalog stage would land on `now` itself.
    pub fn backdated(status: Status, now: DateTime<Utc>) -> Self {
        let mut stages = [None; Status::COUNT];
        for (rank, slot) in stages.iter_mut().enumerate().take(status.rank() + 1) {
            let days_back = (Status::COUNT - rank - 1) as i64;
            *slot = Some(now - Duration::days(days_back));
        }
        Self { stages }
    }

    /// Record a transition to `status` at `at`.
    ///
    /// Stages up to `status` that have no instant yet are stamped with `at`
    /// (skipped stages count as reached at the moment they were skipped).
    /// Stages beyond `status` are cleared, so moving backwards reopens them.
    pub fn advance(&mut self, status: Status, at: DateTime<Utc>) {
        let current = status.rank();
        for (rank, slot) in self.stages.iter_mut().enumerate() {
            if rank > current {
                *slot = None;
            } else if slot.is_none() {
                *slot = Some(at);
            }
        }
    }

    /// When `status` was reached, if it has been.
    pub fn get(&self, status: Status) -> Option<DateTime<Utc>> {
        self.stages[status.rank()]
    }

    /// Returns true if entries exist exactly for ranks `0..=status.rank()`.
    pub fn is_consistent_with(&self, status: Status) -> bool {
        self.stages
            .iter()
            .enumerate()
            .all(|(rank, slot)| slot.is_some() == (rank <= status.rank()))
    }
}

/// Project the full step list for a ticket in `current`.
pub fn project(current: Status, reached: &ReachedAt) -> Vec<Step> {
    let current_rank = current.rank();
    Status::ALL
        .iter()
        .map(|&status| {
            let rank = status.rank();
            Step {
                status,
                description: status.description().to_string(),
                timestamp: if rank <= current_rank {
                    reached.get(status)
                } else {
                    None
                },
                completed: rank < current_rank,
                current: rank == current_rank,
            }
        })
        .collect()
}

/// Project from a wire label, failing on labels outside the catalog.
pub fn project_label(label: &str, reached: &ReachedAt) -> Result<Vec<Step>, StoreError> {
    let status: Status = label.parse()?;
    Ok(project(status, reached))
}

/// Serializes `None` as the literal `"Pending"` and instants as RFC 3339.
mod pending_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const PENDING: &str = "Pending";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_str(PENDING),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == PENDING {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}
