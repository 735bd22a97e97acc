//! Dashboard statistics aggregated from store contents.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ticket::{Status, StoreSnapshot};

/// Ticket count for one status.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    /// Distinct tickets across the active and resolved lists.
    pub total_tickets: usize,
    pub active_tickets: usize,
    pub resolved_tickets: usize,
    /// Resolved share of all tickets, in percent, one decimal.
    pub resolution_rate_pct: f64,
    /// Active tickets per status, in catalog order.
    pub by_status: Vec<StatusCount>,
    pub orders: usize,
}

impl DashboardStats {
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let resolved_ids: HashSet<&str> = snapshot
            .resolved_tickets
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        // Under the retain policy a resolved ticket is also in the active list.
        let still_listed = snapshot
            .tickets
            .iter()
            .filter(|t| resolved_ids.contains(t.id.as_str()))
            .count();

        let resolved = resolved_ids.len();
        let total = snapshot.tickets.len() + resolved - still_listed;

        let by_status = Status::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: snapshot
                    .tickets
                    .iter()
                    .filter(|t| t.status() == status)
                    .count(),
            })
            .collect();

        Self {
            total_tickets: total,
            active_tickets: snapshot.tickets.len(),
            resolved_tickets: resolved,
            resolution_rate_pct: resolution_rate(resolved, total),
            by_status,
            orders: snapshot.orders.len(),
        }
    }
}

fn resolution_rate(resolved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = resolved as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Resolution record of one support agent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentPerformance {
    pub name: String,
    pub tickets_resolved: usize,
    pub last_resolved: NaiveDate,
}

/// Ordering for the agent table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentSort {
    /// Most resolved first.
    #[default]
    Resolved,
    /// Alphabetical.
    Name,
}

impl FromStr for AgentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolved" => Ok(AgentSort::Resolved),
            "name" => Ok(AgentSort::Name),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Per-agent totals from the resolved list.
pub fn agent_performance(snapshot: &StoreSnapshot, sort: AgentSort) -> Vec<AgentPerformance> {
    let mut by_agent: BTreeMap<&str, AgentPerformance> = BTreeMap::new();
    for record in &snapshot.resolved_tickets {
        let entry = by_agent
            .entry(record.resolved_by.as_str())
            .or_insert_with(|| AgentPerformance {
                name: record.resolved_by.clone(),
                tickets_resolved: 0,
                last_resolved: record.resolved_date,
            });
        entry.tickets_resolved += 1;
        entry.last_resolved = entry.last_resolved.max(record.resolved_date);
    }

    // BTreeMap iteration is already alphabetical; the sort below is stable.
    let mut agents: Vec<AgentPerformance> = by_agent.into_values().collect();
    if sort == AgentSort::Resolved {
        agents.sort_by_key(|a| Reverse(a.tickets_resolved));
    }
    agents
}
