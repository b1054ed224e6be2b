//! Leaderboard projection over approved completions.

use crate::completion::{Completion, CompletionState};
use crate::list::RankedList;
use crate::score::score;
use serde::Serialize;
use std::collections::HashMap;

/// One row of the computed leaderboard. Derived on every read, never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub user: String,
    pub points: u32,
    pub completions: u32,
}

/// Fold approved completions into per-user totals.
///
/// The scoring position is the completion's approval snapshot when it has
/// one; otherwise the demon's current position if it still exists.
/// Completions whose demon is gone and never got a snapshot score nothing
/// and are skipped with a warning. Ordering is deterministic: points
/// descending, completion count descending, user ascending.
pub fn compute_ranking(completions: &[Completion], list: &RankedList) -> Vec<LeaderboardRow> {
    let mut totals: HashMap<&str, (u32, u32)> = HashMap::new();

    for completion in completions {
        if completion.state != CompletionState::Approved {
            continue;
        }
        let position = completion
            .position_at_approval
            .or_else(|| list.find_by_name(&completion.demon).map(|d| d.position));
        let Some(position) = position else {
            tracing::warn!(
                user = %completion.user,
                demon = %completion.demon,
                "approved completion has no scorable position, skipping"
            );
            continue;
        };

        let entry = totals.entry(completion.user.as_str()).or_insert((0, 0));
        entry.0 += score(position);
        entry.1 += 1;
    }

    let mut ranking: Vec<LeaderboardRow> = totals
        .into_iter()
        .map(|(user, (points, completions))| LeaderboardRow {
            user: user.to_string(),
            points,
            completions,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.completions.cmp(&a.completions))
            .then(a.user.cmp(&b.user))
    });
    ranking
}
