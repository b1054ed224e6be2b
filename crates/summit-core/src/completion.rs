//! Completion submissions and their moderation workflow.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Moderation state of a completion.
///
/// Permitted transitions: `Pending -> Approved`, `Pending -> Rejected`,
/// `Approved -> Invalidated`. Everything else is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Pending,
    Approved,
    Rejected,
    Invalidated,
}

/// A user's claim of having beaten a demon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Server-assigned id; unique and time-ordered
    pub id: String,

    /// Submitting user (opaque key, supplied by the account layer)
    pub user: String,

    /// Display name of the demon the user claims to have beaten
    pub demon: String,

    /// Evidence link or description
    pub evidence: String,

    /// Moderation state
    pub state: CompletionState,

    /// The demon's position at the moment of approval. Set at most once;
    /// later moves of the demon never change it.
    pub position_at_approval: Option<u32>,
}

impl Completion {
    /// Create a new pending completion.
    pub fn new(id: String, user: String, demon: String, evidence: String) -> Self {
        Self {
            id,
            user,
            demon,
            evidence,
            state: CompletionState::Pending,
            position_at_approval: None,
        }
    }

    /// Approve this completion, snapshotting the demon's current position.
    ///
    /// Approving an already-approved completion is a no-op and leaves the
    /// existing snapshot alone. `current_position` is only consulted when
    /// no snapshot exists yet.
    pub fn approve(&mut self, current_position: Option<u32>) -> Result<()> {
        match self.state {
            CompletionState::Pending => {
                self.state = CompletionState::Approved;
                if self.position_at_approval.is_none() {
                    self.position_at_approval = current_position;
                }
                Ok(())
            }
            CompletionState::Approved => Ok(()),
            state => Err(transition_error(state, CompletionState::Approved)),
        }
    }

    /// Reject a pending completion.
    pub fn reject(&mut self) -> Result<()> {
        match self.state {
            CompletionState::Pending => {
                self.state = CompletionState::Rejected;
                Ok(())
            }
            state => Err(transition_error(state, CompletionState::Rejected)),
        }
    }

    /// Invalidate an approved completion. Terminal: it scores nothing from
    /// then on, exactly like pending and rejected ones.
    pub fn invalidate(&mut self) -> Result<()> {
        match self.state {
            CompletionState::Approved => {
                self.state = CompletionState::Invalidated;
                Ok(())
            }
            state => Err(transition_error(state, CompletionState::Invalidated)),
        }
    }
}

fn transition_error(from: CompletionState, to: CompletionState) -> Error {
    Error::InvalidTransition(format!("{:?} -> {:?}", from, to))
}

/// Generator for unique, time-ordered completion ids.
///
/// Ids are unix milliseconds, bumped past the last issued id when two
/// submissions land in the same millisecond.
#[derive(Debug, Default)]
pub struct CompletionIdGen {
    last: u64,
}

impl CompletionIdGen {
    /// Create a generator that will never issue an id at or below
    /// `last_seen` (pass the highest id loaded from storage).
    pub fn starting_after(last_seen: u64) -> Self {
        Self { last: last_seen }
    }

    /// Issue the next id for a submission arriving at `now` (unix millis).
    pub fn next_id(&mut self, now: u64) -> String {
        self.last = now.max(self.last + 1);
        self.last.to_string()
    }
}
