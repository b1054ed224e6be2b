//! Summit Core - ranked list engine
//!
//! Domain logic for a ranked challenge list ("demon list"): demons hold a
//! dense 1-based position, every position change is appended to a per-demon
//! history, user completions move through a moderation workflow, and a point
//! leaderboard is folded from approved completions on demand.
//!
//! # Invariants
//!
//! - Positions of all demons always form exactly `{1..=N}`: unique, dense,
//!   no gaps. Insert, move, and remove shift neighbours to preserve this.
//! - Position history is append-only and idempotent: a record is written
//!   only when the position actually changed.
//! - A completion's approval snapshot, once set, is never overwritten.
//!
//! This crate is synchronous and does no I/O; persistence and HTTP live in
//! `summit-node`.

mod completion;
mod demon;
mod error;
mod leaderboard;
mod list;
mod score;

pub use completion::{Completion, CompletionIdGen, CompletionState};
pub use demon::{Demon, DemonEdit, PositionHistory, PositionRecord};
pub use error::{Error, Result};
pub use leaderboard::{compute_ranking, LeaderboardRow};
pub use list::{MoveOutcome, RankedList};
pub use score::score;
