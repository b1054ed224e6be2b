//! Demon model and position history.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in unix milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One entry in a demon's position history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Position the demon held from this moment on
    pub position: u32,

    /// Unix milliseconds when the position was recorded
    pub recorded_at: u64,
}

/// Append-only log of a demon's positions over time.
///
/// The last record always equals the demon's current position. Recording
/// the same position twice in a row is a no-op, so no-op moves leave no
/// trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionHistory(Vec<PositionRecord>);

impl PositionHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a record if `position` differs from the last recorded one.
    /// Returns true if a record was written.
    pub fn record(&mut self, position: u32, recorded_at: u64) -> bool {
        if self.last_position() == Some(position) {
            return false;
        }
        self.0.push(PositionRecord {
            position,
            recorded_at,
        });
        true
    }

    /// The most recently recorded position, if any.
    pub fn last_position(&self) -> Option<u32> {
        self.0.last().map(|r| r.position)
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[PositionRecord] {
        &self.0
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A ranked level on the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demon {
    /// Unique level identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// 1-based rank; dense and unique across the whole list
    pub position: u32,

    /// Difficulty tag
    pub difficulty: Option<String>,

    /// Level creator
    pub creator: Option<String>,

    /// First verifier
    pub verifier: Option<String>,

    /// Append-only position history
    #[serde(default)]
    pub history: PositionHistory,
}

impl Demon {
    /// Create a new demon with no position assigned yet.
    ///
    /// `RankedList::insert` assigns the position and writes the initial
    /// history record.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            position: 0,
            difficulty: None,
            creator: None,
            verifier: None,
            history: PositionHistory::new(),
        }
    }
}

/// Partial update of a demon's non-position fields.
///
/// `None` leaves a field unchanged; `Some(value)` is applied verbatim,
/// including an empty string. Position and history are never touched by an
/// edit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemonEdit {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    pub creator: Option<String>,
    pub verifier: Option<String>,
}

impl DemonEdit {
    pub(crate) fn apply(self, demon: &mut Demon) {
        if let Some(name) = self.name {
            demon.name = name;
        }
        if let Some(difficulty) = self.difficulty {
            demon.difficulty = Some(difficulty);
        }
        if let Some(creator) = self.creator {
            demon.creator = Some(creator);
        }
        if let Some(verifier) = self.verifier {
            demon.verifier = Some(verifier);
        }
    }
}
