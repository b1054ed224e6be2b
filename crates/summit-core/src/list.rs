//! The ranked list: an arena of demons indexed by id, ordered by position.

use crate::demon::{now_millis, Demon, DemonEdit, PositionRecord};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Outcome of a move operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The demon changed position; neighbours in the band were shifted.
    Moved { from: u32, to: u32 },
    /// The target equals the current position; nothing was touched.
    Unchanged,
}

/// The ranked demon list.
///
/// Positions are the single source of truth for order and always form
/// exactly `{1..=N}`. Every mutation validates its inputs before touching
/// anything, so a failed operation leaves the list unchanged. All position
/// changes, direct or cascaded, are appended to the affected demon's
/// history with a single timestamp per operation.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    demons: HashMap<String, Demon>,
}

impl RankedList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            demons: HashMap::new(),
        }
    }

    /// Rebuild a list from stored demons, trusting their positions.
    pub fn from_demons(demons: Vec<Demon>) -> Self {
        Self {
            demons: demons.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// Insert a demon at `position`, shifting everything at or below it
    /// down one rank.
    ///
    /// Fails with `DuplicateId` if the id is taken and `InvalidInput` if
    /// `position` is outside `1..=len+1` (which would leave a gap).
    pub fn insert(&mut self, mut demon: Demon, position: u32) -> Result<()> {
        if self.demons.contains_key(&demon.id) {
            return Err(Error::DuplicateId(demon.id));
        }
        let max = self.demons.len() as u32 + 1;
        if position < 1 || position > max {
            return Err(Error::InvalidInput(format!(
                "position {} outside 1..={}",
                position, max
            )));
        }

        let now = now_millis();
        for other in self.demons.values_mut() {
            if other.position >= position {
                other.position += 1;
                other.history.record(other.position, now);
            }
        }

        demon.position = position;
        demon.history.record(position, now);
        self.demons.insert(demon.id.clone(), demon);
        Ok(())
    }

    /// Move a demon to `new_position`, shifting the band between its old
    /// and new slots by one.
    ///
    /// Moving to the current position is not an error: it returns
    /// `MoveOutcome::Unchanged` and writes no history records.
    pub fn move_to(&mut self, id: &str, new_position: u32) -> Result<MoveOutcome> {
        let len = self.demons.len() as u32;
        let old_position = self
            .demons
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("demon {}", id)))?
            .position;
        if new_position < 1 || new_position > len {
            return Err(Error::InvalidInput(format!(
                "position {} outside 1..={}",
                new_position, len
            )));
        }
        if new_position == old_position {
            return Ok(MoveOutcome::Unchanged);
        }

        let now = now_millis();
        if let Some(moved) = self.demons.get_mut(id) {
            moved.position = new_position;
            moved.history.record(new_position, now);
        }

        for other in self.demons.values_mut() {
            if other.id == id {
                continue;
            }
            if old_position < new_position {
                // Moving down the list: the band (old, new] closes up.
                if other.position > old_position && other.position <= new_position {
                    other.position -= 1;
                    other.history.record(other.position, now);
                }
            } else if other.position >= new_position && other.position < old_position {
                // Moving up the list: the band [new, old) makes room.
                other.position += 1;
                other.history.record(other.position, now);
            }
        }

        Ok(MoveOutcome::Moved {
            from: old_position,
            to: new_position,
        })
    }

    /// Remove a demon, closing the gap it leaves.
    pub fn remove(&mut self, id: &str) -> Result<Demon> {
        let removed = self
            .demons
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("demon {}", id)))?;

        let now = now_millis();
        for other in self.demons.values_mut() {
            if other.position > removed.position {
                other.position -= 1;
                other.history.record(other.position, now);
            }
        }
        Ok(removed)
    }

    /// Update a demon's non-position fields. Position and history are
    /// never touched.
    pub fn edit(&mut self, id: &str, edit: DemonEdit) -> Result<&Demon> {
        let demon = self
            .demons
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("demon {}", id)))?;
        edit.apply(demon);
        Ok(demon)
    }

    /// Get a demon by id.
    pub fn get(&self, id: &str) -> Option<&Demon> {
        self.demons.get(id)
    }

    /// Find a demon by display name (completions reference levels by name).
    pub fn find_by_name(&self, name: &str) -> Option<&Demon> {
        self.demons.values().find(|d| d.name == name)
    }

    /// A demon's full position history, oldest first.
    pub fn history_of(&self, id: &str) -> Result<&[PositionRecord]> {
        self.demons
            .get(id)
            .map(|d| d.history.records())
            .ok_or_else(|| Error::NotFound(format!("demon {}", id)))
    }

    /// All demons, ascending by position.
    pub fn demons(&self) -> Vec<&Demon> {
        let mut all: Vec<&Demon> = self.demons.values().collect();
        all.sort_by_key(|d| d.position);
        all
    }

    /// Number of demons.
    pub fn len(&self) -> usize {
        self.demons.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.demons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demon(id: &str) -> Demon {
        Demon::new(id.to_string(), id.to_uppercase())
    }

    /// Positions must be exactly {1..=N} after every operation.
    fn assert_dense(list: &RankedList) {
        let mut positions: Vec<u32> = list.demons().iter().map(|d| d.position).collect();
        positions.sort_unstable();
        let expected: Vec<u32> = (1..=list.len() as u32).collect();
        assert_eq!(positions, expected);
    }

    fn position_of(list: &RankedList, id: &str) -> u32 {
        list.get(id).unwrap().position
    }

    fn history_len(list: &RankedList, id: &str) -> usize {
        list.history_of(id).unwrap().len()
    }

    #[test]
    fn insert_into_empty_list() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        assert_eq!(position_of(&list, "a"), 1);
        assert_eq!(history_len(&list, "a"), 1);
        assert_dense(&list);
    }

    #[test]
    fn insert_shifts_everything_at_or_below() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 2).unwrap();
        list.insert(demon("c"), 3).unwrap();

        // Insert at 2: a stays, b and c shift down by exactly one.
        list.insert(demon("d"), 2).unwrap();
        assert_eq!(position_of(&list, "a"), 1);
        assert_eq!(position_of(&list, "d"), 2);
        assert_eq!(position_of(&list, "b"), 3);
        assert_eq!(position_of(&list, "c"), 4);
        assert_dense(&list);

        // The shifted demons each gained one history record.
        assert_eq!(history_len(&list, "b"), 2);
        assert_eq!(history_len(&list, "c"), 2);
        assert_eq!(history_len(&list, "a"), 1);
    }

    #[test]
    fn insert_duplicate_id_rejected() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        let err = list.insert(demon("a"), 1).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn insert_out_of_range_rejected() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();

        assert!(matches!(
            list.insert(demon("b"), 0),
            Err(Error::InvalidInput(_))
        ));
        // len + 1 is the last valid slot; len + 2 would leave a gap.
        assert!(matches!(
            list.insert(demon("b"), 3),
            Err(Error::InvalidInput(_))
        ));
        list.insert(demon("b"), 2).unwrap();
        assert_dense(&list);
    }

    #[test]
    fn move_down_shifts_band_up() {
        let mut list = RankedList::new();
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            list.insert(demon(id), i as u32 + 1).unwrap();
        }

        // b: 2 -> 4. c and d decrement; a and e untouched.
        let outcome = list.move_to("b", 4).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { from: 2, to: 4 });
        assert_eq!(position_of(&list, "a"), 1);
        assert_eq!(position_of(&list, "c"), 2);
        assert_eq!(position_of(&list, "d"), 3);
        assert_eq!(position_of(&list, "b"), 4);
        assert_eq!(position_of(&list, "e"), 5);
        assert_dense(&list);
        assert_eq!(history_len(&list, "e"), 1);
    }

    #[test]
    fn move_up_shifts_band_down() {
        let mut list = RankedList::new();
        for (i, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            list.insert(demon(id), i as u32 + 1).unwrap();
        }

        // d: 4 -> 2. b and c increment; a and e untouched.
        let outcome = list.move_to("d", 2).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { from: 4, to: 2 });
        assert_eq!(position_of(&list, "a"), 1);
        assert_eq!(position_of(&list, "d"), 2);
        assert_eq!(position_of(&list, "b"), 3);
        assert_eq!(position_of(&list, "c"), 4);
        assert_eq!(position_of(&list, "e"), 5);
        assert_dense(&list);
    }

    #[test]
    fn move_to_current_position_is_noop() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 2).unwrap();

        let before_a = history_len(&list, "a");
        let before_b = history_len(&list, "b");

        let outcome = list.move_to("b", 2).unwrap();
        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(history_len(&list, "a"), before_a);
        assert_eq!(history_len(&list, "b"), before_b);
    }

    #[test]
    fn move_missing_or_out_of_range() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();

        assert!(matches!(list.move_to("x", 1), Err(Error::NotFound(_))));
        assert!(matches!(
            list.move_to("a", 0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            list.move_to("a", 2),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn remove_closes_the_gap() {
        let mut list = RankedList::new();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            list.insert(demon(id), i as u32 + 1).unwrap();
        }

        let removed = list.remove("b").unwrap();
        assert_eq!(removed.position, 2);
        assert!(list.get("b").is_none());
        assert_eq!(position_of(&list, "a"), 1);
        assert_eq!(position_of(&list, "c"), 2);
        assert_eq!(position_of(&list, "d"), 3);
        assert_dense(&list);
        // Only demons below the removed slot gained a record.
        assert_eq!(history_len(&list, "a"), 1);
        assert_eq!(history_len(&list, "c"), 2);
    }

    #[test]
    fn remove_missing_demon() {
        let mut list = RankedList::new();
        assert!(matches!(list.remove("x"), Err(Error::NotFound(_))));
    }

    #[test]
    fn edit_never_touches_position_or_history() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();

        let edit = DemonEdit {
            name: Some("Renamed".to_string()),
            difficulty: Some("extreme".to_string()),
            ..Default::default()
        };
        let demon = list.edit("a", edit).unwrap();
        assert_eq!(demon.name, "Renamed");
        assert_eq!(demon.position, 1);
        assert_eq!(history_len(&list, "a"), 1);
    }

    #[test]
    fn demons_sorted_by_position() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 1).unwrap();
        list.insert(demon("c"), 2).unwrap();

        let order: Vec<&str> = list.demons().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn dense_after_arbitrary_operation_sequence() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 1).unwrap();
        list.insert(demon("c"), 2).unwrap();
        list.insert(demon("d"), 4).unwrap();
        assert_dense(&list);

        list.move_to("d", 1).unwrap();
        assert_dense(&list);
        list.remove("c").unwrap();
        assert_dense(&list);
        list.insert(demon("e"), 2).unwrap();
        assert_dense(&list);
        list.move_to("a", 4).unwrap();
        assert_dense(&list);
        list.remove("d").unwrap();
        list.remove("b").unwrap();
        assert_dense(&list);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn cascaded_shifts_share_one_timestamp_per_operation() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 2).unwrap();
        list.insert(demon("c"), 1).unwrap();

        let a = list.history_of("a").unwrap();
        let b = list.history_of("b").unwrap();
        assert_eq!(a.last().unwrap().recorded_at, b.last().unwrap().recorded_at);
    }

    #[test]
    fn rebuild_from_stored_demons() {
        let mut list = RankedList::new();
        list.insert(demon("a"), 1).unwrap();
        list.insert(demon("b"), 2).unwrap();

        let stored: Vec<Demon> = list.demons().into_iter().cloned().collect();
        let rebuilt = RankedList::from_demons(stored);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.get("a").unwrap().position, 1);
        assert_dense(&rebuilt);
    }
}
