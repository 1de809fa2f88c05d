use crate::row::Row;
use crate::text_buffer::FilePath;
use std::collections::VecDeque;

const MAX_ENTRIES: usize = 1000;

// Full deep copy of the editor state at one point in time. Snapshots own their
// rows so restoring from history can never alias live state.
#[derive(Clone)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub cursor: (usize, usize),
    pub scroll: (usize, usize),
    pub modified: usize,
    pub file: Option<FilePath>,
}

// Stack of snapshots for sequential rollback. The bottom entry is the seed
// taken when the buffer was opened (or last saved). Rollback shrinks the stack
// from the top; there is no redo.
pub struct History {
    entries: VecDeque<Snapshot>,
}

impl History {
    pub fn new(seed: Snapshot) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(seed);
        Self { entries }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        debug_assert!(self.entries.len() <= MAX_ENTRIES);
        if self.entries.len() == MAX_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    // True while only the seed entry remains
    pub fn at_seed(&self) -> bool {
        self.entries.len() == 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // Discards the top entry (when there is more than one) and returns the new
    // top, which becomes the live state
    pub fn rollback(&mut self) -> &Snapshot {
        if self.entries.len() > 1 {
            self.entries.pop_back();
        }
        self.entries.back().unwrap()
    }

    // Collapses the stack to a single entry. Called on save to establish a new
    // undo boundary at the save point
    pub fn reset(&mut self, seed: Snapshot) {
        self.entries.clear();
        self.entries.push_back(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str, modified: usize) -> Snapshot {
        Snapshot {
            rows: vec![Row::new(text)],
            cursor: (0, 0),
            scroll: (0, 0),
            modified,
            file: None,
        }
    }

    #[test]
    fn test_rollback_restores_previous_top() {
        let mut history = History::new(snapshot("", 0));
        history.push(snapshot("ab ", 3));
        history.push(snapshot("ab cd ", 6));
        assert_eq!(history.len(), 3);

        let top = history.rollback();
        assert_eq!(top.rows[0].buffer(), "ab ");
        assert_eq!(top.modified, 3);
        assert_eq!(history.len(), 2);

        let top = history.rollback();
        assert_eq!(top.rows[0].buffer(), "");
        assert!(history.at_seed());
    }

    #[test]
    fn test_rollback_at_seed_keeps_seed() {
        let mut history = History::new(snapshot("seed", 0));
        let top = history.rollback();
        assert_eq!(top.rows[0].buffer(), "seed");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_reset_collapses_stack() {
        let mut history = History::new(snapshot("", 0));
        history.push(snapshot("x", 1));
        history.push(snapshot("xy", 2));
        history.reset(snapshot("xy", 0));
        assert!(history.at_seed());
        assert_eq!(history.rollback().modified, 0);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new(snapshot("seed", 0));
        for i in 0..MAX_ENTRIES + 10 {
            history.push(snapshot("x", i));
        }
        assert_eq!(history.len(), MAX_ENTRIES);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut live = vec![Row::new("hello")];
        let mut history = History::new(Snapshot {
            rows: live.clone(),
            cursor: (5, 0),
            scroll: (0, 0),
            modified: 0,
            file: None,
        });
        live[0].append(" world");
        assert_eq!(history.rollback().rows[0].buffer(), "hello");
    }
}
