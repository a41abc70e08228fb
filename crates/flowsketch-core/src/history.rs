//! Linear undo/redo history over full graph snapshots.

use crate::graph::Snapshot;

/// Undo and redo stacks.
///
/// Every mutating operation pushes the pre-mutation snapshot with
/// [`History::checkpoint`], which also drops the redo branch.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; `None` is unbounded.
    limit: Option<usize>,
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` undo steps.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the state that is about to be replaced.
    pub fn checkpoint(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Step back. `current` is the live state, which moves to the redo stack.
    /// Returns the state to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward; mirror of [`History::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::node::{Node, NodeData, NodeId, ShapeKind};
    use kurbo::Point;

    fn state(count: u64) -> Snapshot {
        let mut store = GraphStore::new();
        let nodes = (1..=count)
            .map(|n| {
                Node::new(
                    NodeId::from_counter(n),
                    ShapeKind::Circle,
                    Point::ORIGIN,
                    NodeData::default(),
                )
            })
            .collect();
        store.replace(nodes, Vec::new());
        store.snapshot()
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(history.undo(state(0)).is_none());
        assert!(!history.can_redo());
        assert!(history.redo(state(0)).is_none());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::new();
        history.checkpoint(state(0));

        let restored = history.undo(state(1)).unwrap();
        assert_eq!(restored, state(0));
        assert_eq!(history.redo_depth(), 1);

        let again = history.redo(restored).unwrap();
        assert_eq!(again, state(1));
        assert_eq!(history.undo_depth(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_checkpoint_clears_redo() {
        let mut history = History::new();
        history.checkpoint(state(0));
        history.undo(state(1));
        assert!(history.can_redo());

        history.checkpoint(state(0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(Some(2));
        history.checkpoint(state(0));
        history.checkpoint(state(1));
        history.checkpoint(state(2));

        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(state(3)), Some(state(2)));
        assert_eq!(history.undo(state(2)), Some(state(1)));
        assert!(history.undo(state(1)).is_none());
    }
}
