//! The ordered, append-only record of all conversation turns.

mod types;

pub use types::{Speaker, Turn};

/// Append-only sequence of turns, insertion order = conversation order.
///
/// Owned exclusively by the session orchestrator (single writer); every
/// other component only ever sees `&Transcript`. Turns are never edited
/// or removed, so a user turn whose exchange failed downstream stays
/// visible, unanswered.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
