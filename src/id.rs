use serde::{Deserialize, Serialize};

/// Monotonic ID generator shared by provinces, trade offers, and agreements.
/// Guarantees globally unique IDs within a session — no two objects of any
/// type share an ID, so a signal carrying a bare `u64` is unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
