//! Batch-wide trip identifiers.

/// Hands out strictly increasing trip identifiers, starting at 1.
///
/// One counter is threaded through every trajectory of a batch so that trips
/// from different objects never share an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripIdCounter {
    next: u64,
}

impl Default for TripIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TripIdCounter {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Continue numbering from an earlier batch.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next identifier.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The identifier the next call to [`TripIdCounter::next_id`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let mut counter = TripIdCounter::new();
        assert_eq!(counter.next_id(), 1);
        assert_eq!(counter.next_id(), 2);
        assert_eq!(counter.peek(), 3);

        let mut resumed = TripIdCounter::starting_at(10);
        assert_eq!(resumed.next_id(), 10);
    }
}
