use std::sync::atomic::{AtomicU64, Ordering};

/// Tag carried by one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Monotonic request counter deciding which responses may still be applied.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True only for the most recently issued ticket.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Records `ticket` as applied unless a newer ticket already was.
    pub fn advance(&self, ticket: Ticket) -> bool {
        self.applied.fetch_max(ticket.0, Ordering::SeqCst) < ticket.0
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use crate::dashboard::generation::RequestGeneration;

    #[test]
    fn only_latest_ticket_is_current() {
        let generation = RequestGeneration::new();
        let first = generation.issue();
        let second = generation.issue();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        generation.invalidate();
        assert!(!generation.is_current(second));
    }

    #[test]
    fn advance_rejects_older_results() {
        let generation = RequestGeneration::new();
        let first = generation.issue();
        let second = generation.issue();
        assert!(generation.advance(second));
        assert!(!generation.advance(first));
        assert!(!generation.advance(second));
        let third = generation.issue();
        assert!(generation.advance(third));
    }
}
