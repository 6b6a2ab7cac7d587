//! Bounded retry with increasing delays.

use std::time::Duration;

/// Delay schedule for a bounded number of attempts.
///
/// The first attempt runs immediately; each configured delay buys one more
/// attempt, so `n` delays allow `n + 1` attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    delays: Vec<Duration>,
    next: usize,
}

impl Backoff {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays, next: 0 }
    }

    /// Delay before the next attempt, or `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.delays.get(self.next).copied()?;
        self.next += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delays() -> Vec<Duration> {
        [150, 400, 1000].into_iter().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_backoff_budget() {
        let mut backoff = Backoff::new(delays());
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(150)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(400)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(1000)));
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_empty_schedule_allows_one_attempt() {
        let mut backoff = Backoff::new(Vec::new());
        assert_eq!(backoff.next_delay(), None);
    }
}
