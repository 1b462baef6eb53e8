// AuditSleuth - app/debounce.rs
//
// Search-input debouncing. The effective search term lags the last
// keystroke by a fixed quantum so the view is not re-filtered on every
// character.
//
// Deliberately clockless: callers pass `Instant`s in, which keeps the
// debouncer a plain value (no timer thread) and makes the timing contract
// directly testable.

use std::time::{Duration, Instant};

/// Delays the effect of rapid input changes until input pauses for the
/// configured quantum.
///
/// Each `input()` call replaces the pending term and pushes the deadline
/// out; `poll()` releases the term once the deadline passes. A zero
/// quantum releases on the next poll.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quantum: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given settle quantum.
    pub fn new(quantum: Duration) -> Self {
        Self {
            quantum,
            pending: None,
            deadline: None,
        }
    }

    /// Record a keystroke at `now`. The previous pending term (if any) is
    /// replaced and the deadline restarts.
    pub fn input(&mut self, term: &str, now: Instant) {
        self.pending = Some(term.to_string());
        self.deadline = Some(now + self.quantum);
    }

    /// Release the pending term if the quantum has elapsed by `now`.
    ///
    /// Returns `Some(term)` exactly once per settled input; subsequent
    /// polls return `None` until the next `input()`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Release the pending term immediately (e.g. the user pressed Enter).
    pub fn flush(&mut self) -> Option<String> {
        self.deadline = None;
        self.pending.take()
    }

    /// True while a term is waiting for its deadline.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUANTUM: Duration = Duration::from_millis(300);

    #[test]
    fn test_term_is_withheld_until_quantum_elapses() {
        let mut debouncer = Debouncer::new(QUANTUM);
        let start = Instant::now();

        debouncer.input("evt", start);
        assert_eq!(debouncer.poll(start), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + QUANTUM), Some("evt".to_string()));
    }

    #[test]
    fn test_each_keystroke_restarts_the_deadline() {
        let mut debouncer = Debouncer::new(QUANTUM);
        let start = Instant::now();

        debouncer.input("e", start);
        debouncer.input("ev", start + Duration::from_millis(200));
        // 300ms after the first keystroke, but only 100ms after the last.
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        // Settles 300ms after the final keystroke, with the final term.
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)),
            Some("ev".to_string())
        );
    }

    #[test]
    fn test_poll_releases_exactly_once() {
        let mut debouncer = Debouncer::new(QUANTUM);
        let start = Instant::now();

        debouncer.input("evt", start);
        assert!(debouncer.poll(start + QUANTUM).is_some());
        assert_eq!(debouncer.poll(start + QUANTUM * 2), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_flush_releases_immediately() {
        let mut debouncer = Debouncer::new(QUANTUM);
        debouncer.input("evt", Instant::now());
        assert_eq!(debouncer.flush(), Some("evt".to_string()));
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_zero_quantum_releases_on_next_poll() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        let now = Instant::now();
        debouncer.input("evt", now);
        assert_eq!(debouncer.poll(now), Some("evt".to_string()));
    }

    #[test]
    fn test_empty_term_still_settles() {
        // Clearing the search box is itself an input that must propagate.
        let mut debouncer = Debouncer::new(QUANTUM);
        let now = Instant::now();
        debouncer.input("", now);
        assert_eq!(debouncer.poll(now + QUANTUM), Some(String::new()));
    }
}
