//! Correlation table for outbound commands awaiting a `result` frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::oneshot;

use super::HaError;

struct PendingEntry {
    respond_to: oneshot::Sender<Result<Option<Value>, HaError>>,
    deadline: Instant,
}

/// Outstanding request/response correlation. Ids are monotonically
/// increasing for the lifetime of one connection; responses with no
/// matching entry are dropped; entries that outlive their deadline are
/// rejected and removed, so nothing leaks.
pub(crate) struct PendingRequests {
    next_id: u64,
    entries: HashMap<u64, PendingEntry>,
    timeout: Duration,
}

impl PendingRequests {
    pub fn new(timeout: Duration) -> Self {
        Self {
            next_id: 0,
            entries: HashMap::new(),
            timeout,
        }
    }

    /// Allocate the next command id.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a pending command sent with `id`.
    pub fn insert(
        &mut self,
        id: u64,
        respond_to: oneshot::Sender<Result<Option<Value>, HaError>>,
        now: Instant,
    ) {
        self.entries.insert(
            id,
            PendingEntry {
                respond_to,
                deadline: now + self.timeout,
            },
        );
    }

    /// Complete the pending command with `id`. Returns false when no
    /// matching entry exists (the response is dropped).
    pub fn resolve(&mut self, id: u64, result: Result<Option<Value>, HaError>) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                // The caller may have given up waiting; ignore that.
                let _ = entry.respond_to.send(result);
                true
            }
            None => {
                tracing::trace!("Dropping response for unknown command id {}", id);
                false
            }
        }
    }

    /// Reject and remove every entry whose deadline has passed.
    /// Returns the number of expired entries.
    pub fn expire(&mut self, now: Instant) -> usize {
        let expired: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            if let Some(entry) = self.entries.remove(id) {
                tracing::warn!("Command {} timed out", id);
                let _ = entry.respond_to.send(Err(HaError::Timeout));
            }
        }
        expired.len()
    }

    /// Reject everything, used when the socket dies.
    pub fn fail_all(&mut self, make_err: impl Fn() -> HaError) {
        for (_, entry) in self.entries.drain() {
            let _ = entry.respond_to.send(Err(make_err()));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PendingRequests {
        PendingRequests::new(Duration::from_secs(10))
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut t = table();
        let a = t.next_id();
        let b = t.next_id();
        let c = t.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_resolve_delivers_result() {
        let mut t = table();
        let id = t.next_id();
        let (tx, mut rx) = oneshot::channel();
        t.insert(id, tx, Instant::now());

        assert!(t.resolve(id, Ok(Some(serde_json::json!({"ok": true})))));
        let result = rx.try_recv().unwrap().unwrap();
        assert_eq!(result.unwrap()["ok"], true);
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_unmatched_response_is_dropped() {
        let mut t = table();
        assert!(!t.resolve(42, Ok(None)));
    }

    #[test]
    fn test_expired_entry_is_rejected_and_removed() {
        let mut t = table();
        let id = t.next_id();
        let (tx, mut rx) = oneshot::channel();
        let start = Instant::now();
        t.insert(id, tx, start);

        // Nothing expires before the deadline.
        assert_eq!(t.expire(start + Duration::from_secs(5)), 0);
        assert_eq!(t.len(), 1);

        assert_eq!(t.expire(start + Duration::from_secs(11)), 1);
        assert_eq!(t.len(), 0);
        match rx.try_recv().unwrap() {
            Err(HaError::Timeout) => {}
            other => panic!("expected timeout, got {:?}", other),
        }

        // A late response for the expired id is now unmatched.
        assert!(!t.resolve(id, Ok(None)));
    }

    #[test]
    fn test_fail_all_rejects_everything() {
        let mut t = table();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let id = t.next_id();
            let (tx, rx) = oneshot::channel();
            t.insert(id, tx, Instant::now());
            receivers.push(rx);
        }

        t.fail_all(|| HaError::ConnectionLost);
        assert_eq!(t.len(), 0);
        for mut rx in receivers {
            assert!(matches!(rx.try_recv().unwrap(), Err(HaError::ConnectionLost)));
        }
    }
}
