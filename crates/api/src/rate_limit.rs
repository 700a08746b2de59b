use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window per-key limiter. Keys are caller IPs.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.inner.lock();

        // map-wide prune: expired timestamps go, and keys left empty go with
        // them, keeping the map bounded by IPs active within one window
        guard.retain(|_, queue| {
            while let Some(front) = queue.front() {
                if now.duration_since(*front) > self.window {
                    queue.pop_front();
                } else {
                    break;
                }
            }
            !queue.is_empty()
        });

        let queue = guard.entry(key.to_string()).or_default();
        if queue.len() >= self.max_requests {
            return false;
        }

        queue.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_key_within_the_window() {
        let limiter = IpRateLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        // a different key has its own window
        assert!(limiter.allow("10.0.0.2"));
    }

    #[test]
    fn idle_keys_are_evicted_after_the_window() {
        let limiter = IpRateLimiter::new(Duration::from_millis(10), 4);
        limiter.allow("10.0.0.1");
        limiter.allow("10.0.0.2");
        limiter.allow("10.0.0.3");
        assert_eq!(limiter.tracked_keys(), 3);

        std::thread::sleep(Duration::from_millis(30));

        // the next call prunes every expired key, not just its own
        limiter.allow("10.0.0.4");
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
