use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by client IP.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    hits: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    capacity: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            hits: Arc::new(Mutex::new(HashMap::new())),
            window,
            capacity,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock();
        let recent = hits.entry(key.to_string()).or_default();

        while recent
            .front()
            .is_some_and(|first| now.duration_since(*first) > self.window)
        {
            recent.pop_front();
        }

        if recent.len() >= self.capacity {
            return false;
        }

        recent.push_back(now);
        true
    }
}
