//! Per-user rate limiting for inbound requests.
//!
//! Prevents a single user from monopolizing the bot. Fixed-window
//! counting keyed by owner id; state lives in memory and resets with the
//! process.

use chrono::{DateTime, Duration, Utc};
use linklet_core::OwnerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Rate limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration in seconds.
    pub window_seconds: u32,
}

impl RateLimitConfig {
    /// Creates a new rate limit configuration.
    #[must_use]
    pub fn new(max_requests: u32, window_seconds: u32) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }
}

impl Default for RateLimitConfig {
    /// 30 requests per minute.
    fn default() -> Self {
        Self::new(30, 60)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        remaining: u32,
        resets_at: DateTime<Utc>,
    },
    /// Rate limit exceeded.
    Exceeded {
        retry_after: Duration,
        resets_at: DateTime<Utc>,
    },
}

impl RateLimitResult {
    /// Returns true if the request is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the number of remaining requests (0 if exceeded).
    #[must_use]
    pub fn remaining(&self) -> u32 {
        match self {
            Self::Allowed { remaining, .. } => *remaining,
            Self::Exceeded { .. } => 0,
        }
    }
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests made in this window.
    count: u32,
    /// When this window started.
    window_start: DateTime<Utc>,
}

impl WindowState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Utc::now(),
        }
    }
}

/// A per-user request rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// State per owner.
    state: Arc<RwLock<HashMap<OwnerId, WindowState>>>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the given configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Checks if a request is allowed for the given owner.
    ///
    /// If allowed, increments the request count.
    pub fn check_and_increment(&self, owner_id: OwnerId) -> RateLimitResult {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let window_duration = Duration::seconds(i64::from(self.config.window_seconds));

        let window_state = state.entry(owner_id).or_insert_with(WindowState::new);

        // Check if we need to start a new window
        if now - window_state.window_start >= window_duration {
            window_state.window_start = now;
            window_state.count = 0;
        }

        let resets_at = window_state.window_start + window_duration;

        if window_state.count >= self.config.max_requests {
            let retry_after = resets_at - now;
            tracing::warn!(%owner_id, "rate limit exceeded");
            return RateLimitResult::Exceeded {
                retry_after,
                resets_at,
            };
        }

        window_state.count += 1;
        let remaining = self.config.max_requests - window_state.count;

        RateLimitResult::Allowed {
            remaining,
            resets_at,
        }
    }

    /// Checks if a request would be allowed without incrementing.
    #[must_use]
    pub fn check(&self, owner_id: OwnerId) -> RateLimitResult {
        let state = self.state.read().unwrap();
        let now = Utc::now();
        let window_duration = Duration::seconds(i64::from(self.config.window_seconds));

        let Some(window_state) = state.get(&owner_id) else {
            // No state means no requests yet
            return RateLimitResult::Allowed {
                remaining: self.config.max_requests,
                resets_at: now + window_duration,
            };
        };

        // Check if window has expired
        if now - window_state.window_start >= window_duration {
            return RateLimitResult::Allowed {
                remaining: self.config.max_requests,
                resets_at: now + window_duration,
            };
        }

        let resets_at = window_state.window_start + window_duration;

        if window_state.count >= self.config.max_requests {
            let retry_after = resets_at - now;
            return RateLimitResult::Exceeded {
                retry_after,
                resets_at,
            };
        }

        let remaining = self.config.max_requests - window_state.count;
        RateLimitResult::Allowed {
            remaining,
            resets_at,
        }
    }

    /// Resets the rate limit for an owner.
    pub fn reset(&self, owner_id: OwnerId) {
        let mut state = self.state.write().unwrap();
        state.remove(&owner_id);
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            state: Arc::clone(&self.state),
        }
    }
}
