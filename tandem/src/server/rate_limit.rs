//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Per-session fixed-window request budget.

use crate::protocol::Stats;
use std::time::Duration;
use tokio::time::Instant;

/// Request budget configuration.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tandem::server::RateLimitConfig;
///
/// let config = RateLimitConfig::new(100, Duration::from_secs(10));
/// assert_eq!(config.max_requests, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window (default: 1000).
    pub max_requests: u64,

    /// Window length (default: 60s).
    pub window: Duration,
}

impl RateLimitConfig {
    /// Creates a config allowing `max_requests` per `window`.
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// A budget that is never exhausted in practice.
    pub fn unlimited() -> Self {
        Self::new(u64::MAX, Duration::from_secs(60))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(60))
    }
}

/// Fixed-window counter.
///
/// The window starts with the first request and resets once `window` has
/// elapsed. Every response, allowed or not, reports the remaining budget
/// and the whole seconds until reset.
#[derive(Debug)]
pub struct RateBudget {
    config: RateLimitConfig,
    window_start: Instant,
    used: u64,
}

impl RateBudget {
    /// Creates a full budget.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            window_start: Instant::now(),
            used: 0,
        }
    }

    /// Consumes one request from the budget.
    ///
    /// Returns `Ok(stats)` if the request is allowed and `Err(stats)` once
    /// the window's budget is spent.
    pub fn try_acquire(&mut self) -> Result<Stats, Stats> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&mut self, now: Instant) -> Result<Stats, Stats> {
        if now.duration_since(self.window_start) >= self.config.window {
            self.window_start = now;
            self.used = 0;
        }

        let allowed = self.used < self.config.max_requests;
        if allowed {
            self.used += 1;
        }

        let stats = self.stats_at(now);
        if allowed { Ok(stats) } else { Err(stats) }
    }

    /// Current stats without consuming anything.
    pub fn stats(&self) -> Stats {
        self.stats_at(Instant::now())
    }

    fn stats_at(&self, now: Instant) -> Stats {
        let elapsed = now.duration_since(self.window_start);
        let left = self.config.window.saturating_sub(elapsed);
        let mut reset_in_seconds = left.as_secs();
        if left.subsec_nanos() > 0 {
            reset_in_seconds += 1;
        }
        Stats::new(
            self.config.max_requests.saturating_sub(self.used),
            reset_in_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_counts_down_then_refuses() {
        let mut budget = RateBudget::new(RateLimitConfig::new(2, Duration::from_secs(60)));
        let now = budget.window_start;

        assert_eq!(budget.try_acquire_at(now).unwrap().remaining_requests, 1);
        assert_eq!(budget.try_acquire_at(now).unwrap().remaining_requests, 0);

        let refused = budget.try_acquire_at(now).unwrap_err();
        assert_eq!(refused, Stats::new(0, 60));
    }

    #[test]
    fn test_window_resets() {
        let mut budget = RateBudget::new(RateLimitConfig::new(1, Duration::from_secs(10)));
        let start = budget.window_start;

        assert!(budget.try_acquire_at(start).is_ok());
        let refused = budget.try_acquire_at(start + Duration::from_millis(6500)).unwrap_err();
        assert_eq!(refused.reset_in_seconds, 4);

        let stats = budget.try_acquire_at(start + Duration::from_secs(10)).unwrap();
        assert_eq!(stats, Stats::new(0, 10));
    }

    #[test]
    fn test_default_budget() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 1000);
        assert_eq!(config.window, Duration::from_secs(60));
        assert_eq!(RateBudget::new(config).stats().remaining_requests, 1000);
    }
}
