use crate::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks the rate limiter state of a single key (one domain, or the global key)
///
/// This structure holds the timestamp of the last request, the current
/// adaptive delay, and the recent outcomes the delay adapts to.
#[derive(Debug, Clone)]
pub struct KeyState {
    /// Timestamp of the last request made under this key
    pub last_request_time: Option<Instant>,

    /// Minimum spacing enforced before the next request
    pub current_delay: Duration,

    /// Number of 5xx responses seen back to back
    pub consecutive_server_errors: u32,

    /// Most recent outcomes, newest last (true = success)
    pub recent_outcomes: VecDeque<bool>,

    /// Number of requests made under this key
    pub request_count: u32,
}

impl KeyState {
    /// Creates a new KeyState starting at the given delay
    pub fn new(base_delay: Duration) -> Self {
        Self {
            last_request_time: None,
            current_delay: base_delay,
            consecutive_server_errors: 0,
            recent_outcomes: VecDeque::new(),
            request_count: 0,
        }
    }

    /// Calculates the time until the next request may be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.current_delay {
            Some(self.current_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was made under this key
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Adapts the delay to the outcome of a completed request
    ///
    /// `status` is None when no response was received. When adaptation is
    /// disabled the delay never moves.
    ///
    /// * 429 doubles the delay, up to `max-delay-ms`
    /// * a 5xx right after another 5xx multiplies it by 1.5, up to
    ///   `server-error-max-delay-ms`
    /// * a fast success with a full window of successes decays it by
    ///   `decay-factor`, never below `min-delay-ms`
    ///
    /// Other 4xx responses say nothing about load and leave the window alone.
    pub fn record_outcome(
        &mut self,
        status: Option<u16>,
        elapsed: Duration,
        config: &RateLimitConfig,
    ) {
        if !config.adaptive {
            return;
        }

        match status {
            Some(429) => {
                self.consecutive_server_errors = 0;
                self.push_outcome(false, config.success_window);
                let cap = Duration::from_millis(config.max_delay_ms);
                self.current_delay = (self.current_delay * 2).min(cap);
            }
            Some(code) if (500..=599).contains(&code) => {
                self.consecutive_server_errors += 1;
                self.push_outcome(false, config.success_window);
                let cap = Duration::from_millis(config.server_error_max_delay_ms);
                if self.consecutive_server_errors >= 2 && self.current_delay < cap {
                    self.current_delay = self.current_delay.mul_f64(1.5).min(cap);
                }
            }
            Some(code) if (200..=399).contains(&code) => {
                self.consecutive_server_errors = 0;
                self.push_outcome(true, config.success_window);
                let fast = elapsed < Duration::from_millis(config.fast_response_ms);
                if fast && self.is_window_all_success(config.success_window) {
                    let floor = Duration::from_millis(config.min_delay_ms);
                    self.current_delay = self
                        .current_delay
                        .mul_f64(config.decay_factor)
                        .max(floor);
                }
            }
            Some(_) => {
                self.consecutive_server_errors = 0;
            }
            None => {
                self.consecutive_server_errors = 0;
                self.push_outcome(false, config.success_window);
            }
        }
    }

    fn push_outcome(&mut self, success: bool, window: usize) {
        self.recent_outcomes.push_back(success);
        while self.recent_outcomes.len() > window {
            self.recent_outcomes.pop_front();
        }
    }

    fn is_window_all_success(&self, window: usize) -> bool {
        self.recent_outcomes.len() >= window && self.recent_outcomes.iter().all(|ok| *ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> RateLimitConfig {
        RateLimitConfig {
            base_delay_ms: 1000,
            min_delay_ms: 100,
            max_delay_ms: 60_000,
            server_error_max_delay_ms: 30_000,
            success_window: 3,
            decay_factor: 0.5,
            fast_response_ms: 2000,
            ..RateLimitConfig::default()
        }
    }

    fn fast() -> Duration {
        Duration::from_millis(50)
    }

    #[test]
    fn test_new_key_state() {
        let state = KeyState::new(Duration::from_millis(1000));
        assert_eq!(state.current_delay, Duration::from_millis(1000));
        assert!(state.last_request_time.is_none());
        assert_eq!(state.request_count, 0);
        assert!(state.time_until_next_request(Instant::now()).is_none());
    }

    #[test]
    fn test_time_until_next_request() {
        let mut state = KeyState::new(Duration::from_millis(1000));
        let now = Instant::now();
        state.record_request(now);

        assert_eq!(
            state.time_until_next_request(now),
            Some(Duration::from_millis(1000))
        );
        assert_eq!(
            state.time_until_next_request(now + Duration::from_millis(400)),
            Some(Duration::from_millis(600))
        );
        assert!(state
            .time_until_next_request(now + Duration::from_millis(1100))
            .is_none());
    }

    #[test]
    fn test_rate_limited_doubles_up_to_cap() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        state.record_outcome(Some(429), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(2000));

        for _ in 0..10 {
            state.record_outcome(Some(429), fast(), &config);
        }
        assert_eq!(state.current_delay, Duration::from_millis(60_000));
    }

    #[test]
    fn test_single_server_error_does_not_slow_down() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        state.record_outcome(Some(503), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(1000));

        state.record_outcome(Some(500), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_repeated_server_errors_capped() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        for _ in 0..20 {
            state.record_outcome(Some(500), fast(), &config);
        }
        assert_eq!(state.current_delay, Duration::from_millis(30_000));
    }

    #[test]
    fn test_server_errors_never_lower_a_higher_delay() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(40_000));

        state.record_outcome(Some(500), fast(), &config);
        state.record_outcome(Some(500), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(40_000));
    }

    #[test]
    fn test_decay_requires_full_window() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        state.record_outcome(Some(200), fast(), &config);
        state.record_outcome(Some(200), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(1000));

        state.record_outcome(Some(200), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_decay_requires_fast_response() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        for _ in 0..5 {
            state.record_outcome(Some(200), Duration::from_secs(3), &config);
        }
        assert_eq!(state.current_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_decay_stops_at_floor() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        for _ in 0..50 {
            state.record_outcome(Some(200), fast(), &config);
        }
        assert_eq!(state.current_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_failure_resets_success_window() {
        let config = create_test_config();
        let mut state = KeyState::new(Duration::from_millis(1000));

        state.record_outcome(Some(200), fast(), &config);
        state.record_outcome(Some(200), fast(), &config);
        state.record_outcome(None, fast(), &config);
        state.record_outcome(Some(200), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_non_adaptive_never_moves() {
        let config = RateLimitConfig {
            adaptive: false,
            ..create_test_config()
        };
        let mut state = KeyState::new(Duration::from_millis(1000));

        state.record_outcome(Some(429), fast(), &config);
        state.record_outcome(Some(500), fast(), &config);
        state.record_outcome(Some(500), fast(), &config);
        assert_eq!(state.current_delay, Duration::from_millis(1000));
    }
}
