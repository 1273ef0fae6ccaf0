// src/middleware/rate_limit.rs

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

// O limitador fica atrás deste trait: uma implementação com backing store
// distribuído entra aqui sem tocar nos call sites.
pub trait RateLimiter: Send + Sync {
    fn consume(&self, key: &str) -> RateDecision;
}

struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

// Janela fixa em memória, local ao processo e best-effort:
// os contadores se perdem num restart, o que é aceitável aqui.
pub struct InMemoryRateLimiter {
    max_requests: u32,
    window: Duration,
    store: DashMap<String, WindowEntry>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            store: DashMap::new(),
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn consume(&self, key: &str) -> RateDecision {
        let now = Utc::now();
        let mut entry = self.store.entry(key.to_string()).or_insert_with(|| WindowEntry {
            count: 0,
            reset_at: now + self.window,
        });

        // Janela anterior expirou: reinicia a contagem
        if entry.reset_at <= now {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.max_requests {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateDecision {
            allowed: true,
            remaining: self.max_requests - entry.count,
            reset_at: entry.reset_at,
        }
    }
}

// Converte a decisão em erro 429 com os segundos até a próxima janela
pub fn check_rate_limit(limiter: &dyn RateLimiter, key: &str) -> Result<(), AppError> {
    let decision = limiter.consume(key);
    if decision.allowed {
        return Ok(());
    }

    let millis = (decision.reset_at - Utc::now()).num_milliseconds().max(0);
    let seconds_to_reset = (millis + 999) / 1000;
    Err(AppError::RateLimited { seconds_to_reset })
}

#[cfg(test)]
mod tests {
    use super::{check_rate_limit, InMemoryRateLimiter, RateLimiter};
    use crate::common::error::AppError;
    use chrono::Duration;

    #[test]
    fn window_exhausts_after_max_requests() {
        let limiter = InMemoryRateLimiter::new(2, Duration::minutes(15));

        let first = limiter.consume("login:a@x.com");
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = limiter.consume("login:a@x.com");
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.consume("login:a@x.com");
        assert!(!third.allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = InMemoryRateLimiter::new(1, Duration::minutes(15));
        assert!(limiter.consume("login:a@x.com").allowed);
        assert!(limiter.consume("login:b@x.com").allowed);
        assert!(!limiter.consume("login:a@x.com").allowed);
    }

    #[test]
    fn expired_window_resets_the_count() {
        let limiter = InMemoryRateLimiter::new(1, Duration::zero());
        assert!(limiter.consume("k").allowed);
        // Janela de duração zero expira imediatamente
        assert!(limiter.consume("k").allowed);
    }

    #[test]
    fn check_rate_limit_surfaces_429_with_reset_seconds() {
        let limiter = InMemoryRateLimiter::new(1, Duration::minutes(15));
        assert!(check_rate_limit(&limiter, "k").is_ok());

        match check_rate_limit(&limiter, "k") {
            Err(AppError::RateLimited { seconds_to_reset }) => {
                assert!(seconds_to_reset > 0 && seconds_to_reset <= 900);
            }
            other => panic!("esperava RateLimited, veio {:?}", other.err()),
        }
    }
}
