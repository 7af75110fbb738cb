use chrono::{DateTime, Utc};
use elastik::transport::Clock;
use parking_lot::RwLock;
use std::time::Duration;

/// Clock that only moves when told to
///
/// Starts at the unix epoch, so times read off an audit trail are offsets
/// from the start of the test.
#[derive(Debug)]
pub struct TestableClock {
    now: RwLock<DateTime<Utc>>,
}

impl TestableClock {
    pub fn new() -> Self {
        Self::at(DateTime::UNIX_EPOCH)
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::days(365));
        let mut now = self.now.write();
        *now += by;
    }

    /// Time passed since the epoch
    pub fn elapsed(&self) -> Duration {
        (*self.now.read() - DateTime::UNIX_EPOCH)
            .to_std()
            .unwrap_or_default()
    }
}

impl Default for TestableClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestableClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_only_moves_on_request() {
        let clock = TestableClock::new();
        assert_eq!(clock.now(), DateTime::UNIX_EPOCH);

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.elapsed(), Duration::from_secs(90));
        assert_eq!(clock.now(), clock.now());

        clock.set(DateTime::UNIX_EPOCH + chrono::Duration::minutes(10));
        assert_eq!(clock.elapsed(), Duration::from_secs(600));
    }
}
