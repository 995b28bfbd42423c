//! Ambient clock and randomness, injected rather than called directly, so
//! that property streams (timestamps, EntryIDs, conversation indices) are
//! reproducible in tests.

use chrono::{DateTime, Utc};
use rand::RngCore;

/// Supplies the current time. The default clock wraps `Utc::now`; tests
/// supply a fixed instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock `Clock`, used by `Message::new` unless a caller substitutes
/// one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed point in time, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Supplies the random bytes behind GUIDs and conversation-index salts.
pub trait IdSource {
    fn random_bytes(&self, out: &mut [u8]);

    fn random_guid(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        bytes
    }
}

/// `IdSource` backed by the OS CSPRNG via `rand`'s thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsIdSource;

impl IdSource for OsIdSource {
    fn random_bytes(&self, out: &mut [u8]) {
        rand::thread_rng().fill_bytes(out);
    }
}

/// `IdSource` that replays a fixed byte, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdSource(pub u8);

impl IdSource for FixedIdSource {
    fn random_bytes(&self, out: &mut [u8]) {
        out.fill(self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_same_instant() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn fixed_id_source_is_deterministic() {
        let src = FixedIdSource(0x42);
        assert_eq!(src.random_guid(), [0x42; 16]);
    }
}
