/// Outcome of feeding one pulse to a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Nothing armed.
    Idle,
    /// Still counting; carries the seconds left after this pulse.
    Running(u64),
    /// Reached zero on this pulse. The countdown disarms itself.
    Expired,
}

/// Decrement-to-zero counter shared by the subject countdown and the
/// preparation interstitial.
///
/// A pulse that lands the value on zero expires in that same pulse. A
/// countdown armed with zero expires on its first pulse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
    armed: bool,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, secs: u64) {
        self.remaining_secs = secs;
        self.armed = true;
    }

    /// Disarm and discard whatever was left.
    pub fn clear(&mut self) {
        self.remaining_secs = 0;
        self.armed = false;
    }

    pub fn remaining(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.armed {
            return CountdownTick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.armed = false;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_countdown_is_idle() {
        let mut c = Countdown::new();
        assert_eq!(c.tick(), CountdownTick::Idle);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn expires_on_the_pulse_that_reaches_zero() {
        let mut c = Countdown::new();
        c.arm(3);
        assert_eq!(c.tick(), CountdownTick::Running(2));
        assert_eq!(c.tick(), CountdownTick::Running(1));
        assert_eq!(c.tick(), CountdownTick::Expired);
        assert!(!c.is_armed());
        assert_eq!(c.tick(), CountdownTick::Idle);
    }

    #[test]
    fn zero_length_expires_immediately() {
        let mut c = Countdown::new();
        c.arm(0);
        assert!(c.is_armed());
        assert_eq!(c.tick(), CountdownTick::Expired);
    }

    #[test]
    fn clear_discards_remaining() {
        let mut c = Countdown::new();
        c.arm(10);
        c.tick();
        c.clear();
        assert_eq!(c.remaining(), 0);
        assert_eq!(c.tick(), CountdownTick::Idle);
    }
}
