//! Pure countdown arithmetic shared by the runtime timer and its tests.

/// What a single one-second step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Decremented; more seconds remain.
    Ticked { remaining: u32 },
    /// Decremented to zero. The caller reports the final tick, then expiry.
    Expired,
    /// Already at zero; nothing happened.
    Idle,
}

/// A remaining-seconds counter that only ever moves down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn step(&mut self) -> CountdownStep {
        match self.remaining {
            0 => CountdownStep::Idle,
            1 => {
                self.remaining = 0;
                CountdownStep::Expired
            }
            n => {
                self.remaining = n - 1;
                CountdownStep::Ticked {
                    remaining: self.remaining,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_steps_reach_expiry_exactly_once() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.step(), CountdownStep::Ticked { remaining: 2 });
        assert_eq!(countdown.step(), CountdownStep::Ticked { remaining: 1 });
        assert_eq!(countdown.step(), CountdownStep::Expired);
        assert_eq!(countdown.step(), CountdownStep::Idle);
        assert!(countdown.is_expired());
    }

    #[test]
    fn zero_is_already_expired() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.is_expired());
        assert_eq!(countdown.step(), CountdownStep::Idle);
    }
}
