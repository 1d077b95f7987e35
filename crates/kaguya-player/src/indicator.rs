//! Transient "-10s / +10s" indicators shown after a double-tap seek.

use std::time::{Duration, Instant};

use crate::gesture::SeekDirection;

/// Expiry instants for the backward and forward indicators.
#[derive(Debug, Clone)]
pub struct SeekIndicators {
    duration: Duration,
    backward_until: Option<Instant>,
    forward_until: Option<Instant>,
}

impl SeekIndicators {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            backward_until: None,
            forward_until: None,
        }
    }

    /// Show the indicator for `direction`, restarting its lifetime.
    pub fn show(&mut self, direction: SeekDirection, now: Instant) {
        *self.slot(direction) = Some(now + self.duration);
    }

    pub fn is_visible(&self, direction: SeekDirection, now: Instant) -> bool {
        let until = match direction {
            SeekDirection::Backward => self.backward_until,
            SeekDirection::Forward => self.forward_until,
        };
        until.is_some_and(|t| now < t)
    }

    pub fn active(&self, now: Instant) -> Vec<SeekDirection> {
        [SeekDirection::Backward, SeekDirection::Forward]
            .into_iter()
            .filter(|d| self.is_visible(*d, now))
            .collect()
    }

    /// Drop expired indicators.
    pub fn tick(&mut self, now: Instant) {
        for slot in [&mut self.backward_until, &mut self.forward_until] {
            if slot.is_some_and(|t| now >= t) {
                *slot = None;
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        crate::earliest(self.backward_until, self.forward_until)
    }

    fn slot(&mut self, direction: SeekDirection) -> &mut Option<Instant> {
        match direction {
            SeekDirection::Backward => &mut self.backward_until,
            SeekDirection::Forward => &mut self.forward_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_expires() {
        let mut ind = SeekIndicators::new(Duration::from_millis(350));
        let t0 = Instant::now();
        ind.show(SeekDirection::Forward, t0);

        assert!(ind.is_visible(SeekDirection::Forward, t0 + Duration::from_millis(349)));
        assert!(!ind.is_visible(SeekDirection::Backward, t0));
        assert!(!ind.is_visible(SeekDirection::Forward, t0 + Duration::from_millis(350)));
        assert_eq!(ind.deadline(), Some(t0 + Duration::from_millis(350)));

        ind.tick(t0 + Duration::from_millis(350));
        assert!(ind.deadline().is_none());
    }

    #[test]
    fn test_both_sides_independent() {
        let mut ind = SeekIndicators::new(Duration::from_millis(350));
        let t0 = Instant::now();
        ind.show(SeekDirection::Backward, t0);
        ind.show(SeekDirection::Forward, t0 + Duration::from_millis(200));

        assert_eq!(
            ind.active(t0 + Duration::from_millis(300)),
            vec![SeekDirection::Backward, SeekDirection::Forward]
        );
        assert_eq!(
            ind.active(t0 + Duration::from_millis(400)),
            vec![SeekDirection::Forward]
        );
        assert_eq!(ind.deadline(), Some(t0 + Duration::from_millis(350)));
    }
}
