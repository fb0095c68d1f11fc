use std::time::{Duration, Instant};

/// Repeating timer polled by the game loop. Firings that were missed while
/// the loop was busy are coalesced into one.
pub struct PeriodicTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    pub fn new(period: Duration) -> Self {
        PeriodicTimer { period, next_due: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true at most once per call if the timer is due, and schedules
    /// the next firing.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_on_period() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(8 * MS);
        timer.start(t0);
        assert!(!timer.fire(t0 + 7 * MS));
        assert!(timer.fire(t0 + 8 * MS));
        assert!(!timer.fire(t0 + 8 * MS));
        assert!(timer.fire(t0 + 16 * MS));
    }

    #[test]
    fn test_late_firings_coalesce() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(10 * MS);
        timer.start(t0);
        assert!(timer.fire(t0 + 55 * MS));
        assert!(!timer.fire(t0 + 60 * MS));
        assert_eq!(timer.time_until_due(t0 + 60 * MS), Some(5 * MS));
        assert!(timer.fire(t0 + 65 * MS));
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(MS);
        assert!(!timer.fire(t0 + 5 * MS));
        timer.start(t0);
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.fire(t0 + 100 * MS));
        assert_eq!(timer.time_until_due(t0), None);
    }
}
