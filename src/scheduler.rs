use std::time::{Duration, Instant};

// Periodic refresh timer. It doesn't own a thread; the event loop asks for
// the next deadline and calls poll() when it wakes up.
pub struct RefreshScheduler {
    interval: Duration,
    next_tick: Option<Instant>,
    stopped: bool,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> RefreshScheduler {
        return RefreshScheduler {
            interval: interval,
            next_tick: None,
            stopped: false,
        };
    }

    pub fn start(&mut self, now: Instant) {
        if self.stopped {
            return;
        }
        self.next_tick = Some(now + self.interval);
    }

    pub fn suspend(&mut self) {
        if self.next_tick.take().is_some() {
            debug!("Refresh suspended");
        }
    }

    // Restarts from a full interval. Ticks missed while suspended are not
    // replayed.
    pub fn resume(&mut self, now: Instant) {
        if self.stopped || self.next_tick.is_some() {
            return;
        }
        debug!("Refresh resumed, next tick in {:?}", self.interval);
        self.next_tick = Some(now + self.interval);
    }

    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.next_tick = None;
    }

    // True when a tick is due. Late wakeups fire once and then reschedule
    // relative to now instead of firing a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.next_tick {
            Some(due) => due,
            None => return false,
        };
        if now < due {
            return false;
        }

        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_tick = Some(next);
        return true;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        return self.next_tick;
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        return self.next_tick.is_some();
    }

    pub fn interval(&self) -> Duration {
        return self.interval;
    }
}
