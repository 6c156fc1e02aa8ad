use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source for pacing. Production code blocks the thread; tests advance
/// a manual clock instead.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when slept on. Records every sleep.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn total_slept(&self) -> Duration {
        self.sleeps.borrow().iter().sum()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
    }
}

/// Enforces a minimum interval between consecutive calls to `wait`.
///
/// The first call never blocks.
pub struct Pacer {
    min_interval: Duration,
    last: Option<Instant>,
    clock: Rc<dyn Clock>,
}

impl Pacer {
    pub fn new(min_interval: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            min_interval,
            last: None,
            clock,
        }
    }

    /// Block until the interval since the previous call has passed.
    /// Returns how long it slept.
    pub fn wait(&mut self) -> Duration {
        let mut slept = Duration::ZERO;

        if let Some(last) = self.last {
            let since = self.clock.now().saturating_duration_since(last);
            if since < self.min_interval {
                slept = self.min_interval - since;
                self.clock.sleep(slept);
            }
        }

        self.last = Some(self.clock.now());
        slept
    }
}
