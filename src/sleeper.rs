use std::time::Duration;

/// Blocking pause, behind a trait so tests can record waits instead of taking them.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
