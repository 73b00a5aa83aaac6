//! Frame timing.

use std::time::{Duration, Instant};

/// Frame clock resource. Updated by the window loop at the start of each
/// frame, before any system runs.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    startup: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Time {
    pub(crate) fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    pub(crate) fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Duration of the previous frame in seconds. Zero on the first frame.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Seconds since the engine started.
    pub fn elapsed_secs(&self) -> f32 {
        self.startup.elapsed().as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous frames per second, from the previous frame's delta.
    pub fn fps(&self) -> f32 {
        let delta = self.delta_secs();
        if delta > 0.0 { 1.0 / delta } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let time = Time::new();
        assert_eq!(time.delta_secs(), 0.0);
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn update_advances_the_clock() {
        let mut time = Time::new();
        std::thread::sleep(Duration::from_millis(5));
        time.update();
        assert!(time.delta_secs() > 0.0);
        assert!(time.elapsed_secs() > 0.0);
        assert_eq!(time.frame_count(), 1);
        assert!(time.fps() > 0.0);
        time.update();
        assert_eq!(time.frame_count(), 2);
    }
}
