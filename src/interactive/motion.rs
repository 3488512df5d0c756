//! Damped continuation of spins and tosses.

use crate::event::MotionMeta;
use crate::timing::{Tick, TimerTask};

/// Continuation period used when the seeding event carries no delay.
pub const DEFAULT_PERIOD: u64 = 40;

/// Speed below which a damped motion stops.
const STOP_SPEED: f32 = 0.001;

/// Velocity state of one continuation (spin or toss).
///
/// Seeding replaces the registered task, so at most one continuation of
/// each kind runs per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inertia {
    task: TimerTask,
    speed: f32,
}

impl Inertia {
    /// Seed from the event that started the motion: its speed becomes the
    /// initial velocity, its delay the continuation period.
    pub fn start(&mut self, meta: &MotionMeta) {
        self.speed = meta.speed;
        let period = if meta.delay == 0 {
            DEFAULT_PERIOD
        } else {
            meta.delay
        };
        self.task.run(period);
    }

    /// Cancel the continuation.
    pub fn stop(&mut self) {
        self.task.stop();
    }

    /// Whether a continuation is registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.is_active()
    }

    /// Current velocity.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Continuation period, if running.
    #[must_use]
    pub fn period(&self) -> Option<u64> {
        self.task.period()
    }

    /// Advance the task; `true` when a continuation step is due.
    pub fn poll(&mut self, now: Tick) -> bool {
        self.task.poll(now)
    }

    /// Apply one step of friction. Returns the ratio between the new and
    /// the previous speed, by which the step size must be rescaled.
    pub fn damp(&mut self, friction: f32) -> f32 {
        let previous = self.speed;
        self.speed *= 1.0 - friction;
        if self.speed.abs() < STOP_SPEED {
            self.speed = 0.0;
        }
        if previous == 0.0 {
            0.0
        } else {
            self.speed / previous
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_uses_default_period() {
        let mut inertia = Inertia::default();
        inertia.start(&MotionMeta {
            speed: 2.0,
            ..MotionMeta::default()
        });
        assert_eq!(inertia.period(), Some(DEFAULT_PERIOD));
        assert_eq!(inertia.speed(), 2.0);
    }

    #[test]
    fn damping_decays_to_a_stop() {
        let mut inertia = Inertia::default();
        inertia.start(&MotionMeta {
            speed: 1.0,
            delay: 16,
            ..MotionMeta::default()
        });
        assert!((inertia.damp(0.5) - 0.5).abs() < 1e-6);
        let mut steps = 0;
        while inertia.speed() > 0.0 {
            let _ = inertia.damp(0.5);
            steps += 1;
        }
        assert!(steps < 20);
        assert_eq!(inertia.damp(0.5), 0.0);
    }
}
