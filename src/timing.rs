//! Tick-driven timers and a monotonic clock.
//!
//! Nothing in the crate reads the wall clock on its own. Hosts pass a
//! millisecond tick into `update(now)` calls; continuation tasks (spinning,
//! tossing, keyframe playback, hint flags) are [`TimerTask`]s polled with
//! that tick.

use web_time::Instant;

/// Milliseconds on the host's monotonic clock.
pub type Tick = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
    Idle,
    /// Registered but not yet polled; the first poll sets the deadline.
    Armed { delay: u64, repeat: bool },
    Scheduled { due: Tick, period: u64, repeat: bool },
}

/// A cancellable task registered with the host's tick loop.
///
/// `run` registers a repeat-until-cancelled task, `run_once` a delayed
/// one-shot. Both replace whatever was registered before, so a task slot
/// never accumulates more than one pending callback. `stop` is immediate
/// and idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTask {
    state: TaskState,
}

impl Default for TimerTask {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerTask {
    /// Create an idle task.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TaskState::Idle,
        }
    }

    /// Fire every `period` milliseconds until stopped.
    pub fn run(&mut self, period: u64) {
        self.state = TaskState::Armed {
            delay: period.max(1),
            repeat: true,
        };
    }

    /// Fire once, `delay` milliseconds from the next poll.
    pub fn run_once(&mut self, delay: u64) {
        self.state = TaskState::Armed {
            delay,
            repeat: false,
        };
    }

    /// Cancel the task.
    pub fn stop(&mut self) {
        self.state = TaskState::Idle;
    }

    /// Whether the task is registered (armed or scheduled).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != TaskState::Idle
    }

    /// Whether this is a repeating task.
    #[must_use]
    pub fn is_repeating(&self) -> bool {
        matches!(
            self.state,
            TaskState::Armed { repeat: true, .. }
                | TaskState::Scheduled { repeat: true, .. }
        )
    }

    /// Period of a repeating task, or the delay of a one-shot.
    #[must_use]
    pub fn period(&self) -> Option<u64> {
        match self.state {
            TaskState::Idle => None,
            TaskState::Armed { delay, .. } => Some(delay),
            TaskState::Scheduled { period, .. } => Some(period),
        }
    }

    /// Advance to `now`. Returns `true` when the task fires.
    ///
    /// A task fires at most once per poll; polling twice with the same tick
    /// fires at most once in total.
    pub fn poll(&mut self, now: Tick) -> bool {
        match self.state {
            TaskState::Idle => false,
            TaskState::Armed { delay, repeat } => {
                self.state = TaskState::Scheduled {
                    due: now.saturating_add(delay),
                    period: delay,
                    repeat,
                };
                false
            }
            TaskState::Scheduled {
                due,
                period,
                repeat,
            } => {
                if now < due {
                    return false;
                }
                self.state = if repeat {
                    TaskState::Scheduled {
                        due: now.saturating_add(period),
                        period,
                        repeat,
                    }
                } else {
                    TaskState::Idle
                };
                true
            }
        }
    }
}

/// Monotonic millisecond clock for hosts that do not keep their own.
pub struct FrameClock {
    /// Instant the clock was created.
    origin: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a clock at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was created.
    #[must_use]
    pub fn now(&self) -> Tick {
        self.origin.elapsed().as_millis() as Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_task_arms_then_fires_each_period() {
        let mut task = TimerTask::new();
        task.run(40);
        assert!(task.is_active());
        assert!(!task.poll(100));
        assert!(!task.poll(139));
        assert!(task.poll(140));
        assert!(!task.poll(140));
        assert!(task.poll(180));
        assert!(task.is_active());
    }

    #[test]
    fn one_shot_fires_once() {
        let mut task = TimerTask::new();
        task.run_once(1000);
        assert!(!task.poll(0));
        assert!(!task.poll(999));
        assert!(task.poll(1000));
        assert!(!task.is_active());
        assert!(!task.poll(5000));
    }

    #[test]
    fn rerunning_replaces_previous_registration() {
        let mut task = TimerTask::new();
        task.run(10);
        let _ = task.poll(0);
        task.run(50);
        assert_eq!(task.period(), Some(50));
        assert!(!task.poll(10));
        assert!(!task.poll(20));
        assert!(task.poll(70));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut task = TimerTask::new();
        task.run(10);
        task.stop();
        task.stop();
        assert!(!task.is_active());
        assert!(!task.poll(1000));
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
