//! Keyframed eye paths.
//!
//! A [`KeyFrameInterpolator`] stores world poses stamped with a time and
//! produces the in-between poses: positions follow a Catmull-Rom (Hermite)
//! spline, orientations a squad curve, magnitudes a straight line.
//!
//! Playback is tick driven. [`KeyFrameInterpolator::update`] is polled with
//! the host's tick and returns the pose the driven frame must take, if one
//! is due.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::frame::Pose;
use crate::geom;
use crate::timing::{Tick, TimerTask};

/// Default playback period, in milliseconds.
pub const DEFAULT_PERIOD: u64 = 40;

/// A pose and the time it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame {
    /// World pose.
    pub pose: Pose,
    /// Time stamp, in time units (seconds at speed 1).
    pub time: f32,
}

/// Interpolates a sequence of keyframes.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrameInterpolator {
    keyframes: Vec<KeyFrame>,
    time: f32,
    speed: f32,
    period: u64,
    looping: bool,
    task: TimerTask,
    /// Set by `start_interpolation`; the next update answers immediately.
    fresh: bool,
}

impl Default for KeyFrameInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyFrameInterpolator {
    /// Empty, stopped interpolator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            time: 0.0,
            speed: 1.0,
            period: DEFAULT_PERIOD,
            looping: false,
            task: TimerTask::new(),
            fresh: false,
        }
    }

    // ── Keyframes ───────────────────────────────────────────────────────

    /// Append `pose` one time unit after the last keyframe (at time 0 for
    /// the first one).
    pub fn add_key_frame(&mut self, pose: Pose) {
        let time = self.keyframes.last().map_or(0.0, |k| k.time + 1.0);
        self.push(pose, time);
    }

    /// Append `pose` `duration` time units after the last keyframe.
    pub fn add_key_frame_after(&mut self, pose: Pose, duration: f32) {
        let time = self.keyframes.last().map_or(0.0, |k| k.time + duration);
        self.push(pose, time);
    }

    fn push(&mut self, mut pose: Pose, time: f32) {
        if let Some(last) = self.keyframes.last() {
            if last.pose.orientation.dot(pose.orientation) < 0.0 {
                pose.orientation = -pose.orientation;
            }
            if time < last.time {
                log::warn!("keyframe time {time} precedes {}, ignored", last.time);
                return;
            }
        }
        self.keyframes.push(KeyFrame { pose, time });
    }

    /// Stop playback and drop every keyframe.
    pub fn delete_path(&mut self) {
        self.stop_interpolation();
        self.keyframes.clear();
        self.time = 0.0;
    }

    /// Number of keyframes.
    #[must_use]
    pub fn number_of_key_frames(&self) -> usize {
        self.keyframes.len()
    }

    /// Keyframe `index`, if any.
    #[must_use]
    pub fn key_frame(&self, index: usize) -> Option<&KeyFrame> {
        self.keyframes.get(index)
    }

    /// All keyframes, in time order.
    #[must_use]
    pub fn key_frames(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    /// Time of the first keyframe (0 when empty).
    #[must_use]
    pub fn first_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time)
    }

    /// Time of the last keyframe (0 when empty).
    #[must_use]
    pub fn last_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Time span covered by the keyframes.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.last_time() - self.first_time()
    }

    // ── Playback settings ───────────────────────────────────────────────

    /// Current interpolation time.
    #[must_use]
    pub fn interpolation_time(&self) -> f32 {
        self.time
    }

    /// Jump to `time` without producing a pose.
    pub fn set_interpolation_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Time units advanced per second of playback. Negative plays backwards.
    #[must_use]
    pub fn interpolation_speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed.
    pub fn set_interpolation_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Milliseconds between two produced poses.
    #[must_use]
    pub fn interpolation_period(&self) -> u64 {
        self.period
    }

    /// Set the playback period. Zero is ignored.
    pub fn set_interpolation_period(&mut self, period: u64) {
        if period == 0 {
            log::warn!("interpolation period must be positive");
            return;
        }
        self.period = period;
    }

    /// Whether playback wraps around at the end.
    #[must_use]
    pub fn loop_interpolation(&self) -> bool {
        self.looping
    }

    /// Set the wrap-around flag.
    pub fn set_loop_interpolation(&mut self, looping: bool) {
        self.looping = looping;
    }

    // ── Playback ────────────────────────────────────────────────────────

    /// Whether playback is running.
    #[must_use]
    pub fn is_interpolation_started(&self) -> bool {
        self.task.is_active()
    }

    /// Start playback. An interpolator sitting at the end of its range
    /// starts over. Nothing happens without keyframes.
    pub fn start_interpolation(&mut self) {
        if self.keyframes.is_empty() {
            return;
        }
        if self.speed > 0.0 && self.time >= self.last_time() {
            self.time = self.first_time();
        }
        if self.speed < 0.0 && self.time <= self.first_time() {
            self.time = self.last_time();
        }
        self.task.run(self.period);
        self.fresh = true;
    }

    /// Stop playback, keeping the current time. Idempotent.
    pub fn stop_interpolation(&mut self) {
        self.task.stop();
        self.fresh = false;
    }

    /// Stop and rewind to the first keyframe.
    pub fn reset_interpolation(&mut self) {
        self.stop_interpolation();
        self.time = self.first_time();
    }

    /// Start when stopped, stop when started.
    pub fn toggle_interpolation(&mut self) {
        if self.is_interpolation_started() {
            self.stop_interpolation();
        } else {
            self.start_interpolation();
        }
    }

    /// Advance playback to `now`. Returns the pose to apply when one is due.
    pub fn update(&mut self, now: Tick) -> Option<Pose> {
        if !self.task.is_active() {
            return None;
        }
        if self.fresh {
            self.fresh = false;
            let _ = self.task.poll(now);
            return self.interpolate_at_time(self.time);
        }
        if !self.task.poll(now) {
            return None;
        }
        self.advance()
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance(&mut self) -> Option<Pose> {
        let (first, last) = (self.first_time(), self.last_time());
        self.time += self.speed * self.period as f32 / 1000.0;
        let span = last - first;
        if self.time > last {
            if self.looping && span > 0.0 {
                self.time = first + (self.time - last) % span;
            } else {
                self.time = last;
                self.stop_interpolation();
            }
        } else if self.time < first {
            if self.looping && span > 0.0 {
                self.time = last - (first - self.time) % span;
            } else {
                self.time = first;
                self.stop_interpolation();
            }
        }
        self.interpolate_at_time(self.time)
    }

    /// Pose along the path at `time`, clamped to the keyframe range.
    #[must_use]
    pub fn interpolate_at_time(&self, time: f32) -> Option<Pose> {
        let n = self.keyframes.len();
        let (first, last) = (self.keyframes.first()?, self.keyframes.last()?);
        if n == 1 || time <= first.time {
            return Some(first.pose);
        }
        if time >= last.time {
            return Some(last.pose);
        }
        let i = self
            .keyframes
            .windows(2)
            .position(|w| time < w[1].time)
            .unwrap_or(n - 2);
        let (k1, k2) = (&self.keyframes[i], &self.keyframes[i + 1]);
        let dt = k2.time - k1.time;
        let alpha = if geom::is_zero(dt) {
            0.0
        } else {
            (time - k1.time) / dt
        };

        let (p1, p2) = (k1.pose.position, k2.pose.position);
        let (tg1, tg2) = (self.position_tangent(i), self.position_tangent(i + 1));
        let v1 = 3.0 * (p2 - p1) - 2.0 * tg1 - tg2;
        let v2 = -2.0 * (p2 - p1) + tg1 + tg2;
        let position = p1 + alpha * (tg1 + alpha * (v1 + alpha * v2));

        let orientation = geom::squad(
            k1.pose.orientation,
            self.orientation_tangent(i),
            self.orientation_tangent(i + 1),
            k2.pose.orientation,
            alpha,
        );
        let magnitude = k1.pose.magnitude.lerp(k2.pose.magnitude, alpha);
        Some(Pose {
            position,
            orientation,
            magnitude,
        })
    }

    fn neighbours(&self, i: usize) -> (&KeyFrame, &KeyFrame) {
        let last = self.keyframes.len() - 1;
        (
            &self.keyframes[i.saturating_sub(1)],
            &self.keyframes[(i + 1).min(last)],
        )
    }

    fn position_tangent(&self, i: usize) -> Vec3 {
        let (prev, next) = self.neighbours(i);
        0.5 * (next.pose.position - prev.pose.position)
    }

    fn orientation_tangent(&self, i: usize) -> Quat {
        let (prev, next) = self.neighbours(i);
        geom::squad_tangent(
            prev.pose.orientation,
            self.keyframes[i].pose.orientation,
            next.pose.orientation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose_at(x: f32) -> Pose {
        Pose::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY)
    }

    fn line() -> KeyFrameInterpolator {
        let mut kfi = KeyFrameInterpolator::new();
        for x in [0.0, 1.0, 2.0] {
            kfi.add_key_frame(pose_at(x));
        }
        kfi
    }

    #[test]
    fn keyframes_are_spaced_one_unit_apart() {
        let kfi = line();
        let times: Vec<_> = kfi.key_frames().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        assert_eq!(kfi.duration(), 2.0);
    }

    #[test]
    fn spline_passes_through_keyframes() {
        let kfi = line();
        for (t, x) in [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)] {
            let pose = kfi.interpolate_at_time(t).unwrap();
            assert!(pose.position.abs_diff_eq(Vec3::new(x, 0.0, 0.0), 1e-5));
        }
        // Clamped end tangent: the first segment eases in.
        let mid = kfi.interpolate_at_time(0.5).unwrap();
        assert!((mid.position.x - 0.4375).abs() < 1e-4);
    }

    #[test]
    fn orientations_join_one_hemisphere() {
        let mut kfi = KeyFrameInterpolator::new();
        let q = Quat::from_rotation_y(0.3);
        kfi.add_key_frame(Pose::new(Vec3::ZERO, q));
        kfi.add_key_frame(Pose::new(Vec3::X, -q));
        let second = kfi.key_frame(1).unwrap().pose.orientation;
        assert!(second.dot(q) > 0.0);
    }

    #[test]
    fn playback_runs_to_the_end_and_stops() {
        let mut kfi = line();
        kfi.start_interpolation();
        assert!(kfi.is_interpolation_started());
        let first = kfi.update(0).unwrap();
        assert!(first.position.abs_diff_eq(Vec3::ZERO, 1e-6));

        let mut now = 0;
        let mut last = None;
        while kfi.is_interpolation_started() && now < 10_000 {
            now += DEFAULT_PERIOD;
            if let Some(pose) = kfi.update(now) {
                last = Some(pose);
            }
        }
        assert!(!kfi.is_interpolation_started());
        assert!(last.unwrap().position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert_eq!(kfi.interpolation_time(), 2.0);
    }

    #[test]
    fn toggle_then_stop_keeps_keyframes() {
        let mut kfi = line();
        kfi.toggle_interpolation();
        assert!(kfi.is_interpolation_started());
        kfi.toggle_interpolation();
        assert!(!kfi.is_interpolation_started());
        assert_eq!(kfi.number_of_key_frames(), 3);
        assert_eq!(kfi.update(1_000), None);
    }

    #[test]
    fn looping_wraps_around() {
        let mut kfi = line();
        kfi.set_loop_interpolation(true);
        kfi.set_interpolation_time(1.99);
        kfi.start_interpolation();
        let _ = kfi.update(0);
        let _ = kfi.update(DEFAULT_PERIOD);
        assert!(kfi.is_interpolation_started());
        assert!(kfi.interpolation_time() < 1.0);
    }

    #[test]
    fn empty_path_never_starts() {
        let mut kfi = KeyFrameInterpolator::new();
        kfi.start_interpolation();
        assert!(!kfi.is_interpolation_started());
        assert_eq!(kfi.interpolate_at_time(0.0), None);
    }
}
