//! Keyframed paths and smooth transitions of the eye.
//!
//! Numbered paths are recorded by the host (`add_key_frame_to_path`) and
//! replayed with `play_path`. Transitions (`interpolate_to*`) use a private
//! two- or three-keyframe path that is rebuilt every time. At most one
//! interpolation runs at a time across the whole eye.

use glam::Vec3;

use super::{CameraModel, Eye, EyeKind, EyeModel};
use crate::frame::{Frame, Pose};
use crate::geom::Rect;
use crate::path::KeyFrameInterpolator;
use crate::timing::Tick;

/// Duration of `interpolate_to_fit_scene` and region zooms, in time units.
const TRANSITION_DURATION: f32 = 1.0;

impl Eye {
    // ── Numbered paths ──────────────────────────────────────────────────

    /// Append the current eye pose to path `key`, creating the path on
    /// first use.
    pub fn add_key_frame_to_path(&mut self, key: i32) {
        let pose = self.pose();
        let period = self.key_frame_period;
        let path = self.paths.entry(key).or_insert_with(|| {
            let mut path = KeyFrameInterpolator::new();
            path.set_interpolation_period(period);
            path
        });
        path.add_key_frame(pose);
        log::info!(
            "Path {key}, position {} added",
            path.number_of_key_frames()
        );
    }

    /// Start path `key`, or stop it when it is running. Starting a path
    /// stops every other interpolation.
    pub fn play_path(&mut self, key: i32) {
        let started = match self.paths.get(&key) {
            Some(path) => path.is_interpolation_started(),
            None => {
                log::debug!("no path {key} to play");
                return;
            }
        };
        if started {
            if let Some(path) = self.paths.get_mut(&key) {
                path.stop_interpolation();
            }
            return;
        }
        self.stop_all_interpolations();
        if let Some(path) = self.paths.get_mut(&key) {
            path.start_interpolation();
        }
    }

    /// A running path `key` only stops. A stopped one rewinds and moves the
    /// eye to its first keyframe.
    pub fn reset_path(&mut self, key: i32) {
        let Some(path) = self.paths.get_mut(&key) else {
            return;
        };
        if path.is_interpolation_started() {
            path.stop_interpolation();
            return;
        }
        path.reset_interpolation();
        if let Some(pose) = path.interpolate_at_time(path.interpolation_time()) {
            self.apply_pose(&pose);
        }
    }

    /// Stop and drop path `key`.
    pub fn delete_path(&mut self, key: i32) {
        if let Some(mut path) = self.paths.remove(&key) {
            path.stop_interpolation();
            log::info!("Path {key} deleted");
        }
    }

    /// Path `key`, if recorded.
    #[must_use]
    pub fn path(&self, key: i32) -> Option<&KeyFrameInterpolator> {
        self.paths.get(&key)
    }

    /// Edit path `key` in place. When the edit starts the path, every
    /// other interpolation stops. `None` when there is no such path.
    pub fn edit_path<R>(
        &mut self,
        key: i32,
        edit: impl FnOnce(&mut KeyFrameInterpolator) -> R,
    ) -> Option<R> {
        let path = self.paths.get_mut(&key)?;
        let was_started = path.is_interpolation_started();
        let result = edit(path);
        if !was_started && path.is_interpolation_started() {
            self.stop_other_interpolations(key);
        }
        Some(result)
    }

    /// Keys of the recorded paths, in increasing order.
    #[must_use]
    pub fn paths(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self.paths.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Install `path` under `key`, returning the path it replaces, stopped.
    /// A path installed while playing stops every other interpolation.
    pub fn set_key_frame_interpolator(
        &mut self,
        key: i32,
        path: KeyFrameInterpolator,
    ) -> Option<KeyFrameInterpolator> {
        let replaced = self.detach_path(key);
        if path.is_interpolation_started() {
            self.stop_all_interpolations();
        }
        let _ = self.paths.insert(key, path);
        log::info!("Path {key} set");
        replaced
    }

    /// Take path `key` out of the eye, stopped.
    pub fn detach_path(&mut self, key: i32) -> Option<KeyFrameInterpolator> {
        let mut path = self.paths.remove(&key)?;
        path.stop_interpolation();
        Some(path)
    }

    /// Period new paths play at, in milliseconds.
    #[must_use]
    pub fn key_frame_period(&self) -> u64 {
        self.key_frame_period
    }

    /// Set the period of paths created from now on. Zero is ignored.
    pub fn set_key_frame_period(&mut self, period: u64) {
        if period == 0 {
            log::warn!("keyframe period must be positive");
            return;
        }
        self.key_frame_period = period;
    }

    /// Whether a path or a transition is running.
    #[must_use]
    pub fn any_interpolation_is_started(&self) -> bool {
        self.interpolation.is_interpolation_started()
            || self
                .paths
                .values()
                .any(KeyFrameInterpolator::is_interpolation_started)
    }

    /// Stop every path and transition.
    pub fn stop_all_interpolations(&mut self) {
        self.interpolation.stop_interpolation();
        for path in self.paths.values_mut() {
            path.stop_interpolation();
        }
    }

    fn stop_other_interpolations(&mut self, key: i32) {
        self.interpolation.stop_interpolation();
        for (k, path) in &mut self.paths {
            if *k != key {
                path.stop_interpolation();
            }
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Smoothly move the eye to `target` in `duration` time units.
    pub fn interpolate_to(&mut self, target: Pose, duration: f32) {
        self.begin_transition();
        self.interpolation.add_key_frame_after(target, duration);
        self.interpolation.start_interpolation();
    }

    /// Smoothly move the eye until the whole scene is in view.
    pub fn interpolate_to_fit_scene(&mut self) {
        let (center, radius, anchor) =
            (self.lens.scene_center, self.lens.scene_radius, self.anchor());
        let target = self.target_pose(|eye, frame| {
            eye.model().fit_ball(&eye.lens, frame, anchor, center, radius);
        });
        self.interpolate_to(target, TRANSITION_DURATION);
    }

    /// Smoothly move the eye until a pixel rectangle fills the viewport.
    pub fn interpolate_to_zoom_on_region(&mut self, rect: Rect) {
        let target = self.target_pose(|eye, frame| eye.fit_screen_region_on(frame, rect));
        self.interpolate_to(target, TRANSITION_DURATION);
    }

    /// Smoothly move the eye towards `target`, ending nine tenths of the
    /// way there and looking at it.
    pub fn interpolate_to_zoom_on_target(&mut self, target: Vec3) {
        let pose = self.pose();
        let mut halfway = pose;
        halfway.position = pose.position * 0.3 + target * 0.7;
        let arrival = self.target_pose(|_, frame| {
            frame.set_position(pose.position * 0.1 + target * 0.9);
            CameraModel.look_at(frame, target);
        });

        self.begin_transition();
        self.interpolation.add_key_frame_after(halfway, 0.4);
        self.interpolation.add_key_frame_after(arrival, 0.6);
        self.interpolation.start_interpolation();
    }

    /// Zoom on the scene point under a pixel. Planar eyes zoom on a
    /// third of the viewport centered on the pixel. Returns whether a
    /// point was found.
    pub fn interpolate_to_zoom_on_pixel(&mut self, x: f32, y: f32) -> bool {
        let Some(point) = self.point_under_pixel(x, y) else {
            return false;
        };
        self.frame.show_zoom_hint(point);
        match self.lens.kind {
            EyeKind::Window2D => {
                let (w, h) = (self.lens.width() / 3.0, self.lens.height() / 3.0);
                let rect = Rect::new(x - w / 2.0, y - h / 2.0, w, h);
                self.interpolate_to_zoom_on_region(rect);
            }
            _ => self.interpolate_to_zoom_on_target(point),
        }
        true
    }

    fn begin_transition(&mut self) {
        if self.any_interpolation_is_started() {
            self.stop_all_interpolations();
        }
        self.interpolation.delete_path();
        self.interpolation.set_interpolation_period(self.key_frame_period);
        self.interpolation.add_key_frame(self.pose());
    }

    /// Pose the eye would reach after `place` moves a detached copy of
    /// its frame.
    fn target_pose(&self, place: impl FnOnce(&Self, &mut Frame)) -> Pose {
        let mut frame = self.frame.frame().borrow().world_snapshot();
        place(self, &mut frame);
        Pose::of(&frame)
    }

    // ── Playback ────────────────────────────────────────────────────────

    pub(super) fn apply_pose(&self, pose: &Pose) {
        if let Err(err) = pose.apply_to(&mut self.frame.frame().borrow_mut()) {
            log::warn!("cannot apply interpolated pose: {err}");
        }
    }

    pub(super) fn update_paths(&mut self, now: Tick) {
        let mut due = Vec::new();
        for path in self.paths.values_mut() {
            if let Some(pose) = path.update(now) {
                due.push(pose);
            }
        }
        if let Some(pose) = self.interpolation.update(now) {
            due.push(pose);
        }
        for pose in &due {
            self.apply_pose(pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    #[test]
    fn three_recorded_poses_make_a_three_keyframe_path() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        let positions = [
            Vec3::new(0.0, 0.0, 300.0),
            Vec3::new(50.0, 0.0, 250.0),
            Vec3::new(0.0, 80.0, 200.0),
        ];
        for p in positions {
            eye.set_position(p);
            eye.add_key_frame_to_path(1);
        }
        let Some(path) = eye.path(1) else {
            unreachable!("path 1 was recorded");
        };
        assert_eq!(path.number_of_key_frames(), 3);
        for (k, p) in path.key_frames().iter().zip(positions) {
            assert!(k.pose.position.abs_diff_eq(p, 1e-5));
        }
        assert_eq!(eye.paths(), vec![1]);
    }

    #[test]
    fn play_then_stop_leaves_the_eye_quiet() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.add_key_frame_to_path(2);
        eye.set_position(Vec3::new(10.0, 0.0, 200.0));
        eye.add_key_frame_to_path(2);

        eye.play_path(2);
        assert!(eye.any_interpolation_is_started());
        eye.play_path(2);
        assert!(!eye.any_interpolation_is_started());
        assert_eq!(eye.path(2).map(KeyFrameInterpolator::number_of_key_frames), Some(2));
    }

    #[test]
    fn starting_a_path_stops_the_others() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        for (key, z) in [(1, 150.0), (2, 200.0)] {
            eye.add_key_frame_to_path(key);
            eye.set_position(Vec3::new(0.0, 0.0, z));
            eye.add_key_frame_to_path(key);
        }
        eye.play_path(1);
        eye.play_path(2);
        assert!(!eye.path(1).unwrap().is_interpolation_started());
        assert!(eye.path(2).unwrap().is_interpolation_started());
    }

    fn two_keyframe_path(eye: &mut Eye, key: i32, z: f32) {
        eye.add_key_frame_to_path(key);
        eye.set_position(Vec3::new(0.0, 0.0, z));
        eye.add_key_frame_to_path(key);
    }

    fn running(eye: &Eye) -> usize {
        eye.paths()
            .into_iter()
            .filter(|key| eye.path(*key).is_some_and(KeyFrameInterpolator::is_interpolation_started))
            .count()
    }

    #[test]
    fn editing_a_path_into_playback_stops_the_others() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        two_keyframe_path(&mut eye, 1, 150.0);
        two_keyframe_path(&mut eye, 2, 200.0);
        eye.play_path(1);
        assert_eq!(eye.edit_path(2, KeyFrameInterpolator::start_interpolation), Some(()));
        assert_eq!(running(&eye), 1);
        assert!(eye.path(2).is_some_and(KeyFrameInterpolator::is_interpolation_started));

        eye.interpolate_to_fit_scene();
        let _ = eye.edit_path(1, KeyFrameInterpolator::start_interpolation);
        assert_eq!(running(&eye), 1);
        assert!(!eye.interpolation.is_interpolation_started());
    }

    #[test]
    fn replacing_a_path_stops_the_old_one() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        two_keyframe_path(&mut eye, 1, 150.0);
        eye.play_path(1);

        let Some(replaced) = eye.set_key_frame_interpolator(1, KeyFrameInterpolator::new()) else {
            unreachable!("path 1 was recorded");
        };
        assert!(!replaced.is_interpolation_started());
        assert!(!eye.any_interpolation_is_started());
    }

    #[test]
    fn installing_a_playing_path_stops_the_others() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        two_keyframe_path(&mut eye, 1, 150.0);
        two_keyframe_path(&mut eye, 2, 200.0);
        eye.play_path(1);
        let Some(mut path) = eye.detach_path(2) else {
            unreachable!("path 2 was recorded");
        };
        path.start_interpolation();

        let _ = eye.set_key_frame_interpolator(3, path);
        assert_eq!(running(&eye), 1);
        assert!(eye.path(3).is_some_and(KeyFrameInterpolator::is_interpolation_started));
    }

    #[test]
    fn reset_stops_a_running_path_in_place() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        let start = eye.position();
        eye.add_key_frame_to_path(1);
        eye.set_position(start + Vec3::new(100.0, 0.0, 0.0));
        eye.add_key_frame_to_path(1);

        eye.play_path(1);
        eye.update(0);
        eye.update(500);
        let midway = eye.position();
        assert!(eye.any_interpolation_is_started());
        assert!(!midway.abs_diff_eq(start, 1e-3));
        eye.reset_path(1);
        assert!(!eye.any_interpolation_is_started());
        assert!(eye.position().abs_diff_eq(midway, 1e-5));
    }

    #[test]
    fn reset_rewinds_a_stopped_path() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        let start = eye.position();
        eye.add_key_frame_to_path(1);
        eye.set_position(start + Vec3::new(100.0, 0.0, 0.0));
        eye.add_key_frame_to_path(1);

        eye.reset_path(1);
        assert!(!eye.any_interpolation_is_started());
        assert!(eye.position().abs_diff_eq(start, 1e-4));
        assert_eq!(eye.path(1).map(KeyFrameInterpolator::interpolation_time), Some(0.0));
    }

    #[test]
    fn delete_path_stops_and_discards() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.add_key_frame_to_path(3);
        eye.add_key_frame_to_path(3);
        eye.play_path(3);
        eye.delete_path(3);
        assert!(eye.path(3).is_none());
        assert!(!eye.any_interpolation_is_started());
    }

    #[test]
    fn playback_drives_the_eye_to_the_last_keyframe() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        let start = eye.position();
        eye.add_key_frame_to_path(1);
        eye.set_position(start + Vec3::new(100.0, 0.0, 0.0));
        eye.add_key_frame_to_path(1);
        eye.set_position(start);

        eye.play_path(1);
        let mut now = 0;
        while eye.any_interpolation_is_started() && now < 10_000 {
            eye.update(now);
            now += 10;
        }
        assert!(eye.position().abs_diff_eq(start + Vec3::new(100.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn transition_reaches_its_target() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        let target = Pose::new(Vec3::new(0.0, 50.0, 500.0), Quat::from_rotation_y(0.3));
        eye.interpolate_to(target, 1.0);
        let mut now = 0;
        while eye.any_interpolation_is_started() && now < 10_000 {
            eye.update(now);
            now += 10;
        }
        assert!(eye.position().abs_diff_eq(target.position, 1e-3));
        assert!(eye.orientation().abs_diff_eq(target.orientation, 1e-4));
    }

    #[test]
    fn zoom_on_pixel_approaches_the_point() {
        let mut eye = Eye::new(EyeKind::Perspective3D);
        eye.compute_matrices();
        let before = eye.distance_to_scene_center();
        assert!(eye.interpolate_to_zoom_on_pixel(400.0, 300.0));
        assert!(eye.frame().zoom_hint().is_some());
        let mut now = 0;
        while eye.any_interpolation_is_started() && now < 10_000 {
            eye.update(now);
            now += 10;
        }
        assert!(eye.distance_to_scene_center() < before * 0.2);
    }

    #[test]
    fn detached_path_keeps_its_keyframes() {
        let mut eye = Eye::new(EyeKind::Window2D);
        eye.add_key_frame_to_path(4);
        let Some(path) = eye.detach_path(4) else {
            unreachable!("path 4 was recorded");
        };
        assert_eq!(path.number_of_key_frames(), 1);
        assert!(eye.path(4).is_none());
        let _ = eye.set_key_frame_interpolator(5, path);
        assert_eq!(eye.paths(), vec![5]);
    }
}
