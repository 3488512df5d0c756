//! Device-neutral input events.
//!
//! The host normalizes raw device input into this taxonomy: clicks, and
//! motion with 1, 2, 3 or 6 degrees of freedom. Motion events are either
//! absolute (the values are the state) or relative (the deltas are the
//! state, the values are the current pointer position). Higher-arity
//! events reduce to lower-arity ones when a lower-arity action or the
//! picking test needs them.
//!
//! # Example
//!
//! ```
//! use vantage::event::{Button, Dof2Event, Event, Modifiers};
//!
//! let drag = Dof2Event::relative(410.0, 300.0, 10.0, 0.0)
//!     .with_id(Button::Left)
//!     .with_modifiers(Modifiers::empty())
//!     .at(16);
//! let event = Event::from(drag);
//! assert_eq!(event.pointer(), Some((410.0, 300.0)));
//! ```

pub mod shortcut;

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
pub use shortcut::{ClickShortcut, KeyboardShortcut, MotionShortcut};

use crate::timing::Tick;

bitflags! {
    /// Modifier keys held while an event was produced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 1;
        /// Control key.
        const CTRL = 1 << 1;
        /// Alt / option key.
        const ALT = 1 << 2;
        /// Meta / command key.
        const META = 1 << 3;
        /// AltGr key.
        const ALT_GRAPH = 1 << 4;
    }
}

/// Button or motion id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// No button (hover motion).
    None,
    /// Primary button.
    Left,
    /// Middle button.
    Middle,
    /// Secondary button.
    Right,
    /// Scroll wheel.
    Wheel,
    /// Any other device-specific id.
    Other(u16),
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Left => write!(f, "left"),
            Self::Middle => write!(f, "middle"),
            Self::Right => write!(f, "right"),
            Self::Wheel => write!(f, "wheel"),
            Self::Other(id) => write!(f, "button{id}"),
        }
    }
}

/// Non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKey {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Escape.
    Escape,
    /// Enter / return.
    Enter,
    /// Tab.
    Tab,
    /// Space bar.
    Space,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
}

/// A keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Printable character, case sensitive.
    Char(char),
    /// Named non-character key.
    Named(NamedKey),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Named(k) => write!(f, "{k:?}"),
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Pressed key.
    pub key: Key,
    /// Host tick when the key was pressed.
    pub timestamp: Tick,
}

impl KeyEvent {
    /// Key press with modifiers.
    #[must_use]
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self {
            modifiers,
            key,
            timestamp: 0,
        }
    }

    /// Shortcut this key press resolves against.
    #[must_use]
    pub fn shortcut(&self) -> KeyboardShortcut {
        KeyboardShortcut::new(self.modifiers, self.key)
    }
}

/// A button click at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Horizontal pixel position.
    pub x: f32,
    /// Vertical pixel position (origin top-left).
    pub y: f32,
    /// Clicked button.
    pub button: Button,
    /// Number of consecutive clicks.
    pub click_count: u8,
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Host tick of the click.
    pub timestamp: Tick,
}

impl ClickEvent {
    /// Single unmodified click.
    #[must_use]
    pub fn new(x: f32, y: f32, button: Button) -> Self {
        Self {
            x,
            y,
            button,
            click_count: 1,
            modifiers: Modifiers::empty(),
            timestamp: 0,
        }
    }

    /// Set the click count.
    #[must_use]
    pub fn with_count(mut self, click_count: u8) -> Self {
        self.click_count = click_count;
        self
    }

    /// Set the modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: Tick) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Shortcut this click resolves against.
    #[must_use]
    pub fn shortcut(&self) -> ClickShortcut {
        ClickShortcut::new(self.modifiers, self.button, self.click_count)
    }
}

/// State shared by every motion event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionMeta {
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Motion id (held button, wheel, ...).
    pub id: Option<Button>,
    /// Host tick of the event.
    pub timestamp: Tick,
    /// Milliseconds since the previous event of the gesture.
    pub delay: u64,
    /// Distance covered since the previous event.
    pub distance: f32,
    /// `distance / delay` (pixels per millisecond).
    pub speed: f32,
    /// First event of a gesture (button press).
    pub fired: bool,
    /// Last event of a gesture (button release).
    pub flushed: bool,
}

impl MotionMeta {
    fn link(&mut self, previous_timestamp: Tick, distance: f32) {
        self.delay = self.timestamp.saturating_sub(previous_timestamp);
        self.distance = distance;
        self.speed = if self.delay == 0 {
            distance
        } else {
            distance / self.delay as f32
        };
    }
}

macro_rules! motion_builders {
    ($ty:ty) => {
        impl $ty {
            /// Set the modifiers.
            #[must_use]
            pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
                self.meta.modifiers = modifiers;
                self
            }

            /// Set the motion id.
            #[must_use]
            pub fn with_id(mut self, id: Button) -> Self {
                self.meta.id = Some(id);
                self
            }

            /// Set the timestamp.
            #[must_use]
            pub fn at(mut self, timestamp: Tick) -> Self {
                self.meta.timestamp = timestamp;
                self
            }

            /// Mark as the first event of a gesture.
            #[must_use]
            pub fn fired(mut self) -> Self {
                self.meta.fired = true;
                self
            }

            /// Mark as the last event of a gesture.
            #[must_use]
            pub fn flushed(mut self) -> Self {
                self.meta.flushed = true;
                self
            }

            /// Whether the event carries deltas.
            #[must_use]
            pub fn is_relative(&self) -> bool {
                self.relative
            }

            /// Whether the event carries absolute values.
            #[must_use]
            pub fn is_absolute(&self) -> bool {
                !self.relative
            }

            /// Shortcut this event resolves against.
            #[must_use]
            pub fn shortcut(&self) -> MotionShortcut {
                MotionShortcut::new(
                    self.meta.modifiers,
                    self.meta.id.unwrap_or(Button::None),
                )
            }
        }
    };
}

/// One degree of freedom (wheel, slider).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dof1Event {
    /// Value (absolute) or accumulated value (relative).
    pub x: f32,
    /// Delta since the previous event.
    pub dx: f32,
    /// Whether `dx` is meaningful.
    pub relative: bool,
    /// Shared motion state.
    pub meta: MotionMeta,
}

impl Dof1Event {
    /// Absolute event.
    #[must_use]
    pub fn absolute(x: f32) -> Self {
        Self {
            x,
            dx: 0.0,
            relative: false,
            meta: MotionMeta::default(),
        }
    }

    /// Relative event.
    #[must_use]
    pub fn relative(x: f32, dx: f32) -> Self {
        Self {
            x,
            dx,
            relative: true,
            meta: MotionMeta::default(),
        }
    }

    /// Wheel rotation by `amount` notches.
    #[must_use]
    pub fn wheel(amount: f32) -> Self {
        Self::relative(amount, amount).with_id(Button::Wheel)
    }

    /// The quantity actions consume: `dx` when relative, `x` otherwise.
    #[must_use]
    pub fn delta(&self) -> f32 {
        if self.relative {
            self.dx
        } else {
            self.x
        }
    }
}

motion_builders!(Dof1Event);

/// Two degrees of freedom (pointer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dof2Event {
    /// Horizontal value or pointer position.
    pub x: f32,
    /// Vertical value or pointer position.
    pub y: f32,
    /// Horizontal delta.
    pub dx: f32,
    /// Vertical delta.
    pub dy: f32,
    /// Whether the deltas are meaningful.
    pub relative: bool,
    /// Shared motion state.
    pub meta: MotionMeta,
}

impl Dof2Event {
    /// Absolute event.
    #[must_use]
    pub fn absolute(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            dx: 0.0,
            dy: 0.0,
            relative: false,
            meta: MotionMeta::default(),
        }
    }

    /// Relative event: pointer now at `(x, y)`, moved by `(dx, dy)`.
    #[must_use]
    pub fn relative(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        Self {
            x,
            y,
            dx,
            dy,
            relative: true,
            meta: MotionMeta::default(),
        }
    }

    /// Previous horizontal pointer position.
    #[must_use]
    pub fn prev_x(&self) -> f32 {
        self.x - self.dx
    }

    /// Previous vertical pointer position.
    #[must_use]
    pub fn prev_y(&self) -> f32 {
        self.y - self.dy
    }

    /// Horizontal quantity actions consume.
    #[must_use]
    pub fn delta_x(&self) -> f32 {
        if self.relative {
            self.dx
        } else {
            self.x
        }
    }

    /// Vertical quantity actions consume.
    #[must_use]
    pub fn delta_y(&self) -> f32 {
        if self.relative {
            self.dy
        } else {
            self.y
        }
    }

    /// Reduce to one axis: X when `from_x`, else Y.
    #[must_use]
    pub fn dof1(&self, from_x: bool) -> Dof1Event {
        let (x, dx) = if from_x {
            (self.x, self.dx)
        } else {
            (self.y, self.dy)
        };
        Dof1Event {
            x,
            dx,
            relative: self.relative,
            meta: self.meta,
        }
    }
}

motion_builders!(Dof2Event);

/// Three degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dof3Event {
    /// X value.
    pub x: f32,
    /// Y value.
    pub y: f32,
    /// Z value.
    pub z: f32,
    /// X delta.
    pub dx: f32,
    /// Y delta.
    pub dy: f32,
    /// Z delta.
    pub dz: f32,
    /// Whether the deltas are meaningful.
    pub relative: bool,
    /// Shared motion state.
    pub meta: MotionMeta,
}

impl Dof3Event {
    /// Absolute event.
    #[must_use]
    pub fn absolute(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            relative: false,
            meta: MotionMeta::default(),
        }
    }

    /// Relative event.
    #[must_use]
    pub fn relative(values: [f32; 3], deltas: [f32; 3]) -> Self {
        Self {
            x: values[0],
            y: values[1],
            z: values[2],
            dx: deltas[0],
            dy: deltas[1],
            dz: deltas[2],
            relative: true,
            meta: MotionMeta::default(),
        }
    }

    /// The three quantities actions consume.
    #[must_use]
    pub fn deltas(&self) -> [f32; 3] {
        if self.relative {
            [self.dx, self.dy, self.dz]
        } else {
            [self.x, self.y, self.z]
        }
    }

    /// Drop the Z axis.
    #[must_use]
    pub fn dof2(&self) -> Dof2Event {
        Dof2Event {
            x: self.x,
            y: self.y,
            dx: self.dx,
            dy: self.dy,
            relative: self.relative,
            meta: self.meta,
        }
    }
}

motion_builders!(Dof3Event);

/// Six degrees of freedom (3D mouse): translation plus rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dof6Event {
    /// Translation values.
    pub translation: [f32; 3],
    /// Rotation values.
    pub rotation: [f32; 3],
    /// Translation deltas.
    pub translation_delta: [f32; 3],
    /// Rotation deltas.
    pub rotation_delta: [f32; 3],
    /// Whether the deltas are meaningful.
    pub relative: bool,
    /// Shared motion state.
    pub meta: MotionMeta,
}

impl Dof6Event {
    /// Absolute event.
    #[must_use]
    pub fn absolute(translation: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            translation,
            rotation,
            translation_delta: [0.0; 3],
            rotation_delta: [0.0; 3],
            relative: false,
            meta: MotionMeta::default(),
        }
    }

    /// Relative event; the values double as the deltas.
    #[must_use]
    pub fn relative(translation: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            translation,
            rotation,
            translation_delta: translation,
            rotation_delta: rotation,
            relative: true,
            meta: MotionMeta::default(),
        }
    }

    /// Translation quantities actions consume.
    #[must_use]
    pub fn translation_deltas(&self) -> [f32; 3] {
        if self.relative {
            self.translation_delta
        } else {
            self.translation
        }
    }

    /// Rotation quantities actions consume.
    #[must_use]
    pub fn rotation_deltas(&self) -> [f32; 3] {
        if self.relative {
            self.rotation_delta
        } else {
            self.rotation
        }
    }

    /// Reduce to the translation (`true`) or rotation (`false`) triple.
    #[must_use]
    pub fn dof3(&self, from_translation: bool) -> Dof3Event {
        let (values, deltas) = if from_translation {
            (self.translation, self.translation_delta)
        } else {
            (self.rotation, self.rotation_delta)
        };
        Dof3Event {
            x: values[0],
            y: values[1],
            z: values[2],
            dx: deltas[0],
            dy: deltas[1],
            dz: deltas[2],
            relative: self.relative,
            meta: self.meta,
        }
    }
}

motion_builders!(Dof6Event);

/// Arity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Click.
    Click,
    /// One degree of freedom.
    Dof1,
    /// Two degrees of freedom.
    Dof2,
    /// Three degrees of freedom.
    Dof3,
    /// Six degrees of freedom.
    Dof6,
}

/// Any input event the agents route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Button click.
    Click(ClickEvent),
    /// One-axis motion.
    Dof1(Dof1Event),
    /// Two-axis motion.
    Dof2(Dof2Event),
    /// Three-axis motion.
    Dof3(Dof3Event),
    /// Six-axis motion.
    Dof6(Dof6Event),
}

impl From<ClickEvent> for Event {
    fn from(e: ClickEvent) -> Self {
        Self::Click(e)
    }
}

impl From<Dof1Event> for Event {
    fn from(e: Dof1Event) -> Self {
        Self::Dof1(e)
    }
}

impl From<Dof2Event> for Event {
    fn from(e: Dof2Event) -> Self {
        Self::Dof2(e)
    }
}

impl From<Dof3Event> for Event {
    fn from(e: Dof3Event) -> Self {
        Self::Dof3(e)
    }
}

impl From<Dof6Event> for Event {
    fn from(e: Dof6Event) -> Self {
        Self::Dof6(e)
    }
}

impl Event {
    /// Arity of the event.
    #[must_use]
    pub fn arity(&self) -> Arity {
        match self {
            Self::Click(_) => Arity::Click,
            Self::Dof1(_) => Arity::Dof1,
            Self::Dof2(_) => Arity::Dof2,
            Self::Dof3(_) => Arity::Dof3,
            Self::Dof6(_) => Arity::Dof6,
        }
    }

    /// Shared motion state, `None` for clicks.
    #[must_use]
    pub fn meta(&self) -> Option<&MotionMeta> {
        match self {
            Self::Click(_) => None,
            Self::Dof1(e) => Some(&e.meta),
            Self::Dof2(e) => Some(&e.meta),
            Self::Dof3(e) => Some(&e.meta),
            Self::Dof6(e) => Some(&e.meta),
        }
    }

    fn meta_mut(&mut self) -> Option<&mut MotionMeta> {
        match self {
            Self::Click(_) => None,
            Self::Dof1(e) => Some(&mut e.meta),
            Self::Dof2(e) => Some(&mut e.meta),
            Self::Dof3(e) => Some(&mut e.meta),
            Self::Dof6(e) => Some(&mut e.meta),
        }
    }

    /// Host tick of the event.
    #[must_use]
    pub fn timestamp(&self) -> Tick {
        match self {
            Self::Click(e) => e.timestamp,
            _ => self.meta().map_or(0, |m| m.timestamp),
        }
    }

    /// Whether this is a motion event carrying deltas.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        match self {
            Self::Click(_) => false,
            Self::Dof1(e) => e.relative,
            Self::Dof2(e) => e.relative,
            Self::Dof3(e) => e.relative,
            Self::Dof6(e) => e.relative,
        }
    }

    /// Whether the event ends a gesture.
    #[must_use]
    pub fn is_flushed(&self) -> bool {
        self.meta().is_some_and(|m| m.flushed)
    }

    /// Whether the event starts a gesture.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.meta().is_some_and(|m| m.fired)
    }

    /// Whether a motion event carries nothing to apply: every consumed
    /// quantity is zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        let zero = |v: &[f32]| v.iter().all(|c| *c == 0.0);
        match self {
            Self::Click(_) => false,
            Self::Dof1(e) => e.delta() == 0.0,
            Self::Dof2(e) => zero(&[e.delta_x(), e.delta_y()]),
            Self::Dof3(e) => zero(&e.deltas()),
            Self::Dof6(e) => {
                zero(&e.translation_deltas()) && zero(&e.rotation_deltas())
            }
        }
    }

    /// Pointer position used for picking. Higher-arity events reduce to
    /// their 2-DOF projection; one-axis events have none.
    #[must_use]
    pub fn pointer(&self) -> Option<(f32, f32)> {
        match self {
            Self::Click(e) => Some((e.x, e.y)),
            Self::Dof1(_) => None,
            Self::Dof2(e) => Some((e.x, e.y)),
            Self::Dof3(e) => Some((e.x, e.y)),
            Self::Dof6(e) => Some((e.translation[0], e.translation[1])),
        }
    }

    /// Scale the consumed quantities per axis. Missing entries count as 1.
    pub fn modulate(&mut self, sensitivities: &[f32]) {
        let s = |i: usize| sensitivities.get(i).copied().unwrap_or(1.0);
        match self {
            Self::Click(_) => {}
            Self::Dof1(e) => {
                if e.relative {
                    e.dx *= s(0);
                } else {
                    e.x *= s(0);
                }
            }
            Self::Dof2(e) => {
                if e.relative {
                    e.dx *= s(0);
                    e.dy *= s(1);
                } else {
                    e.x *= s(0);
                    e.y *= s(1);
                }
            }
            Self::Dof3(e) => {
                if e.relative {
                    e.dx *= s(0);
                    e.dy *= s(1);
                    e.dz *= s(2);
                } else {
                    e.x *= s(0);
                    e.y *= s(1);
                    e.z *= s(2);
                }
            }
            Self::Dof6(e) => {
                let (t, r) = if e.relative {
                    (&mut e.translation_delta, &mut e.rotation_delta)
                } else {
                    (&mut e.translation, &mut e.rotation)
                };
                for i in 0..3 {
                    t[i] *= s(i);
                    r[i] *= s(i + 3);
                }
            }
        }
    }

    /// Fill delay, distance and speed from the previous event of the same
    /// gesture.
    pub fn link_previous(&mut self, previous: &Self) {
        let prev_tick = previous.timestamp();
        let distance = match (&*self, previous) {
            (Self::Dof1(e), _) if e.relative => e.dx.abs(),
            (Self::Dof1(e), Self::Dof1(p)) => (e.x - p.x).abs(),
            (Self::Dof2(e), _) if e.relative => e.dx.hypot(e.dy),
            (Self::Dof2(e), Self::Dof2(p)) => (e.x - p.x).hypot(e.y - p.y),
            (Self::Dof3(e), _) if e.relative => {
                glam::Vec3::new(e.dx, e.dy, e.dz).length()
            }
            (Self::Dof3(e), Self::Dof3(p)) => {
                glam::Vec3::new(e.x - p.x, e.y - p.y, e.z - p.z).length()
            }
            (Self::Dof6(e), _) if e.relative => {
                glam::Vec3::from_array(e.translation_delta).length()
            }
            (Self::Dof6(e), Self::Dof6(p)) => (glam::Vec3::from_array(
                e.translation,
            ) - glam::Vec3::from_array(p.translation))
            .length(),
            _ => 0.0,
        };
        if let Some(meta) = self.meta_mut() {
            meta.link(prev_tick, distance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_deltas_give_previous_position() {
        let e = Dof2Event::relative(110.0, 50.0, 10.0, -5.0);
        assert_eq!(e.prev_x(), 100.0);
        assert_eq!(e.prev_y(), 55.0);
        assert_eq!(e.delta_x(), 10.0);
        let abs = Dof2Event::absolute(3.0, 4.0);
        assert_eq!(abs.delta_y(), 4.0);
    }

    #[test]
    fn reductions_keep_meta() {
        let e = Dof6Event::relative([1.0, 2.0, 3.0], [0.1, 0.2, 0.3])
            .with_id(Button::Other(7))
            .at(42);
        let rot = e.dof3(false);
        assert_eq!([rot.dx, rot.dy, rot.dz], [0.1, 0.2, 0.3]);
        let planar = e.dof3(true).dof2();
        assert_eq!((planar.x, planar.y), (1.0, 2.0));
        assert_eq!(planar.meta.timestamp, 42);
        assert_eq!(Event::from(e).pointer(), Some((1.0, 2.0)));
        assert_eq!(Event::from(Dof1Event::wheel(1.0)).pointer(), None);
    }

    #[test]
    fn null_detection_depends_on_mode() {
        assert!(Event::from(Dof2Event::relative(5.0, 5.0, 0.0, 0.0)).is_null());
        assert!(!Event::from(Dof2Event::absolute(5.0, 5.0)).is_null());
        assert!(!Event::from(ClickEvent::new(0.0, 0.0, Button::Left)).is_null());
    }

    #[test]
    fn modulate_scales_deltas_only_when_relative() {
        let mut e = Event::from(Dof2Event::relative(100.0, 100.0, 2.0, 4.0));
        e.modulate(&[0.5, 2.0]);
        let Event::Dof2(d) = e else { unreachable!() };
        assert_eq!((d.x, d.y, d.dx, d.dy), (100.0, 100.0, 1.0, 8.0));

        let mut wheel = Event::from(Dof1Event::wheel(3.0));
        wheel.modulate(&[2.0]);
        let Event::Dof1(w) = wheel else { unreachable!() };
        assert_eq!(w.delta(), 6.0);
    }

    #[test]
    fn linking_computes_speed() {
        let first = Event::from(Dof2Event::relative(0.0, 0.0, 0.0, 0.0).at(100));
        let mut second =
            Event::from(Dof2Event::relative(30.0, 40.0, 30.0, 40.0).at(110));
        second.link_previous(&first);
        let meta = second.meta().copied().unwrap_or_default();
        assert_eq!(meta.delay, 10);
        assert_eq!(meta.distance, 50.0);
        assert_eq!(meta.speed, 5.0);
    }

    #[test]
    fn shortcut_uses_modifiers_and_id() {
        let e = Dof2Event::relative(0.0, 0.0, 1.0, 0.0)
            .with_id(Button::Right)
            .with_modifiers(Modifiers::SHIFT);
        assert_eq!(
            e.shortcut(),
            MotionShortcut::new(Modifiers::SHIFT, Button::Right)
        );
        let c = ClickEvent::new(1.0, 2.0, Button::Left).with_count(2);
        assert_eq!(c.shortcut(), ClickShortcut::double(Button::Left));
    }
}
