//! Bindable actions and their pairing with events.
//!
//! Motion actions carry a minimum arity (the number of degrees of freedom
//! they read). The arity wrappers [`Dof1Action`] .. [`Dof6Action`] only
//! accept kinds whose minimum arity fits, so a 1-DOF wheel can never end up
//! driving a 2-DOF arcball rotation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VantageError;
use crate::event::{
    Arity, Button, ClickEvent, Dof1Event, Dof2Event, Dof3Event, Dof6Event,
    Event,
};

/// What a click does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    /// Move the target onto the eye's line of sight.
    CenterFrame,
    /// Snap the target's axes onto the eye's (or the eye's onto the world).
    AlignFrame,
    /// Eye only: zoom towards the clicked pixel.
    ZoomOnPixel,
    /// Eye only: set the rotation anchor under the clicked pixel.
    AnchorFromPixel,
    /// Application-defined handler.
    Custom,
}

impl ClickAction {
    /// Whether only the eye can perform this action.
    #[must_use]
    pub fn is_eye_only(self) -> bool {
        matches!(self, Self::ZoomOnPixel | Self::AnchorFromPixel)
    }
}

/// What a motion gesture does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    // ── 1 DOF ──
    /// Rotate about the eye's X axis.
    RotateX,
    /// Rotate about the eye's Y axis.
    RotateY,
    /// Rotate about the eye's Z axis (the only rotation in 2D).
    RotateZ,
    /// Translate along the eye's X axis.
    TranslateX,
    /// Translate along the eye's Y axis.
    TranslateY,
    /// Translate along the eye's Z axis.
    TranslateZ,
    /// Scale uniformly.
    Scale,
    /// Move along the eye's line of sight.
    Zoom,
    // ── 2 DOF ──
    /// Arcball rotation.
    Rotate,
    /// Eye only: rotation about a fixed world axis plus the local X axis.
    CadRotate,
    /// Rotation about the eye's viewing axis.
    ScreenRotate,
    /// Translation in the screen plane.
    Translate,
    /// Screen-plane translation locked to the first movement's axis.
    ScreenTranslate,
    /// Fly forward while steering.
    MoveForward,
    /// Fly backward while steering.
    MoveBackward,
    /// Fly forward, steering with the horizontal axis only.
    Drive,
    /// Steer without moving.
    LookAround,
    /// Eye only: zoom onto the dragged rectangle.
    ZoomOnRegion,
    // ── 3 DOF ──
    /// Rotate about the three eye axes.
    RotateXyz,
    /// Translate along the three eye axes.
    TranslateXyz,
    // ── 6 DOF ──
    /// Translate and rotate along/about the three eye axes.
    TranslateXyzRotateXyz,
    /// Application-defined handler, available at every arity.
    Custom,
}

impl MotionAction {
    /// Minimum number of degrees of freedom the action reads.
    #[must_use]
    pub fn dofs(self) -> u8 {
        match self {
            Self::RotateX
            | Self::RotateY
            | Self::RotateZ
            | Self::TranslateX
            | Self::TranslateY
            | Self::TranslateZ
            | Self::Scale
            | Self::Zoom
            | Self::Custom => 1,
            Self::Rotate
            | Self::CadRotate
            | Self::ScreenRotate
            | Self::Translate
            | Self::ScreenTranslate
            | Self::MoveForward
            | Self::MoveBackward
            | Self::Drive
            | Self::LookAround
            | Self::ZoomOnRegion => 2,
            Self::RotateXyz | Self::TranslateXyz => 3,
            Self::TranslateXyzRotateXyz => 6,
        }
    }

    /// Whether only the eye can perform this action.
    #[must_use]
    pub fn is_eye_only(self) -> bool {
        matches!(self, Self::CadRotate | Self::ZoomOnRegion)
    }

    /// Whether the action seeds a toss that the final event of the gesture
    /// cancels.
    #[must_use]
    pub fn is_fly(self) -> bool {
        matches!(self, Self::MoveForward | Self::MoveBackward | Self::Drive)
    }

    /// When a 2-DOF event is reduced for this 1-DOF action, whether the
    /// horizontal axis is kept.
    fn reads_horizontal(self) -> bool {
        matches!(self, Self::RotateY | Self::RotateZ | Self::TranslateX)
    }
}

impl fmt::Display for MotionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

fn arity_dofs(arity: Arity) -> u8 {
    match arity {
        Arity::Click => 0,
        Arity::Dof1 => 1,
        Arity::Dof2 => 2,
        Arity::Dof3 => 3,
        Arity::Dof6 => 6,
    }
}

macro_rules! arity_action {
    ($name:ident, $dofs:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(MotionAction);

        impl $name {
            /// Wrap `kind`, or `None` when it needs more degrees of freedom.
            #[must_use]
            pub fn new(kind: MotionAction) -> Option<Self> {
                (kind.dofs() <= $dofs).then_some(Self(kind))
            }

            /// The wrapped action kind.
            #[must_use]
            pub fn kind(self) -> MotionAction {
                self.0
            }
        }

        impl TryFrom<MotionAction> for $name {
            type Error = VantageError;

            fn try_from(kind: MotionAction) -> Result<Self, Self::Error> {
                Self::new(kind).ok_or_else(|| {
                    VantageError::InvalidArgument(format!(
                        "{kind} needs {} degrees of freedom, {} available",
                        kind.dofs(),
                        $dofs
                    ))
                })
            }
        }
    };
}

arity_action!(Dof1Action, 1, "Action bound to a 1-DOF gesture.");
arity_action!(Dof2Action, 2, "Action bound to a 2-DOF gesture.");
arity_action!(Dof3Action, 3, "Action bound to a 3-DOF gesture.");
arity_action!(Dof6Action, 6, "Action bound to a 6-DOF gesture.");

/// The action an interactive grabber performs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Click action.
    Click(ClickAction),
    /// 1-DOF action.
    Dof1(Dof1Action),
    /// 2-DOF action.
    Dof2(Dof2Action),
    /// 3-DOF action.
    Dof3(Dof3Action),
    /// 6-DOF action.
    Dof6(Dof6Action),
}

impl Action {
    /// Wrap a motion action for events of `arity`. `None` when the action
    /// needs more degrees of freedom than the events carry.
    #[must_use]
    pub fn for_motion(kind: MotionAction, arity: Arity) -> Option<Self> {
        match arity {
            Arity::Click => None,
            Arity::Dof1 => Dof1Action::new(kind).map(Self::Dof1),
            Arity::Dof2 => Dof2Action::new(kind).map(Self::Dof2),
            Arity::Dof3 => Dof3Action::new(kind).map(Self::Dof3),
            Arity::Dof6 => Dof6Action::new(kind).map(Self::Dof6),
        }
    }

    /// Event arity the action is bound for.
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

    /// Motion kind, `None` for click actions.
    #[must_use]
    pub fn motion(&self) -> Option<MotionAction> {
        match self {
            Self::Click(_) => None,
            Self::Dof1(a) => Some(a.kind()),
            Self::Dof2(a) => Some(a.kind()),
            Self::Dof3(a) => Some(a.kind()),
            Self::Dof6(a) => Some(a.kind()),
        }
    }

    /// Click kind, `None` for motion actions.
    #[must_use]
    pub fn click(&self) -> Option<ClickAction> {
        match self {
            Self::Click(a) => Some(*a),
            _ => None,
        }
    }
}

impl From<ClickAction> for Action {
    fn from(a: ClickAction) -> Self {
        Self::Click(a)
    }
}

/// An event reduced to the arity its action reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Click with its action.
    Click(ClickEvent, ClickAction),
    /// One-axis motion. `wheel` is set when the values come from a wheel.
    Dof1 {
        /// Reduced event.
        event: Dof1Event,
        /// Action kind.
        kind: MotionAction,
        /// Whether the event comes from a wheel.
        wheel: bool,
    },
    /// Two-axis motion.
    Dof2(Dof2Event, MotionAction),
    /// Three-axis motion.
    Dof3(Dof3Event, MotionAction),
    /// Six-axis motion.
    Dof6(Dof6Event, MotionAction),
    /// Custom action: the full, unreduced event.
    Custom(Event),
}

impl Interaction {
    /// Pair `event` with `action`, reducing the event to the action's
    /// arity. `None` (with a diagnostic) when the two cannot be paired.
    #[must_use]
    pub fn new(event: &Event, action: Action) -> Option<Self> {
        if let Event::Click(click) = event {
            return match action {
                Action::Click(ClickAction::Custom) => Some(Self::Custom(*event)),
                Action::Click(kind) => Some(Self::Click(*click, kind)),
                _ => {
                    log::debug!("click event ignored by motion action {action:?}");
                    None
                }
            };
        }
        let Some(kind) = action.motion() else {
            log::debug!("motion event ignored by click action {action:?}");
            return None;
        };
        if kind == MotionAction::Custom {
            return Some(Self::Custom(*event));
        }
        if kind.dofs() > arity_dofs(event.arity()) {
            log::warn!(
                "{kind} needs {} degrees of freedom, the event has fewer",
                kind.dofs()
            );
            return None;
        }
        let wheel = matches!(event, Event::Dof1(e) if e.meta.id == Some(Button::Wheel));
        let interaction = match (kind.dofs(), event) {
            (1, Event::Dof1(e)) => Self::Dof1 {
                event: *e,
                kind,
                wheel,
            },
            (1, _) => Self::Dof1 {
                event: reduce_to_dof2(event, kind)?.dof1(kind.reads_horizontal()),
                kind,
                wheel: false,
            },
            (2, _) => Self::Dof2(reduce_to_dof2(event, kind)?, kind),
            (3, Event::Dof3(e)) => Self::Dof3(*e, kind),
            (3, Event::Dof6(e)) => {
                Self::Dof3(e.dof3(kind != MotionAction::RotateXyz), kind)
            }
            (_, Event::Dof6(e)) => Self::Dof6(*e, kind),
            _ => return None,
        };
        Some(interaction)
    }

    /// Shared motion state of the reduced event.
    #[must_use]
    pub fn meta(&self) -> Option<&crate::event::MotionMeta> {
        match self {
            Self::Click(..) => None,
            Self::Dof1 { event, .. } => Some(&event.meta),
            Self::Dof2(e, _) => Some(&e.meta),
            Self::Dof3(e, _) => Some(&e.meta),
            Self::Dof6(e, _) => Some(&e.meta),
            Self::Custom(e) => e.meta(),
        }
    }
}

fn reduce_to_dof2(event: &Event, kind: MotionAction) -> Option<Dof2Event> {
    match event {
        Event::Dof2(e) => Some(*e),
        Event::Dof3(e) => Some(e.dof2()),
        Event::Dof6(e) => Some(e.dof3(kind != MotionAction::RotateXyz).dof2()),
        Event::Click(_) | Event::Dof1(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_wrappers_reject_wider_kinds() {
        assert!(Dof1Action::new(MotionAction::Rotate).is_none());
        assert!(Dof2Action::new(MotionAction::Scale).is_some());
        assert!(Dof3Action::new(MotionAction::TranslateXyzRotateXyz).is_none());
        assert!(Dof6Action::try_from(MotionAction::Rotate).is_ok());
        assert!(matches!(
            Dof2Action::try_from(MotionAction::RotateXyz),
            Err(VantageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn wider_event_reduces_for_narrow_action() {
        let event = Event::from(Dof2Event::relative(10.0, 20.0, 3.0, -4.0));
        let action = Action::for_motion(MotionAction::Zoom, Arity::Dof2).unwrap();
        let Some(Interaction::Dof1 { event: e, kind, wheel }) =
            Interaction::new(&event, action)
        else {
            unreachable!("expected a reduced interaction");
        };
        assert_eq!(kind, MotionAction::Zoom);
        assert_eq!(e.dx, -4.0);
        assert!(!wheel);

        let action = Action::for_motion(MotionAction::TranslateX, Arity::Dof2).unwrap();
        let Some(Interaction::Dof1 { event: e, .. }) = Interaction::new(&event, action)
        else {
            unreachable!("expected a reduced interaction");
        };
        assert_eq!(e.dx, 3.0);
    }

    #[test]
    fn narrow_event_cannot_drive_wide_action() {
        assert!(Action::for_motion(MotionAction::Rotate, Arity::Dof1).is_none());
        let wheel = Event::from(Dof1Event::wheel(1.0));
        let forced = Action::Dof2(Dof2Action::new(MotionAction::Rotate).unwrap());
        assert!(Interaction::new(&wheel, forced).is_none());
    }

    #[test]
    fn wheel_flag_comes_from_the_id() {
        let wheel = Event::from(Dof1Event::wheel(2.0));
        let action = Action::for_motion(MotionAction::Scale, Arity::Dof1).unwrap();
        assert!(matches!(
            Interaction::new(&wheel, action),
            Some(Interaction::Dof1 { wheel: true, .. })
        ));
    }

    #[test]
    fn custom_keeps_the_whole_event() {
        let event = Event::from(Dof3Event::absolute(1.0, 2.0, 3.0));
        let action = Action::for_motion(MotionAction::Custom, Arity::Dof3).unwrap();
        assert_eq!(Interaction::new(&event, action), Some(Interaction::Custom(event)));
    }

    #[test]
    fn six_dof_rotation_feeds_rotate_xyz() {
        let event = Event::from(Dof6Event::relative([1.0, 0.0, 0.0], [0.0, 0.5, 0.0]));
        let action = Action::for_motion(MotionAction::RotateXyz, Arity::Dof6).unwrap();
        let Some(Interaction::Dof3(e, _)) = Interaction::new(&event, action) else {
            unreachable!("expected a reduced interaction");
        };
        assert_eq!(e.deltas(), [0.0, 0.5, 0.0]);
    }
}
