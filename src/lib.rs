// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Interactive viewpoint and manipulation framework for 2D and 3D scenes.
//!
//! Vantage turns device-neutral pointer and keyboard input into camera and
//! object motion. It owns no window and draws nothing: the host feeds it
//! normalized events and reads back view and projection matrices.
//!
//! # Key entry points
//!
//! - [`eye::Eye`] - the camera (or 2D window): projection, frustum culling
//!   and keyframe paths
//! - [`interactive::InteractiveFrame`] - a frame that rotates, translates
//!   and scales under gestures, with damped spin and toss
//! - [`agent::MotionAgent`] - routes pointer events to the eye or to the
//!   frame under the pointer through per-target binding profiles
//! - [`agent::KeyAgent`] - maps keyboard shortcuts to eye commands
//! - [`options::Options`] - runtime configuration with TOML presets
//!
//! # Architecture
//!
//! Frames form a reference tree ([`frame`]) of local poses with optional
//! [`frame::constraint`]s. An [`interactive::InteractiveFrame`] wraps a
//! frame and interprets [`event::Event`]s according to the
//! [`interactive::Action`] its agent resolved for them. Agents pick the
//! grabber under the pointer, resolve the shortcut through a
//! [`agent::Branch`] profile and dispatch. Time is an explicit
//! [`timing::Tick`] passed to every `update`, so spinning, tossing and path
//! playback advance only when the host says so.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use vantage::agent::MotionAgent;
//! use vantage::event::{Button, Dof2Event};
//! use vantage::eye::{Eye, EyeKind};
//!
//! let eye = Rc::new(RefCell::new(Eye::new(EyeKind::Perspective3D)));
//! let mut mouse = MotionAgent::new("mouse", Rc::clone(&eye));
//! let _ = mouse.press(Dof2Event::relative(400.0, 300.0, 0.0, 0.0).with_id(Button::Left));
//! let _ = mouse.drag(Dof2Event::relative(420.0, 300.0, 20.0, 0.0).with_id(Button::Left));
//! eye.borrow_mut().update(40);
//! let view = eye.borrow().view();
//! assert!(view.is_finite());
//! ```

pub mod agent;
pub mod error;
pub mod event;
pub mod eye;
pub mod frame;
pub mod geom;
pub mod interactive;
pub mod options;
pub mod path;
pub mod timing;

pub use error::VantageError;
