//! Crate-level error types.

use std::fmt;

/// Errors produced by the vantage crate.
///
/// Only precondition violations and configuration I/O surface as errors.
/// Everything on the interactive path (unbound shortcuts, singular
/// projections, stale frustum caches) degrades to a logged no-op instead.
#[derive(Debug)]
pub enum VantageError {
    /// A scaling component was zero or negative.
    InvalidScaling {
        /// The rejected scaling.
        scaling: [f32; 3],
    },
    /// A frame with a reference frame (or a reference frame itself) must
    /// scale uniformly across its axes.
    NonUniformScaling {
        /// The rejected scaling.
        scaling: [f32; 3],
    },
    /// Attaching the reference frame would make a frame its own ancestor.
    CyclicReference,
    /// A recoverable argument problem (reported, state left untouched).
    InvalidArgument(String),
    /// A profile-bound grabber was added without naming its branch.
    BranchRequired,
    /// The branch id does not belong to the agent.
    UnknownBranch(u32),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for VantageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScaling { scaling } => {
                write!(f, "scaling must be strictly positive, got {scaling:?}")
            }
            Self::NonUniformScaling { scaling } => write!(
                f,
                "frames with a reference frame need uniform scaling, got \
                 {scaling:?}"
            ),
            Self::CyclicReference => {
                write!(f, "reference frame would create a cycle")
            }
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::BranchRequired => write!(
                f,
                "profile-bound grabbers must be added to a branch, use \
                 add_grabber_to_branch instead"
            ),
            Self::UnknownBranch(id) => {
                write!(f, "branch {id} does not belong to this agent")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for VantageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VantageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
