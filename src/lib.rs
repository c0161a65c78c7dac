//! Slidepad - positioned, animated scratchpad windows for i3 and sway
//!
//! Runs a command in a floating scratchpad window, remembers which
//! window the command produced, and slides it in and out across a
//! screen edge on show/hide/toggle.

pub mod animation;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod ipc;
pub mod launch;
pub mod scratchpad;

// Re-export commonly used types
pub use error::Error;
pub use geometry::{Anchor, Offset, Placement, Rect, Screen, SizeSpec, SlideEdge};
pub use identity::{storage_key, IdentityRecord, IdentityStore};
pub use ipc::{Compositor, I3Client, LaunchedWindow, StateProbe, WmState, X11Probe};
pub use scratchpad::{Options, Outcome, Scratchpad};
