//! Story-style paged media viewer.
//!
//! Pages of timed segments, one progress clock per visible page, tap and
//! long-press gestures, and a one-shot limit when the user runs off the end of
//! the last page. [`viewer::StoryViewer`] is the synchronous state machine;
//! [`driver::ViewerDriver`] runs it on a tokio task.

pub mod bridge;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod gesture;
pub mod media;
pub mod navigation;
pub mod playback;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{Result, StoryError};
pub use viewer::{StoryViewer, ViewerInput};
