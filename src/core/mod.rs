pub mod limit;
pub mod page;

pub use limit::LimitGate;
pub use page::{PageSpec, SegmentRef, StaticStories, StorySource};
