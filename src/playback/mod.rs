pub mod clock;
pub mod index;

pub use clock::StoryProgressClock;
pub use index::{AdvanceOutcome, RetreatOutcome, StoryIndexController};

/// Clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Result of feeding elapsed time to a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Clock was not running; nothing changed
    Stalled,
    /// Progress moved but the segment is not finished
    Advanced,
    /// Progress reached 1 on this tick. Emitted once per run.
    Completed,
}
