use tracing::{debug, info};

/// One-shot latch guarding the "end of all content" callback.
///
/// The terminal segment of the terminal page can be reached from several
/// paths (tap-forward, clock completion, bridge restart). The gate makes sure
/// the caller's exit action runs once for the lifetime of the viewer.
#[derive(Debug, Default)]
pub struct LimitGate {
    reached: bool,
}

impl LimitGate {
    pub fn new() -> Self {
        Self { reached: false }
    }

    /// Whether the limit has already been reached
    pub fn is_reached(&self) -> bool {
        self.reached
    }

    /// Run `callback` if this is the first trigger. Returns true when it ran.
    pub fn trigger<F: FnOnce()>(&mut self, callback: F) -> bool {
        if self.reached {
            debug!("Limit already reached, ignoring trigger");
            return false;
        }
        self.reached = true;
        info!("Page limit reached");
        callback();
        true
    }
}
