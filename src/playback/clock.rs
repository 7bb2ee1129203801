use crate::media::MediaReadiness;
use crate::playback::{ClockPhase, ClockTick};
use std::time::Duration;
use tracing::debug;

/// Time-driven progress of the segment currently shown on one page.
///
/// The clock does not own a timer. Elapsed time is pushed in through
/// [`tick`](Self::tick) by whoever drives the viewer, so cancelling the timer
/// is just a matter of no longer calling it, and a clock that is not
/// `Running` ignores any tick it still receives.
#[derive(Debug, Clone)]
pub struct StoryProgressClock {
    phase: ClockPhase,
    elapsed: Duration,
    duration: Duration,
    readiness: MediaReadiness,
}

impl StoryProgressClock {
    pub fn new(duration: Duration) -> Self {
        Self {
            phase: ClockPhase::Idle,
            elapsed: Duration::ZERO,
            duration,
            readiness: MediaReadiness::Available,
        }
    }

    /// Get current phase
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Check if currently running
    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn readiness(&self) -> MediaReadiness {
        self.readiness
    }

    /// Progress through the segment, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.phase == ClockPhase::Completed {
            return 1.0;
        }
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Start or resume.
    ///
    /// Suppressed while media is loading, and a completed clock only runs
    /// again through [`restart`](Self::restart). Returns true if the clock
    /// transitioned to `Running`.
    pub fn start(&mut self) -> bool {
        if !self.readiness.is_available() {
            debug!("Clock start suppressed while media is loading");
            return false;
        }
        match self.phase {
            ClockPhase::Idle | ClockPhase::Paused => {
                self.phase = ClockPhase::Running;
                true
            }
            ClockPhase::Running | ClockPhase::Completed => false,
        }
    }

    /// Freeze progress
    pub fn pause(&mut self) {
        if self.phase == ClockPhase::Running {
            self.phase = ClockPhase::Paused;
        }
    }

    /// Rewind to 0, then behave like [`start`](Self::start)
    pub fn restart(&mut self) -> bool {
        self.reset();
        self.start()
    }

    /// Rewind to 0 without starting
    pub fn reset(&mut self) {
        self.phase = ClockPhase::Idle;
        self.elapsed = Duration::ZERO;
    }

    /// Jump to full progress without emitting a completion
    pub fn freeze_complete(&mut self) {
        self.elapsed = self.duration;
        self.phase = ClockPhase::Completed;
    }

    /// The owning page stopped being the active page.
    ///
    /// While a page turn is still interpolating (`is_paging`) the progress is
    /// kept so the indicator does not jump mid-transition.
    pub fn deactivate(&mut self, is_paging: bool) {
        self.pause();
        if !is_paging {
            self.reset();
        }
    }

    /// Feed the readiness of the displayed content.
    ///
    /// Going to `Loading` pauses a running clock without losing progress.
    /// Coming back to `Available` starts it again when `may_autostart` is set
    /// (page active and limit not reached). Returns true if the clock started.
    pub fn set_readiness(&mut self, readiness: MediaReadiness, may_autostart: bool) -> bool {
        let previous = self.readiness;
        self.readiness = readiness;

        match readiness {
            MediaReadiness::Loading => {
                self.pause();
                false
            }
            MediaReadiness::Available => {
                previous == MediaReadiness::Loading && may_autostart && self.start()
            }
        }
    }

    /// Advance by `elapsed` if running
    pub fn tick(&mut self, elapsed: Duration) -> ClockTick {
        if self.phase != ClockPhase::Running || !self.readiness.is_available() {
            return ClockTick::Stalled;
        }

        self.elapsed = self.elapsed.saturating_add(elapsed);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.phase = ClockPhase::Completed;
            ClockTick::Completed
        } else {
            ClockTick::Advanced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn running_clock() -> StoryProgressClock {
        let mut clock = StoryProgressClock::new(ms(1000));
        assert!(clock.start());
        clock
    }

    #[test]
    fn test_new_clock_is_idle() {
        let clock = StoryProgressClock::new(ms(1000));
        assert_eq!(clock.phase(), ClockPhase::Idle);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_progress_is_linear() {
        let mut clock = running_clock();
        assert_eq!(clock.tick(ms(250)), ClockTick::Advanced);
        assert_eq!(clock.progress(), 0.25);
        clock.tick(ms(250));
        assert_eq!(clock.progress(), 0.5);
    }

    #[test]
    fn test_completion_emitted_once() {
        let mut clock = running_clock();
        assert_eq!(clock.tick(ms(600)), ClockTick::Advanced);
        assert_eq!(clock.tick(ms(600)), ClockTick::Completed);
        assert_eq!(clock.phase(), ClockPhase::Completed);
        assert_eq!(clock.progress(), 1.0);

        assert_eq!(clock.tick(ms(600)), ClockTick::Stalled);
    }

    #[test]
    fn test_pause_freezes_progress() {
        let mut clock = running_clock();
        clock.tick(ms(400));
        clock.pause();

        assert_eq!(clock.tick(ms(400)), ClockTick::Stalled);
        assert_eq!(clock.progress(), 0.4);

        assert!(clock.start());
        clock.tick(ms(100));
        assert_eq!(clock.progress(), 0.5);
    }

    #[test]
    fn test_start_suppressed_while_loading() {
        let mut clock = StoryProgressClock::new(ms(1000));
        clock.set_readiness(MediaReadiness::Loading, true);

        assert!(!clock.start());
        assert_eq!(clock.phase(), ClockPhase::Idle);
        assert_eq!(clock.tick(ms(500)), ClockTick::Stalled);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_loading_pauses_and_available_resumes() {
        let mut clock = running_clock();
        clock.tick(ms(300));

        clock.set_readiness(MediaReadiness::Loading, true);
        assert_eq!(clock.phase(), ClockPhase::Paused);
        clock.tick(ms(300));
        assert_eq!(clock.progress(), 0.3);

        assert!(clock.set_readiness(MediaReadiness::Available, true));
        assert!(clock.is_running());
        clock.tick(ms(100));
        assert_eq!(clock.progress(), 0.4);
    }

    #[test]
    fn test_available_without_permission_does_not_start() {
        let mut clock = StoryProgressClock::new(ms(1000));
        clock.set_readiness(MediaReadiness::Loading, false);
        assert!(!clock.set_readiness(MediaReadiness::Available, false));
        assert_eq!(clock.phase(), ClockPhase::Idle);
    }

    #[test]
    fn test_completed_clock_needs_restart() {
        let mut clock = running_clock();
        clock.tick(ms(1000));
        assert!(!clock.start());

        assert!(clock.restart());
        assert_eq!(clock.progress(), 0.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_deactivate_resets_unless_paging() {
        let mut clock = running_clock();
        clock.tick(ms(400));

        clock.deactivate(true);
        assert_eq!(clock.phase(), ClockPhase::Paused);
        assert_eq!(clock.progress(), 0.4);

        clock.deactivate(false);
        assert_eq!(clock.phase(), ClockPhase::Idle);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_freeze_complete_reads_full() {
        let mut clock = running_clock();
        clock.tick(ms(100));
        clock.freeze_complete();
        assert_eq!(clock.progress(), 1.0);
        assert_eq!(clock.tick(ms(100)), ClockTick::Stalled);
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut clock = StoryProgressClock::new(Duration::ZERO);
        clock.start();
        assert_eq!(clock.tick(Duration::ZERO), ClockTick::Completed);
    }
}
