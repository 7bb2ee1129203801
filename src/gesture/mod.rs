//! Two-region tap / long-press surface over the story content.

use std::time::Duration;

/// Horizontal hit region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Left side: go back
    Back,
    /// Right side: go forward
    Forward,
}

impl Region {
    /// Hit-test a horizontal coordinate. Anything left of
    /// `width * back_fraction` is the back region.
    pub fn from_x(x: f64, width: f64, back_fraction: f64) -> Region {
        if width <= 0.0 || !x.is_finite() {
            return Region::Forward;
        }
        if x < width * back_fraction {
            Region::Back
        } else {
            Region::Forward
        }
    }
}

/// Classified gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Quick press and release
    Tap,
    /// Finger went down
    PressDown,
    /// Finger lifted (or the press was cancelled) without counting as a tap
    Release,
    /// Press held past the long-press threshold
    LongPress,
    /// Finger lifted after a long-press
    LongPressRelease,
}

/// Gesture addressed to the page it was produced on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub page: usize,
    pub region: Region,
    pub kind: GestureKind,
}

impl GestureEvent {
    pub fn new(page: usize, region: Region, kind: GestureKind) -> Self {
        Self { page, region, kind }
    }

    pub fn tap(page: usize, region: Region) -> Self {
        Self::new(page, region, GestureKind::Tap)
    }
}

/// What the viewer should do for a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    /// `clock.pause()`
    Pause,
    /// `clock.start()`, itself a no-op while media is loading
    Resume,
    /// `clock.restart()` then `index.retreat()`
    TapBack,
    /// `index.advance()` then restart, page forward, or freeze at full
    TapForward,
}

/// Maps gestures on the two regions to clock and index operations
#[derive(Debug, Clone, Copy)]
pub struct GestureRouter {
    back_fraction: f64,
}

impl Default for GestureRouter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl GestureRouter {
    pub fn new(back_fraction: f64) -> Self {
        Self {
            back_fraction: back_fraction.clamp(0.0, 1.0),
        }
    }

    pub fn hit_test(&self, x: f64, width: f64) -> Region {
        Region::from_x(x, width, self.back_fraction)
    }

    pub fn route(&self, kind: GestureKind, region: Region) -> GestureAction {
        match (kind, region) {
            (GestureKind::Tap, Region::Back) => GestureAction::TapBack,
            (GestureKind::Tap, Region::Forward) => GestureAction::TapForward,
            (GestureKind::PressDown | GestureKind::LongPress, _) => GestureAction::Pause,
            (GestureKind::Release | GestureKind::LongPressRelease, _) => GestureAction::Resume,
        }
    }
}

/// Raw pointer input, for hosts that do not classify gestures themselves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { x: f64, width: f64 },
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    page: usize,
    region: Region,
    held: Duration,
    long_press: bool,
}

/// Turns press / hold / release into tap or long-press gestures
#[derive(Debug, Clone)]
pub struct PressTracker {
    threshold: Duration,
    press: Option<Press>,
}

impl PressTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            press: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn press(&mut self, page: usize, region: Region) -> GestureEvent {
        self.press = Some(Press {
            page,
            region,
            held: Duration::ZERO,
            long_press: false,
        });
        GestureEvent::new(page, region, GestureKind::PressDown)
    }

    /// Accumulate hold time; yields a long-press once the threshold is crossed
    pub fn hold(&mut self, elapsed: Duration) -> Option<GestureEvent> {
        let press = self.press.as_mut()?;
        press.held = press.held.saturating_add(elapsed);
        if !press.long_press && press.held >= self.threshold {
            press.long_press = true;
            return Some(GestureEvent::new(press.page, press.region, GestureKind::LongPress));
        }
        None
    }

    pub fn release(&mut self) -> Option<GestureEvent> {
        let press = self.press.take()?;
        let kind = if press.long_press {
            GestureKind::LongPressRelease
        } else {
            GestureKind::Tap
        };
        Some(GestureEvent::new(press.page, press.region, kind))
    }

    /// The press was taken over (e.g. by a page drag)
    pub fn cancel(&mut self) -> Option<GestureEvent> {
        let press = self.press.take()?;
        Some(GestureEvent::new(press.page, press.region, GestureKind::Release))
    }
}
