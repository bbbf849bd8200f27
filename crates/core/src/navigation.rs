//! Active-slide navigation.
//!
//! The navigator holds the index of the one active slide. Every transition
//! clamps into `0..len`, so out-of-range requests land on the nearest end
//! instead of failing. A deck with no slides keeps index 0.

/// Default horizontal displacement (px) a touch must travel to count as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// URL fragment prefix; fragments are one-based (`#slide-1` is index 0).
pub const FRAGMENT_PREFIX: &str = "slide-";

/// A navigation request from any input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Prev,
    GoTo(i64),
}

/// Map a keyboard key name to a navigation command.
pub fn key_command(key: &str) -> Option<NavCommand> {
    match key {
        "ArrowRight" => Some(NavCommand::Next),
        "ArrowLeft" => Some(NavCommand::Prev),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    index: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.len > 0 && self.index == index
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.index as i64 + 1)
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.index as i64 - 1)
    }

    /// Jump to `target`, clamped into the deck.
    pub fn go_to(&mut self, target: i64) -> usize {
        let last = self.len.saturating_sub(1);
        self.index = if target <= 0 {
            0
        } else {
            usize::try_from(target).map_or(last, |t| t.min(last))
        };
        self.index
    }

    pub fn apply(&mut self, command: NavCommand) -> usize {
        match command {
            NavCommand::Next => self.next(),
            NavCommand::Prev => self.prev(),
            NavCommand::GoTo(target) => self.go_to(target),
        }
    }

    /// URL fragment for the active slide, without the leading `#`.
    pub fn fragment(&self) -> String {
        format!("{FRAGMENT_PREFIX}{}", self.index + 1)
    }

    /// Apply a `#slide-k` fragment read on load.
    ///
    /// Returns `false` and leaves the index untouched when the fragment is
    /// malformed or `k` is outside `1..=len`.
    pub fn apply_fragment(&mut self, fragment: &str) -> bool {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let Some(number) = fragment
            .strip_prefix(FRAGMENT_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
        else {
            return false;
        };
        if number == 0 || number > self.len {
            return false;
        }
        self.index = number - 1;
        true
    }
}

/// Tracks one touch session and turns it into a swipe command.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    start_x: Option<f64>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD_PX)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn touch_start(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Finish the session. A leftward move of at least the threshold means
    /// `Next`, a rightward one `Prev`; anything shorter means nothing.
    pub fn touch_end(&mut self, x: f64) -> Option<NavCommand> {
        let start = self.start_x.take()?;
        let dx = x - start;
        if dx <= -self.threshold {
            Some(NavCommand::Next)
        } else if dx >= self.threshold {
            Some(NavCommand::Prev)
        } else {
            None
        }
    }
}
