//! Presentation state: which slide is active and whether editing is on.
//!
//! Owned by the top-level controller and passed by reference to the
//! renderer and the edit controller.

use pitchdeck_core::edit::EditMode;
use pitchdeck_core::navigation::{key_command, NavCommand, Navigator, SwipeTracker};

#[derive(Debug, Clone)]
pub struct PresentationState {
    navigator: Navigator,
    mode: EditMode,
    swipe: SwipeTracker,
}

impl PresentationState {
    pub fn new(len: usize) -> Self {
        Self {
            navigator: Navigator::new(len),
            mode: EditMode::Viewing,
            swipe: SwipeTracker::default(),
        }
    }

    /// Start at the slide named by a `#slide-k` fragment, if valid.
    pub fn with_fragment(len: usize, fragment: Option<&str>) -> Self {
        let mut state = Self::new(len);
        if let Some(fragment) = fragment {
            state.navigator.apply_fragment(fragment);
        }
        state
    }

    pub fn current_index(&self) -> usize {
        self.navigator.index()
    }

    pub fn len(&self) -> usize {
        self.navigator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.navigator.is_empty()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.navigator.is_active(index)
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn editing(&self) -> bool {
        self.mode.is_editing()
    }

    /// Flip between viewing and editing. Returns the new mode.
    pub fn toggle_mode(&mut self) -> EditMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn go_to(&mut self, target: i64) -> usize {
        self.navigator.go_to(target)
    }

    pub fn navigate(&mut self, command: NavCommand) -> usize {
        self.navigator.apply(command)
    }

    /// Handle a key press. Returns the new index when the key navigates.
    pub fn key(&mut self, key: &str) -> Option<usize> {
        key_command(key).map(|command| self.navigate(command))
    }

    pub fn touch_start(&mut self, x: f64) {
        self.swipe.touch_start(x);
    }

    /// Finish a touch session. Returns the new index when it was a swipe.
    pub fn touch_end(&mut self, x: f64) -> Option<usize> {
        self.swipe.touch_end(x).map(|command| self.navigate(command))
    }

    /// URL fragment for the active slide, without `#`.
    pub fn fragment(&self) -> String {
        self.navigator.fragment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_viewing_on_first_slide() {
        let state = PresentationState::new(4);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.mode(), EditMode::Viewing);
        assert_eq!(state.fragment(), "slide-1");
    }

    #[test]
    fn fragment_on_load_is_applied_when_valid() {
        assert_eq!(PresentationState::with_fragment(4, Some("#slide-3")).current_index(), 2);
        assert_eq!(PresentationState::with_fragment(4, Some("#slide-7")).current_index(), 0);
        assert_eq!(PresentationState::with_fragment(4, None).current_index(), 0);
    }

    #[test]
    fn inputs_drive_navigation() {
        let mut state = PresentationState::new(3);
        assert_eq!(state.key("ArrowRight"), Some(1));
        assert_eq!(state.key("Enter"), None);

        state.touch_start(300.0);
        assert_eq!(state.touch_end(200.0), Some(2));

        state.touch_start(300.0);
        assert_eq!(state.touch_end(280.0), None);
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.fragment(), "slide-3");
    }

    #[test]
    fn toggle_switches_mode_without_moving() {
        let mut state = PresentationState::new(3);
        state.go_to(2);
        assert_eq!(state.toggle_mode(), EditMode::Editing);
        assert!(state.editing());
        assert_eq!(state.toggle_mode(), EditMode::Viewing);
        assert_eq!(state.current_index(), 2);
    }
}
