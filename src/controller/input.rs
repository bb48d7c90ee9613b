//! Maps raw key/pointer events onto a stable logical input state.

use std::collections::HashSet;

/// Logical movement directions the navigation loop reads each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
}

/// Platform-independent input events, fed in by the winit handler natively
/// and by DOM listeners on wasm.
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseMove { dx: f32, dy: f32 },
    FocusLost,
    PointerLockChanged { locked: bool },
}

/// Key names bound to each logical direction. A direction is active while
/// ANY of its bound keys is down, so releasing the arrow key while "w" is
/// still held keeps the player walking.
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub back: Vec<String>,
    pub strafe_left: Vec<String>,
    pub strafe_right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            forward: keys(&["w", "W", "ArrowUp"]),
            back: keys(&["s", "S", "ArrowDown"]),
            strafe_left: keys(&["a", "A", "ArrowLeft"]),
            strafe_right: keys(&["d", "D", "ArrowRight"]),
        }
    }
}

impl KeyBindings {
    pub fn keys_for(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Back => &self.back,
            Direction::StrafeLeft => &self.strafe_left,
            Direction::StrafeRight => &self.strafe_right,
        }
    }

    pub fn recognizes(&self, key: &str) -> bool {
        [&self.forward, &self.back, &self.strafe_left, &self.strafe_right]
            .iter()
            .any(|keys| keys.iter().any(|k| k == key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerLockState {
    Unlocked,
    Locked,
}

/// Two-state pointer-lock machine. Locking is requested through the platform
/// (request_pointer_lock / cursor grab); the machine only transitions when the
/// platform reports the outcome, and never as a side effect of key input.
/// Each transition fires the registered listener once, which the UI layer
/// uses to hide or show the menu overlay.
pub struct PointerLock {
    state: PointerLockState,
    listener: Option<Box<dyn FnMut(PointerLockState)>>,
}

impl Default for PointerLock {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerLock {
    pub fn new() -> Self {
        Self { state: PointerLockState::Unlocked, listener: None }
    }

    pub fn state(&self) -> PointerLockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == PointerLockState::Locked
    }

    pub fn set_listener(&mut self, listener: impl FnMut(PointerLockState) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// External lock-state notification. A denied or failed lock request
    /// simply never reports `locked: true`, leaving the menu visible.
    pub fn notify(&mut self, locked: bool) {
        let next = if locked { PointerLockState::Locked } else { PointerLockState::Unlocked };
        if next != self.state {
            self.state = next;
            if let Some(listener) = &mut self.listener {
                listener(next);
            }
        }
    }
}

/// Logical input state, mutated only by events and read once per frame by the
/// navigation loop.
pub struct InputState {
    bindings: KeyBindings,
    pressed: HashSet<String>,
    look_delta: (f32, f32),
    pub pointer_lock: PointerLock,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::with_bindings(KeyBindings::default())
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            pressed: HashSet::new(),
            look_delta: (0.0, 0.0),
            pointer_lock: PointerLock::new(),
        }
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // Unrecognized keys are ignored, not an error
                if self.bindings.recognizes(key) {
                    self.pressed.insert(key.clone());
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_lock.is_locked() {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_lock.notify(*locked);
                if !locked {
                    self.clear_keys();
                }
            }
        }
    }

    /// OR across every key bound to the direction.
    pub fn is_pressed(&self, direction: Direction) -> bool {
        self.bindings
            .keys_for(direction)
            .iter()
            .any(|key| self.pressed.contains(key.as_str()))
    }

    pub fn clear_keys(&mut self) {
        self.pressed.clear();
    }

    /// Accumulated mouse delta since the previous frame, reset on read.
    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn down(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    fn up(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyUp(key.to_string()));
    }

    #[test]
    fn test_key_down_up_toggles_direction() {
        let mut input = InputState::new();
        assert!(!input.is_pressed(Direction::Forward));
        down(&mut input, "w");
        assert!(input.is_pressed(Direction::Forward));
        up(&mut input, "w");
        assert!(!input.is_pressed(Direction::Forward));
    }

    #[test]
    fn test_multiple_bound_keys_combine_with_or() {
        let mut input = InputState::new();
        down(&mut input, "ArrowUp");
        // "w" was never pressed; releasing it must not matter
        up(&mut input, "w");
        assert!(input.is_pressed(Direction::Forward), "ArrowUp alone keeps forward active");

        down(&mut input, "w");
        up(&mut input, "w");
        assert!(
            input.is_pressed(Direction::Forward),
            "releasing one bound key while another is held must not stop motion"
        );
        up(&mut input, "ArrowUp");
        assert!(!input.is_pressed(Direction::Forward));
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let mut input = InputState::new();
        down(&mut input, "F13");
        down(&mut input, "x");
        for dir in [Direction::Forward, Direction::Back, Direction::StrafeLeft, Direction::StrafeRight] {
            assert!(!input.is_pressed(dir));
        }
    }

    #[test]
    fn test_look_delta_requires_pointer_lock() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 4.0, dy: -2.0 });
        assert_eq!(input.consume_look(), (0.0, 0.0), "mouse motion is discarded while unlocked");

        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        input.process_event(&InputEvent::MouseMove { dx: 4.0, dy: -2.0 });
        input.process_event(&InputEvent::MouseMove { dx: 1.0, dy: 1.0 });
        assert_eq!(input.consume_look(), (5.0, -1.0));
        assert_eq!(input.consume_look(), (0.0, 0.0), "delta resets on read");
    }

    #[test]
    fn test_focus_loss_clears_pressed_keys() {
        let mut input = InputState::new();
        down(&mut input, "w");
        down(&mut input, "d");
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_pressed(Direction::Forward));
        assert!(!input.is_pressed(Direction::StrafeRight));
    }

    #[test]
    fn test_lock_transitions_fire_listener_once_each() {
        let mut input = InputState::new();
        let shows = Rc::new(Cell::new(0u32));
        let hides = Rc::new(Cell::new(0u32));
        {
            let shows = shows.clone();
            let hides = hides.clone();
            input.pointer_lock.set_listener(move |state| match state {
                PointerLockState::Locked => hides.set(hides.get() + 1),
                PointerLockState::Unlocked => shows.set(shows.get() + 1),
            });
        }

        // Key presses never change the lock state
        down(&mut input, "w");
        assert_eq!(input.pointer_lock.state(), PointerLockState::Unlocked);
        assert_eq!(shows.get() + hides.get(), 0);

        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        assert_eq!(input.pointer_lock.state(), PointerLockState::Locked);
        assert_eq!(hides.get(), 1, "entering lock hides the menu once");

        // Redundant notification is not a transition
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        assert_eq!(hides.get(), 1);

        input.process_event(&InputEvent::PointerLockChanged { locked: false });
        assert_eq!(input.pointer_lock.state(), PointerLockState::Unlocked);
        assert_eq!(shows.get(), 1, "unlock shows the menu exactly once");
    }
}
