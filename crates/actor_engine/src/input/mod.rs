//! Input management system
//!
//! Keys and mouse buttons each run a four-state machine. A press moves an
//! idle button to `JustBecameDown`; `late_update` at the end of the frame
//! promotes it to `Down`. Releases mirror this through `JustBecameUp`.
//! Gameplay code queries by name (`"space"`, `"lshift"`, `"a"`) and an
//! unknown name simply reads as not pressed.

use std::collections::HashMap;

use crate::foundation::math::Vec2;

/// Per-button state tracked between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    /// Not held
    #[default]
    Up,
    /// Pressed during the current frame
    JustBecameDown,
    /// Held since an earlier frame
    Down,
    /// Released during the current frame
    JustBecameUp,
}

impl InputState {
    /// Whether the button counts as held
    pub fn is_held(self) -> bool {
        matches!(self, Self::Down | Self::JustBecameDown)
    }
}

/// Input manager
#[derive(Debug, Default)]
pub struct InputManager {
    keys: HashMap<KeyCode, InputState>,
    buttons: HashMap<MouseButton, InputState>,
    just_down_keys: Vec<KeyCode>,
    just_up_keys: Vec<KeyCode>,
    just_down_buttons: Vec<MouseButton>,
    just_up_buttons: Vec<MouseButton>,
    mouse_position: Vec2,
    scroll_delta: f32,
    cursor_visible: bool,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            cursor_visible: true,
            ..Self::default()
        }
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        let state = self.keys.entry(key).or_default();
        if pressed {
            if !state.is_held() {
                *state = InputState::JustBecameDown;
                self.just_down_keys.push(key);
            }
        } else if state.is_held() {
            *state = InputState::JustBecameUp;
            self.just_up_keys.push(key);
        }
    }

    /// Handle mouse button input
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        let state = self.buttons.entry(button).or_default();
        if pressed {
            if !state.is_held() {
                *state = InputState::JustBecameDown;
                self.just_down_buttons.push(button);
            }
        } else if state.is_held() {
            *state = InputState::JustBecameUp;
            self.just_up_buttons.push(button);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_move(&mut self, x: f64, y: f64) {
        self.mouse_position = Vec2::new(x as f32, y as f32);
    }

    /// Handle a wheel event; only the last one in a frame counts
    pub fn handle_scroll(&mut self, delta: f32) {
        self.scroll_delta = delta;
    }

    /// Promote this frame's transitions and clear the scroll delta
    pub fn late_update(&mut self) {
        for key in self.just_down_keys.drain(..) {
            self.keys.insert(key, InputState::Down);
        }
        for key in self.just_up_keys.drain(..) {
            self.keys.insert(key, InputState::Up);
        }
        for button in self.just_down_buttons.drain(..) {
            self.buttons.insert(button, InputState::Down);
        }
        for button in self.just_up_buttons.drain(..) {
            self.buttons.insert(button, InputState::Up);
        }
        self.scroll_delta = 0.0;
    }

    fn key_state(&self, name: &str) -> Option<InputState> {
        let key = KeyCode::from_name(name)?;
        Some(self.keys.get(&key).copied().unwrap_or_default())
    }

    fn button_state(&self, index: i32) -> InputState {
        MouseButton::from_index(index)
            .and_then(|button| self.buttons.get(&button).copied())
            .unwrap_or_default()
    }

    /// True while the named key is held
    pub fn key(&self, name: &str) -> bool {
        self.key_state(name).is_some_and(InputState::is_held)
    }

    /// True only on the frame the named key went down
    pub fn key_down(&self, name: &str) -> bool {
        self.key_state(name) == Some(InputState::JustBecameDown)
    }

    /// True only on the frame the named key was released
    pub fn key_up(&self, name: &str) -> bool {
        self.key_state(name) == Some(InputState::JustBecameUp)
    }

    /// Last reported cursor position in window pixels
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// True while the button (1 left, 2 middle, 3 right) is held
    pub fn mouse_button(&self, index: i32) -> bool {
        self.button_state(index).is_held()
    }

    /// True only on the frame the button went down
    pub fn mouse_button_down(&self, index: i32) -> bool {
        self.button_state(index) == InputState::JustBecameDown
    }

    /// True only on the frame the button was released
    pub fn mouse_button_up(&self, index: i32) -> bool {
        self.button_state(index) == InputState::JustBecameUp
    }

    /// Wheel movement reported this frame
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Hide the cursor
    pub fn hide_cursor(&mut self) {
        self.cursor_visible = false;
    }

    /// Show the cursor
    pub fn show_cursor(&mut self) {
        self.cursor_visible = true;
    }

    /// Whether the backend should draw the cursor
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

macro_rules! key_codes {
    ($($variant:ident => [$($name:literal),+]),+ $(,)?) => {
        /// Key codes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum KeyCode {
            $($variant),+
        }

        impl KeyCode {
            /// Look up a key by the name gameplay code uses
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($($name)|+ => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

key_codes! {
    Up => ["up"],
    Down => ["down"],
    Left => ["left"],
    Right => ["right"],
    Escape => ["escape"],
    LShift => ["lshift"],
    RShift => ["rshift"],
    LCtrl => ["lctrl"],
    RCtrl => ["rctrl"],
    LAlt => ["lalt"],
    RAlt => ["ralt"],
    Tab => ["tab"],
    Enter => ["return", "enter"],
    Backspace => ["backspace"],
    Delete => ["delete"],
    Insert => ["insert"],
    Space => ["space"],
    A => ["a"], B => ["b"], C => ["c"], D => ["d"], E => ["e"], F => ["f"],
    G => ["g"], H => ["h"], I => ["i"], J => ["j"], K => ["k"], L => ["l"],
    M => ["m"], N => ["n"], O => ["o"], P => ["p"], Q => ["q"], R => ["r"],
    S => ["s"], T => ["t"], U => ["u"], V => ["v"], W => ["w"], X => ["x"],
    Y => ["y"], Z => ["z"],
    Num0 => ["0"], Num1 => ["1"], Num2 => ["2"], Num3 => ["3"], Num4 => ["4"],
    Num5 => ["5"], Num6 => ["6"], Num7 => ["7"], Num8 => ["8"], Num9 => ["9"],
    Slash => ["/"],
    Semicolon => [";"],
    Equals => ["="],
    Minus => ["-"],
    Period => ["."],
    Comma => [","],
    LeftBracket => ["["],
    RightBracket => ["]"],
    Backslash => ["\\"],
    Apostrophe => ["'"],
    Grave => ["`"],
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Middle mouse button
    Middle,
    /// Right mouse button
    Right,
}

impl MouseButton {
    /// Map the numeric button index used by scripts
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            1 => Some(Self::Left),
            2 => Some(Self::Middle),
            3 => Some(Self::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_lifecycle() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Space, true);
        assert!(input.key("space"));
        assert!(input.key_down("space"));

        input.late_update();
        assert!(input.key("space"));
        assert!(!input.key_down("space"));

        input.handle_key_input(KeyCode::Space, false);
        assert!(!input.key("space"));
        assert!(input.key_up("space"));

        input.late_update();
        assert!(!input.key_up("space"));
    }

    #[test]
    fn test_repeated_press_does_not_restart() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::A, true);
        input.late_update();
        input.handle_key_input(KeyCode::A, true);
        assert!(!input.key_down("a"));
        assert!(input.key("a"));
    }

    #[test]
    fn test_unknown_key_reads_false() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Enter, true);
        assert!(!input.key("hyperdrive"));
        assert!(!input.key_down("hyperdrive"));
        assert!(input.key("return"));
        assert!(input.key("enter"));
    }

    #[test]
    fn test_mouse_buttons_and_scroll() {
        let mut input = InputManager::new();
        input.handle_mouse_button(MouseButton::Right, true);
        input.handle_mouse_move(12.0, 30.0);
        input.handle_scroll(-1.5);

        assert!(input.mouse_button(3));
        assert!(input.mouse_button_down(3));
        assert!(!input.mouse_button(1));
        assert!(!input.mouse_button(42));
        assert_eq!(input.mouse_position(), Vec2::new(12.0, 30.0));
        assert_eq!(input.scroll_delta(), -1.5);

        input.late_update();
        assert!(!input.mouse_button_down(3));
        assert_eq!(input.scroll_delta(), 0.0);
    }

    #[test]
    fn test_cursor_visibility() {
        let mut input = InputManager::new();
        assert!(input.cursor_visible());
        input.hide_cursor();
        assert!(!input.cursor_visible());
        input.show_cursor();
        assert!(input.cursor_visible());
    }
}
