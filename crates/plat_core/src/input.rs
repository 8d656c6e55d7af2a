//! Logical key state with both edge-triggered and level-triggered queries.
//!
//! - **Held:** `is_held(key)` is true every frame the key is down. Movement and
//!   firing read this.
//! - **Just pressed / just released:** true only until `end_frame()`. The host
//!   calls `end_frame()` after a simulation step has consumed the edges, so a
//!   press on a frame with zero fixed steps is not lost. Jump, debug toggle and
//!   quit read these.
//!
//! Physical key mapping lives in the host; the simulation only ever sees the
//! logical keys below.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Left,
    Right,
    Jump,
    Fire,
    DebugToggle,
    Quit,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Jump,
        Key::Fire,
        Key::DebugToggle,
        Key::Quit,
    ];
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Bring held state in line with `keys`, generating edges for changes.
    pub fn set_held(&mut self, keys: &[Key]) {
        for &key in Key::ALL {
            if keys.contains(&key) {
                self.key_down(key);
            } else {
                self.key_up(key);
            }
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Horizontal intent in {-1, 0, 1} from the held Left/Right keys.
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_held(Key::Left) {
            axis -= 1.0;
        }
        if self.is_held(Key::Right) {
            axis += 1.0;
        }
        axis
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Fire);
        assert!(input.is_held(Key::Fire));
        assert!(input.is_just_pressed(Key::Fire));
    }

    #[test]
    fn key_repeat_does_not_retrigger_after_end_frame() {
        let mut input = InputState::new();
        input.key_down(Key::Jump);
        input.end_frame();
        // OS key repeat delivers another press while the key is still held.
        input.key_down(Key::Jump);
        assert!(input.is_held(Key::Jump));
        assert!(!input.is_just_pressed(Key::Jump));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::Left);
        assert!(!input.is_just_released(Key::Left));
        assert!(!input.is_held(Key::Left));
    }

    #[test]
    fn end_frame_clears_edges_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_down(Key::Left);
        input.key_up(Key::Left);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Right));
        assert!(!input.is_just_released(Key::Left));
        assert!(input.is_held(Key::Right));
        assert!(!input.is_held(Key::Left));
    }

    #[test]
    fn horizontal_axis_cancels_opposing_keys() {
        let mut input = InputState::new();
        assert_eq!(input.horizontal_axis(), 0.0);
        input.key_down(Key::Left);
        assert_eq!(input.horizontal_axis(), -1.0);
        input.key_down(Key::Right);
        assert_eq!(input.horizontal_axis(), 0.0);
        input.key_up(Key::Left);
        assert_eq!(input.horizontal_axis(), 1.0);
    }

    #[test]
    fn set_held_generates_edges_for_changes_only() {
        let mut input = InputState::new();
        input.set_held(&[Key::Right, Key::Fire]);
        assert!(input.is_just_pressed(Key::Right));
        assert!(input.is_just_pressed(Key::Fire));
        input.end_frame();

        input.set_held(&[Key::Right]);
        assert!(!input.is_just_pressed(Key::Right));
        assert!(input.is_just_released(Key::Fire));
        assert!(input.is_held(Key::Right));
        assert!(!input.is_held(Key::Fire));
    }
}
