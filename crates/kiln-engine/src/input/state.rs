use std::collections::HashSet;

use super::KeyCode;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Edge produced by [`KeyboardState::apply`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyTransition {
    Down(KeyCode),
    Up(KeyCode),
}

/// Keys currently held.
///
/// Key repeat is filtered: a key reports `Down` once until it is released.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    keys_down: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a platform event; returns the transition it caused, if any.
    pub fn apply(&mut self, key: KeyCode, state: KeyState) -> Option<KeyTransition> {
        match state {
            KeyState::Pressed => self.keys_down.insert(key).then_some(KeyTransition::Down(key)),
            KeyState::Released => self.keys_down.remove(&key).then_some(KeyTransition::Up(key)),
        }
    }

    /// Releases every held key, e.g. on focus loss, so nothing stays stuck.
    pub fn release_all(&mut self) -> Vec<KeyTransition> {
        self.keys_down.drain().map(KeyTransition::Up).collect()
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_down.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_presses_report_once() {
        let mut kb = KeyboardState::new();
        assert_eq!(kb.apply(KeyCode::Space, KeyState::Pressed), Some(KeyTransition::Down(KeyCode::Space)));
        assert_eq!(kb.apply(KeyCode::Space, KeyState::Pressed), None);
        assert!(kb.is_down(KeyCode::Space));
        assert_eq!(kb.apply(KeyCode::Space, KeyState::Released), Some(KeyTransition::Up(KeyCode::Space)));
        assert_eq!(kb.apply(KeyCode::Space, KeyState::Released), None);
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut kb = KeyboardState::new();
        kb.apply(KeyCode::KeyA, KeyState::Pressed);
        kb.apply(KeyCode::ArrowLeft, KeyState::Pressed);
        let mut released = kb.release_all();
        released.sort_by_key(|t| format!("{t:?}"));
        assert_eq!(released.len(), 2);
        assert_eq!(kb.held().count(), 0);
    }
}
