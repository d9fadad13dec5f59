//! Username rotation state.

use crate::config::UsernameList;

/// Position in the username rotation.
///
/// The counter only ever grows; the index is taken modulo the length of the
/// list passed in, so the list may grow or shrink between calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RotationState {
    counter: usize,
}

impl RotationState {
    /// Creates a new rotation state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the next name and advances. Returns `None` for an empty list
    /// without advancing.
    pub fn next_name<'a>(&mut self, names: &'a UsernameList) -> Option<&'a str> {
        if names.is_empty() {
            return None;
        }

        let name = names.get(self.counter % names.len());
        self.counter = self.counter.wrapping_add(1);
        name
    }

    /// Resets the rotation to the first name.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps_around() {
        let names = UsernameList::parse("a\nb\nc");
        let mut state = RotationState::new();
        let picked: Vec<_> = (0..4).map(|_| state.next_name(&names).unwrap()).collect();
        assert_eq!(picked, ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_empty_list_pauses() {
        let mut state = RotationState::new();
        assert_eq!(state.next_name(&UsernameList::default()), None);
        assert_eq!(state, RotationState::new());
    }

    #[test]
    fn test_shrinking_list_stays_in_bounds() {
        let mut state = RotationState::new();
        let long = UsernameList::parse("a\nb\nc\nd\ne");
        for _ in 0..4 {
            state.next_name(&long);
        }

        let short = UsernameList::parse("x\ny");
        assert_eq!(state.next_name(&short), Some("x"));
        assert_eq!(state.next_name(&short), Some("y"));
    }

    #[test]
    fn test_reset() {
        let names = UsernameList::parse("a\nb");
        let mut state = RotationState::new();
        state.next_name(&names);
        state.reset();
        assert_eq!(state.next_name(&names), Some("a"));
    }
}
