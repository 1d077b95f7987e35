//! Player keyboard shortcuts.
//!
//! Every keypress also counts as a controls interaction; this module only
//! decides which keys carry a player action.

/// A key as reported by the host, independent of any windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Character(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
    };
}

/// Player-level actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Space or K.
    TogglePlay,
    /// Left arrow or J.
    SeekBackward,
    /// Right arrow or L.
    SeekForward,
    /// Shift+N.
    NextEpisode,
    /// Shift+P.
    PreviousEpisode,
}

pub fn map_shortcut(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
    if modifiers.control {
        return None;
    }

    match key {
        Key::Space => Some(Shortcut::TogglePlay),
        Key::ArrowLeft => Some(Shortcut::SeekBackward),
        Key::ArrowRight => Some(Shortcut::SeekForward),
        Key::Character(c) => match (c.to_ascii_lowercase(), modifiers.shift) {
            ('n', true) => Some(Shortcut::NextEpisode),
            ('p', true) => Some(Shortcut::PreviousEpisode),
            ('k', false) => Some(Shortcut::TogglePlay),
            ('j', false) => Some(Shortcut::SeekBackward),
            ('l', false) => Some(Shortcut::SeekForward),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keys() {
        assert_eq!(map_shortcut(Key::Space, Modifiers::NONE), Some(Shortcut::TogglePlay));
        assert_eq!(map_shortcut(Key::Character('k'), Modifiers::NONE), Some(Shortcut::TogglePlay));
        assert_eq!(map_shortcut(Key::ArrowLeft, Modifiers::NONE), Some(Shortcut::SeekBackward));
        assert_eq!(map_shortcut(Key::Character('l'), Modifiers::NONE), Some(Shortcut::SeekForward));
    }

    #[test]
    fn test_episode_keys_need_shift() {
        assert_eq!(map_shortcut(Key::Character('N'), Modifiers::SHIFT), Some(Shortcut::NextEpisode));
        assert_eq!(map_shortcut(Key::Character('p'), Modifiers::SHIFT), Some(Shortcut::PreviousEpisode));
        assert_eq!(map_shortcut(Key::Character('n'), Modifiers::NONE), None);
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(map_shortcut(Key::Escape, Modifiers::NONE), None);
        assert_eq!(map_shortcut(Key::Character('x'), Modifiers::NONE), None);
        let ctrl = Modifiers {
            shift: false,
            control: true,
        };
        assert_eq!(map_shortcut(Key::Space, ctrl), None);
    }
}
