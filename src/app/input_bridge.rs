use crate::input::ESCAPE_KEY;
use crate::window::ButtonState;

// GDK reports XKB keycodes, which are evdev codes + 8.
fn key_character_from_keycode(keycode: u32) -> Option<char> {
    match keycode {
        24 => Some('q'),
        33 => Some('p'),
        39 => Some('s'),
        41 => Some('f'),
        42 => Some('g'),
        43 => Some('h'),
        54 => Some('c'),
        57 => Some('n'),
        _ => None,
    }
}

/// Maps a key press to the character windows bind handlers to.
pub(super) fn translate_key(key: gtk4::gdk::Key, keycode: u32) -> Option<char> {
    if key == gtk4::gdk::Key::Escape {
        return Some(ESCAPE_KEY);
    }

    match key
        .to_unicode()
        .filter(|character| !character.is_control())
        .map(|character| character.to_ascii_lowercase())
    {
        Some(character) if character.is_ascii() => Some(character),
        Some(_) | None => key_character_from_keycode(keycode),
    }
}

pub(super) fn button_state(pressed: bool) -> ButtonState {
    if pressed {
        ButtonState::Pressed
    } else {
        ButtonState::Released
    }
}
