mod binding;

pub use binding::{
    key_label, KeyBinding, KeyBindingError, KeyBindingResult, KeyBindingTable, KeyHandler,
    ESCAPE_KEY,
};
