use thiserror::Error;

/// Escape arrives as its control character once translated from the windowing toolkit.
pub const ESCAPE_KEY: char = '\u{1b}';

pub type KeyHandler = Box<dyn Fn()>;

pub type KeyBindingResult<T> = std::result::Result<T, KeyBindingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBindingError {
    #[error("key {key:?} is already bound to \"{existing}\"")]
    DuplicateKey { key: char, existing: String },
}

pub struct KeyBinding {
    key: char,
    description: String,
    handler: KeyHandler,
}

impl KeyBinding {
    pub fn key(&self) -> char {
        self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct KeyBindingTable {
    bindings: Vec<KeyBinding>,
}

impl KeyBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        key: char,
        description: impl Into<String>,
        handler: F,
    ) -> KeyBindingResult<()>
    where
        F: Fn() + 'static,
    {
        if let Some(existing) = self.binding(key) {
            return Err(KeyBindingError::DuplicateKey {
                key,
                existing: existing.description.clone(),
            });
        }
        self.bindings.push(KeyBinding {
            key,
            description: description.into(),
            handler: Box::new(handler),
        });
        Ok(())
    }

    pub fn dispatch(&self, key: char) -> bool {
        match self.binding(key) {
            Some(binding) => {
                tracing::debug!(key = %key_label(key), description = binding.description.as_str(), "dispatching key binding");
                (binding.handler)();
                true
            }
            None => {
                tracing::trace!(key = %key_label(key), "ignoring unbound key");
                false
            }
        }
    }

    pub fn contains(&self, key: char) -> bool {
        self.binding(key).is_some()
    }

    pub fn describe_all(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.bindings
            .iter()
            .map(|binding| (binding.key, binding.description.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn binding(&self, key: char) -> Option<&KeyBinding> {
        self.bindings.iter().find(|binding| binding.key == key)
    }
}

pub fn key_label(key: char) -> String {
    match key {
        ESCAPE_KEY => "Esc".to_string(),
        ' ' => "Space".to_string(),
        key if key.is_control() => format!("U+{:04X}", u32::from(key)),
        key => key.to_string(),
    }
}
