use thiserror::Error;

use crate::config::ConfigError;
use crate::import::ImportError;
use crate::input::KeyBindingError;
use crate::state::RegistrationError;
use crate::tensor::TensorError;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    KeyBinding(#[from] KeyBindingError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ManagerState;

    #[test]
    fn module_errors_convert_into_app_error() {
        fn register() -> AppResult<()> {
            Err(RegistrationError::RegistrationClosed {
                state: ManagerState::Stopped,
            })?
        }

        let err = register().expect_err("registration should fail");
        assert!(matches!(err, AppError::Registration(_)));
        assert!(err.to_string().contains("Stopped"));
    }
}
