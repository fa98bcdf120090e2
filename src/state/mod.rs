pub mod error;
pub mod machine;
pub mod run_control;
pub mod shared;

pub use error::{RegistrationError, RegistrationResult};
pub use machine::{ManagerEvent, ManagerState, ManagerStateMachine};
pub use run_control::RunControl;
pub use shared::{SharedContext, SlotId, SyncScope};
