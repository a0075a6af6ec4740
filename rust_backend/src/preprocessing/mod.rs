pub mod validator;

pub use validator::{ScheduleValidator, ValidationResult, ValidationStats};
