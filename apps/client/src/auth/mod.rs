pub mod controller;
pub mod validation;

pub use controller::{AuthController, FieldError, FormKind, SubmitOutcome};
pub use validation::{
    calculate_password_strength, is_valid_email, password_requirements, FormValues,
    PasswordStrength,
};
