pub mod password;
pub mod validation;

pub use password::{hash_password, is_valid_pin, verify_password, Password, PasswordHashString};
pub use validation::{ValidatedForm, ValidatedJson};
