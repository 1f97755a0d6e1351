//! Request-side services shared by the generated handlers.

mod validation;
pub use validation::{user_fields, RequestValidator, EMAIL_PATTERN};
