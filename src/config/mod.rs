mod logging;
mod settings;
mod validator;

pub use logging::*;
pub use settings::*;
pub use validator::*;
