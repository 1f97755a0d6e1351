//! Entity definitions: the static description of a record type exposed over CRUD routes.

mod descriptor;
pub use descriptor::*;
