pub mod error;
pub mod types;
pub mod value;

pub use error::{DefinitionError, ErrorKind};
pub use types::*;
pub use value::*;
