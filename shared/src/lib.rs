pub mod error;
pub mod models;
pub mod validation;

pub use error::{PollError, Resource, Result};
pub use models::*;
pub use validation::*;
