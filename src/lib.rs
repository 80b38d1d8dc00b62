pub mod error;
pub mod model;
pub mod protocols;
pub mod runtime;

pub use error::{RoutingError, RoutingResult};
