//! Error taxonomy shared by the topology store and the routing engines.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Self loop, duplicate strict add, zero cost or a routing source outside `[1, count]`.
    #[error("{0}")]
    InvalidArgument(String),

    /// Node id outside the configured capacity `[1, max]`.
    #[error("node {node} is out of range (1..={max})")]
    OutOfRange { node: u32, max: u32 },

    /// Node capacity outside `[1, limit]`.
    #[error("node capacity {requested} must be within 1..={limit}")]
    InvalidCapacity { requested: u32, limit: u32 },
}

impl RoutingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
