use crate::error::{RoutingError, RoutingResult};
use crate::model::topology::Topology;

/// Single-source route computation over a borrowed topology. Every call is
/// independent; nothing is cached between runs.
pub trait RouteComputeEngine {
    type Output;

    fn name(&self) -> &'static str;

    fn compute(&self, topology: &Topology, source: u32) -> RoutingResult<Self::Output>;
}

/// Sources must lie in `[1, count]`.
pub fn check_source(topology: &Topology, source: u32) -> RoutingResult<()> {
    if source < 1 || source > topology.count() {
        return Err(RoutingError::invalid_argument("invalid source node"));
    }
    Ok(())
}
