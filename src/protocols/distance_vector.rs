use tracing::info;

use super::path::reconstruct_path;
use super::traits::{check_source, RouteComputeEngine};
use crate::error::RoutingResult;
use crate::model::routing::{DistanceVectorReport, DistanceVectorRoute, RouteEntry};
use crate::model::topology::Topology;

#[derive(Debug, Default, Clone, Copy)]
pub struct DistanceVectorEngine;

impl RouteComputeEngine for DistanceVectorEngine {
    type Output = DistanceVectorReport;

    fn name(&self) -> &'static str {
        "dvrp"
    }

    fn compute(&self, topology: &Topology, source: u32) -> RoutingResult<Self::Output> {
        compute_distance_vector(topology, source)
    }
}

/// Bellman-Ford over the sparse link list. Always runs `count - 1` full
/// passes; each undirected link is relaxed once per direction per pass.
pub fn compute_distance_vector(
    topology: &Topology,
    source: u32,
) -> RoutingResult<DistanceVectorReport> {
    check_source(topology, source)?;

    let count = topology.count();
    let size = count as usize + 1;
    let mut dist: Vec<Option<u64>> = vec![None; size];
    let mut predecessor: Vec<Option<u32>> = vec![None; size];
    dist[source as usize] = Some(0);

    for _ in 1..count {
        for (u, v, cost) in topology.links() {
            let Some(base) = dist[u as usize] else {
                continue;
            };
            let candidate = base + u64::from(cost);
            if dist[v as usize].map_or(true, |best| candidate < best) {
                dist[v as usize] = Some(candidate);
                predecessor[v as usize] = Some(u);
            }
        }
    }

    let routes = (1..=count)
        .map(|destination| {
            let previous = predecessor[destination as usize];
            DistanceVectorRoute {
                // Unreachable destinations also fall back to the source here.
                next_hop: previous.unwrap_or(source),
                route: RouteEntry {
                    destination,
                    distance: dist[destination as usize],
                    predecessor: previous,
                    path: reconstruct_path(&predecessor, source, destination),
                },
            }
        })
        .collect();

    info!(
        source,
        passes = count.saturating_sub(1),
        links = topology.link_count(),
        "distance-vector routes computed"
    );
    Ok(DistanceVectorReport { source, routes })
}
