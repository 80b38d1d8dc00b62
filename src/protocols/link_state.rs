use tracing::{debug, info};

use super::path::reconstruct_path;
use super::traits::{check_source, RouteComputeEngine};
use crate::error::RoutingResult;
use crate::model::routing::{IterationRow, LinkStateReport, RouteEntry};
use crate::model::topology::Topology;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkStateEngine;

impl RouteComputeEngine for LinkStateEngine {
    type Output = LinkStateReport;

    fn name(&self) -> &'static str {
        "lsrp"
    }

    fn compute(&self, topology: &Topology, source: u32) -> RoutingResult<Self::Output> {
        compute_link_state(topology, source)
    }
}

/// Dijkstra over the dense view, running exactly `count - 1` selection rounds
/// and recording the tentative distances after each.
pub fn compute_link_state(topology: &Topology, source: u32) -> RoutingResult<LinkStateReport> {
    check_source(topology, source)?;

    let count = topology.count();
    let size = count as usize + 1;
    let mut dist: Vec<Option<u64>> = vec![None; size];
    let mut predecessor: Vec<Option<u32>> = vec![None; size];
    let mut visited = vec![false; size];
    dist[source as usize] = Some(0);

    let mut trace = Vec::with_capacity(size.saturating_sub(2));
    for iteration in 1..count as usize {
        let Some(u) = select_next(&dist, &visited) else {
            break;
        };
        visited[u as usize] = true;

        if let Some(base) = dist[u as usize] {
            for v in 1..=count {
                if visited[v as usize] {
                    continue;
                }
                let Some(cost) = topology.cost(u, v) else {
                    continue;
                };
                let candidate = base + u64::from(cost);
                if dist[v as usize].map_or(true, |best| candidate < best) {
                    dist[v as usize] = Some(candidate);
                    predecessor[v as usize] = Some(u);
                }
            }
        }

        debug!(source, iteration, selected = u, "link-state iteration");
        trace.push(IterationRow {
            iteration,
            selected: u,
            distances: dist[1..].to_vec(),
        });
    }

    let routes = (1..=count)
        .filter(|destination| *destination != source)
        .map(|destination| RouteEntry {
            destination,
            distance: dist[destination as usize],
            predecessor: predecessor[destination as usize],
            path: reconstruct_path(&predecessor, source, destination),
        })
        .collect();

    info!(source, iterations = trace.len(), "link-state routes computed");
    Ok(LinkStateReport {
        source,
        trace,
        routes,
    })
}

/// Linear scan over unvisited nodes comparing with `<=`, so among equal
/// minima the highest id wins. Unreachable nodes compare as infinity and can
/// still be selected once nothing reachable is left.
fn select_next(dist: &[Option<u64>], visited: &[bool]) -> Option<u32> {
    let mut minimum = u64::MAX;
    let mut selected = None;
    for node in 1..dist.len() {
        if visited[node] {
            continue;
        }
        let key = dist[node].unwrap_or(u64::MAX);
        if key <= minimum {
            minimum = key;
            selected = Some(node as u32);
        }
    }
    selected
}
