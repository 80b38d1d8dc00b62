use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RoutingError, RoutingResult};

pub const DEFAULT_MAX_NODES: u32 = 100;
/// Ceiling on `max_nodes`; the dense view and the adjacency table grow with
/// the square of the highest id.
pub const MAX_NODES_LIMIT: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRemoval {
    Removed { cost: u32 },
    NoSuchEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpdate {
    Inserted,
    Updated { previous: u32 },
}

/// Undirected weighted graph over node ids `1..=max_nodes`.
///
/// Links are kept in two views that always agree: a dense square matrix
/// indexed by node id, used by the link-state engine, and a sparse map with
/// one entry per direction, used by the distance-vector engine. A node's
/// diagonal cell holds `Some(0)` once it has been an edge endpoint.
///
/// `count` is a watermark of the highest id ever referenced by add or modify
/// and never decreases.
#[derive(Debug, Clone)]
pub struct Topology {
    max_nodes: u32,
    count: u32,
    matrix: Vec<Vec<Option<u32>>>,
    links: BTreeMap<(u32, u32), u32>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::empty(DEFAULT_MAX_NODES)
    }
}

impl Topology {
    /// Fails with `InvalidCapacity` unless `1 <= max_nodes <= MAX_NODES_LIMIT`.
    pub fn new(max_nodes: u32) -> RoutingResult<Self> {
        check_capacity(max_nodes)?;
        Ok(Self::empty(max_nodes))
    }

    fn empty(max_nodes: u32) -> Self {
        Self {
            max_nodes,
            count: 0,
            matrix: vec![Vec::new()],
            links: BTreeMap::new(),
        }
    }

    pub fn max_nodes(&self) -> u32 {
        self.max_nodes
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn add_edge(&mut self, source: u32, destination: u32, cost: u32) -> RoutingResult<()> {
        self.check_node(source)?;
        self.check_node(destination)?;
        if source == destination {
            return Err(RoutingError::invalid_argument(
                "source and destination cannot be the same",
            ));
        }
        Self::check_cost(cost)?;
        if self.cell(source, destination).is_some() || self.cell(destination, source).is_some() {
            return Err(RoutingError::invalid_argument("topology already set"));
        }

        self.insert_link(source, destination, cost);
        self.raise_watermark(source, destination);
        debug!(source, destination, cost, count = self.count, "edge added");
        Ok(())
    }

    pub fn remove_edge(&mut self, source: u32, destination: u32) -> RoutingResult<EdgeRemoval> {
        self.check_node(source)?;
        self.check_node(destination)?;
        let Some(cost) = self.cell(source, destination) else {
            warn!(source, destination, "no such edge");
            return Ok(EdgeRemoval::NoSuchEdge);
        };

        self.set_cell(source, destination, None);
        self.set_cell(destination, source, None);
        self.links.remove(&(source, destination));
        self.links.remove(&(destination, source));
        debug!(source, destination, "edge removed");
        Ok(EdgeRemoval::Removed { cost })
    }

    /// Upserts a link. Unlike [`Topology::add_edge`] this accepts existing
    /// links and `source == destination`.
    pub fn modify_edge(
        &mut self,
        source: u32,
        destination: u32,
        cost: u32,
    ) -> RoutingResult<EdgeUpdate> {
        self.check_node(source)?;
        self.check_node(destination)?;
        Self::check_cost(cost)?;
        self.raise_watermark(source, destination);

        let outcome = match self.cell(source, destination) {
            None => {
                self.insert_link(source, destination, cost);
                EdgeUpdate::Inserted
            }
            Some(previous) => {
                self.set_cell(source, destination, Some(cost));
                self.set_cell(destination, source, Some(cost));
                self.links.insert((source, destination), cost);
                self.links.insert((destination, source), cost);
                EdgeUpdate::Updated { previous }
            }
        };
        debug!(source, destination, cost, ?outcome, "edge modified");
        Ok(outcome)
    }

    /// Dense-view cost between two distinct nodes.
    pub fn cost(&self, source: u32, destination: u32) -> Option<u32> {
        if source == destination {
            return None;
        }
        self.cell(source, destination)
    }

    /// Directed link entries in `(source, destination)` order; every
    /// undirected link appears once per direction.
    pub fn links(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        self.links
            .iter()
            .map(|((source, destination), cost)| (*source, *destination, *cost))
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        let rows = (1..=self.count)
            .map(|u| (1..=self.count).map(|v| self.cell(u, v)).collect())
            .collect();
        AdjacencyMatrix {
            count: self.count,
            rows,
        }
    }

    fn check_node(&self, node: u32) -> RoutingResult<()> {
        if node == 0 || node > self.max_nodes {
            return Err(RoutingError::OutOfRange {
                node,
                max: self.max_nodes,
            });
        }
        Ok(())
    }

    fn check_cost(cost: u32) -> RoutingResult<()> {
        if cost == 0 {
            return Err(RoutingError::invalid_argument("cost must be positive"));
        }
        Ok(())
    }

    fn insert_link(&mut self, source: u32, destination: u32, cost: u32) {
        self.set_cell(source, destination, Some(cost));
        self.set_cell(destination, source, Some(cost));
        self.set_cell(source, source, Some(0));
        self.set_cell(destination, destination, Some(0));
        self.links.insert((source, destination), cost);
        self.links.insert((destination, source), cost);
    }

    fn raise_watermark(&mut self, source: u32, destination: u32) {
        self.count = self.count.max(source).max(destination);
    }

    fn cell(&self, source: u32, destination: u32) -> Option<u32> {
        self.matrix
            .get(source as usize)
            .and_then(|row| row.get(destination as usize))
            .copied()
            .flatten()
    }

    fn set_cell(&mut self, source: u32, destination: u32, value: Option<u32>) {
        let needed = source.max(destination) as usize + 1;
        if self.matrix.len() < needed {
            self.matrix.resize_with(needed, Vec::new);
        }
        for row in &mut self.matrix {
            if row.len() < needed {
                row.resize(needed, None);
            }
        }
        self.matrix[source as usize][destination as usize] = value;
    }
}

pub fn check_capacity(max_nodes: u32) -> RoutingResult<()> {
    if max_nodes == 0 || max_nodes > MAX_NODES_LIMIT {
        return Err(RoutingError::InvalidCapacity {
            requested: max_nodes,
            limit: MAX_NODES_LIMIT,
        });
    }
    Ok(())
}

/// Snapshot of the dense view over `1..=count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyMatrix {
    pub count: u32,
    pub rows: Vec<Vec<Option<u32>>>,
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u|v\t|\t")?;
        for v in 1..=self.count {
            write!(f, "{v}\t")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(3 * self.count as usize + 1))?;
        for (index, row) in self.rows.iter().enumerate() {
            write!(f, "{}\t|\t", index + 1)?;
            for cell in row {
                match cell {
                    Some(cost) => write!(f, "{cost}\t")?,
                    None => write!(f, "-1\t")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_symmetric_in_both_views() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 5).unwrap();

        assert_eq!(topology.cost(1, 2), Some(5));
        assert_eq!(topology.cost(2, 1), Some(5));
        let links: Vec<_> = topology.links().collect();
        assert_eq!(links, vec![(1, 2, 5), (2, 1, 5)]);
        let matrix = topology.adjacency_matrix();
        assert_eq!(matrix.rows[0][0], Some(0));
        assert_eq!(matrix.rows[1][1], Some(0));
        assert_eq!(topology.count(), 2);
    }

    #[test]
    fn add_edge_rejects_self_loop() {
        let mut topology = Topology::default();
        for cost in [1, 7, 1000] {
            let err = topology.add_edge(3, 3, cost).unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert_eq!(topology.count(), 0);
    }

    #[test]
    fn add_edge_rejects_duplicate_in_either_direction() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 5).unwrap();

        assert!(topology.add_edge(1, 2, 7).unwrap_err().is_invalid_argument());
        assert!(topology.add_edge(2, 1, 7).unwrap_err().is_invalid_argument());
        assert_eq!(topology.cost(1, 2), Some(5));
    }

    #[test]
    fn node_ids_outside_capacity_are_out_of_range() {
        let mut topology = Topology::new(4).unwrap();
        assert_eq!(
            topology.add_edge(0, 1, 1),
            Err(RoutingError::OutOfRange { node: 0, max: 4 })
        );
        assert!(topology.add_edge(1, 5, 1).unwrap_err().is_out_of_range());
        assert!(topology.modify_edge(5, 1, 1).unwrap_err().is_out_of_range());
        assert!(topology.remove_edge(1, 9).unwrap_err().is_out_of_range());
        assert_eq!(topology.count(), 0);
    }

    #[test]
    fn capacity_is_bounded() {
        assert_eq!(
            Topology::new(0).unwrap_err(),
            RoutingError::InvalidCapacity {
                requested: 0,
                limit: MAX_NODES_LIMIT
            }
        );
        assert!(Topology::new(200_000).is_err());

        let mut topology = Topology::new(MAX_NODES_LIMIT).unwrap();
        topology.add_edge(1, MAX_NODES_LIMIT, 1).unwrap();
        assert_eq!(topology.count(), MAX_NODES_LIMIT);
        assert!(topology
            .add_edge(1, MAX_NODES_LIMIT + 1, 1)
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn zero_cost_is_rejected() {
        let mut topology = Topology::default();
        assert!(topology.add_edge(1, 2, 0).unwrap_err().is_invalid_argument());
        assert!(topology.modify_edge(1, 2, 0).unwrap_err().is_invalid_argument());
        assert_eq!(topology.cost(1, 2), None);
    }

    #[test]
    fn modify_edge_upserts() {
        let mut topology = Topology::default();
        assert_eq!(topology.modify_edge(3, 4, 9), Ok(EdgeUpdate::Inserted));
        assert_eq!(topology.cost(4, 3), Some(9));

        assert_eq!(
            topology.modify_edge(4, 3, 2),
            Ok(EdgeUpdate::Updated { previous: 9 })
        );
        assert_eq!(topology.cost(3, 4), Some(2));
        assert_eq!(topology.cost(4, 3), Some(2));
        let links: Vec<_> = topology.links().collect();
        assert_eq!(links, vec![(3, 4, 2), (4, 3, 2)]);
    }

    #[test]
    fn remove_edge_clears_both_views_but_keeps_watermark() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 5).unwrap();
        topology.add_edge(2, 7, 1).unwrap();

        assert_eq!(topology.remove_edge(7, 2), Ok(EdgeRemoval::Removed { cost: 1 }));
        assert_eq!(topology.cost(2, 7), None);
        assert_eq!(topology.link_count(), 2);
        assert_eq!(topology.count(), 7);
        assert_eq!(topology.adjacency_matrix().rows[6][6], Some(0));
    }

    #[test]
    fn remove_missing_edge_is_a_no_op() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 5).unwrap();

        assert_eq!(topology.remove_edge(1, 3), Ok(EdgeRemoval::NoSuchEdge));
        assert_eq!(topology.cost(1, 2), Some(5));
        assert_eq!(topology.link_count(), 2);
    }

    #[test]
    fn removed_edge_can_be_added_again() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 5).unwrap();
        topology.remove_edge(1, 2).unwrap();
        topology.add_edge(1, 2, 5).unwrap();
        assert_eq!(topology.cost(2, 1), Some(5));
    }

    #[test]
    fn watermark_never_decreases() {
        let mut topology = Topology::default();
        let mut last = topology.count();
        topology.add_edge(4, 9, 1).unwrap();
        assert!(topology.count() >= last);
        last = topology.count();
        topology.remove_edge(4, 9).unwrap();
        assert!(topology.count() >= last);
        last = topology.count();
        topology.modify_edge(1, 2, 3).unwrap();
        assert!(topology.count() >= last);
        assert_eq!(topology.count(), 9);
    }

    #[test]
    fn adjacency_matrix_renders_tab_separated_table() {
        let mut topology = Topology::default();
        topology.add_edge(1, 2, 4).unwrap();
        topology.add_edge(3, 2, 1).unwrap();

        let rendered = topology.adjacency_matrix().to_string();
        let expected = "u|v\t|\t1\t2\t3\t\n\
                        ----------\n\
                        1\t|\t0\t4\t-1\t\n\
                        2\t|\t4\t0\t1\t\n\
                        3\t|\t-1\t1\t0\t\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn empty_matrix_renders_headers_only() {
        let rendered = Topology::default().adjacency_matrix().to_string();
        assert_eq!(rendered, "u|v\t|\t\n-\n");
    }
}
