use std::fmt;

use serde::Serialize;

const LSRP_RULE: &str = "-------------------------------------------------";
const DVRP_RULE: &str =
    "-----------------------------------------------------------------------";

/// Shortest-path outcome for one destination. `distance` is `None` when the
/// destination is unreachable, in which case `path` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub destination: u32,
    pub distance: Option<u64>,
    pub predecessor: Option<u32>,
    pub path: Vec<u32>,
}

/// Tentative distances after one link-state iteration, indexed by
/// destination `1..=count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationRow {
    pub iteration: usize,
    pub selected: u32,
    pub distances: Vec<Option<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStateReport {
    pub source: u32,
    pub trace: Vec<IterationRow>,
    /// One entry per destination other than the source, ascending.
    pub routes: Vec<RouteEntry>,
}

impl LinkStateReport {
    pub fn route(&self, destination: u32) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .find(|entry| entry.destination == destination)
    }
}

impl fmt::Display for LinkStateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.trace.iter().enumerate() {
            if index > 0 {
                writeln!(f, "{LSRP_RULE}")?;
            }
            writeln!(f, "Iter {}: ", row.iteration)?;
            write!(f, "Dest\t|\t")?;
            for destination in 1..=row.distances.len() {
                write!(f, "{destination}\t|\t")?;
            }
            writeln!(f)?;
            write!(f, "Cost\t|\t")?;
            for distance in &row.distances {
                write!(f, "{}\t|\t", DistanceCell(*distance))?;
            }
            writeln!(f)?;
        }

        if !self.trace.is_empty() {
            writeln!(f, "{LSRP_RULE}")?;
        }
        writeln!(f, "Path\t\t\t|\tMin-Cost\t|\tShortest Path")?;
        writeln!(f, "{LSRP_RULE}")?;
        for entry in &self.routes {
            writeln!(
                f,
                "{}  ->  {}\t\t|\t\t{}\t\t|\t{}",
                self.source,
                entry.destination,
                DistanceCell(entry.distance),
                PathCell(entry)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceVectorRoute {
    pub next_hop: u32,
    #[serde(flatten)]
    pub route: RouteEntry,
}

/// Bellman-Ford table with one row per destination `1..=count`, the source
/// included.
///
/// `next_hop` is the destination's predecessor on the computed path and falls
/// back to the source whenever no predecessor was recorded. That covers the
/// source itself and also unreachable destinations, so a row whose next hop
/// equals the source does not by itself imply a usable route; check
/// `route.distance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceVectorReport {
    pub source: u32,
    pub routes: Vec<DistanceVectorRoute>,
}

impl DistanceVectorReport {
    pub fn route(&self, destination: u32) -> Option<&DistanceVectorRoute> {
        self.routes
            .iter()
            .find(|entry| entry.route.destination == destination)
    }
}

impl fmt::Display for DistanceVectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dest\t|\tNext Hop\t|\tDist\t|\tShortest Path")?;
        writeln!(f, "{DVRP_RULE}")?;
        for entry in &self.routes {
            writeln!(
                f,
                "{}\t\t|\t{}\t\t\t|\t{}\t\t|\t[{}]",
                entry.route.destination,
                entry.next_hop,
                DistanceCell(entry.route.distance),
                PathCell(&entry.route)
            )?;
        }
        Ok(())
    }
}

struct DistanceCell(Option<u64>);

impl fmt::Display for DistanceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(distance) => write!(f, "{distance}"),
            None => write!(f, "-1"),
        }
    }
}

/// Hops joined by ` -> `; an unreachable destination prints only itself.
struct PathCell<'a>(&'a RouteEntry);

impl fmt::Display for PathCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.path.is_empty() {
            return write!(f, "{}", self.0.destination);
        }
        for (index, hop) in self.0.path.iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{hop}")?;
        }
        Ok(())
    }
}
