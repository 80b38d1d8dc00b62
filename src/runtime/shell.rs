use std::fmt;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::RoutingError;
use crate::model::topology::{EdgeRemoval, Topology};
use crate::protocols::{DistanceVectorEngine, LinkStateEngine, RouteComputeEngine};
use crate::runtime::command::{Command, CommandError};
use crate::runtime::config::{OutputConfig, OutputFormat};

const LSRP_BANNER_WIDTH: usize = 17;
const DVRP_BANNER_WIDTH: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum NoticeLevel {
    Info,
    Rejected,
    Error,
}

#[derive(Debug, Serialize)]
struct NoticeLine<'a> {
    level: NoticeLevel,
    message: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented dispatcher that owns the topology for the session and writes
/// every report to `out`.
pub struct Shell<W: Write> {
    topology: Topology,
    output: OutputConfig,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(topology: Topology, output: OutputConfig, out: W) -> Self {
        Self {
            topology,
            output,
            out,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until `exit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        info!(count = self.topology.count(), "session started");
        for line in input.lines() {
            let line = line.context("failed to read command line")?;
            if self.execute_line(&line)? == Flow::Exit {
                break;
            }
        }
        self.out.flush().context("failed to flush output")?;
        info!("session finished");
        Ok(())
    }

    /// Executes one raw line. Command and routing failures are reported on
    /// the output and never end the session; only I/O errors propagate.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let outcome = line
            .parse::<Command>()
            .map_err(anyhow::Error::from)
            .and_then(|command| {
                debug!(?command, "dispatching command");
                self.execute(command)
            });
        match outcome {
            Ok(flow) => Ok(flow),
            Err(err) => {
                self.report_failure(line, err)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Topology { links, malformed } => {
                for link in links {
                    self.topology
                        .add_edge(link.source, link.destination, link.cost)?;
                }
                if let Some(err) = malformed {
                    return Err(err.into());
                }
            }
            Command::Show => {
                let matrix = self.topology.adjacency_matrix();
                self.emit(&matrix)?;
            }
            Command::LinkState { source } => {
                self.run_engine(&LinkStateEngine, source, LSRP_BANNER_WIDTH)?;
            }
            Command::DistanceVector { source } => {
                self.run_engine(&DistanceVectorEngine, source, DVRP_BANNER_WIDTH)?;
            }
            Command::Modify(link) => {
                self.topology
                    .modify_edge(link.source, link.destination, link.cost)?;
            }
            Command::Remove {
                source,
                destination,
            } => {
                if self.topology.remove_edge(source, destination)? == EdgeRemoval::NoSuchEdge {
                    self.notice(NoticeLevel::Info, "No such edge exists")?;
                }
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Writes command and routing failures as notices; anything else is
    /// returned to the caller.
    fn report_failure(&mut self, line: &str, err: anyhow::Error) -> Result<()> {
        let err = match err.downcast::<RoutingError>() {
            Ok(routing) => {
                warn!(line, error = %routing, "command failed");
                return self.notice(NoticeLevel::Error, &routing.to_string());
            }
            Err(other) => other,
        };
        match err.downcast::<CommandError>() {
            Ok(rejected) => {
                warn!(line, error = %rejected, "rejected command");
                self.notice(NoticeLevel::Rejected, &rejected.to_string())
            }
            Err(other) => Err(other),
        }
    }

    /// Runs `engine` from `source`, or once per node `1..=count` behind a
    /// banner when no source is given.
    fn run_engine<E>(&mut self, engine: &E, source: Option<u32>, banner_width: usize) -> Result<()>
    where
        E: RouteComputeEngine,
        E::Output: fmt::Display + Serialize,
    {
        if let Some(source) = source {
            let report = engine.compute(&self.topology, source)?;
            return self.emit(&report);
        }

        for source in 1..=self.topology.count() {
            if self.output.banners && self.output.format == OutputFormat::Text {
                let rule = "#".repeat(banner_width);
                writeln!(
                    self.out,
                    "{rule} {} - source: {source} {rule}",
                    engine.name().to_uppercase()
                )?;
            }
            let report = engine.compute(&self.topology, source)?;
            self.emit(&report)?;
        }
        Ok(())
    }

    fn emit<T>(&mut self, report: &T) -> Result<()>
    where
        T: fmt::Display + Serialize,
    {
        match self.output.format {
            OutputFormat::Text => write!(self.out, "{report}")?,
            OutputFormat::Json => self.write_json(report)?,
        }
        Ok(())
    }

    fn notice(&mut self, level: NoticeLevel, message: &str) -> Result<()> {
        match self.output.format {
            OutputFormat::Text if level == NoticeLevel::Error => {
                writeln!(self.out, "error: {message}")?
            }
            OutputFormat::Text => writeln!(self.out, "{message}")?,
            OutputFormat::Json => self.write_json(&NoticeLine { level, message })?,
        }
        Ok(())
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value).context("failed to encode output line")?;
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::Value;

    use super::*;

    const JSON: OutputConfig = OutputConfig {
        format: OutputFormat::Json,
        banners: true,
    };

    fn run_session(script: &str, output: OutputConfig) -> (Topology, String) {
        let mut shell = Shell::new(Topology::default(), output, Vec::new());
        shell.run(Cursor::new(script)).unwrap();
        let topology = shell.topology().clone();
        let text = String::from_utf8(shell.into_output()).unwrap();
        (topology, text)
    }

    fn json_lines(out: &str) -> Vec<Value> {
        out.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn builds_and_shows_topology() {
        let (topology, out) =
            run_session("topology 1-2-4 2-3-1\nshow\n", OutputConfig::default());
        assert_eq!(topology.count(), 3);
        assert!(out.starts_with("u|v\t|\t1\t2\t3\t\n"));
        assert!(out.contains("2\t|\t4\t0\t1\t\n"));
    }

    #[test]
    fn failures_are_reported_and_session_continues() {
        let script = "topology 1-1-3\n\
                      topology 1-2-5 1-2-7\n\
                      lsrp 9\n\
                      remove 2-3\n\
                      bogus\n\
                      modify 1-2\n\
                      show\n";
        let (topology, out) = run_session(script, OutputConfig::default());

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "error: source and destination cannot be the same");
        assert_eq!(lines[1], "error: topology already set");
        assert_eq!(lines[2], "error: invalid source node");
        assert_eq!(lines[3], "No such edge exists");
        assert_eq!(lines[4], "invalid command");
        assert_eq!(lines[5], "malformed link `1-2`, expected src-dest-cost");
        assert_eq!(lines[6], "u|v\t|\t1\t2\t");
        assert_eq!(topology.cost(1, 2), Some(5));
    }

    #[test]
    fn topology_applies_links_before_malformed_token() {
        let (topology, out) =
            run_session("topology 1-2-1 3-x-1 4-5-1\n", OutputConfig::default());
        assert_eq!(out, "invalid node id `x`\n");
        assert_eq!(topology.cost(1, 2), Some(1));
        assert_eq!(topology.cost(4, 5), None);
        assert_eq!(topology.count(), 2);
    }

    #[test]
    fn exit_stops_processing() {
        let (topology, out) =
            run_session("topology 1-2-1\nexit\ntopology 2-3-1\n", OutputConfig::default());
        assert_eq!(topology.count(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn lsrp_without_source_fans_out_with_banners() {
        let (_, out) =
            run_session("topology 1-2-1 2-3-1 1-3-5\nlsrp\n", OutputConfig::default());
        for source in 1..=3 {
            let banner = format!(
                "################# LSRP - source: {source} #################\n"
            );
            assert_eq!(out.matches(&banner).count(), 1);
        }
        assert!(out.contains("1  ->  3\t\t|\t\t2\t\t|\t1 -> 2 -> 3\n"));
        assert!(out.contains("3  ->  1\t\t|\t\t2\t\t|\t3 -> 2 -> 1\n"));
    }

    #[test]
    fn dvrp_single_source_prints_table() {
        let (_, out) =
            run_session("topology 1-2-1 2-3-1 1-3-5\ndvrp 1\n", OutputConfig::default());
        let expected = "Dest\t|\tNext Hop\t|\tDist\t|\tShortest Path\n\
                        -----------------------------------------------------------------------\n\
                        1\t\t|\t1\t\t\t|\t0\t\t|\t[1]\n\
                        2\t\t|\t1\t\t\t|\t1\t\t|\t[1 -> 2]\n\
                        3\t\t|\t2\t\t\t|\t2\t\t|\t[1 -> 2 -> 3]\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn dvrp_fan_out_uses_wide_banner() {
        let (_, out) = run_session("topology 1-2-1\ndvrp\n", OutputConfig::default());
        assert!(out.starts_with(
            "########################## DVRP - source: 1 ##########################\n"
        ));
    }

    #[test]
    fn json_output_emits_one_report_per_line() {
        let (_, out) = run_session("topology 1-2-1 3-4-1\ndvrp\n", JSON);

        let reports = json_lines(&out);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0]["source"], 1);
        assert!(reports[0]["routes"][3]["distance"].is_null());
        assert_eq!(reports[0]["routes"][3]["next_hop"], 1);
    }

    #[test]
    fn json_output_encodes_notices() {
        let (_, out) = run_session("topology 1-2-1\nremove 2-3\nlsrp 7\nbogus\nshow\n", JSON);

        let lines = json_lines(&out);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["message"], "No such edge exists");
        assert_eq!(lines[1]["level"], "error");
        assert_eq!(lines[1]["message"], "invalid source node");
        assert_eq!(lines[2]["level"], "rejected");
        assert_eq!(lines[2]["message"], "invalid command");
        assert_eq!(lines[3]["count"], 2);
    }

    #[test]
    fn remove_then_readd_round_trips() {
        let (topology, out) = run_session(
            "topology 1-2-5\nremove 1-2\ntopology 1-2-5\nmodify 3-4-9\nmodify 3-4-2\n",
            OutputConfig::default(),
        );
        assert!(out.is_empty());
        assert_eq!(topology.cost(1, 2), Some(5));
        assert_eq!(topology.cost(4, 3), Some(2));
    }
}
