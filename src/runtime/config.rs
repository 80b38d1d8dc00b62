use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::model::topology::{check_capacity, Topology, DEFAULT_MAX_NODES};
use crate::runtime::command::LinkSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub banners: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            banners: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub max_nodes: u32,
    pub output: OutputConfig,
    pub links: Vec<LinkSpec>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            output: OutputConfig::default(),
            links: Vec::new(),
        }
    }
}

impl SimConfig {
    /// Builds the startup topology, applying configured links with strict add.
    pub fn build_topology(&self) -> Result<Topology> {
        let mut topology = Topology::new(self.max_nodes)?;
        for link in &self.links {
            topology
                .add_edge(link.source, link.destination, link.cost)
                .with_context(|| {
                    format!(
                        "invalid configured link {}-{}-{}",
                        link.source, link.destination, link.cost
                    )
                })?;
        }
        Ok(topology)
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawOutput {
    format: Option<OutputFormat>,
    banners: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLink {
    Token(String),
    Fields {
        source: u32,
        destination: u32,
        cost: u32,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawSimConfig {
    max_nodes: Option<u32>,
    output: Option<RawOutput>,
    #[serde(default)]
    topology: Vec<RawLink>,
}

pub fn load_sim_config(path: &Path) -> Result<SimConfig> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_sim_config(&raw_text)
}

pub fn parse_sim_config(raw_text: &str) -> Result<SimConfig> {
    let raw_cfg: RawSimConfig =
        serde_yaml::from_str(raw_text).context("failed to parse simulator config yaml")?;

    let max_nodes = raw_cfg.max_nodes.unwrap_or(DEFAULT_MAX_NODES);
    check_capacity(max_nodes).context("invalid max_nodes")?;

    let output_raw = raw_cfg.output.unwrap_or_default();
    let output = OutputConfig {
        format: output_raw.format.unwrap_or_default(),
        banners: output_raw.banners.unwrap_or(true),
    };

    let links = raw_cfg
        .topology
        .into_iter()
        .map(|item| match item {
            RawLink::Token(token) => token
                .parse::<LinkSpec>()
                .with_context(|| format!("invalid topology entry: {token}")),
            RawLink::Fields {
                source,
                destination,
                cost,
            } => Ok(LinkSpec {
                source,
                destination,
                cost,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SimConfig {
        max_nodes,
        output,
        links,
    })
}
