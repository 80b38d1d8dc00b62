use std::str::FromStr;

use thiserror::Error;

const LINK_DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid command")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("malformed link `{0}`, expected src-dest-cost")]
    MalformedLink(String),
    #[error("invalid node id `{0}`")]
    InvalidNode(String),
    #[error("invalid cost `{0}`, expected a positive integer")]
    InvalidCost(String),
}

/// A `src-dest-cost` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpec {
    pub source: u32,
    pub destination: u32,
    pub cost: u32,
}

impl FromStr for LinkSpec {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = token.split(LINK_DELIMITER).collect();
        let [source, destination, cost] = parts.as_slice() else {
            return Err(CommandError::MalformedLink(token.to_string()));
        };
        Ok(Self {
            source: parse_node(source)?,
            destination: parse_node(destination)?,
            cost: parse_cost(cost)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Links up to the first malformed token, which is kept in `malformed`.
    Topology {
        links: Vec<LinkSpec>,
        malformed: Option<CommandError>,
    },
    Show,
    LinkState { source: Option<u32> },
    DistanceVector { source: Option<u32> },
    Modify(LinkSpec),
    Remove { source: u32, destination: u32 },
    Exit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let args: Vec<&str> = tokens.collect();

        match name {
            "topology" => {
                if args.is_empty() {
                    return Err(CommandError::Usage(
                        "topology src-dest-cost [src-dest-cost ...]",
                    ));
                }
                let mut links = Vec::with_capacity(args.len());
                let mut malformed = None;
                for token in &args {
                    match token.parse::<LinkSpec>() {
                        Ok(link) => links.push(link),
                        Err(err) => {
                            malformed = Some(err);
                            break;
                        }
                    }
                }
                Ok(Self::Topology { links, malformed })
            }
            "show" => Ok(Self::Show),
            "lsrp" => Ok(Self::LinkState {
                source: optional_source(&args)?,
            }),
            "dvrp" => Ok(Self::DistanceVector {
                source: optional_source(&args)?,
            }),
            "modify" => match args.as_slice() {
                [link] => Ok(Self::Modify(link.parse()?)),
                _ => Err(CommandError::Usage("modify src-dest-cost")),
            },
            "remove" => {
                let [pair] = args.as_slice() else {
                    return Err(CommandError::Usage("remove src-dest"));
                };
                let parts: Vec<&str> = pair.split(LINK_DELIMITER).collect();
                let [source, destination] = parts.as_slice() else {
                    return Err(CommandError::Usage("remove src-dest"));
                };
                Ok(Self::Remove {
                    source: parse_node(source)?,
                    destination: parse_node(destination)?,
                })
            }
            "exit" => Ok(Self::Exit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn optional_source(args: &[&str]) -> Result<Option<u32>, CommandError> {
    args.first().map(|token| parse_node(token)).transpose()
}

fn parse_node(token: &str) -> Result<u32, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidNode(token.to_string()))
}

fn parse_cost(token: &str) -> Result<u32, CommandError> {
    match token.parse::<u32>() {
        Ok(cost) if cost > 0 => Ok(cost),
        _ => Err(CommandError::InvalidCost(token.to_string())),
    }
}
