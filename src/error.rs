//! Error types for the planner, the wire protocol and the UDP client

use thiserror::Error;

/// Planning failures. Search exhaustion is not an error, it yields "no move".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("{what} position ({x}, {y}) is outside the {width}x{height} arena")]
    OutOfBounds {
        what: &'static str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("no valid target found after {attempts} re-selection attempts")]
    NoValidTarget { attempts: u32 },
}

/// Malformed server datagrams
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("missing {0} section")]
    MissingSection(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid coordinate '{0}'")]
    InvalidCoord(String),

    #[error("unknown direction token '{0}'")]
    UnknownToken(char),

    #[error("player index {index} out of range for {count} players")]
    PlayerOutOfRange { index: usize, count: usize },
}

/// Client loop failures
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("configuration error: {0}")]
    Config(String),
}
