//! Configuration records for the tagfig demo application.
//!
//! [`DemoConfig`] nests a [`ServerConfig`] behind an `Option<Box<_>>` and
//! keeps a list of [`Upstream`] records, so the demo exercises reference
//! allocation, sequences of records and maps of records.
//!
//! Every field carries identifiers for all three formats; the active format
//! picks which one is used.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use tagfig::{BoxError, Validate, record};

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub server: Option<Box<ServerConfig>>,
    pub upstreams: Vec<Upstream>,
    pub limits: BTreeMap<String, u32>,
    pub color: String,
}

record! {
    DemoConfig {
        name: r#"yaml:"name" json:"name" toml:"name" default:"tagfig-demo" desc:"Application name shown in the banner""#,
        verbose: r#"yaml:"verbose" json:"verbose" toml:"verbose" desc:"Enable verbose output""#,
        server: r#"yaml:"server" json:"server" toml:"server" desc:"Server settings""#,
        upstreams: r#"yaml:"upstreams" json:"upstreams" toml:"upstreams" default:"primary,fallback""#,
        limits: r#"yaml:"limits" json:"limits" toml:"limits" default:"read,write""#,
        color: r#"yaml:"color" json:"color" toml:"color" default:"yellow" option:"red,green,yellow,blue""#,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_connections: u32,
    pub timeout_ms: u64,
}

record! {
    ServerConfig {
        bind: r#"yaml:"bind" json:"bind" toml:"bind" default:"127.0.0.1:3000" desc:"Address to listen on""#,
        max_connections: r#"yaml:"maxConnections" json:"maxConnections" toml:"max_connections" default:"100" desc:"Maximum number of open connections""#,
        timeout_ms: r#"yaml:"timeoutMs" json:"timeoutMs" toml:"timeout_ms" default:"2500""#,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upstream {
    pub url: String,
    pub weight: u8,
}

record! {
    Upstream {
        url: r#"yaml:"url" json:"url" toml:"url" default:"http://localhost:8080""#,
        weight: r#"yaml:"weight" json:"weight" toml:"weight" default:"1""#,
    }
}

impl Validate for DemoConfig {
    fn validate(&self) -> Result<bool, BoxError> {
        if self.name.is_empty() {
            return Err("name must not be empty".into());
        }
        if let Some(server) = &self.server
            && server.max_connections == 0
        {
            return Err("server.max_connections must be positive".into());
        }
        Ok(self.upstreams.iter().any(|upstream| upstream.weight > 0))
    }
}
