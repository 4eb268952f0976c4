// crates/server/src/config.rs
//! Command-line configuration for the control server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use batch_control_core::DEFAULT_LOG_CAPACITY;
use clap::Parser;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 8000;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "warn,batch_control_core=info,batch_control_server=info,tower_http=info";

#[derive(Debug, Clone, Parser)]
#[command(name = "batch-control", version, about = "HTTP control plane for a single batch job")]
pub struct Config {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log entries kept between two polls of /logs.
    #[arg(long, default_value_t = DEFAULT_LOG_CAPACITY, value_parser = parse_capacity)]
    pub log_capacity: usize,

    /// Delay between items of the built-in batch task, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub step_ms: u64,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

fn parse_capacity(raw: &str) -> Result<usize, String> {
    let value: usize = raw
        .parse()
        .map_err(|e| format!("invalid capacity '{raw}': {e}"))?;
    if value == 0 {
        return Err("capacity must be at least 1".to_string());
    }
    Ok(value)
}
