//! Station configuration from the command line.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use crate::domain::{InvalidStationName, StationName};
use crate::timetable::timetable_path;

/// Largest datagram accepted, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 15_000;

/// Capacity of the station's inbox.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Error validating command-line configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    StationName(#[from] InvalidStationName),

    #[error("UDP port {0} is also listed as a neighbour")]
    SelfNeighbour(u16),

    #[error("TCP and UDP ports must differ, both are {0}")]
    SharedPort(u16),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// Replies are matched on their source address, so the station needs
    /// an address its neighbours will answer from.
    #[error("host {0} is unspecified; give the address neighbours use to reach this station")]
    UnspecifiedHost(IpAddr),
}

/// Run one station of the distributed trip planner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Name of this station; its timetable is read from `tt-<NAME>`
    pub station_name: String,

    /// Port for client HTTP requests
    pub tcp_port: u16,

    /// Port for station-to-station datagrams
    pub udp_port: u16,

    /// UDP ports of directly adjacent stations
    pub neighbours: Vec<u16>,

    /// Address to bind and to reach neighbours on; must not be a wildcard
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Directory holding timetable files
    #[arg(long, default_value = ".")]
    pub timetable_dir: PathBuf,

    /// Largest datagram accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,

    /// Number of events the station can queue
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,
}

/// Validated configuration for one station.
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub name: StationName,
    pub host: IpAddr,
    pub tcp_port: u16,
    pub udp_port: u16,

    /// Neighbour UDP ports, all on `host`.
    pub neighbour_ports: Vec<u16>,

    pub timetable_dir: PathBuf,

    /// Datagrams longer than this are truncated on receipt and refused on
    /// send.
    pub max_message_size: usize,

    pub channel_capacity: usize,
}

impl StationConfig {
    /// Create a configuration with default limits.
    pub fn new(name: StationName, tcp_port: u16, udp_port: u16, neighbour_ports: Vec<u16>) -> Self {
        Self {
            name,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            tcp_port,
            udp_port,
            neighbour_ports,
            timetable_dir: PathBuf::from("."),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let name = StationName::parse(&args.station_name)?;

        if args.tcp_port == args.udp_port && args.tcp_port != 0 {
            return Err(ConfigError::SharedPort(args.tcp_port));
        }
        if args.neighbours.contains(&args.udp_port) {
            return Err(ConfigError::SelfNeighbour(args.udp_port));
        }
        if args.host.is_unspecified() {
            return Err(ConfigError::UnspecifiedHost(args.host));
        }
        if args.max_message_size == 0 {
            return Err(ConfigError::Zero("max message size"));
        }
        if args.channel_capacity == 0 {
            return Err(ConfigError::Zero("channel capacity"));
        }

        let mut neighbour_ports = args.neighbours;
        let mut seen = std::collections::HashSet::new();
        neighbour_ports.retain(|p| seen.insert(*p));

        Ok(Self {
            name,
            host: args.host,
            tcp_port: args.tcp_port,
            udp_port: args.udp_port,
            neighbour_ports,
            timetable_dir: args.timetable_dir,
            max_message_size: args.max_message_size,
            channel_capacity: args.channel_capacity,
        })
    }

    pub fn tcp_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.tcp_port)
    }

    pub fn udp_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.udp_port)
    }

    pub fn neighbour_addresses(&self) -> Vec<SocketAddr> {
        self.neighbour_ports
            .iter()
            .map(|p| SocketAddr::new(self.host, *p))
            .collect()
    }

    /// Location of this station's timetable file.
    pub fn timetable_path(&self) -> PathBuf {
        timetable_path(&self.timetable_dir, &self.name)
    }
}
