use clap::{Args, Subcommand};
use std::path::PathBuf;
use ventlink_backend::MessageType;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod crc;
pub mod decode;
pub mod encode;
pub mod schedule;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the CRC-32C of some bytes.
    Crc(CrcArgs),
    /// Encode one state value into a complete wire frame.
    Encode(EncodeArgs),
    /// Decode captured wire frames.
    Decode(DecodeArgs),
    /// Show the state broadcast schedule.
    Schedule(ScheduleArgs),
    /// Run a device and a host backend against each other.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Crc(args) => crc::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Schedule(args) => schedule::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CrcArgs {
    /// Input bytes as hex.
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    pub hex: Option<String>,
    /// Input as a UTF-8 string.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// State kind, e.g. `sensor_measurements`.
    pub kind: MessageType,
    /// State value as JSON. Missing fields default to zero.
    #[arg(long)]
    pub json: Option<String>,
    /// Datagram sequence number.
    #[arg(long, default_value = "0")]
    pub sequence: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Wire bytes as hex. A missing trailing delimiter is added.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// JSON schedule or backend config file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of clock ticks to run.
    #[arg(long, default_value = "90")]
    pub ticks: u32,
    /// JSON schedule or backend config file for the device side.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Drop every Nth device frame on the wire.
    #[arg(long, value_name = "N")]
    pub drop_every: Option<u32>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
