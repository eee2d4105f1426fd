//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bootlock")]
#[command(author, version, about = "Boot flash lockdown controller", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// How to reach the boot flash
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Drive the SPI controller registers directly via /dev/mem
    Aspeed,
    /// Go through the kernel MTD driver. MTD gives userspace no control
    /// over the opcode on the wire, so lock commands are refused on this
    /// path; it exists for drivers that do forward configured opcodes.
    Mtd,
}

/// Device selection shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    /// MTD partition name of the boot flash (mtd transport only)
    #[arg(short, long, default_value = "bmc")]
    pub device: String,

    /// Transport used to reach the flash
    #[arg(short, long, value_enum, default_value_t = TransportKind::Aspeed)]
    pub transport: TransportKind,

    /// Maximum busy polls before giving up on the chip
    #[arg(long, default_value_t = 1_000_000)]
    pub poll_limit: u32,

    /// SPI clock divider (aspeed transport only)
    #[arg(long, default_value_t = 6)]
    pub clock_div: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report whether the boot area is fully locked
    Status(DeviceArgs),

    /// Permanently lock the boot area until the next power cycle
    Engage(DeviceArgs),
}
