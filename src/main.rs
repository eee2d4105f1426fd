//! bootlock - boot flash lockdown controller
//!
//! A one-way protection switch for the 512 KiB boot area of SPI NOR flash.
//! Once engaged, the volatile sector lock bits keep the area read-only until
//! the next power cycle, so a compromised host cannot rewrite early boot
//! code at runtime.
//!
//! Two transports reach the chip:
//! - **aspeed** (default) - maps the SPI controller registers via /dev/mem
//!   and bit-bangs the commands in user mode
//! - **mtd** - rides a flash driver's read/write entry points with the lock
//!   opcodes substituted per transaction; the kernel MTD layer itself does
//!   not forward opcodes, so this path refuses lock commands rather than
//!   rewriting them into data transfers

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Status(args) => commands::lock::cmd_status(&args),
        Commands::Engage(args) => commands::lock::cmd_engage(&args),
    }
}
