//! Lock status and engage commands

use crate::cli::{DeviceArgs, TransportKind};
use bootlock_core::delegate::DelegatedTransport;
use bootlock_core::device::NorConfig;
use bootlock_core::engine::{self, PollLimit};
use bootlock_core::transport::LockTransport;
use bootlock_mtd::MtdNor;
use std::error::Error;
use std::sync::Mutex;

/// Print "1" if every lock region of the boot area is fully locked,
/// "0" otherwise.
pub fn cmd_status(args: &DeviceArgs) -> Result<(), Box<dyn Error>> {
    match args.transport {
        TransportKind::Mtd => run_status(open_mtd(args)?),
        TransportKind::Aspeed => run_status(open_aspeed(args)?),
    }
}

/// Lock the whole boot area.
pub fn cmd_engage(args: &DeviceArgs) -> Result<(), Box<dyn Error>> {
    match args.transport {
        TransportKind::Mtd => run_engage(open_mtd(args)?, args),
        TransportKind::Aspeed => run_engage(open_aspeed(args)?, args),
    }
}

fn open_mtd(args: &DeviceArgs) -> Result<DelegatedTransport<MtdNor>, Box<dyn Error>> {
    let dev = MtdNor::open_by_name(&args.device)?;
    Ok(DelegatedTransport::new(dev)?)
}

fn open_aspeed(
    args: &DeviceArgs,
) -> Result<bootlock_aspeed::AspeedTransport<bootlock_aspeed::PhysMap>, Box<dyn Error>> {
    Ok(bootlock_aspeed::open(&NorConfig::default(), args.clock_div)?)
}

fn run_status<T: LockTransport>(transport: T) -> Result<(), Box<dyn Error>> {
    let shared = Mutex::new(transport);
    let status = engine::query(&shared)?;
    println!("{}", status.token());
    Ok(())
}

fn run_engage<T: LockTransport>(transport: T, args: &DeviceArgs) -> Result<(), Box<dyn Error>> {
    let shared = Mutex::new(transport);
    let limit = PollLimit {
        max_polls: args.poll_limit,
    };
    let written = engine::engage(&shared, limit)?;
    log::info!("boot area locked ({} regions)", written);
    println!("{}", engine::query(&shared)?.token());
    Ok(())
}
