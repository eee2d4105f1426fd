//! Lock engine
//!
//! The orchestrator for both operations the control surface exposes: query
//! the aggregate lock state of the boot area, and engage lockdown. Each
//! invocation follows the same shape:
//!
//! 1. acquire the device mutex (blocking)
//! 2. prepare the transport (device prepare hook / user-control mode)
//! 3. identify the chip and gate on the allow-list
//! 4. walk the boot range at lock-region granularity
//! 5. unprepare, unconditionally once prepare has succeeded
//! 6. release the mutex on guard drop
//!
//! A fault mid-walk aborts the walk but never skips cleanup, and nothing is
//! retried: flash command failure is exceptional and caller-visible.
//!
//! The mutex passed in is the same one every other consumer of the flash
//! device must take; the prepare/unprepare bracketing assumes exclusive
//! ownership of the bus for its whole duration.

use crate::chip;
use crate::error::{Error, Result};
use crate::region;
use crate::transport::LockTransport;
use log::{debug, info, warn};
use std::sync::Mutex;

/// Aggregate protection state of the boot area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// Every lock region reports both lock bits set
    Locked,
    /// At least one region is not fully locked
    Unlocked,
}

impl LockStatus {
    /// The textual token the control surface publishes
    pub fn token(&self) -> &'static str {
        match self {
            LockStatus::Locked => "1",
            LockStatus::Unlocked => "0",
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LockStatus::Locked)
    }
}

/// Bound on the busy-wait spin before a write-type command.
///
/// The chip is expected to clear its busy bit within bounded real time; the
/// bound exists so a wedged chip surfaces as [`Error::Timeout`] instead of
/// an infinite spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLimit {
    /// Maximum number of busy re-reads per wait, on top of the initial
    /// status read
    pub max_polls: u32,
}

impl Default for PollLimit {
    fn default() -> Self {
        Self {
            max_polls: 1_000_000,
        }
    }
}

/// Query the aggregate lock state of the boot area.
///
/// Short-circuits to [`LockStatus::Unlocked`] on the first region whose
/// lock bits are not both set; no further region is read after that.
pub fn query<T: LockTransport>(shared: &Mutex<T>) -> Result<LockStatus> {
    with_session(shared, |t| {
        for addr in region::boot_regions() {
            let bits = t.read_lock_bits(addr)?;
            if bits & chip::SECTOR_LOCK_BITS != chip::SECTOR_LOCK_BITS {
                debug!("region 0x{:08x} not locked (bits {:#04b})", addr, bits);
                return Ok(LockStatus::Unlocked);
            }
        }
        Ok(LockStatus::Locked)
    })
}

/// Engage lockdown over the whole boot area.
///
/// Every region is written, with no early exit, so repeating the operation
/// is safe and always converges on the fully-locked terminal state. After
/// the walk the range is read back once; a region that did not take fails
/// the call with [`Error::VerifyFailed`]. Returns the number of regions
/// written.
pub fn engage<T: LockTransport>(shared: &Mutex<T>, limit: PollLimit) -> Result<u32> {
    with_session(shared, |t| {
        let mut written = 0u32;
        for addr in region::boot_regions() {
            wait_ready(t, limit)?;
            t.write_lock_bits(addr, chip::SECTOR_LOCK_BITS)?;
            written += 1;
        }

        wait_ready(t, limit)?;
        for addr in region::boot_regions() {
            let bits = t.read_lock_bits(addr)?;
            if bits & chip::SECTOR_LOCK_BITS != chip::SECTOR_LOCK_BITS {
                return Err(Error::VerifyFailed { addr, bits });
            }
        }

        info!("boot area lockdown engaged, {} regions", written);
        Ok(written)
    })
}

/// Spin on the status register until the chip reports not busy.
/// The status is read at least once, even with a zero poll budget, so an
/// idle chip never times out.
pub fn wait_ready<T: LockTransport + ?Sized>(t: &mut T, limit: PollLimit) -> Result<()> {
    for _ in 0..=limit.max_polls {
        if !t.is_busy()? {
            return Ok(());
        }
    }
    warn!("flash stayed busy for {} polls", limit.max_polls);
    Err(Error::Timeout)
}

/// Run one engine invocation: lock, prepare, gate on the chip id, run the
/// walk, then unprepare. Unprepare runs on every path once prepare has
/// succeeded; the mutex releases when the guard drops.
fn with_session<T, R, F>(shared: &Mutex<T>, walk: F) -> Result<R>
where
    T: LockTransport,
    F: FnOnce(&mut T) -> Result<R>,
{
    let mut t = shared.lock().map_err(|_| Error::ResourceUnavailable)?;
    t.prepare()?;
    let result = gate_and_walk(&mut *t, walk);
    t.unprepare();
    result
}

fn gate_and_walk<T, R, F>(t: &mut T, walk: F) -> Result<R>
where
    T: LockTransport,
    F: FnOnce(&mut T) -> Result<R>,
{
    let id = t.identify()?;
    match chip::find(id) {
        Some(c) if c.lockable => debug!("identified {} ({:06x})", c.name, id),
        Some(c) => {
            warn!("{} ({:06x}) has no volatile lock support", c.name, id);
            return Err(Error::UnsupportedChip { id });
        }
        None => {
            warn!("unknown flash chip {:06x}", id);
            return Err(Error::UnsupportedChip { id });
        }
    }
    walk(t)
}
