//! MTD device discovery and the NorDevice binding

use crate::error::{MtdError, Result};
use bootlock_core::device::{NorConfig, NorDevice, OpKind};
use bootlock_core::error::Error as CoreError;
use bootlock_core::opcodes;
use log::{debug, info, warn};
use nix::sys::uio::{pread, pwrite};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Sysfs root for MTD devices
const MTD_SYSFS_ROOT: &str = "/sys/class/mtd";

/// Device node root
const DEV_ROOT: &str = "/dev";

/// MTD_WRITEABLE from the kernel headers
const MTD_WRITEABLE: u64 = 0x400;

/// Metadata read from sysfs while binding
#[derive(Debug, Clone)]
pub struct MtdInfo {
    /// Partition name from sysfs
    pub name: String,
    /// Total size in bytes
    pub total_size: u64,
    /// Erase block size in bytes
    pub erase_size: u64,
    /// Whether the device is writable
    pub is_writable: bool,
}

/// The boot flash, bound by MTD partition name
pub struct MtdNor {
    file: File,
    dev_num: u32,
    info: MtdInfo,
    config: NorConfig,
}

impl MtdNor {
    /// Resolve `name` across `/sys/class/mtd`, validate the device type is
    /// `nor`, and open its character device read-write.
    pub fn open_by_name(name: &str) -> Result<Self> {
        let dev_num = find_by_name(name)?;
        let sysfs_path = format!("{}/mtd{}", MTD_SYSFS_ROOT, dev_num);

        let mtd_type = read_sysfs_string(&sysfs_path, "type")?;
        if mtd_type != "nor" {
            return Err(MtdError::NotNorFlash {
                name: name.to_string(),
                mtd_type,
            });
        }

        let flags = read_sysfs_int(&sysfs_path, "flags")?;
        let info = MtdInfo {
            name: name.to_string(),
            total_size: read_sysfs_int(&sysfs_path, "size")?,
            erase_size: read_sysfs_int(&sysfs_path, "erasesize")?,
            is_writable: flags & MTD_WRITEABLE != 0,
        };

        let dev_path = format!("{}/mtd{}", DEV_ROOT, dev_num);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&dev_path)
            .map_err(|source| MtdError::Open {
                path: dev_path.clone(),
                source,
            })?;

        info!(
            "bound {} to '{}' (size {} bytes, erase size {}, writable: {})",
            dev_path, info.name, info.total_size, info.erase_size, info.is_writable
        );

        Ok(Self {
            file,
            dev_num,
            info,
            config: NorConfig::default(),
        })
    }

    pub fn info(&self) -> &MtdInfo {
        &self.info
    }

    pub fn dev_num(&self) -> u32 {
        self.dev_num
    }

    #[cfg(test)]
    fn with_file(file: File) -> Self {
        Self {
            file,
            dev_num: 0,
            info: MtdInfo {
                name: "test".to_string(),
                total_size: 32 * 1024 * 1024,
                erase_size: 4096,
                is_writable: true,
            },
            config: NorConfig::default(),
        }
    }
}

impl NorDevice for MtdNor {
    fn config(&self) -> &NorConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut NorConfig {
        &mut self.config
    }

    fn prepare(&mut self, kind: OpKind) -> bootlock_core::Result<()> {
        // The MTD layer always issues its own flash commands; there is no
        // userspace control over the opcode on the wire, so a lock-bit
        // session cannot be carried here.
        if kind == OpKind::LockBits {
            warn!(
                "mtd{}: MTD offers no opcode control, refusing lock session",
                self.dev_num
            );
            return Err(CoreError::LockUnsupported);
        }
        debug!("mtd{}: suspending normal flash access for {:?}", self.dev_num, kind);
        Ok(())
    }

    fn unprepare(&mut self, kind: OpKind) {
        debug!("mtd{}: resuming normal flash access after {:?}", self.dev_num, kind);
    }

    fn read_at(&mut self, addr: u32, buf: &mut [u8]) -> bootlock_core::Result<usize> {
        // A substituted opcode would silently read flash data instead.
        if self.config.read_opcode != opcodes::FAST_READ {
            return Err(CoreError::LockUnsupported);
        }
        pread(&self.file, buf, i64::from(addr)).map_err(|_| CoreError::Io)
    }

    fn write_at(&mut self, addr: u32, data: &[u8]) -> bootlock_core::Result<usize> {
        // A substituted opcode would program its payload into the boot
        // firmware as data.
        if self.config.program_opcode != opcodes::PP {
            return Err(CoreError::LockUnsupported);
        }
        pwrite(&self.file, data, i64::from(addr)).map_err(|_| CoreError::Io)
    }
}

/// Scan `/sys/class/mtd` for a device whose `name` attribute matches.
/// Read-only shadow devices (`mtdNro`) are skipped.
fn find_by_name(name: &str) -> Result<u32> {
    let root = Path::new(MTD_SYSFS_ROOT);
    let entries = std::fs::read_dir(root).map_err(|source| MtdError::SysfsRead {
        path: MTD_SYSFS_ROOT.to_string(),
        source,
    })?;

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let dir = file_name.to_string_lossy();
        let Some(num) = dir.strip_prefix("mtd").and_then(|n| n.parse::<u32>().ok()) else {
            continue;
        };

        let sysfs_path = format!("{}/mtd{}", MTD_SYSFS_ROOT, num);
        match read_sysfs_string(&sysfs_path, "name") {
            Ok(dev_name) if dev_name == name => return Ok(num),
            Ok(_) => {}
            Err(e) => debug!("skipping mtd{}: {}", num, e),
        }
    }

    Err(MtdError::DeviceNotFound(name.to_string()))
}

/// Read a sysfs attribute and strip trailing whitespace and non-printable
/// characters
fn read_sysfs_string(sysfs_path: &str, attribute: &str) -> Result<String> {
    let path = format!("{}/{}", sysfs_path, attribute);
    let content = std::fs::read_to_string(&path).map_err(|source| MtdError::SysfsRead {
        path: path.clone(),
        source,
    })?;

    let sanitized: String = content
        .chars()
        .take_while(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    Ok(sanitized.trim_end().to_string())
}

/// Read a sysfs attribute as an integer; both hex (`0x...`) and decimal
/// forms occur in the wild
fn read_sysfs_int(sysfs_path: &str, attribute: &str) -> Result<u64> {
    let value = read_sysfs_string(sysfs_path, attribute)?;
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        value.parse::<u64>()
    };

    parsed.map_err(|_| MtdError::SysfsParse {
        path: format!("{}/{}", sysfs_path, attribute),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootlock_core::delegate::DelegatedTransport;
    use bootlock_core::transport::LockTransport;
    use std::io::Write;
    use std::path::PathBuf;

    fn scratch_nor(tag: &str, contents: &[u8]) -> (PathBuf, MtdNor) {
        let path =
            std::env::temp_dir().join(format!("bootlock-mtd-{}-{}", tag, std::process::id()));
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        file.write_all(contents).unwrap();
        (path, MtdNor::with_file(file))
    }

    #[test]
    fn lock_session_is_refused() {
        let (path, mut dev) = scratch_nor("prepare", &[0u8; 16]);
        assert_eq!(
            dev.prepare(OpKind::LockBits),
            Err(CoreError::LockUnsupported)
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn substituted_opcodes_never_reach_the_data_path() {
        let contents = [0xaau8; 16];
        let (path, dev) = scratch_nor("substitute", &contents);
        let mut transport = DelegatedTransport::new(dev).unwrap();

        // Would otherwise come back as the first data byte.
        assert_eq!(transport.read_lock_bits(0), Err(CoreError::LockUnsupported));

        // Would otherwise program 0x03 into the boot firmware.
        assert_eq!(
            transport.write_lock_bits(0, 0b11),
            Err(CoreError::LockUnsupported)
        );
        assert_eq!(std::fs::read(&path).unwrap(), contents);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn plain_data_reads_pass_through() {
        let (path, mut dev) = scratch_nor("data", b"boot firmware bytes");
        let mut buf = [0u8; 4];
        assert_eq!(dev.read_at(5, &mut buf), Ok(4));
        assert_eq!(&buf, b"firm");
        std::fs::remove_file(path).unwrap();
    }
}
