//! QEMU virtual machines: config validation and the create sequence.
//!
//! Creating a VM is two separate invocations, never combined:
//!
//! 1. `qemu-img create -f qcow2 <name>.qcow2 <disk>`
//! 2. `qemu-system-x86_64 -m <ram> -smp <cpu> -hda <name>.qcow2`
//!
//! The launch is only attempted when disk creation exits zero.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::{DiskStore, Error, Report, Result, Runner, Shape};

/// A validated VM description. All fields are non-empty, trimmed text.
///
/// Numeric fields stay text: QEMU takes them as arguments verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    name: String,
    ram: String,
    cpu: String,
    disk: String,
}

/// On-disk shape of a VM config: every field optional, string or number.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default, deserialize_with = "text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    ram: Option<String>,
    #[serde(default, deserialize_with = "text")]
    cpu: Option<String>,
    #[serde(default, deserialize_with = "text")]
    disk: Option<String>,
}

/// Accepts a JSON string or number; anything else counts as absent.
fn text<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl VmConfig {
    /// Validates the four fields. Any blank field fails with
    /// [`Error::IncompleteVm`]; a name with a path separator fails with
    /// [`Error::InvalidVmName`].
    pub fn new(name: &str, ram: &str, cpu: &str, disk: &str) -> Result<Self> {
        let fields = [name, ram, cpu, disk].map(str::trim);
        if fields.iter().any(|f| f.is_empty()) {
            return Err(Error::IncompleteVm);
        }
        DiskStore::check_name(fields[0])?;
        let [name, ram, cpu, disk] = fields.map(str::to_owned);
        Ok(Self {
            name,
            ram,
            cpu,
            disk,
        })
    }

    /// Parses a JSON config object. Extra fields are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json).map_err(Error::ConfigParse)?;
        let field = |v: &Option<String>| v.as_deref().unwrap_or_default().to_owned();
        Self::new(
            &field(&raw.name),
            &field(&raw.ram),
            &field(&raw.cpu),
            &field(&raw.disk),
        )
        .map_err(|e| match e {
            Error::IncompleteVm => Error::IncompleteConfig,
            e => e,
        })
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// VM name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Memory size in MB.
    pub fn ram(&self) -> &str {
        &self.ram
    }

    /// Number of virtual CPUs.
    pub fn cpu(&self) -> &str {
        &self.cpu
    }

    /// Disk size (e.g. `5G`).
    pub fn disk(&self) -> &str {
        &self.disk
    }
}

/// Argument-vector builders for QEMU.
pub mod commands {
    use std::path::Path;

    use crate::Invocation;

    /// `qemu-img create -f qcow2 <disk_file> <size>`.
    pub fn create_disk(qemu_img: &str, disk_file: &Path, size: &str) -> Invocation {
        Invocation::new(
            qemu_img,
            [
                "create".to_owned(),
                "-f".to_owned(),
                "qcow2".to_owned(),
                disk_file.to_string_lossy().into_owned(),
                size.to_owned(),
            ],
        )
    }

    /// `qemu-system-x86_64 -m <ram> -smp <cpu> -hda <disk_file>`.
    pub fn launch(qemu_system: &str, ram: &str, cpu: &str, disk_file: &Path) -> Invocation {
        Invocation::new(
            qemu_system,
            [
                "-m".to_owned(),
                ram.to_owned(),
                "-smp".to_owned(),
                cpu.to_owned(),
                "-hda".to_owned(),
                disk_file.to_string_lossy().into_owned(),
            ],
        )
    }
}

/// Progress step reported by [`Qemu::create`] before each invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// About to create the disk image.
    CreatingDisk,
    /// About to launch the machine.
    Launching,
}

/// Outcome of [`Qemu::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Disk creation report.
    pub disk: Report,
    /// Launch report; `None` when disk creation failed and launch was skipped.
    pub machine: Option<Report>,
}

/// QEMU façade over a [`Runner`] and a [`DiskStore`].
#[derive(Debug, Clone)]
pub struct Qemu<R> {
    runner: R,
    qemu_img: String,
    qemu_system: String,
    disks: DiskStore,
}

impl<R: Runner> Qemu<R> {
    /// Creates a façade invoking the given binaries through `runner`.
    pub fn new(
        runner: R,
        qemu_img: impl Into<String>,
        qemu_system: impl Into<String>,
        disks: DiskStore,
    ) -> Self {
        Self {
            runner,
            qemu_img: qemu_img.into(),
            qemu_system: qemu_system.into(),
            disks,
        }
    }

    /// Disk registry backing this façade.
    pub const fn disks(&self) -> &DiskStore {
        &self.disks
    }

    /// Creates the disk, then launches the VM with it attached.
    ///
    /// Fails with [`Error::DiskExists`] before any invocation if the disk is
    /// already present. `progress` is called before each step.
    pub fn create(&self, cfg: &VmConfig, mut progress: impl FnMut(Step)) -> Result<Created> {
        let disk_file = self.disks.path(cfg.name());
        if disk_file.exists() {
            return Err(Error::DiskExists(disk_file));
        }

        progress(Step::CreatingDisk);
        let res = self.runner.capture(&commands::create_disk(
            &self.qemu_img,
            &disk_file,
            cfg.disk(),
        ))?;
        let disk = Report::from_result(&res, Shape::Line);
        if !disk.is_success() {
            tracing::warn!(vm = cfg.name(), "disk creation failed; not launching");
            return Ok(Created {
                disk,
                machine: None,
            });
        }

        progress(Step::Launching);
        let res = self.runner.capture(&commands::launch(
            &self.qemu_system,
            cfg.ram(),
            cfg.cpu(),
            &disk_file,
        ))?;
        Ok(Created {
            disk,
            machine: Some(Report::from_result(&res, Shape::Block)),
        })
    }
}
