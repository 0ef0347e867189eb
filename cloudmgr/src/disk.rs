//! qcow2 disk files as the VM registry.
//!
//! A VM exists iff `<name>.qcow2` exists in the store directory. There is no
//! index to drift out of sync: every query hits the filesystem.
//!
//! # Layout
//!
//! ```text
//! {vm_dir}/
//!   {name}.qcow2    — one disk per VM
//! ```

use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::{Error, Result};

/// File suffix that marks a VM disk.
pub const DISK_SUFFIX: &str = ".qcow2";

/// Filesystem-backed registry of VM disks.
#[derive(Debug, Clone, Default)]
pub struct DiskStore {
    /// Directory holding the disks. Empty means the current directory.
    dir: PathBuf,
}

impl DiskStore {
    /// Uses `dir` as the disk directory. Nothing is created.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory scanned by [`list`](Self::list).
    pub fn dir(&self) -> &Path {
        if self.dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            &self.dir
        }
    }

    /// Returns the disk path for a VM (may or may not exist).
    ///
    /// With the default (empty) directory this is the bare file name.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{DISK_SUFFIX}"))
    }

    /// Rejects names that would resolve outside the store directory.
    pub fn check_name(name: &str) -> Result<()> {
        if name.contains(['/', '\\']) {
            return Err(Error::InvalidVmName(name.to_owned()));
        }
        Ok(())
    }

    /// Returns `true` if the VM's disk exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Lists VM names (suffix stripped) in directory enumeration order.
    ///
    /// The order is whatever the filesystem yields; callers must not rely
    /// on it being sorted.
    pub fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let file_name = entry.file_name();
            if let Some(s) = file_name.to_str()
                && let Some(name) = s.strip_suffix(DISK_SUFFIX)
            {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    /// Removes a VM's disk. Fails with [`Error::DiskNotFound`] if absent.
    pub fn remove(&self, name: &str) -> Result<()> {
        Self::check_name(name)?;
        let path = self.path(name);
        if !path.exists() {
            return Err(Error::DiskNotFound(path));
        }
        fs::remove_file(&path)?;
        tracing::info!(path = %path.display(), "vm disk removed");
        Ok(())
    }
}
