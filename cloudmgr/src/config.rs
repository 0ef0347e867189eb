//! Tunables shared by the engine and VM façades.

use std::path::PathBuf;

use crate::{DiskStore, Engine, Qemu, Runner};

/// Base image used when the guided Dockerfile prompt is left blank.
pub const DEFAULT_BASE_IMAGE: &str = "python:3.12-slim";

/// Start command used when the guided Dockerfile prompt is left blank.
pub const DEFAULT_START_COMMAND: &str = "python app.py";

/// Runtime settings: which binaries to call and where VM disks live.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Container engine CLI (`docker`).
    pub docker: String,
    /// Disk image tool (`qemu-img`).
    pub qemu_img: String,
    /// Machine emulator (`qemu-system-x86_64`).
    pub qemu_system: String,
    /// Directory holding `<name>.qcow2` disks. Empty means the current directory.
    pub vm_dir: PathBuf,
    /// Default `FROM` image for guided Dockerfiles.
    pub base_image: String,
    /// Default `CMD` for guided Dockerfiles.
    pub start_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker: "docker".to_owned(),
            qemu_img: "qemu-img".to_owned(),
            qemu_system: "qemu-system-x86_64".to_owned(),
            vm_dir: PathBuf::new(),
            base_image: DEFAULT_BASE_IMAGE.to_owned(),
            start_command: DEFAULT_START_COMMAND.to_owned(),
        }
    }
}

impl Settings {
    /// Sets the container engine binary.
    #[must_use]
    pub fn docker(mut self, program: impl Into<String>) -> Self {
        self.docker = program.into();
        self
    }

    /// Sets the disk image tool binary.
    #[must_use]
    pub fn qemu_img(mut self, program: impl Into<String>) -> Self {
        self.qemu_img = program.into();
        self
    }

    /// Sets the machine emulator binary.
    #[must_use]
    pub fn qemu_system(mut self, program: impl Into<String>) -> Self {
        self.qemu_system = program.into();
        self
    }

    /// Sets the VM disk directory.
    #[must_use]
    pub fn vm_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.vm_dir = dir.into();
        self
    }

    /// Builds an [`Engine`] for the configured docker binary.
    pub fn engine<R: Runner>(&self, runner: R) -> Engine<R> {
        Engine::new(runner, &self.docker)
    }

    /// Builds a [`Qemu`] façade for the configured binaries and disk dir.
    pub fn qemu<R: Runner>(&self, runner: R) -> Qemu<R> {
        Qemu::new(
            runner,
            &self.qemu_img,
            &self.qemu_system,
            DiskStore::new(&self.vm_dir),
        )
    }
}
