//! Error types for cloudmgr operations.

use std::path::PathBuf;

/// Alias for `Result<T, cloudmgr::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by cloudmgr operations.
///
/// A non-zero exit from an external tool is not an error: it is reported
/// through [`Report::Failure`](crate::Report::Failure). Every variant here
/// aborts the operation before (or instead of) the external invocation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required field was empty or whitespace-only.
    #[error("{0} cannot be empty.")]
    EmptyField(&'static str),

    /// One or more of the VM fields (name, ram, cpu, disk) was blank.
    #[error("All fields are required.")]
    IncompleteVm,

    /// A VM config file parsed but lacked one of the required fields.
    #[error("Config missing required fields: name, ram, cpu, disk")]
    IncompleteConfig,

    /// The container engine did not answer its diagnostic command.
    #[error("Docker Engine is not running. Please start Docker.")]
    EngineUnavailable,

    /// The external binary could not be found on `PATH`.
    #[error("{program} is not installed (not found on PATH).")]
    ToolMissing {
        /// Program name that failed to spawn.
        program: String,
    },

    /// The Dockerfile passed to a build does not exist.
    #[error("Dockerfile not found: {}", .0.display())]
    DockerfileNotFound(PathBuf),

    /// The file to copy into a new Dockerfile does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The VM config file does not exist.
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The VM config file is not valid JSON for a config object.
    #[error("Failed to read config: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// A VM disk with this name already exists.
    #[error("Disk file already exists: {}", .0.display())]
    DiskExists(PathBuf),

    /// A VM name that would place its disk outside the store directory.
    #[error("Invalid VM name '{0}': path separators are not allowed.")]
    InvalidVmName(String),

    /// No VM disk with this name exists.
    #[error("VM disk '{}' not found.", .0.display())]
    DiskNotFound(PathBuf),

    /// The container id/name is not known to the engine.
    #[error("No such container: {0}")]
    NoSuchContainer(String),

    /// The Dockerfile start command has unbalanced quotes or no words.
    #[error("Invalid start command: {0}")]
    InvalidCommand(String),

    /// Pasted Dockerfile content had no lines.
    #[error("Dockerfile content cannot be empty.")]
    EmptyDockerfile,

    /// A filesystem or process-spawn I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
