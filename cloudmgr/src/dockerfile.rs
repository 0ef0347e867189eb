//! Dockerfile generation.
//!
//! Content comes from exactly one [`Source`]:
//!
//! - [`Source::Guided`]: four templated lines from a base image and a start
//!   command.
//! - [`Source::Pasted`]: lines typed by the user, used verbatim.
//! - [`Source::Loaded`]: the bytes of another file, copied unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A line consisting of exactly this text ends pasted input.
pub const PASTE_TERMINATOR: &str = ".";

/// Where the Dockerfile content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Templated from a base image and a shell-style start command.
    Guided {
        /// `FROM` image.
        base_image: String,
        /// Start command, split into words for `CMD`.
        start_command: String,
    },
    /// Pasted lines, joined with `\n` plus a trailing newline.
    Pasted(Vec<String>),
    /// Copied byte-for-byte from an existing file.
    Loaded(PathBuf),
}

impl Source {
    /// Produces the Dockerfile content.
    pub fn render(&self) -> Result<Vec<u8>> {
        match self {
            Self::Guided {
                base_image,
                start_command,
            } => guided(base_image, start_command).map(String::into_bytes),
            Self::Pasted(lines) => pasted(lines).map(String::into_bytes),
            Self::Loaded(path) => loaded(path),
        }
    }
}

/// Renders the guided template.
pub fn guided(base_image: &str, start_command: &str) -> Result<String> {
    let tokens = shlex::split(start_command)
        .filter(|t| t.iter().any(|w| !w.is_empty()))
        .ok_or_else(|| Error::InvalidCommand(start_command.to_owned()))?;
    Ok(format!(
        "FROM {base_image}\nWORKDIR /app\nCOPY . .\n{}\n",
        cmd_line(&tokens)
    ))
}

/// Formats `tokens` as an exec-form `CMD` line: `CMD ["a", "b"]`.
pub fn cmd_line(tokens: &[String]) -> String {
    let quoted: Vec<String> = tokens
        .iter()
        .map(|t| serde_json::Value::from(t.as_str()).to_string())
        .collect();
    format!("CMD [{}]", quoted.join(", "))
}

/// Joins pasted lines. Empty input is rejected.
pub fn pasted(lines: &[String]) -> Result<String> {
    if lines.is_empty() {
        return Err(Error::EmptyDockerfile);
    }
    let mut content = lines.join("\n");
    content.push('\n');
    Ok(content)
}

/// Reads a source file's bytes. The content need not be UTF-8.
pub fn loaded(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Collects lines up to (not including) the [`PASTE_TERMINATOR`] line or
/// the end of input.
pub fn collect_pasted<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    lines
        .into_iter()
        .take_while(|line| line != PASTE_TERMINATOR)
        .collect()
}

/// Writes `content` to `path`, creating missing parent directories and
/// replacing any existing file.
pub fn write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "dockerfile written");
    Ok(())
}
