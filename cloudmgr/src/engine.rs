//! Container engine operations via the `docker` CLI.
//!
//! [`commands`] holds the pure argument-vector builders. [`Engine`] wires
//! them to a [`Runner`]: every operation validates its fields first, then
//! checks the availability gate, then invokes exactly once.

use std::path::Path;

use crate::input::required;
use crate::{Error, Report, Result, Runner, Shape};

/// Go template used to list container ids and names for existence checks.
pub const ID_NAME_FORMAT: &str = "{{.ID}}\t{{.Names}}";

/// Which containers a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerScope {
    /// Running containers only (`docker ps`).
    Running,
    /// Running and stopped containers (`docker ps -a`).
    All,
}

/// Argument-vector builders. No I/O; fields are assumed validated.
pub mod commands {
    use std::path::Path;

    use super::{ContainerScope, ID_NAME_FORMAT};
    use crate::Invocation;

    /// `docker info`, the availability probe.
    pub fn info(docker: &str) -> Invocation {
        Invocation::new(docker, ["info"])
    }

    /// `docker images`.
    pub fn images(docker: &str) -> Invocation {
        Invocation::new(docker, ["images"])
    }

    /// `docker ps [-a]`.
    pub fn ps(docker: &str, scope: ContainerScope) -> Invocation {
        match scope {
            ContainerScope::Running => Invocation::new(docker, ["ps"]),
            ContainerScope::All => Invocation::new(docker, ["ps", "-a"]),
        }
    }

    /// `docker ps -a --format <id\tname>`, parsed internally.
    pub fn ps_ids(docker: &str) -> Invocation {
        Invocation::new(docker, ["ps", "-a", "--format", ID_NAME_FORMAT])
    }

    /// `docker run -d [--name <name>] <image>`.
    pub fn run(docker: &str, image: &str, name: Option<&str>) -> Invocation {
        let mut args = vec!["run", "-d"];
        if let Some(name) = name {
            args.extend(["--name", name]);
        }
        args.push(image);
        Invocation::new(docker, args)
    }

    /// `docker stop <id>`.
    pub fn stop(docker: &str, id: &str) -> Invocation {
        Invocation::new(docker, ["stop", id])
    }

    /// `docker start <id>`.
    pub fn start(docker: &str, id: &str) -> Invocation {
        Invocation::new(docker, ["start", id])
    }

    /// `docker search <term>`.
    pub fn search(docker: &str, term: &str) -> Invocation {
        Invocation::new(docker, ["search", term])
    }

    /// `docker pull <image>`.
    pub fn pull(docker: &str, image: &str) -> Invocation {
        Invocation::new(docker, ["pull", image])
    }

    /// `docker build -t <tag> -f <dockerfile> .`
    pub fn build(docker: &str, tag: &str, dockerfile: &Path) -> Invocation {
        Invocation::new(
            docker,
            [
                "build".to_owned(),
                "-t".to_owned(),
                tag.to_owned(),
                "-f".to_owned(),
                dockerfile.to_string_lossy().into_owned(),
                ".".to_owned(),
            ],
        )
    }
}

/// Result of a local image search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSearch {
    /// Header line followed by every matching line.
    Found(Vec<String>),
    /// The listing succeeded but nothing matched.
    NoMatches,
    /// The listing itself failed.
    Failed(Report),
}

/// Keeps the header plus lines containing `term` (case-insensitive).
///
/// Returns `None` when no line after the header matches.
pub fn filter_listing<'a>(listing: &'a str, term: &str) -> Option<Vec<&'a str>> {
    let needle = term.to_lowercase();
    let mut lines = listing.lines();
    let header = lines.next()?;
    let matches: Vec<&str> = lines
        .filter(|line| line.to_lowercase().contains(&needle))
        .collect();
    if matches.is_empty() {
        return None;
    }
    Some(std::iter::once(header).chain(matches).collect())
}

/// Returns `true` if `target` equals an id or a name in an
/// [`ID_NAME_FORMAT`] listing.
///
/// The listing shows truncated ids, so a longer hex `target` also matches
/// the id it starts with.
pub fn listed(listing: &str, target: &str) -> bool {
    let hex = target.chars().all(|c| c.is_ascii_hexdigit());
    listing.lines().any(|line| {
        let mut cols = line.split('\t');
        let id = cols.next().unwrap_or_default().trim();
        let names = cols.next().unwrap_or_default();
        id == target
            || (hex && !id.is_empty() && target.len() > id.len() && target.starts_with(id))
            || names.split(',').any(|n| n.trim() == target)
    })
}

/// Container engine façade over a [`Runner`].
#[derive(Debug, Clone)]
pub struct Engine<R> {
    runner: R,
    program: String,
}

impl<R: Runner> Engine<R> {
    /// Creates an engine that invokes `program` through `runner`.
    pub fn new(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// Engine binary name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// `true` iff the diagnostic command exits zero. Never fails: a missing
    /// binary or non-zero exit both mean "unavailable".
    pub fn is_available(&self) -> bool {
        match self.runner.probe(&commands::info(&self.program)) {
            Ok(0) => true,
            Ok(status) => {
                tracing::debug!(status, "engine diagnostic failed");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "engine diagnostic could not run");
                false
            }
        }
    }

    fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::EngineUnavailable)
        }
    }

    /// Streams `docker images`. Returns the exit status.
    pub fn list_images(&self) -> Result<i32> {
        self.ensure_available()?;
        self.runner.stream(&commands::images(&self.program))
    }

    /// Streams `docker ps [-a]`. Returns the exit status.
    pub fn list_containers(&self, scope: ContainerScope) -> Result<i32> {
        self.ensure_available()?;
        self.runner.stream(&commands::ps(&self.program, scope))
    }

    /// Lists images and keeps the lines mentioning `term`.
    pub fn search_local(&self, term: &str) -> Result<LocalSearch> {
        let term = required("Search term", term)?;
        self.ensure_available()?;
        let res = self.runner.capture(&commands::images(&self.program))?;
        if !res.success() {
            return Ok(LocalSearch::Failed(Report::from_result(&res, Shape::Block)));
        }
        Ok(filter_listing(&res.stdout, term).map_or(LocalSearch::NoMatches, |lines| {
            LocalSearch::Found(lines.into_iter().map(str::to_owned).collect())
        }))
    }

    /// Streams `docker search`. Queries the remote registry, so the local
    /// engine need not be running.
    pub fn search_registry(&self, term: &str) -> Result<i32> {
        let term = required("Search term", term)?;
        self.runner.stream(&commands::search(&self.program, term))
    }

    /// Pulls an image.
    pub fn pull(&self, image: &str) -> Result<Report> {
        let image = required("Image name", image)?;
        self.ensure_available()?;
        let res = self.runner.capture(&commands::pull(&self.program, image))?;
        Ok(Report::from_result(&res, Shape::Block))
    }

    /// Builds `tag` from `dockerfile` with the current directory as context.
    pub fn build(&self, dockerfile: &Path, tag: &str) -> Result<Report> {
        if dockerfile.as_os_str().is_empty() || !dockerfile.is_file() {
            return Err(Error::DockerfileNotFound(dockerfile.to_path_buf()));
        }
        let tag = required("Image name", tag)?;
        self.ensure_available()?;
        let res = self
            .runner
            .capture(&commands::build(&self.program, tag, dockerfile))?;
        Ok(Report::from_result(&res, Shape::Block))
    }

    /// Starts a detached container from `image`, optionally named.
    pub fn run(&self, image: &str, name: Option<&str>) -> Result<Report> {
        let image = required("Image name", image)?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        self.ensure_available()?;
        let res = self
            .runner
            .capture(&commands::run(&self.program, image, name))?;
        Ok(Report::from_result(&res, Shape::Line))
    }

    /// Stops a container by id or name.
    pub fn stop(&self, id: &str) -> Result<Report> {
        let id = required("Container ID or name", id)?;
        self.ensure_available()?;
        let res = self.runner.capture(&commands::stop(&self.program, id))?;
        Ok(Report::from_result(&res, Shape::Line))
    }

    /// Starts a container by id or name after confirming the engine knows it.
    ///
    /// Fails with [`Error::NoSuchContainer`] without issuing `docker start`
    /// when the id matches neither an id nor a name.
    pub fn start(&self, id: &str) -> Result<Report> {
        let id = required("Container ID or name", id)?;
        self.ensure_available()?;
        let listing = self.runner.capture(&commands::ps_ids(&self.program))?;
        if !listing.success() {
            return Ok(Report::from_result(&listing, Shape::Line));
        }
        if !listed(&listing.stdout, id) {
            return Err(Error::NoSuchContainer(id.to_owned()));
        }
        let res = self.runner.capture(&commands::start(&self.program, id))?;
        Ok(Report::from_result(&res, Shape::Line))
    }
}
