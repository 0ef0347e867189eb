//! Docker menu actions: prompt, call the engine, print the outcome.

use std::path::{Path, PathBuf};

use cloudmgr::dockerfile::{self, Source};
use cloudmgr::input::{confirmed, optional, or_default, required};
use cloudmgr::{ContainerScope, Error, LocalSearch, Report, Result};

use crate::console::{Console, ask};
use crate::menu::App;

/// Prints a captured report: stdout on success, prefixed stderr otherwise.
pub fn print_report(console: &mut dyn Console, report: &Report) {
    match report {
        Report::Success(out) if out.trim().is_empty() => {}
        Report::Success(out) => console.success(out.trim_end_matches('\n')),
        Report::Failure { .. } => console.failure(report.to_string().trim_end_matches('\n')),
    }
}

/// Flags a non-zero status from a streamed command.
fn print_streamed(console: &mut dyn Console, status: i32) {
    if status != 0 {
        console.failure(&format!("Operation failed (exit status {status})."));
    }
}

pub fn list_images(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let status = app.engine.list_images()?;
    print_streamed(console, status);
    Ok(())
}

pub fn list_containers(
    app: &App<'_>,
    console: &mut dyn Console,
    scope: ContainerScope,
) -> Result<()> {
    let status = app.engine.list_containers(scope)?;
    print_streamed(console, status);
    Ok(())
}

pub fn search_local(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let term = ask(console, "Enter image name to search locally: ");
    match app.engine.search_local(&term)? {
        LocalSearch::Found(lines) => {
            for line in &lines {
                console.say(line);
            }
        }
        LocalSearch::NoMatches => console.say("No matching images found."),
        LocalSearch::Failed(report) => print_report(console, &report),
    }
    Ok(())
}

pub fn search_registry(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let term = ask(console, "Enter image name to search on DockerHub: ");
    let status = app.engine.search_registry(&term)?;
    print_streamed(console, status);
    Ok(())
}

pub fn pull(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let image = ask(console, "Enter image name to pull: ");
    let report = app.engine.pull(&image)?;
    print_report(console, &report);
    Ok(())
}

pub fn run(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let image = ask(console, "Enter image name: ");
    required("Image name", &image)?;
    let name = ask(console, "Enter container name (optional): ");
    let report = app.engine.run(&image, optional(&name))?;
    print_report(console, &report);
    Ok(())
}

pub fn start(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let id = ask(console, "Enter container ID or name to start: ");
    let report = app.engine.start(&id)?;
    print_report(console, &report);
    Ok(())
}

pub fn stop(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    list_containers(app, console, ContainerScope::Running)?;
    let id = ask(console, "Enter container ID or name to stop: ");
    let report = app.engine.stop(&id)?;
    print_report(console, &report);
    Ok(())
}

pub fn build(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let path = ask(console, "Enter Dockerfile path (default: Dockerfile): ");
    let path = Path::new(or_default(&path, "Dockerfile"));
    if !path.is_file() {
        return Err(Error::DockerfileNotFound(path.to_path_buf()));
    }
    let tag = ask(console, "Enter image name:tag (e.g. myapp:1.0): ");
    let report = app.engine.build(path, &tag)?;
    print_report(console, &report);
    Ok(())
}

pub fn create_dockerfile(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let path = ask(
        console,
        "Enter path to save Dockerfile (default: ./Dockerfile): ",
    );
    let path = PathBuf::from(or_default(&path, "Dockerfile"));

    if path.exists() {
        let answer = ask(console, "Dockerfile already exists. Overwrite? (y/n): ");
        if !confirmed(&answer) {
            console.say("Operation cancelled.");
            return Ok(());
        }
    }

    console.say("How should the Dockerfile be created?");
    console.say("1. Guided (base image + start command)");
    console.say("2. Paste content");
    console.say("3. Load from an existing file");
    let source = match ask(console, "Enter mode (1-3): ").trim() {
        "1" => {
            let base_image = ask(
                console,
                &format!("Enter base image (default: {}): ", app.settings.base_image),
            );
            let start_command = ask(
                console,
                &format!(
                    "Enter start command (default: {}): ",
                    app.settings.start_command
                ),
            );
            Source::Guided {
                base_image: or_default(&base_image, &app.settings.base_image).to_owned(),
                start_command: or_default(&start_command, &app.settings.start_command)
                    .to_owned(),
            }
        }
        "2" => {
            console.say(&format!(
                "Paste Dockerfile content. End with a line containing only '{}'.",
                dockerfile::PASTE_TERMINATOR
            ));
            Source::Pasted(dockerfile::collect_pasted(std::iter::from_fn(|| {
                console.read_line("")
            })))
        }
        "3" => {
            let src = ask(console, "Enter path of the file to copy: ");
            Source::Loaded(PathBuf::from(required("Source path", &src)?))
        }
        _ => {
            console.failure("Invalid choice!");
            return Ok(());
        }
    };

    let content = source.render()?;
    dockerfile::write(&path, &content)?;
    console.success(&format!(
        "Dockerfile created successfully at {}",
        path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use cloudmgr::{ScriptedRunner, Settings};

    use super::*;
    use crate::console::Script;
    use crate::menu::{Choice, dispatch};

    fn path_str(p: &Path) -> &str {
        p.to_str().unwrap()
    }

    #[test]
    fn streamed_listing_failure_is_flagged() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new().ok("").fail(1, "");
        let app = App::new(&settings, &runner);
        let mut console = Script::new([]);

        dispatch(&app, &mut console, Choice::ListImages);

        assert_eq!(console.output, ["Operation failed (exit status 1)."]);
        assert_eq!(runner.argvs(), [["docker", "info"], ["docker", "images"]]);
    }

    #[test]
    fn streamed_listing_success_prints_nothing_extra() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([]);

        dispatch(&app, &mut console, Choice::ListAll);

        assert!(console.output.is_empty());
        assert_eq!(runner.argvs()[1], ["docker", "ps", "-a"]);
    }

    #[test]
    fn run_with_blank_image_invokes_nothing() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["   ", "web"]);

        dispatch(&app, &mut console, Choice::Run);

        assert!(console.printed("Image name cannot be empty."));
        assert_eq!(console.unread(), 1);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn run_prints_container_id() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new().ok("").ok("container123\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["nginx", "web"]);

        dispatch(&app, &mut console, Choice::Run);

        assert_eq!(console.output, ["container123"]);
        assert_eq!(runner.argvs()[1], ["docker", "run", "-d", "--name", "web", "nginx"]);
    }

    #[test]
    fn local_search_without_matches() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new()
            .ok("")
            .ok("REPOSITORY TAG\nnginx latest\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["postgres"]);

        dispatch(&app, &mut console, Choice::SearchLocal);

        assert_eq!(console.output, ["No matching images found."]);
    }

    #[test]
    fn local_search_prints_header_and_matches() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new()
            .ok("")
            .ok("REPOSITORY TAG\nnginx latest\nredis 7\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["NGINX"]);

        dispatch(&app, &mut console, Choice::SearchLocal);

        assert_eq!(console.output, ["REPOSITORY TAG", "nginx latest"]);
    }

    #[test]
    fn registry_search_with_blank_term() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([""]);

        dispatch(&app, &mut console, Choice::SearchRegistry);

        assert!(console.printed("Search term cannot be empty."));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn stop_lists_running_first() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new().ok("").ok("").ok("").ok("container123\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["container123"]);

        dispatch(&app, &mut console, Choice::Stop);

        assert_eq!(
            runner.argvs(),
            [
                vec!["docker", "info"],
                vec!["docker", "ps"],
                vec!["docker", "info"],
                vec!["docker", "stop", "container123"],
            ]
        );
        assert_eq!(console.output, ["container123"]);
    }

    #[test]
    fn start_unknown_container() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new().ok("").ok("abc123\tweb\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["db"]);

        dispatch(&app, &mut console, Choice::Start);

        assert!(console.printed("No such container: db"));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn build_missing_dockerfile_issues_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Dockerfile");
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&missing), "app:1.0"]);

        dispatch(&app, &mut console, Choice::Build);

        assert!(console.printed("Dockerfile not found"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn build_failure_shows_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Dockerfile");
        fs::write(&file, "FROM scratch\n").unwrap();
        let settings = Settings::default();
        let runner = ScriptedRunner::new().ok("").fail(1, "failed to solve\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&file), "app:1.0"]);

        dispatch(&app, &mut console, Choice::Build);

        assert_eq!(console.output, ["Operation failed: failed to solve"]);
        assert_eq!(
            runner.argvs()[1],
            ["docker", "build", "-t", "app:1.0", "-f", path_str(&file), "."]
        );
    }

    #[test]
    fn guided_dockerfile_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app/Dockerfile");
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&path), "1", "", "  "]);

        dispatch(&app, &mut console, Choice::CreateDockerfile);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "FROM python:3.12-slim\nWORKDIR /app\nCOPY . .\nCMD [\"python\", \"app.py\"]\n"
        );
        assert!(console.printed("Dockerfile created successfully"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn pasted_dockerfile_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([
            path_str(&path),
            "2",
            "FROM alpine:3.20",
            "  RUN apk add curl",
            ".",
            "0",
        ]);

        dispatch(&app, &mut console, Choice::CreateDockerfile);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "FROM alpine:3.20\n  RUN apk add curl\n"
        );
        assert_eq!(console.unread(), 1);
    }

    #[test]
    fn loaded_dockerfile_requires_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        let source = dir.path().join("nope");
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&path), "3", path_str(&source)]);

        dispatch(&app, &mut console, Choice::CreateDockerfile);

        assert!(console.printed("Source file not found"));
        assert!(!path.exists());
    }

    #[test]
    fn declining_overwrite_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        fs::write(&path, "FROM original\n").unwrap();
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&path), "n", "1", "", ""]);

        dispatch(&app, &mut console, Choice::CreateDockerfile);

        assert!(console.printed("Operation cancelled."));
        assert_eq!(fs::read_to_string(&path).unwrap(), "FROM original\n");
        assert_eq!(console.unread(), 3);
    }

    #[test]
    fn accepting_overwrite_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dockerfile");
        fs::write(&path, "FROM original\n").unwrap();
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([path_str(&path), "Yes", "1", "node:20", "node server.js"]);

        dispatch(&app, &mut console, Choice::CreateDockerfile);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("FROM node:20\n"));
        assert!(text.ends_with("CMD [\"node\", \"server.js\"]\n"));
    }
}
