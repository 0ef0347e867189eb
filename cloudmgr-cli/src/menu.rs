//! The interactive menu loop.

use cloudmgr::{ContainerScope, Engine, Qemu, Runner, Settings};

use crate::console::Console;
use crate::{docker, vm};

/// Everything a menu action needs.
pub struct App<'a> {
    /// Settings the façades were built from.
    pub settings: &'a Settings,
    /// Container engine operations.
    pub engine: Engine<&'a dyn Runner>,
    /// VM operations.
    pub qemu: Qemu<&'a dyn Runner>,
}

impl<'a> App<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn Runner) -> Self {
        Self {
            settings,
            engine: settings.engine(runner),
            qemu: settings.qemu(runner),
        }
    }
}

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Clear,
    ListImages,
    SearchLocal,
    SearchRegistry,
    Pull,
    CreateDockerfile,
    Build,
    Run,
    ListRunning,
    ListAll,
    Start,
    Stop,
    CreateVm,
    CreateVmFromConfig,
    ListVms,
    DeleteVm,
    Exit,
}

impl Choice {
    /// Parses a menu key. Surrounding whitespace is ignored.
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key.trim() {
            "c" | "C" => Self::Clear,
            "1" => Self::ListImages,
            "2" => Self::SearchLocal,
            "3" => Self::SearchRegistry,
            "4" => Self::Pull,
            "5" => Self::CreateDockerfile,
            "6" => Self::Build,
            "7" => Self::Run,
            "8" => Self::ListRunning,
            "9" => Self::ListAll,
            "10" => Self::Start,
            "11" => Self::Stop,
            "12" => Self::CreateVm,
            "13" => Self::CreateVmFromConfig,
            "14" => Self::ListVms,
            "15" => Self::DeleteVm,
            "0" => Self::Exit,
            _ => return None,
        })
    }
}

fn show(console: &mut dyn Console) {
    console.say("");
    console.heading("=== Cloud Management System ===");
    console.say("c. Clear Screen");
    console.say("");
    console.heading("--- Docker ---");
    for line in [
        "1. List Docker Images",
        "2. Search Local Images",
        "3. Search Image on DockerHub",
        "4. Pull Docker Image",
        "5. Create Dockerfile",
        "6. Build Docker Image",
        "7. Run Docker Image (create container)",
        "8. List Running Containers",
        "9. List All Containers (running + stopped)",
        "10. Start Container",
        "11. Stop Container",
    ] {
        console.say(line);
    }
    console.say("");
    console.heading("--- Virtual Machines (QEMU) ---");
    for line in [
        "12. Create Virtual Machine (interactive)",
        "13. Create VM from JSON config",
        "14. List Virtual Machines (QEMU)",
        "15. Delete Virtual Machine (QEMU)",
    ] {
        console.say(line);
    }
    console.say("0. Exit");
}

/// Runs the menu until the user exits or input ends.
pub fn run(app: &App<'_>, console: &mut dyn Console) {
    loop {
        show(console);
        let Some(line) = console.read_line("Enter your choice: ") else {
            console.say("Exiting...");
            return;
        };
        if line.trim().is_empty() {
            continue;
        }
        match Choice::parse(&line) {
            Some(Choice::Exit) => {
                console.say("Exiting...");
                return;
            }
            Some(choice) => dispatch(app, console, choice),
            None => console.failure("Invalid choice!"),
        }
    }
}

/// Runs one action. Errors are printed; control always returns to the menu.
pub fn dispatch(app: &App<'_>, console: &mut dyn Console, choice: Choice) {
    let result = match choice {
        Choice::Clear => {
            console.clear();
            Ok(())
        }
        Choice::ListImages => docker::list_images(app, console),
        Choice::SearchLocal => docker::search_local(app, console),
        Choice::SearchRegistry => docker::search_registry(app, console),
        Choice::Pull => docker::pull(app, console),
        Choice::CreateDockerfile => docker::create_dockerfile(app, console),
        Choice::Build => docker::build(app, console),
        Choice::Run => docker::run(app, console),
        Choice::ListRunning => docker::list_containers(app, console, ContainerScope::Running),
        Choice::ListAll => docker::list_containers(app, console, ContainerScope::All),
        Choice::Start => docker::start(app, console),
        Choice::Stop => docker::stop(app, console),
        Choice::CreateVm => vm::create(app, console),
        Choice::CreateVmFromConfig => vm::create_from_config(app, console),
        Choice::ListVms => vm::list(app, console),
        Choice::DeleteVm => vm::delete(app, console),
        Choice::Exit => Ok(()),
    };
    if let Err(e) = result {
        tracing::debug!(?choice, error = %e, "action failed");
        console.failure(&e.to_string());
    }
}
