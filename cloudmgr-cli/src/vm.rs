//! VM menu actions: create (interactive or from JSON), list, delete.

use std::path::Path;

use cloudmgr::input::{confirmed, required};
use cloudmgr::{DiskStore, Error, Result, Step, VmConfig};

use crate::console::{Console, ask};
use crate::docker::print_report;
use crate::menu::App;

pub fn create(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    console.heading("=== Create Virtual Machine (QEMU) ===");
    let name = ask(console, "Enter VM name: ");
    let ram = ask(console, "Enter RAM size in MB (e.g. 1024): ");
    let cpu = ask(console, "Enter number of CPUs (e.g. 1): ");
    let disk = ask(console, "Enter disk size (e.g. 5G): ");
    let cfg = VmConfig::new(&name, &ram, &cpu, &disk)?;
    launch(app, console, &cfg)
}

pub fn create_from_config(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    console.heading("=== Create Virtual Machine from JSON config (QEMU) ===");
    let path = ask(console, "Enter JSON config file path: ");
    let cfg = VmConfig::load(Path::new(path.trim()))?;
    launch(app, console, &cfg)
}

/// Shared tail of both create paths: disk image, then the machine.
fn launch(app: &App<'_>, console: &mut dyn Console, cfg: &VmConfig) -> Result<()> {
    let created = app.qemu.create(cfg, |step| match step {
        Step::CreatingDisk => console.say("[+] Creating disk image..."),
        Step::Launching => console.say("[+] Starting virtual machine..."),
    })?;
    print_report(console, &created.disk);
    match created.machine {
        Some(report) => print_report(console, &report),
        None => console.failure("Virtual machine not started: disk creation failed."),
    }
    Ok(())
}

pub fn list(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    let names = app.qemu.disks().list()?;
    if names.is_empty() {
        console.say("No virtual machines found.");
        return Ok(());
    }
    console.say("Available Virtual Machines:");
    for name in &names {
        console.say(&format!("- {name}"));
    }
    Ok(())
}

pub fn delete(app: &App<'_>, console: &mut dyn Console) -> Result<()> {
    console.heading("=== Delete Virtual Machine (QEMU) ===");
    let name = ask(console, "Enter VM name to delete: ");
    let name = required("VM name", &name)?;
    DiskStore::check_name(name)?;

    let disks = app.qemu.disks();
    let disk_file = disks.path(name);
    if !disk_file.exists() {
        return Err(Error::DiskNotFound(disk_file));
    }

    let answer = ask(
        console,
        &format!(
            "Are you sure you want to delete '{}'? (y/n): ",
            disk_file.display()
        ),
    );
    if !confirmed(&answer) {
        console.say("Operation cancelled.");
        return Ok(());
    }

    disks.remove(name)?;
    console.success(&format!("VM '{name}' deleted successfully."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use cloudmgr::{ScriptedRunner, Settings};

    use super::*;
    use crate::console::Script;
    use crate::menu::{Choice, dispatch};

    fn settings_in(dir: &Path) -> Settings {
        Settings::default().vm_dir(dir)
    }

    #[test]
    fn interactive_create_runs_both_steps() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["test1", "512", "1", "5G"]);

        dispatch(&app, &mut console, Choice::CreateVm);

        let disk = dir.path().join("test1.qcow2");
        let disk = disk.to_str().unwrap();
        assert_eq!(
            runner.argvs(),
            [
                vec!["qemu-img", "create", "-f", "qcow2", disk, "5G"],
                vec!["qemu-system-x86_64", "-m", "512", "-smp", "1", "-hda", disk],
            ]
        );
        assert!(console.printed("[+] Creating disk image..."));
        assert!(console.printed("[+] Starting virtual machine..."));
    }

    #[test]
    fn interactive_create_with_blank_field() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["testvm", "1024", "1", ""]);

        dispatch(&app, &mut console, Choice::CreateVm);

        assert!(console.printed("All fields are required."));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn failed_disk_creation_does_not_launch() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new().fail(1, "qemu-img: error\n");
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["vm", "512", "1", "5G"]);

        dispatch(&app, &mut console, Choice::CreateVm);

        assert_eq!(runner.calls().len(), 1);
        assert!(console.printed("Operation failed: qemu-img: error"));
        assert!(console.printed("Virtual machine not started"));
        assert!(!console.printed("[+] Starting virtual machine..."));
    }

    #[test]
    fn config_create_runs_both_steps() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("vm.json");
        fs::write(&cfg, r#"{"name": "testvm", "ram": 2048, "cpu": "2", "disk": "20G"}"#).unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new([cfg.to_str().unwrap()]);

        dispatch(&app, &mut console, Choice::CreateVmFromConfig);

        let calls = runner.argvs();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1][..5], ["qemu-system-x86_64", "-m", "2048", "-smp", "2"]);
    }

    #[test]
    fn config_errors_are_distinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        let partial = dir.path().join("partial.json");
        fs::write(&bad, "{ invalid }").unwrap();
        fs::write(&partial, r#"{"name": "testvm", "ram": "2048"}"#).unwrap();
        let missing = dir.path().join("missing.json");
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);

        for (path, message) in [
            (&missing, "Config file not found"),
            (&bad, "Failed to read config"),
            (&partial, "Config missing required fields"),
        ] {
            let mut console = Script::new([path.to_str().unwrap()]);
            dispatch(&app, &mut console, Choice::CreateVmFromConfig);
            assert!(console.printed(message), "{message}");
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn existing_disk_blocks_creation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vm.qcow2"), b"").unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["vm", "512", "1", "5G"]);

        dispatch(&app, &mut console, Choice::CreateVm);

        assert!(console.printed("Disk file already exists"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn list_reports_none_then_names() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);

        let mut console = Script::new([]);
        dispatch(&app, &mut console, Choice::ListVms);
        assert_eq!(console.output, ["No virtual machines found."]);

        fs::write(dir.path().join("ubuntu.qcow2"), b"").unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        let mut console = Script::new([]);
        dispatch(&app, &mut console, Choice::ListVms);
        assert_eq!(console.output, ["Available Virtual Machines:", "- ubuntu"]);
    }

    #[test]
    fn delete_needs_leading_y() {
        let dir = tempfile::tempdir().unwrap();
        let disk = dir.path().join("testvm.qcow2");
        fs::write(&disk, b"").unwrap();
        let settings = settings_in(dir.path());
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);

        for answer in ["n", "", "maybe", "1", " y", "  Y"] {
            let mut console = Script::new(["testvm", answer]);
            dispatch(&app, &mut console, Choice::DeleteVm);
            assert!(console.printed("Operation cancelled."), "{answer:?}");
            assert!(disk.exists());
        }

        let mut console = Script::new(["testvm", "Y"]);
        dispatch(&app, &mut console, Choice::DeleteVm);
        assert!(console.printed("VM 'testvm' deleted successfully."));
        assert!(!disk.exists());

        let mut console = Script::new(["testvm", "y"]);
        dispatch(&app, &mut console, Choice::DeleteVm);
        assert!(console.printed("not found"));
        assert_eq!(console.unread(), 1);
    }

    #[test]
    fn delete_refuses_paths_outside_vm_dir() {
        let dir = tempfile::tempdir().unwrap();
        let vms = dir.path().join("vms");
        fs::create_dir(&vms).unwrap();
        let outside = dir.path().join("host.qcow2");
        fs::write(&outside, b"").unwrap();
        let settings = settings_in(&vms);
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["../host", "y"]);

        dispatch(&app, &mut console, Choice::DeleteVm);

        assert!(console.printed("path separators are not allowed"));
        assert!(outside.exists());
        assert_eq!(console.unread(), 1);
    }

    #[test]
    fn delete_blank_name() {
        let settings = Settings::default();
        let runner = ScriptedRunner::new();
        let app = App::new(&settings, &runner);
        let mut console = Script::new(["  "]);
        dispatch(&app, &mut console, Choice::DeleteVm);
        assert!(console.printed("VM name cannot be empty."));
    }
}
