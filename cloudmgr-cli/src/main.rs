//! Interactive manager for docker containers, images and QEMU VMs.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod console;
mod docker;
mod dry_run;
mod logging;
mod menu;
mod vm;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use cloudmgr::{Runner, Settings, SystemRunner};

use crate::console::Terminal;
use crate::dry_run::DryRun;
use crate::menu::App;

#[derive(Parser)]
#[command(
    name = "cloudmgr",
    version,
    about = "Manage docker containers, images and QEMU virtual machines from a menu"
)]
struct Cli {
    /// Container engine binary.
    #[arg(long, env = "CLOUDMGR_DOCKER", default_value = "docker", global = true)]
    docker: String,

    /// Disk image tool binary.
    #[arg(long, env = "CLOUDMGR_QEMU_IMG", default_value = "qemu-img", global = true)]
    qemu_img: String,

    /// Machine emulator binary.
    #[arg(
        long,
        env = "CLOUDMGR_QEMU_SYSTEM",
        default_value = "qemu-system-x86_64",
        global = true
    )]
    qemu_system: String,

    /// Directory holding `<name>.qcow2` VM disks (default: current directory).
    #[arg(long, env = "CLOUDMGR_VM_DIR", global = true)]
    vm_dir: Option<PathBuf>,

    /// Print each command instead of running it.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive menu (default).
    Menu,
    /// Generate shell completion scripts.
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(e) = cli.dispatch() {
        eprintln!("cloudmgr: {e:#}");
        std::process::exit(1);
    }
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings::default()
            .docker(&self.docker)
            .qemu_img(&self.qemu_img)
            .qemu_system(&self.qemu_system)
            .vm_dir(self.vm_dir.clone().unwrap_or_default())
    }

    fn dispatch(self) -> Result<()> {
        match self.command {
            Some(Command::Completion { shell }) => {
                clap_complete::generate(shell, &mut Self::command(), "cloudmgr", &mut std::io::stdout());
                Ok(())
            }
            Some(Command::Menu) | None => self.menu(),
        }
    }

    fn menu(&self) -> Result<()> {
        let settings = self.settings();
        let runner: &dyn Runner = if self.dry_run { &DryRun } else { &SystemRunner };
        tracing::debug!(?settings, dry_run = self.dry_run, "starting menu");

        let app = App::new(&settings, runner);
        let mut terminal = Terminal::open().context("failed to initialise terminal")?;
        menu::run(&app, &mut terminal);
        Ok(())
    }
}
