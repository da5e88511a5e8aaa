//! CLI 模块

pub mod menu;
pub mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::storage::config::{self, Config};
use crate::storage::tasks::{Task, TaskStatus, TaskStore};

#[derive(Parser)]
#[command(name = "task-tracker")]
#[command(version)]
#[command(about = "Track personal tasks in a local JSON file")]
pub struct Cli {
    /// Directory holding the task file (overrides TASK_TRACKER_DIR and config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the interactive menu (default)
    Menu,
    /// Add a new task
    Add {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// List tasks, optionally filtered by status
    List {
        /// Only show tasks with this status (todo, in-progress, done)
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    /// Show a single task
    Show { id: u32 },
    /// Replace a task's description and status
    Update {
        id: u32,
        description: String,
        status: TaskStatus,
    },
    /// Change only a task's status
    Status { id: u32, status: TaskStatus },
    /// Delete a task
    Delete { id: u32 },
    /// Print the effective configuration
    Config {
        /// Write the config file with current values if it does not exist
        #[arg(long)]
        init: bool,
    },
}

/// 命令执行结果：Ok(false) 表示目标任务不存在
pub fn execute<W: Write>(
    command: Commands,
    config: &Config,
    data_dir: Option<&Path>,
    out: &mut W,
) -> Result<bool> {
    let open_store = || TaskStore::open(config.tasks_file(data_dir));

    let found = match command {
        Commands::Menu => {
            let mut store = open_store()?;
            let stdin = io::stdin();
            menu::Menu::new(&mut store, stdin.lock(), &mut *out)
                .clear_screen(config.clear_screen)
                .run()?;
            true
        }
        Commands::Add { description } => {
            let task = open_store()?.add(description.join(" "))?;
            render::write_task(out, &task)?;
            true
        }
        Commands::List { status } => {
            let store = open_store()?;
            match status {
                Some(status) => render::write_tasks(out, store.list_by_status(status))?,
                None => render::write_tasks(out, store.list())?,
            }
            true
        }
        Commands::Show { id } => report(out, id, open_store()?.get(id).cloned())?,
        Commands::Update {
            id,
            description,
            status,
        } => report(out, id, open_store()?.update(id, description, status)?)?,
        Commands::Status { id, status } => {
            report(out, id, open_store()?.update_status(id, status)?)?
        }
        Commands::Delete { id } => report(out, id, open_store()?.delete(id)?)?,
        Commands::Config { init } => show_config(config, data_dir, init, out)?,
    };

    Ok(found)
}

fn report<W: Write>(out: &mut W, id: u32, task: Option<Task>) -> Result<bool> {
    match task {
        Some(task) => {
            render::write_task(out, &task)?;
            Ok(true)
        }
        None => {
            render::write_not_found(out, id)?;
            Ok(false)
        }
    }
}

fn show_config<W: Write>(
    config: &Config,
    data_dir: Option<&Path>,
    init: bool,
    out: &mut W,
) -> Result<bool> {
    match config::config_path() {
        Some(path) => {
            if init && !path.exists() {
                config::save_config(config)?;
                writeln!(out, "Wrote {}", path.display())?;
            }
            writeln!(out, "config file: {}", path.display())?;
        }
        None => writeln!(out, "config file: <no home directory>")?,
    }
    writeln!(out, "tasks file:  {}", config.tasks_file(data_dir).display())?;
    writeln!(out, "clear screen: {}", config.clear_screen)?;
    Ok(true)
}
