//! CLI argument and shell command parsing for td.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasklist::{Priority, SortKey};

#[derive(Parser)]
#[command(
    name = "td",
    about = "An in-memory todo list shell",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/tasklist/logs/tasklist.log"
)]
pub struct Cli {
    /// Path to a YAML config file (default: ~/.config/tasklist/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Snapshot file imported at start and exported on exit
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Initial sort key (createdAt, priority, dueDate)
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[command(name = "td", no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task
    Add {
        /// Task title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Toggle a task's completion
    Toggle {
        /// Task ID or unique prefix
        id: String,
    },

    /// Delete a task and its subtasks
    #[command(alias = "rm")]
    Delete {
        /// Task ID or unique prefix
        id: String,
    },

    /// Show one task in full
    Show {
        /// Task ID or unique prefix
        id: String,
    },

    /// List the current view
    #[command(alias = "ls")]
    List,

    /// Manage subtasks
    Sub {
        #[command(subcommand)]
        action: SubAction,
    },

    /// Replace a task's notes (no text clears them)
    Notes {
        id: String,
        text: Vec<String>,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage dependencies
    Dep {
        #[command(subcommand)]
        action: DepAction,
    },

    /// Set the sort key (createdAt, priority, dueDate)
    Sort { key: SortKey },

    /// Replace the filter (no options clears it)
    Filter {
        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long)]
        category: Option<String>,

        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        done: bool,

        /// Only open tasks
        #[arg(long)]
        open: bool,

        /// Match any of these tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Search title, notes and tags (no text clears the search)
    Search { query: Vec<String> },

    /// Show completion progress
    Progress,

    /// List known categories
    Categories,

    /// Write a snapshot file
    Export { path: PathBuf },

    /// Replace the session with a snapshot file
    Import { path: PathBuf },

    /// Leave the shell
    #[command(aliases = ["exit", "q"])]
    Quit,
}

#[derive(Subcommand, Debug)]
pub enum SubAction {
    /// Add a subtask
    Add {
        id: String,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Toggle a subtask
    Toggle { id: String, subtask_id: String },

    /// Delete a subtask
    #[command(alias = "rm")]
    Delete { id: String, subtask_id: String },
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    Add { id: String, tag: String },
    Rm { id: String, tag: String },
}

#[derive(Subcommand, Debug)]
pub enum DepAction {
    /// Make the first task depend on the second
    Add { id: String, dependency_id: String },
    Rm { id: String, dependency_id: String },
}
