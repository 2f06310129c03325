//! td - an interactive shell over an in-memory task store.

use chrono::NaiveTime;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::Path;
use tasklist::{
    Filter, NewTask, Priority, Request, Response, ShellConfig, Snapshot, Store, StoreHandle, Subtask, Task,
};
use tokio::io::{AsyncBufReadExt, BufReader};

mod cli;

use cli::{Cli, Command, DepAction, Line, SubAction, TagAction};

enum Flow {
    Continue,
    Quit,
}

fn setup_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("tasklist.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn format_priority(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "high".red(),
        Priority::Medium => "medium".yellow(),
        Priority::Low => "low".green(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..11).unwrap_or(id)
}

fn render_task(task: &Task) -> String {
    let check = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.completed {
        task.title.dimmed()
    } else {
        task.title.normal()
    };

    let mut line = format!(
        "{} {} {} {}",
        check,
        short_id(&task.id).cyan(),
        format_priority(task.priority),
        title
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" {}", format!("due {}", due.format("%Y-%m-%d")).magenta()));
    }
    if let Some(category) = &task.category {
        line.push_str(&format!(" {}", format!("@{}", category).blue()));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!(" {}", tags.join(" ").dimmed()));
    }
    if !task.subtasks.is_empty() {
        let progress = task.subtask_progress();
        line.push_str(&format!(" ({}/{})", progress.completed, progress.total));
    }
    line
}

fn render_subtask(subtask: &Subtask) -> String {
    let check = if subtask.completed { "[x]".green() } else { "[ ]".normal() };
    format!("    {} {} {}", check, short_id(&subtask.id).cyan(), subtask.title)
}

/// Turn an error response into an Err.
fn expect_ok(response: Response) -> Result<Response> {
    match response {
        Response::Error { message } => Err(eyre::eyre!(message)),
        other => Ok(other),
    }
}

async fn fetch_task(handle: &StoreHandle, id: &str) -> Result<Task> {
    match handle.send(Request::Get { id: id.to_string() }).await? {
        Response::Task { task } => Ok(task),
        _ => Err(eyre::eyre!("no task matches '{}'", id)),
    }
}

/// Full subtask id from an exact id or unique prefix, else the input unchanged.
fn resolve_subtask(task: &Task, id: &str) -> String {
    task.resolve_subtask(id).map_or_else(|| id.to_string(), |s| s.id.clone())
}

fn report_changed(response: Response, done: &str, unchanged: &str) -> Result<()> {
    match expect_ok(response)? {
        Response::Changed { changed: false } | Response::NotFound { .. } => {
            println!("{} {}", "·".dimmed(), unchanged.dimmed())
        }
        _ => println!("{} {}", "✓".green(), done),
    }
    Ok(())
}

async fn print_view(handle: &StoreHandle) -> Result<()> {
    let Response::View {
        tasks,
        sort_key,
        filter,
        search,
    } = handle.send(Request::View).await?
    else {
        eyre::bail!("unexpected response to view request");
    };

    let mut settings = format!("sort: {}", sort_key);
    if !filter.is_empty() {
        settings.push_str(&format!(", filter: {}", describe_filter(&filter)));
    }
    if !search.is_empty() {
        settings.push_str(&format!(", search: \"{}\"", search));
    }
    println!("{}", settings.dimmed());

    if tasks.is_empty() {
        println!("{}", "No tasks found".dimmed());
    }
    for task in &tasks {
        println!("{}", render_task(task));
    }
    Ok(())
}

fn describe_filter(filter: &Filter) -> String {
    let mut parts = Vec::new();
    if let Some(priority) = filter.priority {
        parts.push(format!("priority={}", priority));
    }
    if let Some(category) = &filter.category {
        parts.push(format!("category={}", category));
    }
    if let Some(completed) = filter.completed {
        parts.push(if completed { "done" } else { "open" }.to_string());
    }
    if !filter.tags.is_empty() {
        parts.push(format!("tags={}", filter.tags.join("|")));
    }
    parts.join(" ")
}

async fn export(handle: &StoreHandle, path: &Path) -> Result<()> {
    let Response::Snapshot { snapshot } = handle.send(Request::Snapshot).await? else {
        eyre::bail!("unexpected response to snapshot request");
    };
    snapshot.write_to(path)?;
    println!("{} Exported {} tasks to {}", "✓".green(), snapshot.tasks.len(), path.display());
    Ok(())
}

async fn execute(handle: &StoreHandle, command: Command) -> Result<Flow> {
    match command {
        Command::Add {
            title,
            priority,
            due,
            category,
            notes,
            tags,
        } => {
            let task = NewTask {
                title: title.join(" "),
                priority,
                due_date: due.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
                category,
                notes,
                tags: tags.unwrap_or_default(),
            };
            if let Response::Task { task } = expect_ok(handle.send(Request::AddTask { task }).await?)? {
                println!("{} Created: {} {}", "✓".green(), short_id(&task.id).cyan(), task.title);
            }
        }

        Command::Toggle { id } => {
            let task = fetch_task(handle, &id).await?;
            let response = handle.send(Request::ToggleTask { id: task.id.clone() }).await?;
            let state = if task.completed { "open" } else { "done" };
            report_changed(response, &format!("{} is now {}", task.title, state), "nothing to toggle")?;
        }

        Command::Delete { id } => {
            let task = fetch_task(handle, &id).await?;
            if let Response::Task { task } = handle.send(Request::DeleteTask { id: task.id }).await? {
                println!("{} Deleted: {}", "✓".green(), task.title);
            }
        }

        Command::Show { id } => {
            let task = fetch_task(handle, &id).await?;
            println!("{}", render_task(&task));
            println!("    {} {}", "id:".dimmed(), task.id);
            println!("    {} {}", "created:".dimmed(), task.created_at.format("%Y-%m-%d %H:%M"));
            if let Some(notes) = &task.notes {
                println!("    {} {}", "notes:".dimmed(), notes);
            }
            if !task.dependencies.is_empty() {
                println!("    {} {}", "depends on:".dimmed(), task.dependencies.join(", "));
            }
            for subtask in &task.subtasks {
                println!("{}", render_subtask(subtask));
            }
        }

        Command::List => print_view(handle).await?,

        Command::Sub { action } => match action {
            SubAction::Add { id, title } => {
                let task = fetch_task(handle, &id).await?;
                let request = Request::AddSubtask {
                    task_id: task.id,
                    title: title.join(" "),
                };
                if let Response::Subtask { subtask } = expect_ok(handle.send(request).await?)? {
                    println!("{} Added subtask {} {}", "✓".green(), short_id(&subtask.id).cyan(), subtask.title);
                }
            }
            SubAction::Toggle { id, subtask_id } => {
                let task = fetch_task(handle, &id).await?;
                let subtask_id = resolve_subtask(&task, &subtask_id);
                let response = handle
                    .send(Request::ToggleSubtask {
                        task_id: task.id,
                        subtask_id,
                    })
                    .await?;
                report_changed(response, "Subtask toggled", "no such subtask")?;
            }
            SubAction::Delete { id, subtask_id } => {
                let task = fetch_task(handle, &id).await?;
                let subtask_id = resolve_subtask(&task, &subtask_id);
                let response = handle
                    .send(Request::DeleteSubtask {
                        task_id: task.id,
                        subtask_id,
                    })
                    .await?;
                report_changed(response, "Subtask deleted", "no such subtask")?;
            }
        },

        Command::Notes { id, text } => {
            let task = fetch_task(handle, &id).await?;
            let response = handle
                .send(Request::UpdateNotes {
                    task_id: task.id,
                    notes: text.join(" "),
                })
                .await?;
            report_changed(response, "Notes updated", "notes unchanged")?;
        }

        Command::Tag { action } => {
            let (request, done, unchanged) = match action {
                TagAction::Add { id, tag } => {
                    let task = fetch_task(handle, &id).await?;
                    (Request::AddTag { task_id: task.id, tag }, "Tag added", "tag already present")
                }
                TagAction::Rm { id, tag } => {
                    let task = fetch_task(handle, &id).await?;
                    (Request::RemoveTag { task_id: task.id, tag }, "Tag removed", "tag not present")
                }
            };
            report_changed(handle.send(request).await?, done, unchanged)?;
        }

        Command::Dep { action } => {
            let (request, done, unchanged) = match action {
                DepAction::Add { id, dependency_id } => {
                    let task = fetch_task(handle, &id).await?;
                    // dependencies may point at tasks that do not exist
                    let dependency_id = match fetch_task(handle, &dependency_id).await {
                        Ok(dependency) => dependency.id,
                        Err(_) => dependency_id,
                    };
                    (
                        Request::AddDependency {
                            task_id: task.id,
                            dependency_id,
                        },
                        "Dependency added",
                        "dependency already recorded",
                    )
                }
                DepAction::Rm { id, dependency_id } => {
                    let task = fetch_task(handle, &id).await?;
                    let dependency_id = task
                        .resolve_dependency(&dependency_id)
                        .map_or(dependency_id.clone(), String::from);
                    (
                        Request::RemoveDependency {
                            task_id: task.id,
                            dependency_id,
                        },
                        "Dependency removed",
                        "no such dependency",
                    )
                }
            };
            report_changed(handle.send(request).await?, done, unchanged)?;
        }

        Command::Sort { key } => {
            expect_ok(handle.send(Request::SetSortKey { sort_key: key }).await?)?;
            print_view(handle).await?;
        }

        Command::Filter {
            priority,
            category,
            done,
            open,
            tags,
        } => {
            let completed = match (done, open) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let filter = Filter {
                priority,
                category,
                completed,
                tags: Vec::new(),
            }
            .tags(tags.unwrap_or_default());
            expect_ok(handle.send(Request::SetFilter { filter }).await?)?;
            print_view(handle).await?;
        }

        Command::Search { query } => {
            let query = query.join(" ");
            expect_ok(handle.send(Request::SetSearch { query }).await?)?;
            print_view(handle).await?;
        }

        Command::Progress => {
            if let Response::Progress { progress } = handle.send(Request::Progress).await? {
                println!(
                    "{}/{} completed ({:.0}%)",
                    progress.completed,
                    progress.total,
                    progress.percent()
                );
            }
        }

        Command::Categories => {
            if let Response::Categories { categories } = handle.send(Request::Categories).await? {
                if categories.is_empty() {
                    println!("{}", "No categories".dimmed());
                }
                for category in categories {
                    println!("@{}", category.blue());
                }
            }
        }

        Command::Export { path } => export(handle, &path).await?,

        Command::Import { path } => {
            let snapshot = Snapshot::read_from(&path)?;
            let count = snapshot.tasks.len();
            expect_ok(handle.send(Request::Restore { snapshot }).await?)?;
            println!("{} Imported {} tasks from {}", "✓".green(), count, path.display());
        }

        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

fn open_store(cli: &Cli, config: &ShellConfig) -> Result<Store> {
    let mut store = match &config.snapshot {
        Some(path) if path.exists() => {
            Store::from_snapshot(Snapshot::read_from(path)?).context("Failed to restore snapshot")?
        }
        _ => Store::with_sort_key(config.default_sort),
    };
    if let Some(sort_key) = cli.sort {
        store.set_sort_key(sort_key);
    }
    Ok(store)
}

fn prompt() -> Result<()> {
    print!("{} ", "td>".bold());
    std::io::stdout().flush().context("Failed to flush stdout")
}

async fn run(cli: Cli, config: ShellConfig) -> Result<()> {
    let store = open_store(&cli, &config)?;
    let (handle, actor) = StoreHandle::spawn(store, config.queue_depth);

    println!("{} td {} - type 'help' for commands", "→".blue(), env!("GIT_DESCRIBE"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(words) = shlex::split(line) else {
            println!("{} unbalanced quotes", "✗".red());
            continue;
        };
        let command = match Line::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                e.print().ok();
                continue;
            }
        };

        match execute(&handle, command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }

    if let Some(path) = &config.snapshot {
        export(&handle, path).await?;
    }
    handle.shutdown().await?;
    actor.await.context("Store actor panicked")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ShellConfig::load_or_default(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(snapshot) = &cli.snapshot {
        config.snapshot = Some(snapshot.clone());
    }
    if cli.no_color {
        config.color = false;
    }

    setup_logging(&config.log_dir()).context("Failed to setup logging")?;
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if !config.color {
        colored::control::set_override(false);
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    if let Err(e) = rt.block_on(run(cli, config)) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
