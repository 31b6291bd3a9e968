//! TaskHub CLI - browse and manage tasks on a TaskHub server.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskhub::directory::{
    CategoryChoice, CompletionFilter, Priority, TaskDirectory, TaskDraft, TaskFilter, TaskPatch,
};
use taskhub::views::{DashboardController, LoadPhase, TaskListController};
use taskhub::{ApiClient, RestDirectory, SessionStore, Task, TokenStore};

/// TaskHub CLI - task management from the terminal.
#[derive(Parser)]
#[command(name = "taskhub")]
#[command(about = "Browse and manage tasks on a TaskHub server")]
struct Cli {
    /// Base URL of the TaskHub API.
    #[arg(long, env = "TASKHUB_API_URL", default_value = "http://localhost:8000/api")]
    api_url: String,

    /// File the login credential is persisted in.
    #[arg(long, env = "TASKHUB_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session credential.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,

        /// Account password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account, then log in with it.
    Register {
        /// Account name.
        #[arg(long)]
        username: String,

        /// Account email.
        #[arg(long)]
        email: String,

        /// Account password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Drop the current session and stored credential.
    Logout,

    /// Show the currently logged-in user.
    Whoami,

    /// List tasks, optionally filtered.
    List {
        /// Only tasks in this category.
        #[arg(long)]
        category: Option<String>,

        /// Completion state: all, pending or completed.
        #[arg(long, default_value = "all")]
        status: CompletionFilter,

        /// Only tasks whose title contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one task.
    Get {
        /// Task ID.
        #[arg(long)]
        id: u64,
    },

    /// Create a task.
    Add {
        /// Task title.
        #[arg(long)]
        title: String,

        /// Longer details.
        #[arg(long, default_value = "")]
        description: String,

        /// Existing category to file the task under.
        #[arg(long, conflicts_with = "new_category")]
        category: Option<String>,

        /// Create a new category for the task.
        #[arg(long)]
        new_category: Option<String>,

        /// high, medium or low.
        #[arg(long, default_value = "medium")]
        priority: Priority,

        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Edit fields of an existing task.
    Edit {
        /// Task ID.
        #[arg(long)]
        id: u64,

        /// New title.
        #[arg(long)]
        title: Option<String>,

        /// New details.
        #[arg(long)]
        description: Option<String>,

        /// Move to an existing category.
        #[arg(long, conflicts_with = "new_category")]
        category: Option<String>,

        /// Move to a new category.
        #[arg(long)]
        new_category: Option<String>,

        /// New priority: high, medium or low.
        #[arg(long)]
        priority: Option<Priority>,

        /// New due date (YYYY-MM-DD).
        #[arg(long)]
        due: Option<NaiveDate>,

        /// Clear the due date.
        #[arg(long, conflicts_with = "due", default_value = "false")]
        clear_due: bool,
    },

    /// Flip a task's completion state.
    Toggle {
        /// Task ID.
        #[arg(long)]
        id: u64,
    },

    /// Delete a task.
    Rm {
        /// Task ID.
        #[arg(long)]
        id: u64,
    },

    /// List categories in use.
    Categories,

    /// Show the statistics snapshot and recent tasks.
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api = ApiClient::new(&cli.api_url).context("Failed to create API client")?;
    let token_file = match cli.token_file {
        Some(path) => path,
        None => TokenStore::default_path()
            .context("Could not determine a credential path; pass --token-file")?,
    };
    let mut session = SessionStore::new(api.clone(), TokenStore::new(token_file));
    session.restore();

    let directory = RestDirectory::new(api);

    match cli.command {
        Commands::Login { email, password } => {
            let password = read_password(password)?;
            let current = session.login(&email, &password).await?;
            println!("\n✅ Logged in as {} <{}>", current.username, current.email);
        }

        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            let current = session.register(&username, &email, &password).await?;
            println!("\n✅ Registered and logged in as {}", current.username);
        }

        Commands::Logout => {
            session.logout();
            println!("\n✅ Logged out");
        }

        Commands::Whoami => match session.current() {
            Some(current) => println!(
                "{} <{}> (user id {})",
                current.username, current.email, current.user_id
            ),
            None => println!("Not logged in"),
        },

        Commands::List {
            category,
            status,
            search,
        } => {
            require_login(&session)?;
            let mut list = TaskListController::new(directory);
            list.apply_filter(TaskFilter {
                category,
                completion: status,
                search,
            })
            .await;

            if let LoadPhase::Failed(error) = list.phase() {
                bail!("Failed to load tasks: {error}");
            }
            print_task_table(list.tasks());
        }

        Commands::Get { id } => {
            require_login(&session)?;
            let task = directory.get(id).await?;
            print_task(&task);
        }

        Commands::Add {
            title,
            description,
            category,
            new_category,
            priority,
            due,
        } => {
            require_login(&session)?;
            let category = category_choice(category, new_category)?
                .context("Pass --category or --new-category")?;
            let task = directory
                .create(TaskDraft {
                    title,
                    description,
                    category,
                    priority,
                    due_date: due,
                })
                .await?;
            println!("\n✅ Task created!");
            print_task(&task);
        }

        Commands::Edit {
            id,
            title,
            description,
            category,
            new_category,
            priority,
            due,
            clear_due,
        } => {
            require_login(&session)?;
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let patch = TaskPatch {
                title,
                description,
                category: category_choice(category, new_category)?,
                priority,
                due_date,
            };
            if patch.is_empty() {
                bail!("Nothing to change");
            }
            let task = directory.update(id, patch).await?;
            println!("\n✅ Task updated!");
            print_task(&task);
        }

        Commands::Toggle { id } => {
            require_login(&session)?;
            let task = directory.get(id).await?;
            let updated = directory.set_completed(id, !task.completed).await?;
            println!(
                "\n✅ Task {} marked {}",
                id,
                if updated.completed { "completed" } else { "pending" }
            );
        }

        Commands::Rm { id } => {
            require_login(&session)?;
            directory.remove(id).await?;
            println!("\n✅ Task deleted: {id}");
        }

        Commands::Categories => {
            require_login(&session)?;
            let categories = directory.categories().await?;
            if categories.is_empty() {
                println!("\nNo categories yet");
            }
            for category in categories {
                println!("{category}");
            }
        }

        Commands::Dashboard => {
            require_login(&session)?;
            let mut dashboard = DashboardController::new(directory);
            dashboard.load().await;

            if let LoadPhase::Failed(error) = dashboard.phase() {
                bail!("Failed to load dashboard: {error}");
            }
            if let Some(stats) = dashboard.stats() {
                println!("\n📊 Tasks:");
                println!("  Total:         {}", stats.total);
                println!("  Completed:     {}", stats.completed);
                println!("  Pending:       {}", stats.pending);
                println!("  High priority: {}", stats.high_priority);
                println!("  Due soon:      {}", stats.due_soon);
            }
            println!("\nRecent tasks:");
            print_task_table(dashboard.recent());
        }
    }

    Ok(())
}

fn require_login(session: &SessionStore) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        bail!("Not logged in - run `taskhub login` first")
    }
}

fn read_password(provided: Option<String>) -> Result<String> {
    match provided {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

fn category_choice(
    existing: Option<String>,
    new: Option<String>,
) -> Result<Option<CategoryChoice>> {
    match (existing, new) {
        (None, None) => Ok(None),
        (Some(name), None) => Ok(Some(CategoryChoice::Existing(name))),
        (None, Some(name)) => Ok(Some(CategoryChoice::New(name))),
        (Some(_), Some(_)) => bail!("Pass only one of --category or --new-category"),
    }
}

fn print_task_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("\nNo tasks found");
        return;
    }

    println!(
        "\n{:<6} {:<3} {:<32} {:<12} {:<8} {:<10}",
        "ID", "", "TITLE", "CATEGORY", "PRIORITY", "DUE"
    );
    println!("{}", "-".repeat(76));
    for task in tasks {
        let mark = if task.completed { "✓" } else { "" };
        let due = task.due_date.map(|d| d.to_string()).unwrap_or_default();
        println!(
            "{:<6} {:<3} {:<32} {:<12} {:<8} {:<10}",
            task.id, mark, task.title, task.category, task.priority, due
        );
    }
}

fn print_task(task: &Task) {
    println!("\nTask {}:", task.id);
    println!("  Title:     {}", task.title);
    if !task.description.is_empty() {
        println!("  Details:   {}", task.description);
    }
    println!("  Category:  {}", task.category);
    println!("  Priority:  {}", task.priority);
    println!("  Completed: {}", if task.completed { "yes" } else { "no" });
    if let Some(due) = task.due_date {
        println!("  Due:       {due}");
    }
    println!("  Updated:   {}", task.updated_at);
}
