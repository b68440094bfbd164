//! Command-line front end for TodoMate.
//!
//! # Responsibility
//! - Drive core use-cases against the configured database for scripting and
//!   local sanity checks.
//! - Keep output line-oriented and deterministic.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use todomate_core::ai::fallback::list_fallback;
use todomate_core::repo::area_repo::SqliteLifeAreaRepository;
use todomate_core::repo::goal_repo::SqliteWeeklyGoalRepository;
use todomate_core::repo::task_repo::{SqliteTaskRepository, TaskSort};
use todomate_core::stats::summary::ListStats;
use todomate_core::{
    logging, open_db, AppConfig, AreaService, Clock, CreateTaskRequest, Priority,
    SqliteDashboardSource, SystemClock, TaskService, WeekNavigation, WeeklyDashboard,
};

#[derive(Parser)]
#[command(name = "todomate")]
#[command(about = "Weekly goals and tasks across life areas")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "TODOMATE_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version
    Ping,
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Area(AreaCommand),
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Show goal vs actual for a week
    Week {
        /// Weeks back from the current one
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// low | medium | high
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        area: Option<i64>,
    },
    List {
        #[arg(long, default_value = "")]
        query: String,
        /// date_desc | date_asc | priority
        #[arg(long, default_value = "date_desc")]
        sort: String,
    },
    /// Toggle completion
    Done { id: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum AreaCommand {
    List,
    Add { name: String },
    Delete { id: i64 },
    /// Restore built-in areas
    Reset,
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Set this week's goal, e.g. `goal set 1 30`
    Set { area: i64, percentage: u8 },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(db) = args.db {
        config.db_path = db;
    }
    logging::init_from_config(&config).context("failed to start logging")?;

    if let Command::Ping = args.command {
        println!("todomate_core ping={}", todomate_core::ping());
        println!("todomate_core version={}", todomate_core::core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match args.command {
        Command::Ping => {}
        Command::Task(command) => {
            let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            run_task(&tasks, command)?;
        }
        Command::Area(command) => {
            let areas = AreaService::new(
                SqliteLifeAreaRepository::try_new(&conn)?,
                SqliteWeeklyGoalRepository::try_new(&conn)?,
            );
            run_area(&areas, command)?;
        }
        Command::Goal(GoalCommand::Set { area, percentage }) => {
            let areas = AreaService::new(
                SqliteLifeAreaRepository::try_new(&conn)?,
                SqliteWeeklyGoalRepository::try_new(&conn)?,
            );
            let now = SystemClock.now_ms();
            let saved = areas.save_weekly_goals(now, &[(area, percentage)])?;
            println!("saved {} goal(s) for this week", saved.len());
        }
        Command::Week { offset } => {
            let mut dashboard = WeeklyDashboard::local(SqliteDashboardSource::try_new(&conn)?);
            dashboard.refresh()?;
            for _ in 0..offset {
                if dashboard.previous_week()? == WeekNavigation::Blocked {
                    bail!("week navigation blocked");
                }
            }
            print_week(&dashboard);
        }
    }
    Ok(())
}

fn run_task(tasks: &TaskService<SqliteTaskRepository<'_>>, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add {
            title,
            description,
            priority,
            category,
            area,
        } => {
            let Some(priority) = Priority::parse(&priority) else {
                bail!("unknown priority `{priority}`");
            };
            let task = tasks.create_task(&CreateTaskRequest {
                title,
                description,
                priority,
                category,
                life_area_id: area,
                created_at: None,
            })?;
            println!("{}", task.id);
        }
        TaskCommand::List { query, sort } => {
            let sort = match sort.as_str() {
                "date_asc" => TaskSort::DateAsc,
                "priority" => TaskSort::Priority,
                "date_desc" => TaskSort::DateDesc,
                other => bail!("unknown sort `{other}`"),
            };
            let listed = tasks.list_tasks(&query, sort)?;
            for task in &listed {
                println!(
                    "{} [{}] {:<6} {} ({})",
                    task.id,
                    if task.is_completed { "x" } else { " " },
                    task.priority.as_str(),
                    task.title,
                    task.category
                );
            }
            let stats = ListStats::from_tasks(&listed);
            println!("{}", list_fallback(stats.total, stats.completed));
        }
        TaskCommand::Done { id } => {
            let task = tasks.toggle_complete(id.parse().context("invalid task id")?)?;
            println!("{} completed={}", task.id, task.is_completed);
        }
        TaskCommand::Delete { id } => {
            tasks.delete_task(id.parse().context("invalid task id")?)?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn run_area(
    areas: &AreaService<SqliteLifeAreaRepository<'_>, SqliteWeeklyGoalRepository<'_>>,
    command: AreaCommand,
) -> Result<()> {
    let listed = match command {
        AreaCommand::List => areas.list_areas()?,
        AreaCommand::Add { name } => {
            areas.add_custom_area(name)?;
            areas.list_areas()?
        }
        AreaCommand::Delete { id } => {
            areas.delete_area(id)?;
            areas.list_areas()?
        }
        AreaCommand::Reset => areas.reset_areas()?,
    };
    for area in listed {
        println!(
            "{:>3} {:<16} icon={} default={}",
            area.id, area.name, area.icon, area.is_default
        );
    }
    Ok(())
}

fn print_week(dashboard: &WeeklyDashboard<SqliteDashboardSource<'_>>) {
    println!("week {}", dashboard.week_range_text());
    match dashboard.latest() {
        Some(week) => {
            for ((label, goal), actual) in week
                .labels
                .iter()
                .zip(&week.goal_values)
                .zip(&week.actual_values)
            {
                println!("{label:<16} goal={goal:>5.1}% actual={actual:>5.1}%");
            }
        }
        None => println!("no life areas"),
    }
    println!("{}", dashboard.default_encouragement());
}
