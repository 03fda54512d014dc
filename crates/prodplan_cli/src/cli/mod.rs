use clap::{Parser, Subcommand};
use prodplan_core::config::parse_switch;

#[derive(Parser, Debug)]
#[command(author, version, about = "Production scheduling engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and move tasks through their statuses
    Task {
        #[command(subcommand)]
        task: TaskCommand,
    },
    /// Check whether a standard task's limit phases are complete in a project
    ///
    /// Example: prodplan deps std-12 project-4
    Deps {
        standard_task_id: String,
        project_id: String,
    },
    /// List the workstations an employee may staff
    ///
    /// Example: prodplan workstations emp-3
    Workstations { employee_id: String },
    /// Generate or show the daily plan
    Plan {
        #[command(subcommand)]
        plan: PlanCommand,
    },
    /// Team lanes of the installation calendar
    Team {
        #[command(subcommand)]
        team: TeamCommand,
    },
    /// Truck deliveries derived from team assignments
    Truck {
        #[command(subcommand)]
        truck: TruckCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Show a task
    ///
    /// Example: prodplan task show task-1
    Show { id: String },
    /// Request a status change
    ///
    /// Example: prodplan task status task-1 todo
    /// Example: prodplan task status task-1 completed --by emp-2
    Status {
        id: String,
        status: String,
        /// Employee performing the change
        #[arg(long, value_name = "EMPLOYEE")]
        by: Option<String>,
        /// Employee taking the task
        #[arg(long, value_name = "EMPLOYEE")]
        assignee: Option<String>,
    },
    /// Open tasks at an employee's workstations
    ///
    /// Example: prodplan task mine emp-3
    Mine { employee_id: String },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Rebuild the auto-generated schedule for a date
    ///
    /// Example: prodplan plan generate 2024-06-03
    Generate { date: String },
    /// Show every schedule entry for a date
    ///
    /// Example: prodplan plan show 2024-06-03
    Show { date: String },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Put a project on a team lane
    ///
    /// Example: prodplan team assign project-4 blue 2024-06-03 --duration 3
    Assign {
        project_id: String,
        team: String,
        start_date: String,
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Move a project to a new start date
    ///
    /// Example: prodplan team move project-4 2024-06-10
    Move {
        project_id: String,
        start_date: String,
    },
    /// Grow at the end or shrink at the start by one day
    ///
    /// Example: prodplan team extend project-4 end
    Extend {
        project_id: String,
        direction: String,
    },
    /// Set the duration, clamped to the visible calendar window
    ///
    /// Example: prodplan team resize project-4 5 --window-start 2024-06-03
    Resize {
        project_id: String,
        #[arg(allow_negative_numbers = true)]
        duration: i64,
        /// First rendered day; defaults to the assignment's start date
        #[arg(long, value_name = "DATE")]
        window_start: Option<String>,
    },
    /// Show team lanes for a window
    ///
    /// Example: prodplan team calendar 2024-06-03
    Calendar { start_date: String },
    /// Take a project off its team lane
    ///
    /// Example: prodplan team unassign project-4
    Unassign { project_id: String },
    /// List projects without a team assignment
    Unassigned,
}

#[derive(Subcommand, Debug)]
pub enum TruckCommand {
    /// Assign a truck, or pass "none" to unassign
    ///
    /// Example: prodplan truck assign project-4 truck-2
    Assign { project_id: String, truck_id: String },
    /// Show the truck assignment of a project
    Show { project_id: String },
}

/// One `--config-override` value, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverride {
    Color(bool),
    WindowDays(u32),
}

/// Parse a raw `KEY=VALUE` override such as `color=off` or `window_days=21`.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;
    let key = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;
    let value = value_raw.trim();

    match key.as_str() {
        "color" | "colour" => parse_switch(value)
            .map(ConfigOverride::Color)
            .ok_or_else(|| format!("color must be on or off, got '{value}'")),
        "window_days" | "window" => match value.parse::<u32>() {
            Ok(days) if days > 0 => Ok(ConfigOverride::WindowDays(days)),
            _ => Err("window_days must be a positive number".to_string()),
        },
        other => Err(format!("unknown config field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
