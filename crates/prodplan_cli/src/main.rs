use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use prodplan_cli::cli::{
    Cli, Command, ConfigOverride, PlanCommand, TaskCommand, TeamCommand, TruckCommand,
    parse_config_override,
};
use prodplan_core::assignment_calendar::{self, ExtendDirection};
use prodplan_core::config::{self, Config, ConfigOverrides, Palette};
use prodplan_core::error::AppError;
use prodplan_core::model::{ScheduleEntry, Task, Team, TeamAssignment, TaskStatus};
use prodplan_core::planner;
use prodplan_core::storage::json_store::JsonStore;
use prodplan_core::storage::{TeamAssignmentRepository, TruckAssignmentRepository};
use prodplan_core::task_api::{self, StatusChange};
use prodplan_core::{delivery, dependency, workstation};
use serde::Serialize;
use std::io::{self, BufRead};
use std::str::FromStr;
use tabled::{Table, Tabled};
use time::macros::format_description;
use time::{Date, Time};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_ENV_VAR: &str = "PRODPLAN_LOG";

struct Context {
    store: JsonStore,
    config: Config,
    palette: Palette,
    json: bool,
}

#[derive(Tabled)]
struct TaskRow {
    id: String,
    title: String,
    status: &'static str,
    priority: &'static str,
    workstation: String,
    assignee: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.as_str(),
            priority: task.priority.as_str(),
            workstation: task.workstation.clone().unwrap_or_else(|| "-".to_string()),
            assignee: task.assignee.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
struct ScheduleRow {
    employee: String,
    start: String,
    end: String,
    title: String,
    source: &'static str,
}

#[derive(Tabled)]
struct LaneRow {
    team: &'static str,
    project: String,
    start: String,
    end: String,
    days: u32,
}

#[derive(Tabled)]
struct NamedRow {
    id: String,
    name: String,
}

fn clock(value: Time) -> Result<String, AppError> {
    value
        .format(format_description!("[hour]:[minute]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation(format!("date must be YYYY-MM-DD, got '{raw}'")))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_table<R: Tabled>(rows: Vec<R>) {
    if rows.is_empty() {
        println!("(none)");
    } else {
        println!("{}", Table::new(rows));
    }
}

fn print_schedule(entries: &[ScheduleEntry]) -> Result<(), AppError> {
    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        rows.push(ScheduleRow {
            employee: entry.employee_id.clone(),
            start: clock(entry.start_time)?,
            end: clock(entry.end_time)?,
            title: entry.title.clone(),
            source: if entry.is_auto_generated {
                "auto"
            } else {
                "manual"
            },
        });
    }
    print_table(rows);
    Ok(())
}

fn describe_assignment(palette: &Palette, assignment: &TeamAssignment) -> Result<String, AppError> {
    Ok(format!(
        "{} on {} from {} to {} ({} day(s))",
        assignment.project_id,
        palette.team(assignment.team),
        assignment.start_date,
        assignment.end_date()?,
        assignment.duration_days
    ))
}

fn report_assignment(ctx: &Context, verb: &str, assignment: &TeamAssignment) -> Result<(), AppError> {
    if ctx.json {
        print_json(assignment)
    } else {
        println!("{verb}: {}", describe_assignment(&ctx.palette, assignment)?);
        Ok(())
    }
}

fn run_task(ctx: &Context, command: TaskCommand) -> Result<(), AppError> {
    match command {
        TaskCommand::Show { id } => {
            let task = task_api::get_task(&ctx.store, &id)?;
            if ctx.json {
                print_json(&task)?;
            } else {
                print_table(vec![TaskRow::from(&task)]);
            }
        }
        TaskCommand::Status {
            id,
            status,
            by,
            assignee,
        } => {
            let change = StatusChange {
                status: TaskStatus::from_str(&status)?,
                acting_employee: by,
                assignee,
            };
            let outcome = task_api::transition_task(&ctx.store, &id, &change)?;
            if ctx.json {
                print_json(&serde_json::json!({
                    "task": outcome.task,
                    "requested": outcome.requested,
                    "downgraded": outcome.downgraded(),
                }))?;
            } else if outcome.downgraded() {
                println!(
                    "Task {} held as {}: limit phases incomplete (requested {})",
                    outcome.task.id,
                    ctx.palette.status(TaskStatus::Hold),
                    outcome.requested.as_str()
                );
            } else {
                println!(
                    "Task {} is now {}",
                    outcome.task.id,
                    ctx.palette.status(outcome.task.status)
                );
            }
        }
        TaskCommand::Mine { employee_id } => {
            let tasks = task_api::tasks_for_employee(&ctx.store, &employee_id)?;
            if ctx.json {
                print_json(&tasks)?;
            } else {
                print_table(tasks.iter().map(TaskRow::from).collect());
            }
        }
    }

    Ok(())
}

fn run_plan(ctx: &Context, command: PlanCommand) -> Result<(), AppError> {
    match command {
        PlanCommand::Generate { date } => {
            let date = parse_date(&date)?;
            let outcome = planner::generate_daily_plan(&ctx.store, date)?;
            if ctx.json {
                print_json(&serde_json::json!({
                    "date": outcome.date.to_string(),
                    "segments": outcome.segments,
                    "removed": outcome.removed,
                    "entries": outcome.entries,
                }))?;
            } else {
                println!(
                    "{}",
                    ctx.palette.heading(&format!(
                        "Planned {} entries for {} across {} segment(s)",
                        outcome.entries.len(),
                        outcome.date,
                        outcome.segments
                    ))
                );
                if outcome.removed > 0 {
                    println!(
                        "{}",
                        ctx.palette.note(&format!(
                            "replaced {} auto-generated entries",
                            outcome.removed
                        ))
                    );
                }
                print_schedule(&outcome.entries)?;
            }
        }
        PlanCommand::Show { date } => {
            let date = parse_date(&date)?;
            let entries = planner::schedule_for_date(&ctx.store, date)?;
            if ctx.json {
                print_json(&entries)?;
            } else {
                print_schedule(&entries)?;
            }
        }
    }

    Ok(())
}

fn run_team(ctx: &Context, command: TeamCommand) -> Result<(), AppError> {
    match command {
        TeamCommand::Assign {
            project_id,
            team,
            start_date,
            duration,
        } => {
            let assignment = assignment_calendar::assign_project_to_team(
                &ctx.store,
                &project_id,
                Team::from_str(&team)?,
                parse_date(&start_date)?,
                duration,
            )?;
            report_assignment(ctx, "Assigned", &assignment)?;
        }
        TeamCommand::Move {
            project_id,
            start_date,
        } => {
            let assignment =
                assignment_calendar::move_project(&ctx.store, &project_id, parse_date(&start_date)?)?;
            report_assignment(ctx, "Moved", &assignment)?;
        }
        TeamCommand::Extend {
            project_id,
            direction,
        } => {
            let assignment = assignment_calendar::extend_project(
                &ctx.store,
                &project_id,
                ExtendDirection::from_str(&direction)?,
            )?;
            report_assignment(ctx, "Extended", &assignment)?;
        }
        TeamCommand::Resize {
            project_id,
            duration,
            window_start,
        } => {
            let current = ctx
                .store
                .team_assignment_by_project(project_id.trim())?
                .ok_or_else(|| {
                    AppError::not_found(format!("no team assignment for project {project_id}"))
                })?;
            let window_start = match window_start {
                Some(raw) => parse_date(&raw)?,
                None => current.start_date,
            };
            let max_columns = assignment_calendar::remaining_columns(
                window_start,
                ctx.config.window_days(),
                current.start_date,
            );
            let assignment =
                assignment_calendar::resize(&ctx.store, &project_id, duration, max_columns)?;
            report_assignment(ctx, "Resized", &assignment)?;
        }
        TeamCommand::Calendar { start_date } => {
            let lanes = assignment_calendar::calendar_window(
                &ctx.store,
                parse_date(&start_date)?,
                ctx.config.window_days(),
            )?;
            if ctx.json {
                let payload: Vec<_> = lanes
                    .iter()
                    .map(|lane| {
                        serde_json::json!({
                            "team": lane.team,
                            "assignments": lane.assignments,
                        })
                    })
                    .collect();
                print_json(&payload)?;
            } else {
                let mut rows = Vec::new();
                for lane in &lanes {
                    for assignment in &lane.assignments {
                        rows.push(LaneRow {
                            team: lane.team.as_str(),
                            project: assignment.project_id.clone(),
                            start: assignment.start_date.to_string(),
                            end: assignment.end_date()?.to_string(),
                            days: assignment.duration_days,
                        });
                    }
                }
                print_table(rows);
            }
        }
        TeamCommand::Unassign { project_id } => {
            let removed = assignment_calendar::unassign_project(&ctx.store, &project_id)?;
            if ctx.json {
                print_json(&serde_json::json!({ "removed": removed }))?;
            } else if removed {
                println!("Unassigned {}", project_id.trim());
            } else {
                println!("{} had no team assignment", project_id.trim());
            }
        }
        TeamCommand::Unassigned => {
            let projects = assignment_calendar::unassigned_projects(&ctx.store)?;
            if ctx.json {
                print_json(&projects)?;
            } else {
                print_table(
                    projects
                        .into_iter()
                        .map(|project| NamedRow {
                            id: project.id,
                            name: project.name,
                        })
                        .collect(),
                );
            }
        }
    }

    Ok(())
}

fn run_truck(ctx: &Context, command: TruckCommand) -> Result<(), AppError> {
    match command {
        TruckCommand::Assign {
            project_id,
            truck_id,
        } => {
            let assignment = delivery::upsert_truck_assignment(&ctx.store, &project_id, &truck_id)?;
            if ctx.json {
                print_json(&assignment)?;
            } else {
                match assignment {
                    Some(truck) => println!(
                        "Truck {} for {}: loading {}, installation {}",
                        truck.truck_id,
                        truck.project_id,
                        truck.loading_date,
                        truck.installation_date
                    ),
                    None => println!("Truck unassigned from {}", project_id.trim()),
                }
            }
        }
        TruckCommand::Show { project_id } => {
            let assignment = ctx.store.truck_assignment_by_project(project_id.trim())?;
            if ctx.json {
                print_json(&assignment)?;
            } else {
                match assignment {
                    Some(truck) => println!(
                        "Truck {} for {}: loading {}, installation {}",
                        truck.truck_id,
                        truck.project_id,
                        truck.loading_date,
                        truck.installation_date
                    ),
                    None => println!("No truck assigned to {}", project_id.trim()),
                }
            }
        }
    }

    Ok(())
}

fn load_context(cli: &Cli) -> Result<Context, AppError> {
    let loaded = config::load_config();
    if let Some(err) = loaded.error.as_ref() {
        warn!(error = %err, "using default configuration");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        let parsed = parse_config_override(raw).map_err(AppError::validation)?;
        match parsed {
            ConfigOverride::Color(enabled) => overrides.color = Some(enabled),
            ConfigOverride::WindowDays(days) => overrides.window_days = Some(days),
        }
    }
    let config = config::merge_overrides(&loaded.config, &overrides);
    let palette = if cli.json {
        Palette::plain()
    } else {
        config.palette()
    };

    Ok(Context {
        store: JsonStore::from_env()?,
        config,
        palette,
        json: cli.json,
    })
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let ctx = load_context(&cli)?;

    match cli.command {
        Command::Task { task } => run_task(&ctx, task)?,
        Command::Deps {
            standard_task_id,
            project_id,
        } => {
            let blocking =
                dependency::blocking_phases(&ctx.store, standard_task_id.trim(), project_id.trim())?;
            if ctx.json {
                print_json(&serde_json::json!({
                    "satisfied": blocking.is_empty(),
                    "blocking": blocking,
                }))?;
            } else if blocking.is_empty() {
                println!("Limit phases satisfied");
            } else {
                println!("Blocked by: {}", blocking.join(", "));
            }
        }
        Command::Workstations { employee_id } => {
            let workstations = workstation::workstations_for_employee(&ctx.store, employee_id.trim())?;
            if ctx.json {
                print_json(&workstations)?;
            } else {
                print_table(
                    workstations
                        .into_iter()
                        .map(|workstation| NamedRow {
                            id: workstation.id,
                            name: workstation.name,
                        })
                        .collect(),
                );
            }
        }
        Command::Plan { plan } => run_plan(&ctx, plan)?,
        Command::Team { team } => run_team(&ctx, team)?,
        Command::Truck { truck } => run_truck(&ctx, truck)?,
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("prodplan".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
