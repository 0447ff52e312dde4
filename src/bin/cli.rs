use chrono::{Local, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use release_planner::{
    CapacityPeriod, Employee, EngineConfig, Release, Task, TaskStatus, load_release_from_json,
    save_release_to_json, save_schedule_to_csv,
};
use std::io::{self, Write};
use std::str::FromStr;

fn parse_id_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::List(inner) => match inner.str() {
            Ok(ca) => ca.into_iter().flatten().collect::<Vec<_>>().join(","),
            Err(_) => av.to_string(),
        },
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(s.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                         Show this help\n  show                                         Compute and show the schedule\n  release                                      Show release details\n  name <text...>                               Rename the release\n  start <YYYY-MM-DD>                           Set the release start date\n  holiday add|remove <YYYY-MM-DD>              Edit custom holidays\n  employee <id> <name...>                      Upsert an employee\n  period <emp_id> <start> <end> <hours> [desc] Add a capacity period\n  task <id> <name> <hours> [emp|-] [blockers_csv|-] [priority]\n                                               Upsert a task\n  status <id> <pending|in_progress|completed|blocked>\n                                               Set task status\n  assign <id> <emp|->                          Assign or unassign a task\n  reorder <id,id,...>                          Put tasks first in this order\n  delete task|employee <id>                    Delete a record\n  config show                                  Show engine configuration\n  config load <json_path>                      Load engine configuration\n  save <path>                                  Save release as JSON\n  load <path>                                  Load release from JSON\n  export <path>                                Export the schedule as CSV\n  quit|exit                                    Exit"
    );
}

fn print_release(release: &Release) {
    let holidays = release
        .custom_holidays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Release id   : {}", release.id);
    println!("Release name : {}", release.name);
    println!("Start date   : {}", release.start_date);
    println!("Holidays     : {}", holidays);
    println!("Employees    : {}", release.employees.len());
    for employee in &release.employees {
        println!(
            "  {} {} ({} capacity periods)",
            employee.id,
            employee.name,
            employee.capacity.len()
        );
    }
    println!("Tasks        : {}", release.tasks.len());
}

fn print_schedule(release: &Release, config: &EngineConfig) {
    let schedule = release.schedule_with_config(config);
    match schedule.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering schedule: {}", e),
    }
    println!("Schedule ({})", schedule.summary().to_cli_summary());
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    setup_logging();

    let mut release = Release::new("release-1", "New Release", Local::now().date_naive());
    let mut config = EngineConfig::default();

    println!("Release Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_schedule(&release, &config),
            "release" => print_release(&release),
            "name" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: name <text...>");
                    continue;
                }
                release.name = rest.join(" ");
                println!("Release renamed.");
            }
            "start" => match parts.next().map(parse_date) {
                Some(Some(date)) => {
                    release.start_date = date;
                    println!("Start date set to {}.", date);
                }
                Some(None) => println!("Invalid date (YYYY-MM-DD)"),
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "holiday" => {
                let action = parts.next();
                let date = parts.next().map(parse_date);
                match (action, date) {
                    (Some("add"), Some(Some(date))) => {
                        release.add_holiday(date);
                        println!("Holiday {} added.", date);
                    }
                    (Some("remove"), Some(Some(date))) => {
                        if release.remove_holiday(date) {
                            println!("Holiday {} removed.", date);
                        } else {
                            println!("Holiday {} not found.", date);
                        }
                    }
                    (_, Some(None)) => println!("Invalid date (YYYY-MM-DD)"),
                    _ => println!("Usage: holiday add|remove <YYYY-MM-DD>"),
                }
            }
            "employee" => {
                let id = parts.next();
                let rest: Vec<&str> = parts.collect();
                match id {
                    Some(id) if !rest.is_empty() => {
                        let mut employee = Employee::new(id, rest.join(" "));
                        if let Some(existing) = release.find_employee(id) {
                            employee.position = existing.position.clone();
                            employee.capacity = existing.capacity.clone();
                        }
                        match release.upsert_employee(employee) {
                            Ok(_) => println!("Employee upserted."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: employee <id> <name...>"),
                }
            }
            "period" => {
                let employee_id = parts.next();
                let start = parts.next().and_then(parse_date);
                let end = parts.next().and_then(parse_date);
                let hours = parts.next().and_then(|h| h.parse::<f64>().ok());
                let description: Vec<&str> = parts.collect();
                match (employee_id, start, end, hours) {
                    (Some(employee_id), Some(start), Some(end), Some(hours)) => {
                        let mut period = CapacityPeriod::new(start, end, hours);
                        if !description.is_empty() {
                            period = period.with_description(description.join(" "));
                        }
                        match release.add_capacity_period(employee_id, period) {
                            Ok(_) => println!("Capacity period added."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: period <emp_id> <YYYY-MM-DD> <YYYY-MM-DD> <hours> [desc]"),
                }
            }
            "task" => {
                let id = parts.next();
                let name = parts.next();
                let hours = parts.next();
                let assignee = parts.next();
                let blockers = parts.next();
                let priority = parts.next();
                match (id, name, hours) {
                    (Some(id), Some(name), Some(hours)) => {
                        let hours: f64 = match hours.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid hours");
                                continue;
                            }
                        };
                        let priority: i32 = match priority.map(str::parse::<i32>) {
                            Some(Ok(v)) => v,
                            Some(Err(_)) => {
                                println!("Invalid priority");
                                continue;
                            }
                            None => release.find_task(id).map(|t| t.priority).unwrap_or(
                                release.tasks.len() as i32,
                            ),
                        };
                        let mut task = Task::new(id, name, hours).with_priority(priority);
                        if let Some(existing) = release.find_task(id) {
                            task.status = existing.status;
                        }
                        if let Some(emp) = assignee.filter(|a| *a != "-") {
                            task = task.assigned_to(emp);
                        }
                        if let Some(list) = blockers.filter(|b| *b != "-") {
                            task = task.blocked_by(parse_id_list(list));
                        }
                        match release.upsert_task(task) {
                            Ok(_) => println!("Task upserted."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!(
                        "Usage: task <id> <name> <hours> [emp|-] [blockers_csv|-] [priority]"
                    ),
                }
            }
            "status" => {
                let id = parts.next();
                let status = parts.next().map(TaskStatus::from_str);
                match (id, status) {
                    (Some(id), Some(Ok(status))) => match release.set_task_status(id, status) {
                        Ok(_) => println!("Task {} is now {}.", id, status),
                        Err(e) => println!("Error: {}", e),
                    },
                    (_, Some(Err(e))) => println!("Error: {}", e),
                    _ => println!("Usage: status <id> <pending|in_progress|completed|blocked>"),
                }
            }
            "assign" => {
                let id = parts.next();
                let employee = parts.next();
                match (id, employee) {
                    (Some(id), Some(employee)) => {
                        let employee = (employee != "-").then_some(employee);
                        match release.assign_task(id, employee) {
                            Ok(_) => println!("Task {} assignment updated.", id),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: assign <id> <emp|->"),
                }
            }
            "reorder" => match parts.next() {
                Some(list) => {
                    let ids = parse_id_list(list);
                    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
                    match release.reorder_tasks(&refs) {
                        Ok(_) => println!("Tasks reordered."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: reorder <id,id,...>"),
            },
            "delete" => match (parts.next(), parts.next()) {
                (Some("task"), Some(id)) => {
                    if release.delete_task(id) {
                        println!("Deleted task {id}.");
                    } else {
                        println!("Task {id} not found.");
                    }
                }
                (Some("employee"), Some(id)) => {
                    if release.delete_employee(id) {
                        println!("Deleted employee {id}.");
                    } else {
                        println!("Employee {id} not found.");
                    }
                }
                _ => println!("Usage: delete task|employee <id>"),
            },
            "config" => match parts.next() {
                Some("show") | None => {
                    println!("Horizon months       : {}", config.horizon_months);
                    println!("Hours per working day: {}", config.hours_per_working_day);
                }
                Some("load") => match parts.next() {
                    Some(path) => match EngineConfig::load(path) {
                        Ok(loaded) => {
                            config = loaded;
                            println!("Configuration loaded from {}.", path);
                        }
                        Err(e) => println!("Error loading configuration: {}", e),
                    },
                    None => println!("Usage: config load <json_path>"),
                },
                Some(other) => {
                    println!("Unknown config command '{}'.", other);
                    println!("Usage: config show|load <json_path>");
                }
            },
            "save" => match parts.next() {
                Some(path) => match save_release_to_json(&release, path) {
                    Ok(_) => println!("Release saved to {}.", path),
                    Err(e) => println!("Error saving release: {}", e),
                },
                None => println!("Usage: save <path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_release_from_json(path) {
                    Ok(loaded) => {
                        release = loaded;
                        println!("Release loaded from {}.", path);
                        print_schedule(&release, &config);
                    }
                    Err(e) => println!("Error loading release: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "export" => match parts.next() {
                Some(path) => {
                    let schedule = release.schedule_with_config(&config);
                    match save_schedule_to_csv(&schedule, path) {
                        Ok(_) => println!("Schedule exported to {}.", path),
                        Err(e) => println!("Error exporting schedule: {}", e),
                    }
                }
                None => println!("Usage: export <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
