use chrono::{Datelike, NaiveDate, Weekday};
use release_planner::palette::{EMPLOYEE_PALETTE, UNASSIGNED_COLOR};
use release_planner::{
    CapacityPeriod, Employee, EngineConfig, Release, Task, TaskStatus, UnscheduledReason,
    WorkCalendar, compute_schedule, compute_schedule_with_config,
};
use std::collections::HashSet;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Monday 2025-01-06
fn monday_release() -> Release {
    Release::new("r1", "Q1", d(2025, 1, 6))
}

fn full_time(id: &str, name: &str) -> Employee {
    Employee::new(id, name).with_period(CapacityPeriod::new(d(2025, 1, 1), d(2026, 12, 31), 8.0))
}

#[test]
fn one_result_per_task_in_input_order() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("a", "A", 8.0),
        Task::new("b", "B", 4.0).assigned_to("e1").blocked_by(["a"]),
        Task::new("c", "C", 4.0).blocked_by(["missing"]),
        Task::new("d", "D", 4.0).blocked_by(["e"]),
        Task::new("e", "E", 4.0).blocked_by(["d"]),
    ];

    let result = compute_schedule(&r);
    let ids: Vec<&str> = result.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), r.tasks.len());
}

#[test]
fn mutual_blockers_are_both_cycles() {
    let mut r = monday_release();
    r.tasks = vec![
        Task::new("a", "A", 8.0).blocked_by(["b"]),
        Task::new("b", "B", 8.0).blocked_by(["a"]),
        Task::new("free", "Free", 8.0),
    ];

    let result = compute_schedule(&r);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::Cycle)
    );
    assert_eq!(
        result.find("b").unwrap().unscheduled_reason,
        Some(UnscheduledReason::Cycle)
    );
    assert!(result.find("free").unwrap().is_scheduled());
    assert!(result.find("a").unwrap().start_date.is_none());
}

#[test]
fn self_blocking_task_is_a_cycle() {
    let mut r = monday_release();
    r.tasks = vec![Task::new("a", "A", 8.0).blocked_by(["a"])];
    let result = compute_schedule(&r);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::Cycle)
    );
}

#[test]
fn dependents_of_a_cycle_inherit_the_reason() {
    let mut r = monday_release();
    r.tasks = vec![
        Task::new("after", "After", 8.0).blocked_by(["a"]).with_priority(0),
        Task::new("a", "A", 8.0).blocked_by(["b"]).with_priority(5),
        Task::new("b", "B", 8.0).blocked_by(["a"]).with_priority(5),
    ];
    let result = compute_schedule(&r);
    for id in ["after", "a", "b"] {
        assert_eq!(
            result.find(id).unwrap().unscheduled_reason,
            Some(UnscheduledReason::Cycle),
            "task {id}"
        );
    }
}

#[test]
fn blocked_task_starts_after_blocker_on_a_working_day() {
    let mut r = monday_release();
    r.add_holiday(d(2025, 1, 13));
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("design", "Design", 32.0).assigned_to("e1"),
        Task::new("build", "Build", 12.0)
            .assigned_to("e1")
            .blocked_by(["design"]),
        Task::new("ship", "Ship", 8.0).blocked_by(["build", "design"]),
    ];

    let result = compute_schedule(&r);
    let calendar = r.calendar();
    for task in &r.tasks {
        let scheduled = result.find(&task.id).unwrap();
        let start = scheduled.start_date.unwrap();
        assert!(calendar.is_working_day(start));
        for blocker in &task.blocker_task_ids {
            let blocker_end = result.find(blocker).unwrap().end_date.unwrap();
            assert!(start > blocker_end, "{} starts before {} ends", task.id, blocker);
        }
    }

    // Design fills Mon-Thu, Build skips Sat/Sun and the Monday holiday.
    let design = result.find("design").unwrap();
    assert_eq!((design.start_date, design.end_date), (Some(d(2025, 1, 6)), Some(d(2025, 1, 9))));
    let build = result.find("build").unwrap();
    assert_eq!((build.start_date, build.end_date), (Some(d(2025, 1, 10)), Some(d(2025, 1, 14))));
    let ship = result.find("ship").unwrap();
    assert_eq!(ship.start_date, Some(d(2025, 1, 15)));
}

#[test]
fn shared_employee_capacity_is_not_double_booked() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("first", "First", 8.0).assigned_to("e1").with_priority(0),
        Task::new("second", "Second", 8.0).assigned_to("e1").with_priority(1),
    ];

    let result = compute_schedule(&r);
    let first = result.find("first").unwrap();
    let second = result.find("second").unwrap();
    assert_eq!((first.start_date, first.end_date), (Some(d(2025, 1, 6)), Some(d(2025, 1, 6))));
    assert_eq!((second.start_date, second.end_date), (Some(d(2025, 1, 7)), Some(d(2025, 1, 7))));
}

#[test]
fn lower_priority_value_wins_contested_capacity() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("late", "Late", 8.0).assigned_to("e1").with_priority(3),
        Task::new("early", "Early", 8.0).assigned_to("e1").with_priority(1),
    ];
    let result = compute_schedule(&r);
    assert_eq!(result.find("early").unwrap().start_date, Some(d(2025, 1, 6)));
    assert_eq!(result.find("late").unwrap().start_date, Some(d(2025, 1, 7)));
}

#[test]
fn blocker_is_scheduled_first_even_with_worse_priority() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("dependent", "Dependent", 8.0)
            .assigned_to("e1")
            .blocked_by(["blocker"])
            .with_priority(0),
        Task::new("blocker", "Blocker", 8.0).assigned_to("e1").with_priority(9),
    ];
    let result = compute_schedule(&r);
    assert_eq!(result.find("blocker").unwrap().start_date, Some(d(2025, 1, 6)));
    assert_eq!(result.find("dependent").unwrap().start_date, Some(d(2025, 1, 7)));
}

#[test]
fn part_time_capacity_spreads_over_days() {
    let mut r = monday_release();
    r.employees.push(
        Employee::new("e1", "Ada")
            .with_period(CapacityPeriod::new(d(2025, 1, 1), d(2025, 12, 31), 4.0)),
    );
    r.tasks = vec![Task::new("a", "A", 10.0).assigned_to("e1")];
    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!((a.start_date, a.end_date), (Some(d(2025, 1, 6)), Some(d(2025, 1, 8))));
    assert_eq!(result.employee_loads[0].allocated_hours, 10.0);
}

#[test]
fn vacation_period_is_skipped() {
    let mut r = monday_release();
    r.employees.push(
        Employee::new("e1", "Ada")
            .with_period(
                CapacityPeriod::new(d(2025, 1, 6), d(2025, 1, 8), 0.0).with_description("Vacation"),
            )
            .with_period(CapacityPeriod::new(d(2025, 1, 1), d(2025, 12, 31), 8.0)),
    );
    r.tasks = vec![Task::new("a", "A", 8.0).assigned_to("e1")];
    let result = compute_schedule(&r);
    assert_eq!(result.find("a").unwrap().start_date, Some(d(2025, 1, 9)));
}

#[test]
fn zero_capacity_employee_yields_no_capacity() {
    let mut r = monday_release();
    r.employees.push(
        Employee::new("e1", "Ada")
            .with_period(CapacityPeriod::new(d(2024, 1, 1), d(2027, 12, 31), 0.0)),
    );
    r.tasks = vec![Task::new("a", "A", 1.0).assigned_to("e1")];
    let result = compute_schedule(&r);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
}

#[test]
fn employee_without_periods_yields_no_capacity() {
    let mut r = monday_release();
    r.employees.push(Employee::new("e1", "Ada"));
    r.tasks = vec![Task::new("a", "A", 8.0).assigned_to("e1")];
    let result = compute_schedule(&r);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
}

#[test]
fn unknown_assignee_yields_no_capacity_and_neutral_color() {
    let mut r = monday_release();
    r.tasks = vec![Task::new("a", "A", 8.0).assigned_to("ghost")];
    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!(a.unscheduled_reason, Some(UnscheduledReason::NoCapacity));
    assert_eq!(a.assigned_employee_name, None);
    assert_eq!(a.color, UNASSIGNED_COLOR);
}

#[test]
fn partial_consumption_is_not_rolled_back() {
    let mut r = monday_release();
    // Only one week of capacity: 40 hours.
    r.employees.push(
        Employee::new("e1", "Ada")
            .with_period(CapacityPeriod::new(d(2025, 1, 6), d(2025, 1, 10), 8.0)),
    );
    r.tasks = vec![
        Task::new("big", "Big", 100.0).assigned_to("e1").with_priority(0),
        Task::new("small", "Small", 8.0).assigned_to("e1").with_priority(1),
    ];
    let result = compute_schedule(&r);
    assert_eq!(
        result.find("big").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert_eq!(
        result.find("small").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert_eq!(result.employee_loads[0].allocated_hours, 40.0);
    assert_eq!(result.employee_loads[0].available_hours, 40.0);
}

#[test]
fn start_beyond_horizon_yields_no_capacity() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        // About 270 working days, past the 12 month horizon.
        Task::new("long", "Long", 8.0 * 270.0),
        Task::new("after", "After", 8.0)
            .assigned_to("e1")
            .blocked_by(["long"]),
    ];
    let result = compute_schedule(&r);
    assert!(result.find("long").unwrap().is_scheduled());
    assert_eq!(
        result.find("after").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert_eq!(result.release_date, None);
}

#[test]
fn shorter_horizon_from_config_limits_capacity() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![Task::new("a", "A", 8.0 * 30.0).assigned_to("e1")];
    let config = EngineConfig {
        horizon_months: 1,
        ..EngineConfig::default()
    };
    let result = compute_schedule_with_config(&r, &config);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert!(compute_schedule(&r).find("a").unwrap().is_scheduled());
}

#[test]
fn unassigned_estimate_past_the_date_range_is_no_capacity() {
    let mut r = monday_release();
    r.tasks = vec![
        Task::new("huge", "Huge", 1.0e9),
        Task::new("after", "After", 8.0).blocked_by(["huge"]),
        Task::new("normal", "Normal", 8.0),
    ];
    assert!(r.validate().is_ok());

    let result = compute_schedule(&r);
    assert_eq!(
        result.find("huge").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert_eq!(
        result.find("after").unwrap().unscheduled_reason,
        Some(UnscheduledReason::NoCapacity)
    );
    assert!(result.find("normal").unwrap().is_scheduled());
    assert_eq!(result.release_date, None);
}

#[test]
fn degenerate_config_values_are_sanitized() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("a", "A", 16.0),
        Task::new("b", "B", 8.0).assigned_to("e1"),
    ];
    let config = EngineConfig {
        horizon_months: u32::MAX,
        hours_per_working_day: 0.0,
    };
    let result = compute_schedule_with_config(&r, &config);
    assert_eq!(result.tasks, compute_schedule(&r).tasks);
    assert_eq!(result.find("a").unwrap().end_date, Some(d(2025, 1, 8)));
    assert_eq!(result.release_date, Some(d(2025, 1, 8)));
}

#[test]
fn missing_blocker_is_external() {
    let mut r = monday_release();
    r.tasks = vec![Task::new("a", "A", 8.0).blocked_by(["not-in-release"])];
    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!(a.unscheduled_reason, Some(UnscheduledReason::ExternalBlocker));
    assert_eq!(a.dependencies, vec!["not-in-release".to_string()]);
}

#[test]
fn blocker_failure_wins_over_own_capacity_problem() {
    let mut r = monday_release();
    r.employees.push(Employee::new("e1", "Ada"));
    r.tasks = vec![
        Task::new("gone", "Gone", 8.0).blocked_by(["x"]),
        Task::new("a", "A", 8.0).assigned_to("e1").blocked_by(["gone"]),
    ];
    let result = compute_schedule(&r);
    assert_eq!(
        result.find("a").unwrap().unscheduled_reason,
        Some(UnscheduledReason::ExternalBlocker)
    );
}

#[test]
fn no_work_lands_on_weekends_or_holidays() {
    // Friday start, Monday holiday.
    let mut r = Release::new("r1", "Q1", d(2025, 1, 10));
    r.add_holiday(d(2025, 1, 13));
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("a", "A", 16.0).assigned_to("e1"),
        Task::new("b", "B", 8.0).blocked_by(["a"]),
    ];

    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!((a.start_date, a.end_date), (Some(d(2025, 1, 10)), Some(d(2025, 1, 14))));

    let calendar = r.calendar();
    for task in &result.tasks {
        for date in [task.start_date.unwrap(), task.end_date.unwrap()] {
            assert!(calendar.is_working_day(date), "{} lands on {}", task.id, date);
            assert!(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }
    assert_eq!(result.employee_loads[0].allocated_hours, 16.0);
}

#[test]
fn weekend_release_start_moves_to_monday() {
    let r = {
        let mut r = Release::new("r1", "Q1", d(2025, 1, 4));
        r.tasks = vec![Task::new("a", "A", 8.0)];
        r
    };
    let result = compute_schedule(&r);
    assert_eq!(result.find("a").unwrap().start_date, Some(d(2025, 1, 6)));
}

#[test]
fn release_date_requires_every_task_scheduled() {
    let mut r = monday_release();
    r.tasks = vec![Task::new("a", "A", 8.0), Task::new("b", "B", 24.0)];
    let result = compute_schedule(&r);
    let latest = result.tasks.iter().filter_map(|t| t.end_date).max();
    assert_eq!(result.release_date, latest);
    assert_eq!(result.release_date, Some(d(2025, 1, 9)));

    r.tasks.push(Task::new("c", "C", 8.0).blocked_by(["nope"]));
    assert_eq!(compute_schedule(&r).release_date, None);
}

#[test]
fn empty_release_has_no_release_date() {
    let result = compute_schedule(&monday_release());
    assert!(result.tasks.is_empty());
    assert_eq!(result.release_date, None);
}

#[test]
fn unassigned_sixteen_hours_spans_two_working_days() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![Task::new("a", "A", 16.0)];
    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!(a.start_date, Some(d(2025, 1, 6)));
    assert_eq!(
        a.end_date,
        WorkCalendar::default().add_working_days(d(2025, 1, 6), 2)
    );
    assert_eq!(result.employee_loads[0].allocated_hours, 0.0);
}

#[test]
fn blocked_unassigned_task_starts_after_blocker_ends() {
    let mut r = monday_release();
    r.tasks = vec![
        Task::new("a", "A", 8.0),
        Task::new("b", "B", 8.0).blocked_by(["a"]),
    ];
    let result = compute_schedule(&r);
    let a = result.find("a").unwrap();
    assert_eq!((a.start_date, a.end_date), (Some(d(2025, 1, 6)), Some(d(2025, 1, 7))));
    assert_eq!(result.find("b").unwrap().start_date, Some(d(2025, 1, 8)));
}

#[test]
fn zero_hour_assigned_task_is_a_milestone() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("work", "Work", 8.0).assigned_to("e1"),
        Task::new("gate", "Gate", 0.0).assigned_to("e1").blocked_by(["work"]),
    ];
    let result = compute_schedule(&r);
    let gate = result.find("gate").unwrap();
    assert_eq!((gate.start_date, gate.end_date), (Some(d(2025, 1, 7)), Some(d(2025, 1, 7))));
    assert_eq!(result.employee_loads[0].allocated_hours, 8.0);
}

#[test]
fn presentation_fields_follow_employee_and_status() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.employees.push(full_time("e2", "Grace"));
    r.tasks = vec![
        Task::new("a", "A", 8.0).assigned_to("e2").with_status(TaskStatus::Completed),
        Task::new("b", "B", 8.0).with_status(TaskStatus::InProgress),
        Task::new("c", "C", 8.0).assigned_to("e1").with_status(TaskStatus::Blocked),
    ];
    let result = compute_schedule(&r);

    assert_eq!(result.employee_colors.len(), 2);
    assert_eq!(result.employee_colors[0].color, EMPLOYEE_PALETTE[0]);
    assert_eq!(result.employee_colors[1].color, EMPLOYEE_PALETTE[1]);

    let a = result.find("a").unwrap();
    assert_eq!(a.assigned_employee_name.as_deref(), Some("Grace"));
    assert_eq!(a.color, EMPLOYEE_PALETTE[1]);
    assert_eq!(a.progress, 100);

    let b = result.find("b").unwrap();
    assert_eq!(b.color, UNASSIGNED_COLOR);
    assert_eq!(b.progress, 50);

    assert_eq!(result.find("c").unwrap().progress, 0);
}

#[test]
fn summary_counts_outcomes() {
    let mut r = monday_release();
    r.employees.push(Employee::new("e1", "Ada"));
    r.tasks = vec![
        Task::new("ok", "Ok", 8.0).with_status(TaskStatus::Completed),
        Task::new("ext", "Ext", 8.0).blocked_by(["zz"]),
        Task::new("cap", "Cap", 8.0).assigned_to("e1"),
        Task::new("c1", "C1", 8.0).blocked_by(["c2"]),
        Task::new("c2", "C2", 8.0).blocked_by(["c1"]),
    ];
    let summary = compute_schedule(&r).summary();
    assert_eq!(summary.task_count, 5);
    assert_eq!(summary.scheduled_count, 1);
    assert_eq!(summary.external_blocker_count, 1);
    assert_eq!(summary.no_capacity_count, 1);
    assert_eq!(summary.cycle_count, 2);
    assert_eq!(summary.release_date, None);
    assert_eq!(summary.progress, 20.0);
    let line = summary.to_cli_summary();
    assert!(line.contains("release=unplanned"));
    assert!(line.contains("cycle=2"));
}

#[test]
fn scheduling_leaves_the_release_untouched_and_is_repeatable() {
    let mut r = monday_release();
    r.employees.push(full_time("e1", "Ada"));
    r.tasks = vec![
        Task::new("a", "A", 12.0).assigned_to("e1"),
        Task::new("b", "B", 12.0).assigned_to("e1").blocked_by(["a"]),
    ];
    let snapshot = r.clone();
    let first = compute_schedule(&r);
    let second = compute_schedule(&r);
    assert_eq!(r, snapshot);
    assert_eq!(first, second);
}

#[test]
fn schedule_dataframe_has_one_row_per_task() {
    let mut r = monday_release();
    r.tasks = vec![
        Task::new("a", "A", 8.0),
        Task::new("b", "B", 8.0).blocked_by(["a", "x"]),
    ];
    let df = compute_schedule(&r).to_dataframe().unwrap();
    assert_eq!(df.height(), 2);
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert!(names.contains(&"start_date".to_string()));
    assert!(names.contains(&"unscheduled_reason".to_string()));
    let reasons = df
        .column("unscheduled_reason")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .clone();
    assert_eq!(reasons.get(0), None);
    assert_eq!(reasons.get(1), Some("external_blocker"));
}
