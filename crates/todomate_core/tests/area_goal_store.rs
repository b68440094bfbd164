use chrono::{FixedOffset, TimeZone};
use std::sync::Arc;
use todomate_core::db::open_db_in_memory;
use todomate_core::model::life_area::LifeAreaDraft;
use todomate_core::model::task::Task;
use todomate_core::model::weekly_goal::GoalTarget;
use todomate_core::repo::area_repo::{LifeAreaRepository, OnConflict, SqliteLifeAreaRepository};
use todomate_core::repo::goal_repo::{SqliteWeeklyGoalRepository, WeeklyGoalRepository};
use todomate_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use todomate_core::{
    AreaService, AreaServiceError, ChangeHub, FixedClock, RepoError, StoreChange, WeekCalendar,
};

fn tz() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
    tz().with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap()
        .timestamp_millis()
}

#[test]
fn areas_list_in_order_index_then_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLifeAreaRepository::try_new(&conn).unwrap();

    repo.insert(&LifeAreaDraft::custom("Hobby", 0)).unwrap();
    let names = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|area| area.name)
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Career", "Hobby", "Health", "Learning", "Relationships", "Finance"]
    );
}

#[test]
fn insert_many_ignore_keeps_existing_rows_and_replace_overwrites() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLifeAreaRepository::try_new(&conn).unwrap();

    let mut renamed = LifeAreaDraft::custom("Work", 0);
    renamed.id = Some(1);

    assert_eq!(
        repo.insert_many(std::slice::from_ref(&renamed), OnConflict::Ignore)
            .unwrap(),
        0
    );
    assert_eq!(repo.get_by_id(1).unwrap().unwrap().name, "Career");

    assert_eq!(
        repo.insert_many(&[renamed], OnConflict::Replace).unwrap(),
        1
    );
    assert_eq!(repo.get_by_id(1).unwrap().unwrap().name, "Work");
    assert_eq!(repo.count().unwrap(), 5);
}

#[test]
fn deleting_area_unassigns_tasks_and_drops_goals() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteLifeAreaRepository::try_new(&conn).unwrap();
    let goals = SqliteWeeklyGoalRepository::try_new(&conn).unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("Run", 10).in_area(2);
    tasks.insert(&task).unwrap();
    goals
        .upsert(
            &GoalTarget {
                life_area_id: 2,
                week_start: 1_000,
                target_percentage: 25,
            },
            5,
        )
        .unwrap();

    areas.delete(2).unwrap();

    assert_eq!(tasks.get_by_id(task.id).unwrap().unwrap().life_area_id, None);
    assert!(goals.list_for_week(1_000).unwrap().is_empty());
    assert!(matches!(
        areas.delete(2),
        Err(RepoError::LifeAreaNotFound(2))
    ));
}

#[test]
fn goal_upsert_replaces_same_area_and_week() {
    let conn = open_db_in_memory().unwrap();
    let goals = SqliteWeeklyGoalRepository::try_new(&conn).unwrap();

    let target = |pct| GoalTarget {
        life_area_id: 1,
        week_start: 7_000,
        target_percentage: pct,
    };
    let first = goals.upsert(&target(30), 1).unwrap();
    let second = goals.upsert(&target(55), 2).unwrap();
    assert_eq!(first, second);

    let stored = goals.get_for_week_and_area(7_000, 1).unwrap().unwrap();
    assert_eq!(stored.target_percentage, 55);
    assert_eq!(stored.created_at, 2);
    assert_eq!(goals.list_for_week(7_000).unwrap().len(), 1);
}

#[test]
fn goal_upsert_validates_percentage_and_area() {
    let conn = open_db_in_memory().unwrap();
    let goals = SqliteWeeklyGoalRepository::try_new(&conn).unwrap();

    let over = GoalTarget {
        life_area_id: 1,
        week_start: 0,
        target_percentage: 101,
    };
    assert!(matches!(
        goals.upsert(&over, 0),
        Err(RepoError::GoalValidation(_))
    ));

    let missing_area = GoalTarget {
        life_area_id: 404,
        week_start: 0,
        target_percentage: 10,
    };
    assert!(matches!(
        goals.upsert_many(&[missing_area], 0),
        Err(RepoError::LifeAreaNotFound(404))
    ));
}

#[test]
fn upsert_many_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let goals = SqliteWeeklyGoalRepository::try_new(&conn).unwrap();

    let batch = [
        GoalTarget {
            life_area_id: 1,
            week_start: 9,
            target_percentage: 10,
        },
        GoalTarget {
            life_area_id: 404,
            week_start: 9,
            target_percentage: 10,
        },
    ];
    assert!(goals.upsert_many(&batch, 0).is_err());
    assert!(goals.list_for_week(9).unwrap().is_empty());
}

#[test]
fn service_canonicalizes_goal_weeks_and_publishes_week_changes() {
    let conn = open_db_in_memory().unwrap();
    let (hub, feed) = ChangeHub::channel();
    let service = AreaService::new(
        SqliteLifeAreaRepository::try_new(&conn).unwrap(),
        SqliteWeeklyGoalRepository::try_new(&conn).unwrap(),
    )
    .with_calendar(WeekCalendar::new(tz()))
    .with_change_hub(hub)
    .with_clock(Arc::new(FixedClock(ms(2024, 2, 2, 8))));

    let thursday = ms(2024, 2, 1, 15);
    let monday = ms(2024, 1, 29, 0);
    let saved = service
        .save_weekly_goals(thursday, &[(1, 30), (2, 20)])
        .unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|goal| goal.week_start == monday));
    assert!(saved.iter().all(|goal| goal.created_at == ms(2024, 2, 2, 8)));

    let sunday_night = ms(2024, 2, 4, 23);
    assert_eq!(
        service
            .goal_for(sunday_night, 1)
            .unwrap()
            .unwrap()
            .target_percentage,
        30
    );
    assert!(service.goals_for_week(ms(2024, 2, 5, 0)).unwrap().is_empty());

    assert_eq!(service.clear_weekly_goals(monday).unwrap(), 2);
    assert_eq!(
        feed.drain(),
        vec![
            StoreChange::WeeklyGoals { week_start: monday },
            StoreChange::WeeklyGoals { week_start: monday },
        ]
    );
}

#[test]
fn goals_of_future_weeks_are_refused() {
    let conn = open_db_in_memory().unwrap();
    let (hub, feed) = ChangeHub::channel();
    let goals = SqliteWeeklyGoalRepository::try_new(&conn).unwrap();
    let service = AreaService::new(
        SqliteLifeAreaRepository::try_new(&conn).unwrap(),
        SqliteWeeklyGoalRepository::try_new(&conn).unwrap(),
    )
    .with_calendar(WeekCalendar::new(tz()))
    .with_change_hub(hub)
    .with_clock(Arc::new(FixedClock(ms(2024, 1, 31, 10))));

    let far_future = ms(2030, 6, 5, 10);
    let future_monday = ms(2030, 6, 3, 0);
    assert!(matches!(
        service.save_weekly_goals(far_future, &[(1, 40)]),
        Err(AreaServiceError::FutureWeek { week_start }) if week_start == future_monday
    ));
    assert!(goals.list_for_week(future_monday).unwrap().is_empty());

    // The very next week is already out of reach.
    let next_monday = ms(2024, 2, 5, 0);
    assert!(matches!(
        service.save_weekly_goals(next_monday, &[(1, 40)]),
        Err(AreaServiceError::FutureWeek { .. })
    ));
    assert!(matches!(
        service.clear_weekly_goals(next_monday),
        Err(AreaServiceError::FutureWeek { .. })
    ));
    assert!(feed.drain().is_empty());

    // Sunday night of the current week still counts as this week.
    assert_eq!(
        service
            .save_weekly_goals(ms(2024, 2, 4, 23), &[(1, 40)])
            .unwrap()
            .len(),
        1
    );
    assert_eq!(service.week_start_for(ms(2024, 2, 4, 23)), ms(2024, 1, 29, 0));
}

#[test]
fn custom_areas_append_and_reset_restores_defaults() {
    let conn = open_db_in_memory().unwrap();
    let service = AreaService::new(
        SqliteLifeAreaRepository::try_new(&conn).unwrap(),
        SqliteWeeklyGoalRepository::try_new(&conn).unwrap(),
    );

    let hobby = service.add_custom_area("  Hobby ").unwrap();
    assert_eq!(hobby.name, "Hobby");
    assert_eq!(hobby.order_index, 5);
    assert!(!hobby.is_default);

    assert!(matches!(
        service.add_custom_area(" "),
        Err(AreaServiceError::InvalidName)
    ));
    assert!(matches!(
        service.rename_area(999, "x"),
        Err(AreaServiceError::LifeAreaNotFound(999))
    ));
    assert_eq!(service.rename_area(1, "Work").unwrap().name, "Work");

    let restored = service.reset_areas().unwrap();
    assert_eq!(
        restored.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["Career", "Health", "Learning", "Relationships", "Finance"]
    );
    assert_eq!(
        restored.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
}

#[test]
fn first_custom_area_after_clearing_starts_at_one() {
    let conn = open_db_in_memory().unwrap();
    let areas = SqliteLifeAreaRepository::try_new(&conn).unwrap();
    areas.delete_all().unwrap();

    let service = AreaService::new(areas, SqliteWeeklyGoalRepository::try_new(&conn).unwrap());
    assert_eq!(service.add_custom_area("Solo").unwrap().order_index, 1);
}
