// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::config;
use crate::planner;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use common::{CreateGoalPayload, Goal, GoalWithPlan, Task, MAX_PLAN_DAYS};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{debug, info};

/// Errors from creating a goal and its plan.
#[derive(Debug, thiserror::Error)]
pub enum CreateGoalError {
    /// The target date is today or earlier, so the plan would be empty.
    #[error("end date {end} must be after {start}")]
    EndDateNotInFuture { start: NaiveDate, end: NaiveDate },

    /// The end date is further out than `MAX_PLAN_DAYS`.
    #[error("plan span of {days} days exceeds the maximum of {max}")]
    SpanTooLong { days: i64, max: u32 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Establishes the database connection pool.
/// If the database (or its directory) does not exist, it creates it,
/// then makes sure both tables are present.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if let Some(parent) = config::sqlite_file_path(database_url)
        .as_deref()
        .and_then(|path| path.parent())
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    // A single connection: the planner serves one user and one session.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Creates the `goals` and `tasks` tables if they are absent.
/// The schema is never altered once created.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            hours_per_day INTEGER NOT NULL,
            preferred_days TEXT NOT NULL,
            intensity TEXT NOT NULL,
            learning_pref TEXT NOT NULL,
            current_day INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'goals' table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL REFERENCES goals(id),
            day INTEGER NOT NULL,
            description TEXT NOT NULL,
            milestone TEXT NOT NULL,
            done BOOLEAN NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'tasks' table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_goal ON tasks(goal_id);")
        .execute(pool)
        .await
        .context("Failed to create 'tasks' index")?;

    info!("'goals' and 'tasks' tables are ready.");

    Ok(())
}

/// Creates a goal starting `today` and persists its generated plan.
///
/// The goal row and every task row are written in one transaction, so a
/// failed task insert leaves no orphaned goal behind.
pub async fn create_goal_with_plan(
    pool: &SqlitePool,
    payload: CreateGoalPayload,
    today: NaiveDate,
) -> Result<GoalWithPlan, CreateGoalError> {
    let span = (payload.end_date - today).num_days();
    if span <= 0 {
        return Err(CreateGoalError::EndDateNotInFuture {
            start: today,
            end: payload.end_date,
        });
    }
    if span > i64::from(MAX_PLAN_DAYS) {
        return Err(CreateGoalError::SpanTooLong {
            days: span,
            max: MAX_PLAN_DAYS,
        });
    }
    let total_days = u32::try_from(span).context("Plan span does not fit in u32")?;

    let plan = planner::generate_plan(
        &payload.name,
        total_days,
        payload.intensity,
        payload.learning_pref,
    );

    debug!(
        "Insert goal: name={}, goal_type={:?}, start_date={}, end_date={}, total_days={}, plan_len={}",
        payload.name,
        payload.goal_type,
        today,
        payload.end_date,
        total_days,
        plan.len()
    );

    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin goal creation transaction")?;

    let goal_id = sqlx::query(
        "INSERT INTO goals (name, goal_type, start_date, end_date, hours_per_day, preferred_days, intensity, learning_pref, current_day) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(&payload.name)
    .bind(payload.goal_type)
    .bind(today)
    .bind(payload.end_date)
    .bind(payload.hours_per_day)
    .bind(payload.preferred_days.to_string())
    .bind(payload.intensity)
    .bind(payload.learning_pref)
    .execute(&mut *tx)
    .await
    .context("Failed to insert goal into DB")?
    .last_insert_rowid();

    let mut tasks = Vec::with_capacity(plan.len());
    for entry in plan {
        let description = format!("Day {}: {}", entry.day, entry.description);
        let day = i64::from(entry.day);

        let id = sqlx::query(
            "INSERT INTO tasks (goal_id, day, description, milestone, done) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(goal_id)
        .bind(day)
        .bind(&description)
        .bind(entry.milestone)
        .bind(false)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert task for day {day} of goal {goal_id}"))?
        .last_insert_rowid();

        tasks.push(Task {
            id,
            goal_id,
            day,
            description,
            milestone: entry.milestone,
            done: false,
        });
    }

    tx.commit()
        .await
        .context("Failed to commit goal creation")?;

    info!("Created goal {} with {} tasks.", goal_id, tasks.len());

    let goal = Goal {
        id: goal_id,
        name: payload.name,
        goal_type: payload.goal_type,
        start_date: today,
        end_date: payload.end_date,
        hours_per_day: payload.hours_per_day,
        preferred_days: payload.preferred_days,
        intensity: payload.intensity,
        learning_pref: payload.learning_pref,
        current_day: 1,
    };

    Ok(GoalWithPlan { goal, tasks })
}

/// Retrieves every goal in creation order.
pub async fn list_goals(pool: &SqlitePool) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>("SELECT * FROM goals ORDER BY id ASC;")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve goals from DB")?;

    Ok(goals)
}

/// Fetches a single goal by ID.
pub async fn get_goal(pool: &SqlitePool, goal_id: i64) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = ?;")
        .bind(goal_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to fetch goal with ID: {goal_id}"))?;

    Ok(goal)
}

/// Retrieves the tasks of a goal in insertion order.
pub async fn list_tasks_for_goal(pool: &SqlitePool, goal_id: i64) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE goal_id = ? ORDER BY id ASC;")
        .bind(goal_id)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to retrieve tasks for goal with ID: {goal_id}"))?;

    Ok(tasks)
}

/// Sets a task's `done` flag to an explicit value.
/// Returns true if the task exists, false otherwise. Repeating the same
/// value is a no-op that still reports true.
pub async fn set_task_done(pool: &SqlitePool, task_id: i64, done: bool) -> Result<bool> {
    debug!("Setting done={} on task with ID: {}", done, task_id);
    let result = sqlx::query("UPDATE tasks SET done = ? WHERE id = ?")
        .bind(done)
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update task with ID: {task_id}"))?;

    Ok(result.rows_affected() > 0)
}

/// Moves a goal's `current_day` forward by one, with no upper bound.
/// Returns true if the goal exists, false otherwise.
pub async fn advance_current_day(pool: &SqlitePool, goal_id: i64) -> Result<bool> {
    let result = sqlx::query("UPDATE goals SET current_day = current_day + 1 WHERE id = ?")
        .bind(goal_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to advance current day of goal with ID: {goal_id}"))?;

    let rows_affected = result.rows_affected();
    info!(
        "Advanced current day on {} rows for goal ID: {}",
        rows_affected, goal_id
    );

    Ok(rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc, Weekday};
    use common::{GoalType, Intensity, LearningPreference, Milestone, StudyDays};

    /// Helper function to set up an in-memory SQLite database for testing.
    /// The pool is capped at one connection so every query sees the same
    /// in-memory database.
    async fn setup_test_db() -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        init_schema(&pool).await?;
        Ok(pool)
    }

    fn payload(name: &str, end_date: NaiveDate) -> CreateGoalPayload {
        CreateGoalPayload {
            name: name.to_string(),
            goal_type: GoalType::Exam,
            end_date,
            hours_per_day: 3,
            preferred_days: StudyDays::new([Weekday::Mon, Weekday::Thu]),
            intensity: Intensity::Intensive,
            learning_pref: LearningPreference::Reading,
        }
    }

    #[tokio::test]
    async fn test_create_goal_with_plan() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();

        let created = create_goal_with_plan(&pool, payload("Rust", today + Duration::days(7)), today)
            .await
            .unwrap();

        assert!(created.goal.id > 0);
        assert_eq!(created.goal.start_date, today);
        assert_eq!(created.goal.current_day, 1);
        assert_eq!(created.tasks.len(), 7);
        assert_eq!(
            created.tasks[0].description,
            "Day 1: Read about Fundamentals of Rust"
        );
        assert_eq!(created.tasks[6].description, "Day 7: Read about Rust");
        assert_eq!(created.tasks[6].milestone, Milestone::Practice);
        assert!(created.tasks.iter().all(|t| t.goal_id == created.goal.id && !t.done));

        // What was returned is what was stored.
        let stored_goal = get_goal(&pool, created.goal.id).await.unwrap().unwrap();
        assert_eq!(stored_goal, created.goal);
        let stored_tasks = list_tasks_for_goal(&pool, created.goal.id).await.unwrap();
        assert_eq!(stored_tasks, created.tasks);
    }

    #[tokio::test]
    async fn test_create_goal_rejects_end_date_not_in_future() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();

        for end_date in [today, today - Duration::days(3)] {
            let err = create_goal_with_plan(&pool, payload("Late", end_date), today)
                .await
                .unwrap_err();
            assert!(matches!(err, CreateGoalError::EndDateNotInFuture { .. }));
        }

        // Nothing was written.
        assert!(list_goals(&pool).await.unwrap().is_empty());
        let (task_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(task_count, 0);
    }

    #[tokio::test]
    async fn test_create_goal_rejects_span_over_maximum() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();

        let too_far = today + Duration::days(i64::from(MAX_PLAN_DAYS) + 1);
        let err = create_goal_with_plan(&pool, payload("Forever", too_far), today)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateGoalError::SpanTooLong { days, max } if days == i64::from(MAX_PLAN_DAYS) + 1 && max == MAX_PLAN_DAYS
        ));
        assert!(list_goals(&pool).await.unwrap().is_empty());

        // The limit itself is still accepted.
        let at_limit = today + Duration::days(i64::from(MAX_PLAN_DAYS));
        let created = create_goal_with_plan(&pool, payload("Decade", at_limit), today)
            .await
            .unwrap();
        assert_eq!(created.tasks.len(), MAX_PLAN_DAYS as usize);
    }

    #[tokio::test]
    async fn test_failed_task_insert_rolls_back_goal() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();

        sqlx::query(
            r#"
            CREATE TRIGGER fail_day_three BEFORE INSERT ON tasks
            WHEN NEW.day = 3
            BEGIN
                SELECT RAISE(ABORT, 'day three rejected');
            END;
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = create_goal_with_plan(&pool, payload("Broken", today + Duration::days(7)), today)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateGoalError::Storage(_)));

        // Neither the goal nor the first two tasks survive.
        let (goal_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM goals")
            .fetch_one(&pool)
            .await
            .unwrap();
        let (task_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(goal_count, 0);
        assert_eq!(task_count, 0);
    }

    #[tokio::test]
    async fn test_list_goals_and_tasks_are_scoped() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();

        let first = create_goal_with_plan(&pool, payload("First", today + Duration::days(10)), today)
            .await
            .unwrap();
        let second = create_goal_with_plan(&pool, payload("Second", today + Duration::days(3)), today)
            .await
            .unwrap();

        let goals = list_goals(&pool).await.unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].name, "First");
        assert_eq!(goals[1].name, "Second");
        assert_eq!(
            goals[0].preferred_days.days(),
            &[Weekday::Mon, Weekday::Thu]
        );

        let tasks = list_tasks_for_goal(&pool, second.goal.id).await.unwrap();
        // Three days requested, but every topic still gets a day.
        assert_eq!(tasks.len(), 6);
        assert!(tasks.iter().all(|t| t.goal_id == second.goal.id));
        assert!(tasks.windows(2).all(|w| w[0].id < w[1].id));

        let first_tasks = list_tasks_for_goal(&pool, first.goal.id).await.unwrap();
        assert_eq!(first_tasks.len(), 10);

        assert!(get_goal(&pool, 999).await.unwrap().is_none());
        assert!(list_tasks_for_goal(&pool, 999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_task_done_is_idempotent() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();
        let created = create_goal_with_plan(&pool, payload("Toggle", today + Duration::days(7)), today)
            .await
            .unwrap();
        let task_id = created.tasks[0].id;

        let done_of = |tasks: Vec<Task>| tasks.into_iter().find(|t| t.id == task_id).unwrap().done;

        assert!(set_task_done(&pool, task_id, true).await.unwrap());
        assert!(set_task_done(&pool, task_id, true).await.unwrap());
        let tasks = list_tasks_for_goal(&pool, created.goal.id).await.unwrap();
        assert!(done_of(tasks));

        assert!(set_task_done(&pool, task_id, false).await.unwrap());
        let tasks = list_tasks_for_goal(&pool, created.goal.id).await.unwrap();
        assert_eq!(tasks, created.tasks);

        assert!(!set_task_done(&pool, 12345, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_advance_current_day_has_no_upper_bound() {
        let pool = setup_test_db().await.unwrap();
        let today = Utc::now().date_naive();
        let created = create_goal_with_plan(&pool, payload("Advance", today + Duration::days(7)), today)
            .await
            .unwrap();

        for _ in 0..10 {
            assert!(advance_current_day(&pool, created.goal.id).await.unwrap());
        }

        let goal = get_goal(&pool, created.goal.id).await.unwrap().unwrap();
        assert_eq!(goal.current_day, 11);

        // Advancing never touches completion.
        let tasks = list_tasks_for_goal(&pool, created.goal.id).await.unwrap();
        assert!(tasks.iter().all(|t| !t.done));

        assert!(!advance_current_day(&pool, 999).await.unwrap());
    }

    #[tokio::test]
    async fn test_establish_connection_pool_creates_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("planner.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = establish_connection_pool(&url).await.unwrap();
        assert!(db_path.exists());
        assert!(list_goals(&pool).await.unwrap().is_empty());
        pool.close().await;

        // Reopening keeps the schema and data untouched.
        let pool = establish_connection_pool(&url).await.unwrap();
        let today = Utc::now().date_naive();
        create_goal_with_plan(&pool, payload("Persisted", today + Duration::days(2)), today)
            .await
            .unwrap();
        pool.close().await;

        let pool = establish_connection_pool(&url).await.unwrap();
        assert_eq!(list_goals(&pool).await.unwrap().len(), 1);
    }
}
