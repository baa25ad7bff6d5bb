// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::dashboard;
use crate::database::{self, CreateGoalError};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use common::{
    CreateGoalPayload, Dashboard, DashboardResponse, Goal, GoalWithPlan, Task,
    UpdateTaskPayload, EMPTY_DASHBOARD_MESSAGE, HOURS_PER_DAY_RANGE,
};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Handler for listing every goal.
pub async fn list_goals(State(pool): State<SqlitePool>) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = database::list_goals(&pool).await?;
    info!("Successfully retrieved {} goals.", goals.len());
    Ok(Json(goals))
}

/// Handler for creating a goal and generating its plan.
pub async fn create_goal(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateGoalPayload>,
) -> Result<(StatusCode, Json<GoalWithPlan>), AppError> {
    debug!(
        "Received request to create goal {:?} ending {}",
        payload.name, payload.end_date
    );

    if !HOURS_PER_DAY_RANGE.contains(&payload.hours_per_day) {
        error!(
            "Validation failed: hours_per_day {} is out of range.",
            payload.hours_per_day
        );
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            &format!(
                "Hours per day must be between {} and {}.",
                HOURS_PER_DAY_RANGE.start(),
                HOURS_PER_DAY_RANGE.end()
            ),
        ));
    }

    let today = Utc::now().date_naive();
    let created = database::create_goal_with_plan(&pool, payload, today).await?;

    info!(
        "Goal created successfully with ID: {} ({} tasks)",
        created.goal.id,
        created.tasks.len()
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for fetching a single goal.
pub async fn get_goal(
    State(pool): State<SqlitePool>,
    Path(goal_id): Path<i64>,
) -> Result<Json<Goal>, AppError> {
    let goal = find_goal(&pool, goal_id).await?;
    Ok(Json(goal))
}

/// Handler for listing the tasks of a goal.
pub async fn list_goal_tasks(
    State(pool): State<SqlitePool>,
    Path(goal_id): Path<i64>,
) -> Result<Json<Vec<Task>>, AppError> {
    find_goal(&pool, goal_id).await?;
    let tasks = database::list_tasks_for_goal(&pool, goal_id).await?;
    info!("Successfully retrieved {} tasks for goal {}.", tasks.len(), goal_id);
    Ok(Json(tasks))
}

/// Handler for moving a goal to its next day.
pub async fn advance_goal(
    State(pool): State<SqlitePool>,
    Path(goal_id): Path<i64>,
) -> Result<Json<Goal>, AppError> {
    debug!("Received request to advance goal with ID: {}", goal_id);

    if !database::advance_current_day(&pool, goal_id).await? {
        return Err(goal_not_found(goal_id));
    }

    let goal = find_goal(&pool, goal_id).await?;
    info!("Goal {} advanced to day {}.", goal_id, goal.current_day);
    Ok(Json(goal))
}

/// Handler for the dashboard of a given goal.
pub async fn goal_dashboard(
    State(pool): State<SqlitePool>,
    Path(goal_id): Path<i64>,
) -> Result<Json<Dashboard>, AppError> {
    let goal = find_goal(&pool, goal_id).await?;
    let dashboard = load_dashboard(&pool, goal).await?;
    Ok(Json(dashboard))
}

/// Handler for the default dashboard: the first goal, or an informational
/// message when no goal exists yet.
pub async fn default_dashboard(
    State(pool): State<SqlitePool>,
) -> Result<Json<DashboardResponse>, AppError> {
    let Some(goal) = database::list_goals(&pool).await?.into_iter().next() else {
        info!("Dashboard requested before any goal exists.");
        return Ok(Json(DashboardResponse::Empty {
            message: EMPTY_DASHBOARD_MESSAGE.to_string(),
        }));
    };

    let dashboard = load_dashboard(&pool, goal).await?;
    Ok(Json(DashboardResponse::Ready(Box::new(dashboard))))
}

/// Handler for checking or unchecking a task.
pub async fn update_task(
    State(pool): State<SqlitePool>,
    Path(task_id): Path<i64>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<StatusCode, AppError> {
    debug!("Setting done={} on task with ID: {}", payload.done, task_id);

    if database::set_task_done(&pool, task_id, payload.done).await? {
        info!("Task with ID {} updated successfully.", task_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        error!("Task with ID {} not found for update.", task_id);
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            &format!("Task with ID {task_id} not found."),
        ))
    }
}

async fn find_goal(pool: &SqlitePool, goal_id: i64) -> Result<Goal, AppError> {
    database::get_goal(pool, goal_id)
        .await?
        .ok_or_else(|| goal_not_found(goal_id))
}

async fn load_dashboard(pool: &SqlitePool, goal: Goal) -> Result<Dashboard, AppError> {
    let tasks = database::list_tasks_for_goal(pool, goal.id).await?;
    let dashboard = dashboard::build_dashboard(goal, tasks);
    debug!(
        "Dashboard for goal {}: {}% done, pace {:?}",
        dashboard.goal.id, dashboard.completion_percent, dashboard.pace
    );
    Ok(dashboard)
}

fn goal_not_found(goal_id: i64) -> AppError {
    error!("Goal with ID {} not found.", goal_id);
    AppError::new(
        StatusCode::NOT_FOUND,
        &format!("Goal with ID {goal_id} not found."),
    )
}

/// Error type returned by every handler.
#[derive(Debug)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

/// Store failures become a generic 500; the cause is only logged.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal server error: {:?}", err);
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred.".to_string(),
        }
    }
}

impl From<CreateGoalError> for AppError {
    fn from(err: CreateGoalError) -> Self {
        match err {
            CreateGoalError::EndDateNotInFuture { start, end } => {
                error!(
                    "Validation failed: end date {} is not after start date {}.",
                    end, start
                );
                Self::new(StatusCode::BAD_REQUEST, "End date must be in the future.")
            }
            CreateGoalError::SpanTooLong { days, max } => {
                error!(
                    "Validation failed: plan span of {} days exceeds {}.",
                    days, max
                );
                Self::new(
                    StatusCode::BAD_REQUEST,
                    &format!("End date must be at most {max} days away."),
                )
            }
            CreateGoalError::Storage(err) => err.into(),
        }
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            self.code.as_u16(),
            self.message
        );
        (
            self.code,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
