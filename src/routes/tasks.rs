use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{PageQuery, Task, TaskInput},
    response::{ApiResponse, PagedResponse},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Creates a task owned by the authenticated user.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.0.id);

    sqlx::query(
        "INSERT INTO tasks (id, title, description, user_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.user_id)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(ApiResponse::message("Task created successfully")))
}

/// Lists the authenticated user's tasks, newest first, optionally paginated.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks: Vec<Task> = sqlx::query_as(
        "SELECT id, title, description, user_id, created_at, updated_at FROM tasks \
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user.0.id)
    .bind(query.page_size())
    .bind(query.offset())
    .fetch_all(&**pool)
    .await?;

    if !query.has_pagination() {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok("Task found", tasks)));
    }

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
        .bind(user.0.id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(PagedResponse::ok(
        "Task found",
        tasks,
        query.page_number(),
        query.page_size(),
        total.0,
    )))
}

/// Fetches one task. Tasks belonging to other users answer 404, never 403,
/// so existence is not leaked.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task: Option<Task> = sqlx::query_as(
        "SELECT id, title, description, user_id, created_at, updated_at FROM tasks WHERE id = $1",
    )
    .bind(task_id.into_inner())
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) if task.user_id == user.0.id => {
            Ok(HttpResponse::Ok().json(ApiResponse::ok("Task found", task)))
        }
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates a task's title and description.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let result = sqlx::query(
        "UPDATE tasks SET title = $1, description = $2, updated_at = now() \
         WHERE id = $3 AND user_id = $4",
    )
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(task_id.into_inner())
    .bind(user.0.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("Task update failed".into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("Task updated successfully")))
}

/// Deletes a task. Deleting an absent task is not an error.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.0.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Task deleted successfully")))
}
