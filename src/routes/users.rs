use crate::{
    auth::{
        clear_session_cookie, hash_password, issue_token, reset, session_cookie, verify_password,
        AdminResetRequest, AuthenticatedUser, ForgotPasswordRequest, LoginRequest, RegisterRequest,
        SendEmailRequest,
    },
    config::Config,
    error::AppError,
    mail::{reset_email_html, Mailer},
    models::{AuthUser, PageQuery, UpdateUserRequest, User},
    response::{ApiResponse, PagedResponse},
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user.
///
/// Creates the account, mints a session token, and sets the session cookie,
/// so registration doubles as login.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    let password_hash = hash_password(&register_data.password).await?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
         RETURNING id, name, email, is_admin, created_at",
    )
    .bind(&register_data.name)
    .bind(&register_data.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    let token = issue_token(user.id, &config.jwt_secret)?;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(token))
        .json(ApiResponse::ok("User created successfully", user)))
}

/// Login: verifies credentials and sets a fresh session cookie.
/// Unknown email and wrong password are indistinguishable to the caller.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user: Option<AuthUser> = sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE email = $1",
        AuthUser::COLUMNS
    ))
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let user = user.ok_or_else(|| AppError::Forbidden("Invalid Credentials!!!".into()))?;

    if !verify_password(&login_data.password, &user.password_hash).await? {
        return Err(AppError::Forbidden("Invalid Credentials!!!".into()));
    }

    let token = issue_token(user.id, &config.jwt_secret)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token))
        .json(ApiResponse::ok("Logged in successfully!!!", user.summary())))
}

/// Logout clears the cookie client-side. The token itself stays valid until
/// its natural expiry; there is no server-side revocation.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(ApiResponse::message("Logged out successfully"))
}

/// Issues a password-reset token and emails the reset link.
#[post("/send-email")]
pub async fn send_reset_email(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<SendEmailRequest>,
) -> Result<impl Responder, AppError> {
    let email = match body.email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => email.to_string(),
        None => {
            return Err(AppError::NotFound(
                "Please provide your email address.".into(),
            ))
        }
    };

    let token = reset::issue_reset_token(&pool, &email).await?;
    let link = reset::reset_link(&config.domain_url, &token);

    let mailer = mailer.clone();
    let html = reset_email_html(&link);
    let to = email.clone();
    web::block(move || mailer.send_mail(&to, "Password reset", &html))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Mail worker failed: {}", e)))??;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Password reset email sent successfully",
        link,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ResetTokenQuery {
    pub token: String,
}

/// Resolves a reset token from the emailed link back to `{token, email}` so
/// the frontend can render the reset form. Expired and unknown tokens answer
/// the same way.
#[get("/reset-token")]
pub async fn resolve_reset_token(
    pool: web::Data<PgPool>,
    query: web::Query<ResetTokenQuery>,
) -> Result<impl Responder, AppError> {
    let email = reset::resolve_reset_token(&pool, &query.token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        "Token retrieved successfully",
        json!({ "token": query.token, "email": email }),
    )))
}

/// Consumes a reset token: stores the new password and invalidates the token.
#[put("/forgot-password")]
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    reset::consume_reset_token(&pool, &body.token, &body.new_password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset successfully")))
}

/// Admin-only: reset a user's password to the deterministic temporary one.
#[put("/reset-password")]
pub async fn reset_password_by_admin(
    pool: web::Data<PgPool>,
    body: web::Json<AdminResetRequest>,
) -> Result<impl Responder, AppError> {
    let email = body
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("No email provided".into()))?;

    reset::admin_reset_password(&pool, email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Password reset successfully")))
}

/// The authenticated caller's own profile.
#[get("/profile")]
pub async fn profile(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok("User fetched successfully", user.0)))
}

/// Admin-only: list all users, newest first, optionally paginated.
#[get("")]
pub async fn list_users(
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, AppError> {
    let users: Vec<User> = sqlx::query_as(
        "SELECT id, name, email, is_admin, created_at FROM users \
         ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(query.page_size())
    .bind(query.offset())
    .fetch_all(&**pool)
    .await?;

    if !query.has_pagination() {
        return Ok(
            HttpResponse::Ok().json(ApiResponse::ok("Users fetched successfully", users))
        );
    }

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(PagedResponse::ok(
        "Users fetched successfully",
        users,
        query.page_number(),
        query.page_size(),
        total.0,
    )))
}

/// Admin-only: update a user's name, email, and admin flag.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
    body: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let result = sqlx::query("UPDATE users SET name = $1, email = $2, is_admin = $3 WHERE id = $4")
        .bind(&body.name)
        .bind(&body.email)
        .bind(body.is_admin)
        .bind(user_id.into_inner())
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest("User update failed".into()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("User updated successfully")))
}
