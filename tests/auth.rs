use std::sync::{Arc, Mutex};

use actix_web::{middleware::NormalizePath, test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use taskoo::auth::token::{Claims, SESSION_COOKIE};
use taskoo::config::{Config, MailConfig};
use taskoo::error::AppError;
use taskoo::mail::Mailer;

const JWT_SECRET: &str = "integration-test-secret";

/// Records outbound mail instead of talking to an SMTP relay.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl Mailer for RecordingMailer {
    fn send_mail(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html.to_string()));
        Ok(())
    }
}

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        jwt_secret: JWT_SECRET.to_string(),
        domain_url: "http://localhost:3000".to_string(),
        mail: MailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from: "Taskoo <no-reply@taskoo.app>".to_string(),
        },
    }
}

/// Connects to the test database, applying the schema. Returns `None` (and
/// the test passes vacuously) when `DATABASE_URL` is not set.
async fn test_pool() -> Option<(PgPool, Config)> {
    dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    pool.execute(include_str!("../migrations/0001_init.sql"))
        .await
        .expect("Failed to apply schema");
    let config = test_config(&database_url);
    Some((pool, config))
}

fn unique_email(tag: &str) -> String {
    format!("{}+{}@example.com", tag, Uuid::new_v4().simple())
}

macro_rules! test_app {
    ($pool:expr, $config:expr, $mailer:expr) => {
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config.clone()))
                .app_data($mailer.clone())
                .service(taskoo::routes::health::health)
                .configure(taskoo::routes::config),
        )
        .await
    };
}

fn recording_mailer() -> (Arc<RecordingMailer>, web::Data<dyn Mailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let dyn_mailer: Arc<dyn Mailer> = mailer.clone();
    (mailer, web::Data::from(dyn_mailer))
}

fn session_cookie_from<B>(resp: &actix_web::dev::ServiceResponse<B>) -> actix_web::cookie::Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie should be set")
        .into_owned()
}

#[actix_rt::test]
async fn test_register_login_profile_flow() {
    let Some((pool, config)) = test_pool().await else { return };
    let (_mailer, mailer_data) = recording_mailer();
    let app = test_app!(pool, config, mailer_data);

    let email = unique_email("jane");
    let register_payload = json!({
        "name": "Jane Doe",
        "email": email,
        "password": "Abcdef1!"
    });

    // Register: 201, user summary, session cookie
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201, "registration should succeed");
    let cookie = session_cookie_from(&resp);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["isAdmin"], false);
    assert!(body["data"].get("password").is_none());

    // Duplicate registration: 400
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Weak password: 400
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(json!({
            "name": "Weak",
            "email": unique_email("weak"),
            "password": "password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Wrong password: 403
    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "email": email, "password": "Wrong-pass1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Login: 200 with a fresh cookie
    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "email": email, "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let login_cookie = session_cookie_from(&resp);

    // Profile with the cookie: 200, own data, no password leaked
    let req = test::TestRequest::get()
        .uri("/user/profile")
        .cookie(login_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["name"], "Jane Doe");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());

    // Profile without a cookie: 401
    let req = test::TestRequest::get().uri("/user/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Profile with a tampered cookie: 403
    let req = test::TestRequest::get()
        .uri("/user/profile")
        .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Logout: 200 and the cookie is cleared
    let req = test::TestRequest::post()
        .uri("/user/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let cleared = session_cookie_from(&resp);
    assert_eq!(cleared.value(), "");
}

#[actix_rt::test]
async fn test_expired_session_token_is_forbidden() {
    let Some((pool, config)) = test_pool().await else { return };
    let (_mailer, mailer_data) = recording_mailer();
    let app = test_app!(pool, config, mailer_data);

    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: 1,
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        },
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .cookie(taskoo::auth::session_cookie(expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
async fn test_deleted_user_with_valid_token_is_unauthorized() {
    let Some((pool, config)) = test_pool().await else { return };
    let (_mailer, mailer_data) = recording_mailer();
    let app = test_app!(pool, config, mailer_data);

    let email = unique_email("ghost");
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(json!({ "name": "Ghost User", "email": email, "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let cookie = session_cookie_from(&resp);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/user/profile")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_password_reset_flow() {
    let Some((pool, config)) = test_pool().await else { return };
    let (mailer, mailer_data) = recording_mailer();
    let app = test_app!(pool, config, mailer_data);

    let email = unique_email("reset");
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(json!({ "name": "Jane Doe", "email": email, "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    // Missing email: 404
    let req = test::TestRequest::post()
        .uri("/user/send-email")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Unknown email: 404
    let req = test::TestRequest::post()
        .uri("/user/send-email")
        .set_json(json!({ "email": "nobody@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Request a reset: the link comes back and is also emailed
    let req = test::TestRequest::post()
        .uri("/user/send-email")
        .set_json(json!({ "email": email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let link = body["data"].as_str().expect("reset link in data");
    let first_token = link.split("token=").nth(1).expect("token in link").to_string();
    assert_eq!(first_token.len(), 64);
    {
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, email);
        assert_eq!(sent[0].1, "Password reset");
        assert!(sent[0].2.contains(&first_token));
    }

    // The token resolves to {token, email}
    let req = test::TestRequest::get()
        .uri(&format!("/user/reset-token?token={}", first_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["token"], first_token.as_str());
    assert_eq!(body["data"]["email"], email.as_str());

    // A second request supersedes the first token
    let req = test::TestRequest::post()
        .uri("/user/send-email")
        .set_json(json!({ "email": email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let second_token = body["data"]
        .as_str()
        .unwrap()
        .split("token=")
        .nth(1)
        .unwrap()
        .to_string();
    assert_ne!(first_token, second_token);

    let req = test::TestRequest::get()
        .uri(&format!("/user/reset-token?token={}", first_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404, "superseded token must not resolve");

    // Reusing the current password: 400
    let req = test::TestRequest::put()
        .uri("/user/forgot-password")
        .set_json(json!({ "token": second_token, "newPassword": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Unknown token: 404
    let req = test::TestRequest::put()
        .uri("/user/forgot-password")
        .set_json(json!({ "token": "0".repeat(64), "newPassword": "Newpass1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Consume the token with a genuinely new password
    let req = test::TestRequest::put()
        .uri("/user/forgot-password")
        .set_json(json!({ "token": second_token, "newPassword": "Newpass1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // The consumed token is gone
    let req = test::TestRequest::get()
        .uri(&format!("/user/reset-token?token={}", second_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404, "consumed token must not resolve");

    // Old password no longer works, the new one does
    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "email": email, "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(json!({ "email": email, "password": "Newpass1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
async fn test_reset_token_expiry() {
    let Some((pool, config)) = test_pool().await else { return };
    let (_mailer, mailer_data) = recording_mailer();
    let app = test_app!(pool, config, mailer_data);

    let email = unique_email("expiry");
    let req = test::TestRequest::post()
        .uri("/user/register")
        .set_json(json!({ "name": "Late Larry", "email": email, "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/user/send-email")
        .set_json(json!({ "email": email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["data"]
        .as_str()
        .unwrap()
        .split("token=")
        .nth(1)
        .unwrap()
        .to_string();

    // Push the expiry into the past, simulating the 30 minutes elapsing
    sqlx::query("UPDATE users SET reset_token_expires = now() - interval '1 minute' WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/user/reset-token?token={}", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404, "expired token must not resolve");
}
