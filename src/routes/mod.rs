pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AdminGuard, AuthMiddleware};

/// Route table.
///
/// Registration, login, logout, and the whole reset flow are public; for
/// the reset endpoints the token itself is the credential. Profile and the
/// task routes sit behind the session gate; user administration additionally
/// behind the admin gate. Registration order matters inside the admin scope:
/// `/reset-password` must precede `/{id}`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::send_reset_email)
            .service(users::resolve_reset_token)
            .service(users::forgot_password)
            .service(
                web::scope("")
                    .wrap(AuthMiddleware)
                    .service(users::profile)
                    .service(
                        web::scope("")
                            .wrap(AdminGuard)
                            .service(users::reset_password_by_admin)
                            .service(users::list_users)
                            .service(users::update_user),
                    ),
            ),
    )
    .service(
        web::scope("/task")
            .wrap(AuthMiddleware)
            .service(tasks::create_task)
            .service(tasks::list_tasks)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
