//! Request gates.
//!
//! `AuthMiddleware` verifies the session cookie and attaches the resolved
//! identity (the full user record, minus secrets) to request extensions.
//! `AdminGuard` composes after it and admits only admin identities.

use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::token::{verify_token, SESSION_COOKIE};
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the user lookup makes the call future outlive `&self`.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match req.cookie(SESSION_COOKIE) {
                Some(cookie) => cookie.value().to_string(),
                None => {
                    return Err(
                        AppError::Unauthorized("Not authorized, no token found".into()).into(),
                    )
                }
            };

            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError(
                        "Config not registered in app data".into(),
                    ))
                })?;

            let claims = verify_token(&token, &config.jwt_secret)?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError(
                        "Database pool not registered in app data".into(),
                    ))
                })?;

            let user: Option<User> = sqlx::query_as(
                "SELECT id, name, email, is_admin, created_at FROM users WHERE id = $1",
            )
            .bind(claims.sub)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(AppError::from)?;

            // A verified token whose user has since been deleted is an auth
            // failure, never a silent absent identity.
            let user = user.ok_or_else(|| {
                Error::from(AppError::Unauthorized(
                    "Not authorized, user no longer exists".into(),
                ))
            })?;

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}

/// Admits only requests whose attached identity has the admin flag set.
/// Must be composed after `AuthMiddleware`.
pub struct AdminGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AdminGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardService { service }))
    }
}

pub struct AdminGuardService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_admin = req
            .extensions()
            .get::<User>()
            .map(|user| user.is_admin)
            .unwrap_or(false);

        if is_admin {
            Box::pin(self.service.call(req))
        } else {
            Box::pin(async move {
                Err(AppError::Unauthorized("Not authorized as admin".into()).into())
            })
        }
    }
}
