//! Shared application state and the glue between actix and the backend ports.

use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web::{self, Data};
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use sqlx::SqlitePool;

use crate::backend::sqlite::{SqliteAuth, SqliteStore};
use crate::backend::{AuthService, AuthUser, BackendClient};
use crate::common::error::AppError;
use crate::config::Settings;
use crate::features;

pub struct AppState {
    pool: SqlitePool,
    pub auth: Arc<dyn AuthService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: &Settings) -> Self {
        let auth = SqliteAuth::new(pool.clone(), settings.session_ttl(), settings.bcrypt_cost);
        AppState {
            pool,
            auth: Arc::new(auth),
        }
    }

    /// A backend handle scoped to the given caller.
    pub fn client_for(&self, user: Option<AuthUser>) -> BackendClient {
        let store = SqliteStore::new(self.pool.clone()).acting_as(user.as_ref().map(|u| u.id));
        BackendClient::new(user, Arc::new(store))
    }
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller from the bearer token. A missing, unknown or expired
/// token yields an anonymous client; operations that need a user reject it.
impl FromRequest for BackendClient {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<Data<AppState>>().cloned();
        let token = bearer_token(req).map(str::to_string);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                log::error!("AppState is missing from the application data");
                AppError::persistence("Service is not configured")
            })?;
            let user = match token {
                Some(token) => state.auth.get_user(&token).await?,
                None => None,
            };
            Ok(state.client_for(user))
        })
    }
}

/// Routes plus extractor configs that report malformed input as validation
/// errors in the common error shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|error, _| {
        log::debug!("rejected JSON body: {error}");
        AppError::invalid_field("body", error.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|error, _| {
        log::debug!("rejected query string: {error}");
        AppError::invalid_field("query", "Invalid filter input").into()
    }))
    .app_data(web::PathConfig::default().error_handler(|error, _| {
        AppError::not_found(error.to_string()).into()
    }))
    .configure(features::auth::configure)
    .configure(features::event::configure)
    .configure(features::venue::configure);
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn bearer_tokens_are_read_from_the_authorization_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc123"));

        let basic = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&basic), None);

        let blank = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(&blank), None);
        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }
}
