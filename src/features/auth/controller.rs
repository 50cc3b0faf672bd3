use validator::Validate;

use super::model::{CredentialsForm, RecoverForm, ResetPasswordForm, UpdatePasswordForm};
use crate::backend::{AuthService, AuthUser, BackendClient, Session};
use crate::common::error::AppError;
use crate::features::event::validation::collect_field_errors;

fn check(form: &impl Validate) -> Result<(), AppError> {
    form.validate()
        .map_err(|errors| AppError::validation(collect_field_errors(&errors)))
}

pub async fn sign_up(auth: &dyn AuthService, form: CredentialsForm) -> Result<AuthUser, AppError> {
    check(&form)?;
    Ok(auth.sign_up(form.into()).await?)
}

pub async fn sign_in(auth: &dyn AuthService, form: CredentialsForm) -> Result<Session, AppError> {
    check(&form)?;
    let session = auth.sign_in(form.into()).await?;
    log::info!("user {} signed in", session.user.id);
    Ok(session)
}

pub async fn sign_out(auth: &dyn AuthService, access_token: Option<&str>) -> Result<(), AppError> {
    let token = access_token.ok_or_else(|| AppError::unauthorized("please log in"))?;
    Ok(auth.sign_out(token).await?)
}

/// Issues a recovery token. Unknown addresses succeed silently.
pub async fn request_password_reset(
    auth: &dyn AuthService,
    form: ResetPasswordForm,
) -> Result<(), AppError> {
    check(&form)?;
    match auth.request_password_reset(&form.email).await? {
        // No mailer is wired in; the token only reaches debug logs.
        Some(token) => {
            log::info!("password recovery token issued for {}", form.email);
            log::debug!("recovery token for {}: {token}", form.email);
        }
        None => log::info!("password reset requested for unknown address {}", form.email),
    }
    Ok(())
}

pub async fn recover(auth: &dyn AuthService, form: RecoverForm) -> Result<Session, AppError> {
    check(&form)?;
    Ok(auth.redeem_recovery_token(form.token.trim()).await?)
}

pub async fn update_password(
    auth: &dyn AuthService,
    client: &BackendClient,
    form: UpdatePasswordForm,
) -> Result<(), AppError> {
    let user = client.authenticated_user()?;
    check(&form)?;
    auth.update_password(user.id, &form.password).await?;
    log::info!("user {} changed their password", user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sqlite::SqliteAuth;
    use crate::testing::{self, TEST_COST};

    fn credentials(email: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            email: email.into(),
            password: password.into(),
        }
    }

    async fn auth() -> SqliteAuth {
        let pool = testing::memory_pool().await;
        SqliteAuth::new(pool, chrono::Duration::hours(1), TEST_COST)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let auth = auth().await;
        let user = sign_up(&auth, credentials("coach@example.com", "secret1"))
            .await
            .unwrap();
        let session = sign_in(&auth, credentials("coach@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.user, user);

        let error = sign_in(&auth, credentials("coach@example.com", "wrong-one"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn malformed_credentials_are_field_errors() {
        let auth = auth().await;
        let error = sign_up(&auth, credentials("not-an-email", ""))
            .await
            .unwrap_err();
        let AppError::Validation { errors } = error else {
            panic!("expected a validation error");
        };
        assert_eq!(errors.get("email"), Some("Enter a valid email address"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[tokio::test]
    async fn sign_out_needs_a_token() {
        let auth = auth().await;
        let error = sign_out(&auth, None).await.unwrap_err();
        assert!(matches!(error, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn reset_requests_for_unknown_addresses_still_succeed() {
        let auth = auth().await;
        request_password_reset(
            &auth,
            ResetPasswordForm {
                email: "nobody@example.com".into(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reset_requests_for_known_addresses_issue_a_usable_token() {
        let auth = auth().await;
        let user = sign_up(&auth, credentials("coach@example.com", "secret1"))
            .await
            .unwrap();
        request_password_reset(
            &auth,
            ResetPasswordForm {
                email: "coach@example.com".into(),
            },
        )
        .await
        .unwrap();

        let token = auth
            .request_password_reset("coach@example.com")
            .await
            .unwrap()
            .unwrap();
        let session = recover(&auth, RecoverForm { token }).await.unwrap();
        assert_eq!(session.user, user);
    }

    #[tokio::test]
    async fn password_updates_need_a_session() {
        let auth = auth().await;
        let pool = testing::memory_pool().await;
        let anonymous = testing::client(&pool, None);
        let error = update_password(
            &auth,
            &anonymous,
            UpdatePasswordForm {
                password: "brand-new".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error, AppError::Unauthorized { .. }));
    }
}
