use serde::Deserialize;
use validator::Validate;

use crate::backend::Credentials;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CredentialsForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<CredentialsForm> for Credentials {
    fn from(form: CredentialsForm) -> Self {
        Credentials {
            email: form.email,
            password: form.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecoverForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Recovery token is required"))]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePasswordForm {
    #[serde(default)]
    #[validate(length(min = 6, message = "Password should be at least 6 characters"))]
    pub password: String,
}
