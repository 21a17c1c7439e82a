// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication. Credentials
// are forwarded to the identity provider; nothing is stored here.

pub mod login;   // POST /auth/login - password sign-in
pub mod refresh; // POST /auth/refresh - exchange a refresh token
pub mod signup;  // POST /auth/signup - create an account
pub mod user;    // GET /auth/user - claims of the presented token

pub use login::login_post;
pub use refresh::refresh_post;
pub use signup::signup_post;
pub use user::user_get;

use serde::Deserialize;

use crate::auth::provider::Credentials;
use crate::error::ApiError;
use crate::middleware::require_non_empty;

/// Body shared by sign-up and login. Fields default to empty so a missing
/// field is reported the same way as a blank one.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        require_non_empty("email", &self.email)?;
        require_non_empty("password", &self.password)?;
        Ok(Credentials {
            email: self.email,
            password: self.password,
        })
    }
}
