//! Login, registration, password reset and logout.

use crate::client::CatalogClient;
use crate::error::{ClientError, ViewError, ViewResult};
use crate::models::RegisterRequest;
use crate::routes::Route;
use crate::session::Session;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth flows. Each flow reports through the session's event bus.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: CatalogClient,
}

impl AuthService {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Sign in and start a session.
    pub async fn login(&self, email: &str, password: &str) -> ViewResult<Session> {
        let email = email.trim();
        require("email", email)?;
        require("password", password)?;

        let events = self.client.session().events();
        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                let message = match &e {
                    ClientError::Unauthorized { message } | ClientError::BadRequest { message }
                        if !message.is_empty() =>
                    {
                        message.clone()
                    }
                    _ => "Login failed".to_string(),
                };
                events.error(message);
                return Err(ViewError::Client(e));
            }
        };

        let session = Session::new(response.token, email);
        self.client.session().begin(session.clone()).await?;
        events.success("Login successful!");
        events.navigate(Route::Dashboard);
        Ok(session)
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, request: &RegisterRequest, confirm_password: &str) -> ViewResult<()> {
        require("name", request.name.trim())?;
        require("email", request.email.trim())?;
        if !request.email.contains('@') {
            return Err(ViewError::validation("email", "Enter a valid email address"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ViewError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if request.password != confirm_password {
            return Err(ViewError::validation("confirm_password", "Passwords do not match"));
        }

        let events = self.client.session().events();
        match self.client.register(request).await {
            Ok(_) => {
                tracing::info!(email = %request.email, "Registered account");
                events.success("Registration successful! Please login.");
                events.navigate(Route::Login);
                Ok(())
            }
            Err(e) => {
                let error = ViewError::Client(e);
                events.error(match &error {
                    ViewError::Client(ClientError::BadRequest { message }) if !message.is_empty() => {
                        message.clone()
                    }
                    _ => "Registration failed".to_string(),
                });
                Err(error)
            }
        }
    }

    /// Ask for reset instructions. The backend answers the same way whether
    /// or not the address exists.
    pub async fn forgot_password(&self, email: &str) -> ViewResult<String> {
        let email = email.trim();
        require("email", email)?;

        let events = self.client.session().events();
        match self.client.forgot_password(email).await {
            Ok(response) => {
                let message = response.message.unwrap_or_else(|| {
                    "If an account exists with this email, you will receive password reset instructions."
                        .to_string()
                });
                events.info(message.clone());
                Ok(message)
            }
            Err(e) => {
                let error = ViewError::Client(e);
                events.error(error.to_user_message());
                Err(error)
            }
        }
    }

    /// End the session and go to the login screen.
    pub async fn logout(&self) -> ViewResult<()> {
        self.client.session().end().await?;
        let events = self.client.session().events();
        events.success("Logged out successfully");
        events.navigate(Route::Login);
        Ok(())
    }
}

fn require(field: &str, value: &str) -> ViewResult<()> {
    if value.is_empty() {
        return Err(ViewError::validation(field, format!("{field} is required")));
    }
    Ok(())
}
