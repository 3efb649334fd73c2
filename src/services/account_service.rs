// Accounts - signup, login and logout backed by server-side sessions

use tracing::{info, instrument, warn};

use crate::{
    error::AppResult,
    infrastructure::{
        security::{hash_password, new_session_token, verify_password},
        BlogDatabase,
    },
    models::Author,
    services::forms::{FormErrors, LoginForm, SignupForm},
};

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";
pub const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Errors not tied to one field.
pub const NON_FIELD: &str = "__all__";

/// A logged-in author and the token for their session cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub author: Author,
    pub token: String,
}

#[derive(Debug)]
pub enum AccountOutcome {
    LoggedIn(Session),
    Invalid(FormErrors),
}

#[derive(Clone)]
pub struct AccountService {
    db: BlogDatabase,
}

impl AccountService {
    pub fn new(db: BlogDatabase) -> Self {
        Self { db }
    }

    /// Register an author and log them straight in.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: SignupForm) -> AppResult<AccountOutcome> {
        let form = form.normalized();
        let mut errors = form.field_errors();
        if errors.get("username").is_empty() && self.db.get_author_by_username(&form.username).await?.is_some() {
            errors.add("username", DUPLICATE_USERNAME);
        }
        if !errors.is_empty() {
            return Ok(AccountOutcome::Invalid(errors));
        }

        let password_hash = hash_password(&form.password)?;
        let token = new_session_token();
        let author = self
            .db
            .register_author(&form.username, form.full_name.as_deref(), &password_hash, &token)
            .await?;
        info!("Registered author {} ({})", author.username, author.id);
        Ok(AccountOutcome::LoggedIn(Session { author, token }))
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> AppResult<AccountOutcome> {
        let mut errors = form.field_errors();
        if !errors.is_empty() {
            return Ok(AccountOutcome::Invalid(errors));
        }

        let username = form.username.trim();
        let verified = match self.db.get_credentials(username).await? {
            Some(credentials) if verify_password(&form.password, &credentials.password_hash)? => {
                self.db.get_author(credentials.id).await?
            }
            _ => None,
        };

        match verified {
            Some(author) => {
                let token = new_session_token();
                self.db.create_session(&token, author.id).await?;
                info!("Author {} logged in", author.username);
                Ok(AccountOutcome::LoggedIn(Session { author, token }))
            }
            None => {
                warn!("Failed login for {}", username);
                errors.add(NON_FIELD, BAD_CREDENTIALS);
                Ok(AccountOutcome::Invalid(errors))
            }
        }
    }

    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        if let Some(token) = token {
            self.db.delete_session(token).await?;
        }
        Ok(())
    }
}
