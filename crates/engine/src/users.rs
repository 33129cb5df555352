//! Users and authentication.
//!
//! The users document maps a username to its [`User`] record. Passwords are
//! stored only as salted Argon2 hashes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Engine, EngineError, ResultEngine,
    budgets::Budgets,
    expenses::Expenses,
    normalize_optional_text, normalize_required_name, password,
    store::Document,
};

/// A stored user, keyed by username in the users document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub(crate) type Users = BTreeMap<String, User>;

/// Public part of a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub email: Option<String>,
}

impl Engine {
    /// Verify the credentials and return the canonical username.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> ResultEngine<String> {
        let username = username.trim();
        let users: Users = self.store.read(Document::Users).await?;

        let verified = match users.get(username) {
            Some(user) => password::verify_password(&user.password_hash, password).await?,
            None => false,
        };
        if verified {
            tracing::debug!("user {username} logged in");
            Ok(username.to_string())
        } else {
            tracing::debug!("failed login for {username}");
            Err(EngineError::InvalidCredentials)
        }
    }

    /// Create a new user with empty expense and budget branches and return
    /// the canonical username.
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ResultEngine<String> {
        let username = normalize_required_name(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let user = User {
            password_hash: password::hash_password(password).await?,
            email: normalize_optional_text(email),
        };

        self.store
            .update(Document::Users, |users: &mut Users| {
                if users.contains_key(&username) {
                    return Err(EngineError::ExistingKey(username.clone()));
                }
                users.insert(username.clone(), user);
                Ok(())
            })
            .await?;

        self.store
            .update(Document::Expenses, |expenses: &mut Expenses| {
                expenses.entry(username.clone()).or_default();
                Ok(())
            })
            .await?;

        self.store
            .update(Document::Budgets, |budgets: &mut Budgets| {
                budgets.entry(username.clone()).or_default();
                Ok(())
            })
            .await?;

        tracing::info!("created user {username}");
        Ok(username)
    }

    pub async fn profile(&self, username: &str) -> ResultEngine<Profile> {
        let users: Users = self.store.read(Document::Users).await?;
        let user = users
            .get(username)
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))?;

        Ok(Profile {
            username: username.to_string(),
            email: user.email.clone(),
        })
    }
}
