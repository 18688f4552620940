//! Authentication domain models and wire types.

use crate::validation::{self, MIN_PASSWORD_LENGTH, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated user as returned by the backend.
///
/// Only the fields the client reads are typed; anything else the backend
/// sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            first_name: None,
            last_name: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name shown in the UI: `name`, else "first last", else email, else id.
    pub fn display_name(&self) -> String {
        if let Some(name) = non_blank(self.name.as_deref()) {
            return name.to_string();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        non_blank(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }

    /// Uppercased initials for avatars.
    ///
    /// Uses `firstName`/`lastName` when both are set, else the first and
    /// last words of `name`, else the first letter of the email.
    pub fn initials(&self) -> String {
        fn first_char(s: &str) -> Option<char> {
            s.chars().next()
        }

        let letters: Vec<char> = match (
            non_blank(self.first_name.as_deref()),
            non_blank(self.last_name.as_deref()),
        ) {
            (Some(first), Some(last)) => [first_char(first), first_char(last)]
                .into_iter()
                .flatten()
                .collect(),
            _ => match non_blank(self.name.as_deref()) {
                Some(name) => {
                    let words: Vec<&str> = name.split_whitespace().collect();
                    match words.as_slice() {
                        [] => Vec::new(),
                        [only] => first_char(only).into_iter().collect(),
                        [first, .., last] => [first_char(first), first_char(last)]
                            .into_iter()
                            .flatten()
                            .collect(),
                    }
                }
                None => non_blank(self.email.as_deref())
                    .and_then(first_char)
                    .into_iter()
                    .collect(),
            },
        };

        letters.into_iter().flat_map(char::to_uppercase).collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::email("email", &self.email)?;
        validation::min_length("password", &self.password, MIN_PASSWORD_LENGTH)
    }
}

/// New-user data for `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("firstName", &self.first_name)?;
        validation::require("lastName", &self.last_name)?;
        validation::email("email", &self.email)?;
        validation::min_length("password", &self.password, MIN_PASSWORD_LENGTH)
    }
}

/// Response of login and registration.
///
/// The canonical wire shape is camelCase `accessToken` / `refreshToken`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// The access/refresh token pair as persisted by the token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// The persisted part of the session that is not a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user: User,
}

/// Authentication state of the client.
///
/// Invariant: `is_authenticated` implies `access_token.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthSession {
    /// The anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session built from a stored or received token pair.
    pub fn authenticated(user: User, tokens: TokenPair) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token,
            is_loading: false,
            error: None,
        }
    }

    /// Whether this is a signed-in session still holding `refresh_token`.
    pub fn holds_refresh_token(&self, refresh_token: &str) -> bool {
        self.is_authenticated && self.refresh_token.as_deref() == Some(refresh_token)
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.access_token.as_ref().map(|access_token| TokenPair {
            access_token: access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        })
    }
}
