//! Wire DTOs for the auth API and the client-side error taxonomy.
//!
//! DESIGN
//! ======
//! Every endpoint answers with the same envelope:
//! `{success:true, data}` or `{success:false, message, errors?}`. The HTTP
//! status is not trusted; the envelope alone decides the outcome. Failures
//! become a tagged [`AuthFailure`] instead of a string-or-map payload.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Field name to server-side validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message used when login fails without a server-provided reason.
pub const DEFAULT_LOGIN_FAILURE: &str = "Invalid credentials";

// =============================================================================
// USER
// =============================================================================

/// Account type chosen at registration. Selects the dashboard after sign-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Customer,
    /// Barbershop owner.
    Shop,
    #[default]
    Barber,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Shop, Role::Barber];

    /// Label shown on the account-type picker.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Shop => "Shop Owner",
            Self::Barber => "Barber",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Customer => "Join queues at barbershops",
            Self::Shop => "Manage your barbershop and queues",
            Self::Barber => "Work at a barbershop and serve customers",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A user account as returned by the auth API and cached on-device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier. Numeric strings are accepted on the wire.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// `"First Last"`, as shown in greetings.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| D::Error::custom("expected integer id")),
        serde_json::Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom("expected numeric id string")),
        _ => Err(D::Error::custom("expected number or numeric string")),
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: Role,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Successful auth payload: the bearer token plus its user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Response envelope shared by every auth endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    /// Decoded lazily so a failure envelope with odd `data` still parses.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

impl ApiEnvelope {
    /// Parse a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::InvalidResponse`] if the body is not JSON or
    /// does not have the envelope shape.
    pub fn parse(body: &str) -> Result<Self, AuthFailure> {
        serde_json::from_str(body).map_err(|_| AuthFailure::InvalidResponse)
    }

    /// Interpret a registration response. Field errors win over the message.
    ///
    /// # Errors
    ///
    /// Returns the server's field errors or message when `success` is false,
    /// and [`AuthFailure::InvalidResponse`] when a success lacks `data`.
    pub fn into_registration(self) -> Result<AuthPayload, AuthFailure> {
        if self.success {
            return decode_payload(self.data);
        }
        match self.errors {
            Some(errors) if !errors.is_empty() => Err(AuthFailure::FieldErrors(errors)),
            _ => Err(AuthFailure::Message(self.message.unwrap_or_default())),
        }
    }

    /// Interpret a login response. Only the message is surfaced on failure.
    ///
    /// # Errors
    ///
    /// Returns the server message (or [`DEFAULT_LOGIN_FAILURE`]) when
    /// `success` is false, and [`AuthFailure::InvalidResponse`] when a
    /// success lacks `data`.
    pub fn into_login(self) -> Result<AuthPayload, AuthFailure> {
        if self.success {
            return decode_payload(self.data);
        }
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_owned());
        Err(AuthFailure::Message(message))
    }
}

fn decode_payload(data: Option<serde_json::Value>) -> Result<AuthPayload, AuthFailure> {
    data.and_then(|value| serde_json::from_value(value).ok())
        .ok_or(AuthFailure::InvalidResponse)
}

// =============================================================================
// ERROR
// =============================================================================

/// Why an auth call did not produce a session. Every variant is recoverable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// Server-side validation failed for one or more fields.
    #[error("{}", render_field_errors(.0))]
    FieldErrors(FieldErrors),

    /// The server rejected the request with a single message.
    #[error("{0}")]
    Message(String),

    /// The request could not be sent or timed out.
    #[error("Network error occurred")]
    Network,

    /// The server answered with something other than the JSON envelope.
    #[error("Invalid server response")]
    InvalidResponse,

    /// The session could not be written to on-device storage.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Render field errors as `field: msg1, msg2` lines.
#[must_use]
pub fn render_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}
