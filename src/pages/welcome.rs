//! Welcome screen: sign-in / sign-up form with account-type selection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Holds the transient form state for one screen lifetime. Validation runs
//! fresh on every submit and reports every failing field; nothing reaches the
//! network until the error map is empty.

#[cfg(test)]
#[path = "welcome_test.rs"]
mod welcome_test;

use std::collections::BTreeMap;

use crate::net::types::{Role, SignUpRequest};
use crate::state::session::{Notice, Session};
use crate::state::storage::KeyValueStore;
use crate::util::validation::{
    validate_email, validate_first_name, validate_last_name, validate_password, validate_phone,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    SignIn,
    #[default]
    SignUp,
}

impl Mode {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
        }
    }

    #[must_use]
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Create Account",
        }
    }

    /// Fields shown in this mode, in display order.
    #[must_use]
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::SignIn => &[Field::Email, Field::Password],
            Self::SignUp => &[
                Field::FirstName,
                Field::LastName,
                Field::Phone,
                Field::Email,
                Field::Password,
                Field::PasswordConfirmation,
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Phone,
    Email,
    Password,
    PasswordConfirmation,
}

impl Field {
    /// Wire/field name, matching the server's validation keys.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Password => "password",
            Self::PasswordConfirmation => "password_confirmation",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Phone => "Phone Number",
            Self::Email => "Email",
            Self::Password => "Password",
            Self::PasswordConfirmation => "Confirm Password",
        }
    }

    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::FirstName => "John",
            Self::LastName => "Doe",
            Self::Phone => "03347882314",
            Self::Email => "john@example.com",
            Self::Password => "Minimum 8 characters",
            Self::PasswordConfirmation => "Confirm your password",
        }
    }

    #[must_use]
    pub fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::PasswordConfirmation)
    }
}

/// Failing fields and their messages.
pub type FormErrors = BTreeMap<Field, &'static str>;

/// Result of pressing the submit button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    /// A previous operation is still running; the press was ignored.
    Busy,
    /// Client-side validation failed; see [`WelcomeForm::errors`].
    Invalid,
    /// The session operation ran and produced a notice.
    Completed(Notice),
}

#[derive(Clone, Debug, Default)]
pub struct WelcomeForm {
    mode: Mode,
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
    password: String,
    password_confirmation: String,
    role: Role,
    errors: FormErrors,
}

impl WelcomeForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn select_role(&mut self, role: Role) {
        self.role = role;
    }

    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::PasswordConfirmation => &self.password_confirmation,
        }
    }

    /// Update a field; editing clears that field's error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Phone => self.phone = value,
            Field::Email => self.email = value,
            Field::Password => self.password = value,
            Field::PasswordConfirmation => self.password_confirmation = value,
        }
        self.errors.remove(&field);
    }

    /// Validate every field relevant to the current mode.
    ///
    /// Replaces the stored errors and returns `true` when there are none.
    pub fn validate(&mut self) -> bool {
        let mut next = FormErrors::new();
        let mut check = |field: Field, result: Option<&'static str>| {
            if let Some(message) = result {
                next.insert(field, message);
            }
        };

        if self.mode == Mode::SignUp {
            check(Field::FirstName, validate_first_name(&self.first_name));
            check(Field::LastName, validate_last_name(&self.last_name));
            check(Field::Phone, validate_phone(&self.phone));
        }
        check(Field::Email, validate_email(&self.email));
        check(Field::Password, validate_password(&self.password));
        if self.mode == Mode::SignUp && self.password != self.password_confirmation {
            check(Field::PasswordConfirmation, Some("Passwords do not match"));
        }

        self.errors = next;
        self.errors.is_empty()
    }

    /// Registration payload built from the current values.
    #[must_use]
    pub fn sign_up_request(&self) -> SignUpRequest {
        SignUpRequest {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            role: self.role,
        }
    }

    /// Validate and run the session operation for the current mode.
    ///
    /// A successful registration switches the form to sign-in and clears the
    /// password fields so the user can log in with the same email.
    pub async fn submit<S: KeyValueStore>(&mut self, session: &Session<S>) -> Submission {
        if session.is_loading() {
            return Submission::Busy;
        }
        if !self.validate() {
            return Submission::Invalid;
        }

        let notice = match self.mode {
            Mode::SignIn => session.sign_in(self.email.trim(), &self.password).await,
            Mode::SignUp => {
                let notice = session.sign_up(&self.sign_up_request()).await;
                if notice.is_success() {
                    self.mode = Mode::SignIn;
                    self.password.clear();
                    self.password_confirmation.clear();
                }
                notice
            }
        };
        Submission::Completed(notice)
    }
}
