//! Form validation for login, registration and the admin user editor.
//!
//! Validation runs entirely on the client as a fast-fail check before any
//! remote call. Failures come back as [`FieldErrors`] so a form can show
//! every problem next to its field at once; the backend still re-validates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};

use hazel_lab_core::birth_date::today;
use hazel_lab_core::{AccountStatus, Email, EmailError, Role, is_adult_on, rut};

use crate::api::{NewUser, UserProfile, UserUpdate};

/// Minimum password length on the login and registration forms.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Maximum password length on the registration form.
pub const MAX_PASSWORD_LENGTH: usize = 50;

/// Minimum password length when staff set a password in the admin editor.
pub const MIN_ADMIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// Field errors
// =============================================================================

/// A form field that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Nombre,
    Apellidos,
    Rut,
    Email,
    BirthDate,
    Region,
    Comuna,
    Direccion,
    Password,
    PasswordConfirmation,
}

impl Field {
    /// Form input name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Nombre => "nombre",
            Self::Apellidos => "apellidos",
            Self::Rut => "rut",
            Self::Email => "email",
            Self::BirthDate => "fechaNacimiento",
            Self::Region => "region",
            Self::Comuna => "comuna",
            Self::Direccion => "direccion",
            Self::Password => "password",
            Self::PasswordConfirmation => "confirmPassword",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors keyed by field, in form order.
///
/// Only the first error recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error unless the field already has one.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Field checks
// =============================================================================

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn require(value: &str, field: Field, message: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = non_empty(value);
    if value.is_none() {
        errors.add(field, message);
    }
    value
}

/// Parse, normalize and allow-list an email address.
fn check_email(raw: &str, errors: &mut FieldErrors) -> Option<Email> {
    if raw.trim().is_empty() {
        errors.add(Field::Email, "Email is required");
        return None;
    }
    let result = Email::parse_normalized(raw).and_then(|email| {
        email.check_allowed_domain()?;
        Ok(email)
    });
    match result {
        Ok(email) => Some(email),
        Err(EmailError::DomainNotAllowed) => {
            errors.add(
                Field::Email,
                "Email must be @duoc.cl, @profesor.duoc.cl or @gmail.com",
            );
            None
        }
        Err(_) => {
            errors.add(Field::Email, "Invalid email address");
            None
        }
    }
}

/// Validate a RUT and return its canonical form.
fn check_rut(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    if raw.trim().is_empty() {
        errors.add(Field::Rut, "RUT is required");
        None
    } else if rut::is_valid(raw) {
        Some(rut::format(raw))
    } else {
        errors.add(Field::Rut, "Invalid RUT, e.g. 19.011.022-2");
        None
    }
}

fn check_adult(birth_date: Option<NaiveDate>, today: NaiveDate, errors: &mut FieldErrors) {
    if let Some(birth) = birth_date
        && !is_adult_on(birth, today)
    {
        errors.add(Field::BirthDate, "Must be at least 18 years old");
    }
}

fn check_password(
    password: &SecretString,
    confirmation: &SecretString,
    min: usize,
    max: usize,
    errors: &mut FieldErrors,
) {
    let length = password.expose_secret().chars().count();
    if length < min {
        errors.add(
            Field::Password,
            format!("Password must be at least {min} characters"),
        );
    } else if length > max {
        errors.add(
            Field::Password,
            format!("Password must be at most {max} characters"),
        );
    } else if password.expose_secret() != confirmation.expose_secret() {
        errors.add(Field::PasswordConfirmation, "Passwords do not match");
    }
}

/// Treat an empty password box as "not provided".
fn provided(secret: Option<SecretString>) -> Option<SecretString> {
    secret.filter(|s| !s.expose_secret().is_empty())
}

// =============================================================================
// Login
// =============================================================================

/// Email and password as typed on the login page.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }

    /// Returns the normalized email to authenticate with.
    ///
    /// # Errors
    ///
    /// Returns field errors for a malformed or non-allow-listed email, or a
    /// password shorter than [`MIN_PASSWORD_LENGTH`].
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = check_email(&self.email, &mut errors);
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                Field::Password,
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Self-service sign-up form.
#[derive(Debug)]
pub struct RegistrationForm {
    pub rut: String,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub region: String,
    pub comuna: String,
    pub direccion: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
}

impl RegistrationForm {
    /// Validate against today's date.
    ///
    /// # Errors
    ///
    /// See [`RegistrationForm::validate_on`].
    pub fn validate(self) -> Result<NewUser, FieldErrors> {
        self.validate_on(today())
    }

    /// Validate and build the account to create: role `cliente`, status
    /// `activo`, username from the full name (or the RUT when no name was
    /// given).
    ///
    /// # Errors
    ///
    /// Returns field errors for an invalid RUT, a non-allow-listed email, an
    /// under-age birth date, or a password outside
    /// [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`] or not matching its
    /// confirmation.
    pub fn validate_on(self, today: NaiveDate) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let rut = check_rut(&self.rut, &mut errors);
        let email = check_email(&self.email, &mut errors);
        check_adult(self.birth_date, today, &mut errors);
        check_password(
            &self.password,
            &self.password_confirmation,
            MIN_PASSWORD_LENGTH,
            MAX_PASSWORD_LENGTH,
            &mut errors,
        );

        let (Some(rut), Some(email)) = (rut, email) else {
            return Err(errors);
        };
        errors.into_result()?;

        let full_name = format!("{} {}", self.nombre.trim(), self.apellidos.trim());
        let username = non_empty(&full_name).unwrap_or_else(|| rut.clone());

        Ok(NewUser {
            username,
            email,
            rut,
            password: self.password,
            role: Role::Customer,
            status: AccountStatus::Active,
            profile: UserProfile {
                nombre: non_empty(&self.nombre),
                apellidos: non_empty(&self.apellidos),
                direccion: non_empty(&self.direccion),
                region: non_empty(&self.region),
                comuna: non_empty(&self.comuna),
                fecha_nacimiento: self.birth_date,
            },
        })
    }
}

// =============================================================================
// Admin user editor
// =============================================================================

/// User create/edit form in the admin area.
#[derive(Debug, Default)]
pub struct UserForm {
    pub username: String,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub rut: String,
    pub role: Role,
    pub status: AccountStatus,
    pub birth_date: Option<NaiveDate>,
    pub region: String,
    pub comuna: String,
    pub direccion: String,
    /// Empty or `None` keeps the current password on update.
    pub password: Option<SecretString>,
    pub password_confirmation: Option<SecretString>,
}

/// Fields common to create and update once validated.
struct ValidUser {
    username: String,
    email: Email,
    rut: String,
    password: Option<SecretString>,
    role: Role,
    status: AccountStatus,
    profile: UserProfile,
}

impl UserForm {
    fn check(self, today: NaiveDate, password_required: bool) -> Result<ValidUser, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = require(&self.username, Field::Username, "Username is required", &mut errors);
        let apellidos = require(&self.apellidos, Field::Apellidos, "Last name is required", &mut errors);
        let email = check_email(&self.email, &mut errors);
        let rut = check_rut(&self.rut, &mut errors);
        let region = require(&self.region, Field::Region, "Region is required", &mut errors);
        let comuna = require(&self.comuna, Field::Comuna, "Comuna is required", &mut errors);
        let direccion = require(&self.direccion, Field::Direccion, "Address is required", &mut errors);
        check_adult(self.birth_date, today, &mut errors);

        let password = provided(self.password);
        match &password {
            Some(password) => {
                let confirmation = provided(self.password_confirmation)
                    .unwrap_or_else(|| SecretString::from(String::new()));
                check_password(
                    password,
                    &confirmation,
                    MIN_ADMIN_PASSWORD_LENGTH,
                    usize::MAX,
                    &mut errors,
                );
            }
            None if password_required => errors.add(Field::Password, "Password is required"),
            None => {}
        }

        let (Some(username), Some(email), Some(rut)) = (username, email, rut) else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(ValidUser {
            username,
            email,
            rut,
            password,
            role: self.role,
            status: self.status,
            profile: UserProfile {
                nombre: non_empty(&self.nombre),
                apellidos,
                direccion,
                region,
                comuna,
                fecha_nacimiento: self.birth_date,
            },
        })
    }

    /// Validate for account creation; a password is mandatory.
    ///
    /// # Errors
    ///
    /// Returns field errors for missing required fields, an invalid RUT, a
    /// non-allow-listed email, an under-age birth date, or a password shorter
    /// than [`MIN_ADMIN_PASSWORD_LENGTH`] or not matching its confirmation.
    pub fn validate_new_on(self, today: NaiveDate) -> Result<NewUser, FieldErrors> {
        let user = self.check(today, true)?;
        let Some(password) = user.password else {
            let mut errors = FieldErrors::new();
            errors.add(Field::Password, "Password is required");
            return Err(errors);
        };
        Ok(NewUser {
            username: user.username,
            email: user.email,
            rut: user.rut,
            password,
            role: user.role,
            status: user.status,
            profile: user.profile,
        })
    }

    /// Validate for an update; the password is only sent when changed.
    ///
    /// # Errors
    ///
    /// Same as [`UserForm::validate_new_on`], except that an empty password
    /// is accepted.
    pub fn validate_update_on(self, today: NaiveDate) -> Result<UserUpdate, FieldErrors> {
        let user = self.check(today, false)?;
        Ok(UserUpdate {
            username: user.username,
            email: user.email,
            rut: user.rut,
            password: user.password,
            role: user.role,
            status: user.status,
            profile: user.profile,
        })
    }
}
