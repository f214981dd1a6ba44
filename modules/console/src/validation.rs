//! Client-side form validation.
//!
//! Forms hold raw user input. Validation either yields the request payload or
//! the per-field messages to show; nothing is sent while any field is invalid.

use std::fmt;

use opsdesk_sdk::{AccessLevel, CredentialType, MemberUpdate, NewMember, NewProfile, Platform};
use opsdesk_utils::SecretString;

use crate::credential::encode_credential_data;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Password,
    Level,
    Name,
    Platform,
    CredentialType,
    CredentialData,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::Level => "level",
            Self::Name => "name",
            Self::Platform => "platform",
            Self::CredentialType => "credentialType",
            Self::CredentialData => "credentialData",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages for every invalid field, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(Field, String)>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message shown under `field`, if it is invalid.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Values of the add/edit member form.
#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub level: String,
}

/// Values of the add profile form. A new form starts on the first selectable
/// platform and its default credential type.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub name: String,
    pub description: String,
    pub platform: Option<Platform>,
    pub credential_type: Option<CredentialType>,
    pub credential_data: SecretString,
}

impl Default for ProfileForm {
    fn default() -> Self {
        let platform = Platform::Gcp;
        Self {
            name: String::new(),
            description: String::new(),
            platform: Some(platform),
            credential_type: Some(platform.default_credential_type()),
            credential_data: SecretString::default(),
        }
    }
}

impl ProfileForm {
    /// Select a platform and reset the credential type to its default.
    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = Some(platform);
        self.credential_type = Some(platform.default_credential_type());
    }
}

/// # Errors
/// Returns the messages of every invalid field.
pub fn validate_new_member(form: &MemberForm) -> Result<NewMember, ValidationErrors> {
    check_member_fields(form, true).into_result(|| NewMember {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        password: form.password.clone(),
        level: AccessLevel::from(form.level.trim()),
    })
}

/// # Errors
/// Returns the messages of every invalid field. The password is ignored.
pub fn validate_member_update(form: &MemberForm) -> Result<MemberUpdate, ValidationErrors> {
    check_member_fields(form, false).into_result(|| MemberUpdate {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        email: form.email.trim().to_owned(),
        level: AccessLevel::from(form.level.trim()),
    })
}

/// Validate the profile form and encode its credential data.
///
/// # Errors
/// Returns the messages of every invalid field.
pub fn validate_new_profile(form: &ProfileForm) -> Result<NewProfile, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if is_blank(&form.name) {
        errors.push(Field::Name, "Name is required");
    }
    match form.platform {
        None => errors.push(Field::Platform, "Platform is required"),
        Some(platform) if !Platform::selectable().contains(&platform) => errors.push(
            Field::Platform,
            format!("{} is not available", platform.display_name()),
        ),
        Some(_) => {}
    }
    match (form.platform, form.credential_type) {
        (_, None) => errors.push(Field::CredentialType, "Credential type is required"),
        (Some(platform), Some(ct)) if !platform.supports(ct) => errors.push(
            Field::CredentialType,
            format!("{} is not available for {}", ct.display_name(), platform.display_name()),
        ),
        _ => {}
    }
    let encoded = match encode_credential_data(form.credential_data.expose()) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            errors.push(Field::CredentialData, e.to_string());
            None
        }
    };

    match (form.platform, form.credential_type, encoded) {
        (Some(platform), Some(credential_type), Some(data)) if errors.is_empty() => Ok(NewProfile {
            name: form.name.trim().to_owned(),
            description: form.description.trim().to_owned(),
            platform,
            credential_type,
            credential_data: SecretString::new(data),
        }),
        _ => Err(errors),
    }
}

fn check_member_fields(form: &MemberForm, with_password: bool) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if is_blank(&form.first_name) {
        errors.push(Field::FirstName, "First name is required");
    }
    if is_blank(&form.last_name) {
        errors.push(Field::LastName, "Last name is required");
    }
    if is_blank(&form.email) {
        errors.push(Field::Email, "Email is required");
    } else if !is_valid_email(form.email.trim()) {
        errors.push(Field::Email, "Invalid email");
    }
    if with_password {
        let password = form.password.expose();
        if password.is_empty() {
            errors.push(Field::Password, "Password is required");
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(Field::Password, "Password must be at least 6 characters");
        }
    }
    if is_blank(&form.level) {
        errors.push(Field::Level, "Role is required");
    }
    errors
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `local@domain.tld` with no whitespace and non-empty domain labels.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels
            .iter()
            .all(|l| !l.is_empty() && !l.starts_with('-') && !l.ends_with('-'))
        && labels.last().is_some_and(|tld| tld.len() >= 2)
}
