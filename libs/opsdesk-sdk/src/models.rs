//! Records exchanged with the backend.
//!
//! Field names are camelCase on the wire. Timestamps are RFC 3339 and
//! optional, since list endpoints do not always include them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use opsdesk_utils::SecretString;

/// Placeholder shown for values that are unknown or not expanded.
pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// The user side of an [`Access`]. The backend sends either the full user
/// object or only its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessUser {
    Expanded(User),
    Reference(String),
}

impl AccessUser {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Expanded(user) => &user.id,
            Self::Reference(id) => id,
        }
    }

    #[must_use]
    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::Expanded(user) => Some(user),
            Self::Reference(_) => None,
        }
    }

    /// "First Last", or `-` when only the id is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.as_user()
            .map_or_else(|| EMPTY_CELL.to_owned(), User::full_name)
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.as_user().map_or(EMPTY_CELL, |u| u.email.as_str())
    }
}

/// Role of a user within a company.
///
/// Levels the console does not know are kept as [`AccessLevel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessLevel {
    Owner,
    Admin,
    Editor,
    Viewer,
    Other(String),
}

impl AccessLevel {
    /// Wire value, e.g. `admin`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::Other(level) => level,
        }
    }

    /// Display label: the wire value with its first letter capitalized.
    #[must_use]
    pub fn label(&self) -> String {
        capitalize(self.as_str())
    }
}

impl From<String> for AccessLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "owner" => Self::Owner,
            "admin" => Self::Admin,
            "editor" => Self::Editor,
            "viewer" => Self::Viewer,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AccessLevel {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<AccessLevel> for String {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Other(level) => level,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Membership of a user in a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    pub user: AccessUser,
    pub level: AccessLevel,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// Returned by `FromStr` for [`Platform`] and [`CredentialType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Gcp,
    Aws,
    Azure,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::Gcp, Self::Aws, Self::Azure];

    /// Platforms offered when creating a profile.
    #[must_use]
    pub fn selectable() -> &'static [Self] {
        &[Self::Gcp]
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "GCP",
            Self::Aws => "AWS",
            Self::Azure => "AZURE",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Gcp => "Google Cloud Platform",
            Self::Aws => "Amazon Web Services",
            Self::Azure => "Microsoft Azure",
        }
    }

    /// Credential types valid for this platform. The first one is the default.
    #[must_use]
    pub fn credential_types(self) -> &'static [CredentialType] {
        match self {
            Self::Gcp => &[CredentialType::GcpServiceAccount],
            Self::Aws => &[CredentialType::AwsAccessKey, CredentialType::AwsAssumeRole],
            Self::Azure => &[CredentialType::AzureServicePrincipal],
        }
    }

    #[must_use]
    pub fn default_credential_type(self) -> CredentialType {
        self.credential_types()[0]
    }

    #[must_use]
    pub fn supports(self, credential_type: CredentialType) -> bool {
        self.credential_types().contains(&credential_type)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "platform",
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
    GcpServiceAccount,
    AwsAccessKey,
    AwsAssumeRole,
    AzureServicePrincipal,
}

impl CredentialType {
    pub const ALL: [Self; 4] = [
        Self::GcpServiceAccount,
        Self::AwsAccessKey,
        Self::AwsAssumeRole,
        Self::AzureServicePrincipal,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GcpServiceAccount => "GCP_SERVICE_ACCOUNT",
            Self::AwsAccessKey => "AWS_ACCESS_KEY",
            Self::AwsAssumeRole => "AWS_ASSUME_ROLE",
            Self::AzureServicePrincipal => "AZURE_SERVICE_PRINCIPAL",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::GcpServiceAccount => "GCP Service Account",
            Self::AwsAccessKey => "AWS Access Key",
            Self::AwsAssumeRole => "AWS Assume Role",
            Self::AzureServicePrincipal => "Azure Service Principal",
        }
    }

    #[must_use]
    pub fn platform(self) -> Platform {
        match self {
            Self::GcpServiceAccount => Platform::Gcp,
            Self::AwsAccessKey | Self::AwsAssumeRole => Platform::Aws,
            Self::AzureServicePrincipal => Platform::Azure,
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "credential type",
                value: s.to_owned(),
            })
    }
}

/// Cloud provider credential profile. The credential payload itself is never
/// returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub platform: Platform,
    pub credential_type: CredentialType,
    #[serde(default)]
    pub created_by: Option<User>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Profile {
    /// "First Last" of the creator, or `-`.
    #[must_use]
    pub fn created_by_name(&self) -> String {
        self.created_by
            .as_ref()
            .map_or_else(|| EMPTY_CELL.to_owned(), User::full_name)
    }
}

/// Body of `POST /company/{companyId}/team`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub level: AccessLevel,
}

/// Body of `PATCH /company/{companyId}/team/{memberId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub level: AccessLevel,
}

/// Body of `POST /company/{companyId}/profile`.
///
/// `credential_data` is base64 encoded JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    pub description: String,
    pub platform: Platform,
    pub credential_type: CredentialType,
    #[serde(serialize_with = "expose")]
    pub credential_data: SecretString,
}

fn expose<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose())
}
