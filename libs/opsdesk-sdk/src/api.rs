//! Backend operations used by the console.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Access, AccessLevel, MemberUpdate, NewMember, NewProfile, Profile};

/// Backend API consumed by the console screens and modals.
///
/// Company-scoped operations take the company id explicitly; callers obtain
/// it from the selected company at the time of the call.
///
/// ```ignore
/// let levels = api.list_access_levels().await?;
/// api.remove_member(company_id, &member.id).await?;
/// let team = api.list_team(company_id).await?;
/// ```
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Every access the signed-in user holds, one per company.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn list_accesses(&self) -> Result<Vec<Access>, ApiError>;

    /// Role levels that can be assigned to team members.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn list_access_levels(&self) -> Result<Vec<AccessLevel>, ApiError>;

    /// Team of a company.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn list_team(&self, company_id: &str) -> Result<Vec<Access>, ApiError>;

    /// A single team member.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn get_member(&self, company_id: &str, member_id: &str) -> Result<Access, ApiError>;

    /// Create a user and grant it access to the company.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn add_member(&self, company_id: &str, member: &NewMember) -> Result<Access, ApiError>;

    /// Update name, email and role of a team member.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn update_member(
        &self,
        company_id: &str,
        member_id: &str,
        update: &MemberUpdate,
    ) -> Result<Access, ApiError>;

    /// Revoke a member's access to the company.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn remove_member(&self, company_id: &str, member_id: &str) -> Result<(), ApiError>;

    /// Cloud provider profiles of a company.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn list_profiles(&self, company_id: &str) -> Result<Vec<Profile>, ApiError>;

    /// Create a profile. Returns the created record when the backend sends one.
    ///
    /// # Errors
    /// See [`ApiError`].
    async fn create_profile(
        &self,
        company_id: &str,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, ApiError>;
}
