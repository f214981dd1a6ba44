//! [`ConsoleApi`] over the authenticated gateway.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use opsdesk_auth::{AuthGateway, GatewayRequest};
use opsdesk_http::{HttpResponse, StatusCode};
use opsdesk_sdk::{
    Access, AccessLevel, ApiError, ConsoleApi, MemberUpdate, NewMember, NewProfile, Profile,
};

/// Operation names, used for logging and fallback error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    ListAccesses,
    ListAccessLevels,
    ListTeam,
    GetMember,
    AddMember,
    UpdateMember,
    RemoveMember,
    ListProfiles,
    CreateProfile,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Self::ListAccesses => "list_accesses",
            Self::ListAccessLevels => "list_access_levels",
            Self::ListTeam => "list_team",
            Self::GetMember => "get_member",
            Self::AddMember => "add_member",
            Self::UpdateMember => "update_member",
            Self::RemoveMember => "remove_member",
            Self::ListProfiles => "list_profiles",
            Self::CreateProfile => "create_profile",
        }
    }

    /// Message used when the error body carries no `message`.
    fn fallback_message(self, status: StatusCode) -> String {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        match self {
            Self::ListAccesses => "Failed to fetch companies".to_owned(),
            Self::ListAccessLevels => "Failed to load access levels".to_owned(),
            Self::ListTeam => format!("Failed to load team data: {reason}"),
            Self::GetMember => format!("Failed to load member: {reason}"),
            Self::AddMember => "Failed to submit data".to_owned(),
            Self::UpdateMember => "Failed to update member".to_owned(),
            Self::RemoveMember => "Failed to remove member".to_owned(),
            Self::ListProfiles => format!("Failed to load profiles data: {reason}"),
            Self::CreateProfile => "Failed to create profile".to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// REST client for the console backend.
///
/// Paths are appended to `base_url`, so `https://host/api` yields
/// `https://host/api/company/{id}/team`.
#[derive(Clone, Debug)]
pub struct RestConsoleClient {
    gateway: AuthGateway,
    base_url: Url,
}

impl RestConsoleClient {
    #[must_use]
    pub fn new(gateway: AuthGateway, base_url: Url) -> Self {
        Self { gateway, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    async fn execute(&self, op: Op, request: GatewayRequest) -> Result<HttpResponse, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(operation = op.name(), error = %e, "no usable response");
            ApiError::NoResponse(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Best effort: an unreadable or non-JSON body falls back to the default message.
        let message = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
            .and_then(|body| body.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| op.fallback_message(status));

        tracing::warn!(
            operation = op.name(),
            status = status.as_u16(),
            message = %message,
            "backend rejected request"
        );
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        op: Op,
        request: GatewayRequest,
    ) -> Result<T, ApiError> {
        self.execute(op, request)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ConsoleApi for RestConsoleClient {
    async fn list_accesses(&self) -> Result<Vec<Access>, ApiError> {
        let url = self.endpoint(&["access"])?;
        self.fetch(Op::ListAccesses, self.gateway.get(url)).await
    }

    async fn list_access_levels(&self) -> Result<Vec<AccessLevel>, ApiError> {
        let url = self.endpoint(&["access", "level"])?;
        self.fetch(Op::ListAccessLevels, self.gateway.get(url)).await
    }

    async fn list_team(&self, company_id: &str) -> Result<Vec<Access>, ApiError> {
        let url = self.endpoint(&["company", company_id, "team"])?;
        self.fetch(Op::ListTeam, self.gateway.get(url)).await
    }

    async fn get_member(&self, company_id: &str, member_id: &str) -> Result<Access, ApiError> {
        let url = self.endpoint(&["company", company_id, "team", member_id])?;
        self.fetch(Op::GetMember, self.gateway.get(url)).await
    }

    async fn add_member(&self, company_id: &str, member: &NewMember) -> Result<Access, ApiError> {
        let url = self.endpoint(&["company", company_id, "team"])?;
        let access: Access = self
            .fetch(Op::AddMember, self.gateway.post(url).json(member))
            .await?;
        tracing::info!(company_id, member_id = %access.id, "team member added");
        Ok(access)
    }

    async fn update_member(
        &self,
        company_id: &str,
        member_id: &str,
        update: &MemberUpdate,
    ) -> Result<Access, ApiError> {
        let url = self.endpoint(&["company", company_id, "team", member_id])?;
        let access = self
            .fetch(Op::UpdateMember, self.gateway.patch(url).json(update))
            .await?;
        tracing::info!(company_id, member_id, "team member updated");
        Ok(access)
    }

    async fn remove_member(&self, company_id: &str, member_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["company", company_id, "team", member_id])?;
        self.execute(Op::RemoveMember, self.gateway.delete(url)).await?;
        tracing::info!(company_id, member_id, "team member removed");
        Ok(())
    }

    async fn list_profiles(&self, company_id: &str) -> Result<Vec<Profile>, ApiError> {
        let url = self.endpoint(&["company", company_id, "profile"])?;
        self.fetch(Op::ListProfiles, self.gateway.get(url)).await
    }

    async fn create_profile(
        &self,
        company_id: &str,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, ApiError> {
        let url = self.endpoint(&["company", company_id, "profile"])?;
        let response = self
            .execute(Op::CreateProfile, self.gateway.post(url).json(profile))
            .await?;
        // The created record is optional in the response.
        let created = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<Profile>(&body).ok());
        tracing::info!(company_id, name = %profile.name, "profile created");
        Ok(created)
    }
}
