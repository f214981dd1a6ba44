//! In-memory [`ConsoleApi`] for unit tests.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use opsdesk_sdk::{
    Access, AccessLevel, AccessUser, ApiError, Company, ConsoleApi, CredentialType, MemberUpdate,
    NewMember, NewProfile, Platform, Profile, User,
};

#[derive(Default)]
pub struct FakeApi {
    pub accesses: Mutex<Vec<Access>>,
    pub levels: Mutex<Vec<AccessLevel>>,
    pub team: Mutex<Vec<Access>>,
    pub profiles: Mutex<Vec<Profile>>,
    pub added_members: Mutex<Vec<NewMember>>,
    pub updates: Mutex<Vec<MemberUpdate>>,
    pub created_profiles: Mutex<Vec<NewProfile>>,
    /// Every call fails with this error while set.
    pub fail_with: Mutex<Option<ApiError>>,
    /// Every call waits this long before answering.
    pub delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn enter(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().push(call);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_with.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn list_accesses(&self) -> Result<Vec<Access>, ApiError> {
        self.enter("list_accesses".to_owned()).await?;
        Ok(self.accesses.lock().clone())
    }

    async fn list_access_levels(&self) -> Result<Vec<AccessLevel>, ApiError> {
        self.enter("list_access_levels".to_owned()).await?;
        Ok(self.levels.lock().clone())
    }

    async fn list_team(&self, company_id: &str) -> Result<Vec<Access>, ApiError> {
        self.enter(format!("list_team {company_id}")).await?;
        Ok(self.team.lock().clone())
    }

    async fn get_member(&self, company_id: &str, member_id: &str) -> Result<Access, ApiError> {
        self.enter(format!("get_member {company_id} {member_id}")).await?;
        self.team
            .lock()
            .iter()
            .find(|m| m.id == member_id)
            .cloned()
            .ok_or_else(|| ApiError::Backend {
                status: 404,
                message: "Member not found".to_owned(),
            })
    }

    async fn add_member(&self, company_id: &str, new_member: &NewMember) -> Result<Access, ApiError> {
        self.enter(format!("add_member {company_id}")).await?;
        self.added_members.lock().push(new_member.clone());
        let access = member(
            &format!("m{}", self.team.lock().len() + 1),
            &new_member.first_name,
            &new_member.last_name,
            &new_member.email,
        );
        self.team.lock().push(access.clone());
        Ok(access)
    }

    async fn update_member(
        &self,
        company_id: &str,
        member_id: &str,
        update: &MemberUpdate,
    ) -> Result<Access, ApiError> {
        self.enter(format!("update_member {company_id} {member_id}"))
            .await?;
        self.updates.lock().push(update.clone());
        let mut access = member(member_id, &update.first_name, &update.last_name, &update.email);
        access.level = update.level.clone();
        Ok(access)
    }

    async fn remove_member(&self, company_id: &str, member_id: &str) -> Result<(), ApiError> {
        self.enter(format!("remove_member {company_id} {member_id}"))
            .await?;
        self.team.lock().retain(|m| m.id != member_id);
        Ok(())
    }

    async fn list_profiles(&self, company_id: &str) -> Result<Vec<Profile>, ApiError> {
        self.enter(format!("list_profiles {company_id}")).await?;
        Ok(self.profiles.lock().clone())
    }

    async fn create_profile(
        &self,
        company_id: &str,
        profile: &NewProfile,
    ) -> Result<Option<Profile>, ApiError> {
        self.enter(format!("create_profile {company_id}")).await?;
        self.created_profiles.lock().push(profile.clone());
        Ok(None)
    }
}

/// Access granting the current user `owner` on company `id`.
#[must_use]
pub fn company_access(id: &str) -> Access {
    Access {
        id: format!("acc-{id}"),
        company: Some(Company {
            id: id.to_owned(),
            name: format!("Company {id}"),
            description: None,
            created_at: None,
            updated_at: None,
        }),
        user: AccessUser::Reference("me".to_owned()),
        level: AccessLevel::Owner,
        created_at: None,
        updated_at: None,
    }
}

/// Team entry with an expanded user and the `admin` level.
#[must_use]
pub fn member(id: &str, first_name: &str, last_name: &str, email: &str) -> Access {
    Access {
        id: id.to_owned(),
        company: None,
        user: AccessUser::Expanded(User {
            id: format!("user-{id}"),
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            active: true,
            created_at: None,
            updated_at: None,
        }),
        level: AccessLevel::Admin,
        created_at: None,
        updated_at: None,
    }
}

#[must_use]
pub fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_owned(),
        name: name.to_owned(),
        description: None,
        platform: Platform::Gcp,
        credential_type: CredentialType::GcpServiceAccount,
        created_by: None,
        created_at: None,
        updated_at: None,
    }
}
