use opsdesk_sdk::{Access, AccessUser};

/// Pending removal of a team member, waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    company_id: String,
    member_id: String,
    display_name: String,
}

impl DeleteConfirmation {
    #[must_use]
    pub fn for_member(company_id: impl Into<String>, member: &Access) -> Self {
        let display_name = match &member.user {
            AccessUser::Expanded(user) => user.full_name(),
            AccessUser::Reference(id) => id.clone(),
        };
        Self {
            company_id: company_id.into(),
            member_id: member.id.clone(),
            display_name,
        }
    }

    #[must_use]
    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    #[must_use]
    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Are you sure you want to remove {} from the team?",
            self.display_name
        )
    }
}
