//! Staff account administration: credentials plus role assignments.

use std::sync::Arc;

use hims_auth::Role;
use hims_backend::{Backend, Gender, IdentityService, NewUser, Profile, ProfileStore, UserRoleStore};
use hims_core::{DomainError, UserId};

use crate::DirectoryError;
use crate::validate;

const MIN_PASSWORD_LEN: usize = 6;

/// A login account as shown in the administration view: the profile row
/// joined with its role assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub profile: Profile,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
}

pub struct AccountAdmin {
    backend: Arc<dyn Backend>,
    origin: Option<String>,
}

impl AccountAdmin {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            origin: None,
        }
    }

    /// Confirmation links in sign-up mails point back at this origin.
    pub fn with_origin(backend: Arc<dyn Backend>, origin: Option<String>) -> Self {
        Self { backend, origin }
    }

    /// Staff accounts (students are managed through the directory, not
    /// here), ordered by full name.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, DirectoryError> {
        let profiles = self.backend.list_profiles().await?;
        let roles = self.backend.list_roles().await?;

        let mut accounts: Vec<Account> = profiles
            .into_iter()
            .filter_map(|profile| {
                let user_id = profile.user_id?;
                let role = roles.iter().find(|r| r.user_id == user_id)?.role;
                Some(Account { profile, role })
            })
            .filter(|a| a.role != Role::Student)
            .collect();
        accounts.sort_by(|a, b| a.profile.full_name.cmp(&b.profile.full_name));
        Ok(accounts)
    }

    /// Create credentials, assign the role, and fill in the profile columns
    /// the sign-up trigger does not know about.
    ///
    /// The profile patch is best-effort: the account is already usable when
    /// it runs, so a failure is logged and the account kept.
    pub async fn create_account(&self, new: NewAccount) -> Result<UserId, DirectoryError> {
        let full_name = validate::non_blank("full name", &new.full_name)?;
        let email = validate::email(&new.email)?;
        if new.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            ))
            .into());
        }
        if new.role == Role::Warden && new.gender.is_none() {
            return Err(DomainError::validation("warden accounts require a gender").into());
        }

        let user = self
            .backend
            .sign_up(NewUser {
                email,
                password: new.password,
                redirect_to: self.origin.clone(),
                full_name,
            })
            .await?;
        self.backend.insert_role(user.id, new.role).await?;

        if let Err(err) = self.patch_profile(user.id, new.gender, new.phone).await {
            tracing::warn!(user_id = %user.id, error = %err, "profile patch after account creation failed");
        }

        tracing::info!(user_id = %user.id, role = %new.role, "account created");
        Ok(user.id)
    }

    async fn patch_profile(
        &self,
        user_id: UserId,
        gender: Option<Gender>,
        phone: Option<String>,
    ) -> Result<(), DirectoryError> {
        let Some(profile) = self.backend.find_profile_by_user(user_id).await? else {
            return Err(DomainError::NotFound.into());
        };
        let updated = Profile {
            gender,
            phone,
            ..profile
        };
        self.backend.update_profile(&updated).await?;
        Ok(())
    }

    pub async fn change_role(&self, user_id: UserId, role: Role) -> Result<(), DirectoryError> {
        self.backend.update_role(user_id, role).await?;
        tracing::info!(%user_id, %role, "role changed");
        Ok(())
    }

    /// Remove the role assignment and the profile. The credential record
    /// itself lives in the identity service and is out of reach from here;
    /// without a role row the account resolves to no access.
    pub async fn remove_account(&self, user_id: UserId) -> Result<(), DirectoryError> {
        self.backend.delete_role(user_id).await?;
        self.backend.delete_profile_by_user(user_id).await?;
        tracing::info!(%user_id, "account removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_backend::InMemoryBackend;

    fn admin() -> (Arc<InMemoryBackend>, AccountAdmin) {
        let backend = Arc::new(InMemoryBackend::new());
        let admin = AccountAdmin::new(backend.clone() as Arc<dyn Backend>);
        (backend, admin)
    }

    fn warden(name: &str, email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: name.to_string(),
            role: Role::Warden,
            gender: Some(Gender::Female),
            phone: None,
        }
    }

    #[tokio::test]
    async fn create_account_assigns_role_and_patches_profile() {
        let (backend, admin) = admin();
        let user_id = admin
            .create_account(NewAccount {
                phone: Some("555".to_string()),
                ..warden("Ada Warden", "ada@hostel.test")
            })
            .await
            .unwrap();

        let role = backend.find_role(user_id).await.unwrap().unwrap();
        assert_eq!(role.role, Role::Warden);

        let profile = backend.find_profile_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.phone.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn create_account_validation() {
        let (_, admin) = admin();

        let short = NewAccount {
            password: "12345".to_string(),
            ..warden("Ada", "ada@hostel.test")
        };
        assert!(admin.create_account(short).await.is_err());

        let genderless = NewAccount {
            gender: None,
            ..warden("Ada", "ada@hostel.test")
        };
        assert!(admin.create_account(genderless).await.is_err());

        // Admins do not need a gender.
        let plain_admin = NewAccount {
            role: Role::Admin,
            gender: None,
            ..warden("Root", "root@hostel.test")
        };
        assert!(admin.create_account(plain_admin).await.is_ok());
    }

    #[tokio::test]
    async fn listing_excludes_students_and_sorts() {
        let (backend, admin) = admin();
        admin.create_account(warden("Zoe", "zoe@hostel.test")).await.unwrap();
        admin.create_account(warden("Ada", "ada@hostel.test")).await.unwrap();

        let student = admin
            .create_account(NewAccount {
                role: Role::Student,
                gender: None,
                ..warden("Sam Student", "sam@hostel.test")
            })
            .await
            .unwrap();
        assert!(backend.find_role(student).await.unwrap().is_some());

        let names: Vec<String> = admin
            .list_accounts()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.profile.full_name)
            .collect();
        assert_eq!(names, vec!["Ada", "Zoe"]);
    }

    #[tokio::test]
    async fn remove_account_drops_role_and_profile() {
        let (backend, admin) = admin();
        let user_id = admin.create_account(warden("Ada", "ada@hostel.test")).await.unwrap();

        admin.remove_account(user_id).await.unwrap();

        assert!(backend.find_role(user_id).await.unwrap().is_none());
        assert!(backend.find_profile_by_user(user_id).await.unwrap().is_none());
        assert!(admin.list_accounts().await.unwrap().is_empty());
    }
}
