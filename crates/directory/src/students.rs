//! Student records: login-less profiles carrying a student identifier.

use std::sync::Arc;

use hims_backend::{Backend, Gender, HostelStore, NewProfile, Profile, ProfileStore};
use hims_core::{HostelId, ProfileId};

use crate::DirectoryError;
use crate::validate;

/// Input for registering a student record. No credentials are involved;
/// the profile is created with `user_id = None`.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub full_name: String,
    pub email: String,
    pub student_id: String,
    pub phone: Option<String>,
    pub hostel_id: Option<HostelId>,
    pub room_number: Option<String>,
    pub gender: Option<Gender>,
}

/// Full replacement of the editable columns (the edit form submits the
/// whole record, cleared fields included).
#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub full_name: String,
    pub email: String,
    pub student_id: String,
    pub phone: Option<String>,
    pub hostel_id: Option<HostelId>,
    pub room_number: Option<String>,
    pub gender: Option<Gender>,
}

/// A hostel choice for assignment dropdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostelOption {
    pub id: HostelId,
    pub name: String,
}

pub struct StudentDirectory {
    backend: Arc<dyn Backend>,
}

impl StudentDirectory {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All student records, ordered by full name.
    pub async fn list_students(&self) -> Result<Vec<Profile>, DirectoryError> {
        let mut students: Vec<Profile> = self
            .backend
            .list_profiles()
            .await?
            .into_iter()
            .filter(Profile::is_student)
            .collect();
        students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(students)
    }

    /// Hostel choices for the assignment dropdown, ordered by name.
    pub async fn hostel_options(&self) -> Result<Vec<HostelOption>, DirectoryError> {
        let mut options: Vec<HostelOption> = self
            .backend
            .list_hostels()
            .await?
            .into_iter()
            .map(|h| HostelOption {
                id: h.id,
                name: h.name,
            })
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(options)
    }

    pub async fn register_student(&self, new: NewStudent) -> Result<Profile, DirectoryError> {
        let full_name = validate::non_blank("full name", &new.full_name)?;
        let email = validate::email(&new.email)?;
        let student_id = validate::non_blank("student id", &new.student_id)?;

        let profile = self
            .backend
            .insert_profile(NewProfile {
                user_id: None,
                full_name,
                email,
                phone: new.phone,
                student_id: Some(student_id),
                hostel_id: new.hostel_id,
                room_number: new.room_number,
                gender: new.gender,
            })
            .await?;
        tracing::info!(profile_id = %profile.id, "student registered");
        Ok(profile)
    }

    pub async fn update_student(
        &self,
        id: ProfileId,
        update: StudentUpdate,
    ) -> Result<Profile, DirectoryError> {
        let full_name = validate::non_blank("full name", &update.full_name)?;
        let email = validate::email(&update.email)?;
        let student_id = validate::non_blank("student id", &update.student_id)?;

        let existing = self
            .backend
            .list_profiles()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(hims_core::DomainError::NotFound)?;

        let updated = Profile {
            full_name,
            email,
            student_id: Some(student_id),
            phone: update.phone,
            hostel_id: update.hostel_id,
            room_number: update.room_number,
            gender: update.gender,
            ..existing
        };
        self.backend.update_profile(&updated).await?;
        Ok(updated)
    }
}
