use core::str::FromStr;

use serde::{Deserialize, Serialize};

use hims_core::DomainError;

/// Application role used for view gating.
///
/// This is a closed set; the wire representation is the lowercase name and
/// must match the `app_role` enum of the data service exactly. Absence of a
/// role assignment means "role unknown", which is distinct from `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Warden,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Warden, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Warden => "warden",
            Role::Student => "student",
        }
    }

    /// Roles allowed to administer records (everything but students).
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Warden)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "warden" => Ok(Role::Warden),
            "student" => Ok(Role::Student),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Warden).unwrap(), "\"warden\"");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn rejects_unknown_role() {
        assert!("superuser".parse::<Role>().is_err());
    }
}
