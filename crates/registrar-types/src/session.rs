use serde::{Deserialize, Serialize};

/// The two authenticated roles. A session carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }

    /// The login form submits the role as a free string; anything that is
    /// not "admin" is treated as a student attempt.
    pub fn from_form(value: &str) -> Role {
        if value == "admin" { Role::Admin } else { Role::Student }
    }
}

/// Signed session claims carried in the session cookie. Canonical definition
/// lives here so the API handlers and the relay upgrade share one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Row id of the authenticated User or Admin.
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_form_defaults_to_student() {
        assert_eq!(Role::from_form("admin"), Role::Admin);
        assert_eq!(Role::from_form("student"), Role::Student);
        assert_eq!(Role::from_form("anything-else"), Role::Student);
    }
}
