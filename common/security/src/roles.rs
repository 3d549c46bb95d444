use common_auth::ROLE_SUPER_USER;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    SuperUser,
    /// Any other permission value; scoped to its own tenant.
    Member(String),
}

impl Role {
    /// Permission strings are compared exactly; `superuser` is an ordinary role.
    pub fn from_permission(s: &str) -> Self {
        if s == ROLE_SUPER_USER {
            Role::SuperUser
        } else {
            Role::Member(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperUser => ROLE_SUPER_USER,
            Role::Member(name) => name,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::SuperUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_super_user_is_elevated() {
        assert!(Role::from_permission("SuperUser").is_elevated());
        assert!(!Role::from_permission("superuser").is_elevated());
        assert!(!Role::from_permission("").is_elevated());
        assert_eq!(Role::from_permission("Admin").as_str(), "Admin");
    }
}
