use serde::{Deserialize, Serialize};

use super::UserId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Manager,
    Engineer,
}

impl Role {
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// Application profile of an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Profile {
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}
