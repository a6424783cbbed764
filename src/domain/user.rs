//! User accounts as synchronized from the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Account role.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    /// Regular buyer account.
    #[default]
    User,
    /// Platform administrator.
    Admin,
    /// Account that sells services.
    Seller,
}

/// Account status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
pub enum UserStatus {
    /// Account in good standing.
    #[default]
    Active,
    /// Dormant account.
    Inactive,
    /// Account blocked by an administrator.
    Suspended,
}

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Subject id from the identity provider.
    pub id: UserId,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Contact email, unique when present.
    pub email: Option<String>,
    /// Profile picture URL.
    pub profile_image_url: Option<String>,
    /// Account role.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// First time the account was seen.
    pub created_at: DateTime<Utc>,
    /// Last profile synchronization.
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written on every login synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertUser {
    /// Subject id.
    pub id: UserId,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Profile picture URL.
    pub profile_image_url: Option<String>,
    /// Role claimed by the token.
    pub role: UserRole,
}

impl User {
    /// Builds the row inserted the first time an account is seen.
    #[must_use]
    pub fn from_upsert(upsert: UpsertUser, now: DateTime<Utc>) -> Self {
        Self {
            id: upsert.id,
            first_name: upsert.first_name,
            last_name: upsert.last_name,
            email: upsert.email,
            profile_image_url: upsert.profile_image_url,
            role: upsert.role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a later synchronization, keeping `created_at` and `status`.
    pub fn apply_upsert(&mut self, upsert: UpsertUser, now: DateTime<Utc>) {
        self.first_name = upsert.first_name;
        self.last_name = upsert.last_name;
        self.email = upsert.email;
        self.profile_image_url = upsert.profile_image_url;
        self.role = upsert.role;
        self.updated_at = now;
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
