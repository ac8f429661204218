use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, Display,
    AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    /// An intern account, linked to an intern record.
    #[default]
    User,
}

impl Role {
    /// Where a session of this role lands after login or after hitting a route
    /// reserved for the other role.
    pub fn landing_page(&self) -> &'static str {
        match self {
            Role::Admin => "/",
            Role::User => "/me",
        }
    }
}
