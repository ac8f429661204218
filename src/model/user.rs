use crate::model::role::Role;
use std::str::FromStr;

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub intern_id: Option<i64>,
}

impl User {
    /// Unknown spellings fall back to the least privileged role.
    pub fn role(&self) -> Role {
        Role::from_str(&self.role).unwrap_or(Role::User)
    }
}
