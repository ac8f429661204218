use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "s3cret")]
    pub password: String,
    #[schema(example = "s3cret")]
    pub confirm: String,
    #[serde(default)]
    pub role: Role,
    /// Required for `user` accounts; must name an existing intern.
    #[schema(example = "M001", nullable = true)]
    pub matricule: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "M001")]
    pub username: String,
    #[schema(example = "M001")]
    pub password: String,
}

/// Session token payload. `jti` identifies the session and survives the
/// sliding refresh, so revoking it ends every copy of the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
    /// Present only if this account is linked to an intern record
    pub intern_id: Option<i64>,
}
