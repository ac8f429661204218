use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "full_name": "RAKOTO Jean",
        "surface_id": "0340000001",
        "office": "DCP",
        "matricule": "M001"
    })
)]
pub struct Intern {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "RAKOTO Jean")]
    pub full_name: String,

    /// PAOSITRA MONEY code used for stipend payment.
    #[schema(example = "0340000001")]
    pub surface_id: String,

    /// Bureau, display only.
    #[schema(example = "DCP")]
    pub office: String,

    #[schema(example = "M001")]
    pub matricule: String,
}
