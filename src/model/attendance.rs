use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub intern_id: i64,
    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 1.0)]
    pub presence: f64,
    /// Set by the intern's own check-in (`HH:MM:SS`).
    #[schema(example = "08:12:45", nullable = true)]
    pub time_of_day: Option<String>,
}

/// A day's presence amount. Only whole and half days exist; anything else the
/// grids submit is rejected before it reaches the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Presence {
    Absent,
    HalfDay,
    FullDay,
}

impl Presence {
    pub fn value(self) -> f64 {
        match self {
            Presence::Absent => 0.0,
            Presence::HalfDay => 0.5,
            Presence::FullDay => 1.0,
        }
    }

    pub fn from_checkbox(checked: bool) -> Self {
        if checked {
            Presence::FullDay
        } else {
            Presence::Absent
        }
    }
}

impl TryFrom<f64> for Presence {
    type Error = String;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        if v == 0.0 {
            Ok(Presence::Absent)
        } else if v == 0.5 {
            Ok(Presence::HalfDay)
        } else if v == 1.0 {
            Ok(Presence::FullDay)
        } else {
            Err(format!("Valeur de présence invalide : {v} (attendu 0, 0.5 ou 1)"))
        }
    }
}
