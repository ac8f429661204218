use crate::model::{attendance::AttendanceRecord, intern::Intern, month::YearMonth};
use crate::repo;
use chrono::Datelike;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use utoipa::ToSchema;

/// One intern's month: a value for every calendar day, zero where nothing was recorded.
#[derive(Debug, Clone)]
pub struct InternMonth {
    pub intern: Intern,
    /// `days[d - 1]` is the presence on day `d`.
    pub days: Vec<f64>,
    pub total: f64,
}

impl InternMonth {
    pub fn day(&self, day: u32) -> f64 {
        day.checked_sub(1)
            .and_then(|i| self.days.get(i as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct MonthlyAttendance {
    pub month: YearMonth,
    /// Every intern, ordered by matricule.
    pub interns: Vec<InternMonth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryRow {
    pub intern_id: i64,
    pub full_name: String,
    pub matricule: String,
    pub office: String,
    #[schema(example = 21.5)]
    pub total: f64,
}

/// Folds the month's records into the dense per-intern matrix. Records for
/// unknown interns or outside the month are skipped.
pub fn build(month: YearMonth, interns: Vec<Intern>, records: &[AttendanceRecord]) -> MonthlyAttendance {
    let days_in_month = month.days_in_month() as usize;

    let mut rows: Vec<InternMonth> = interns
        .into_iter()
        .map(|intern| InternMonth {
            intern,
            days: vec![0.0; days_in_month],
            total: 0.0,
        })
        .collect();

    let index: HashMap<i64, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.intern.id, i))
        .collect();

    for record in records.iter().filter(|r| month.contains(r.date)) {
        let Some(&i) = index.get(&record.intern_id) else { continue };
        let row = &mut rows[i];
        row.days[record.date.day() as usize - 1] = record.presence;
        row.total += record.presence;
    }

    MonthlyAttendance {
        month,
        interns: rows,
    }
}

pub async fn aggregate(pool: &SqlitePool, month: YearMonth) -> Result<MonthlyAttendance, sqlx::Error> {
    let interns = repo::intern::list(pool).await?;
    let records = repo::attendance::for_month(pool, month).await?;
    Ok(build(month, interns, &records))
}

impl MonthlyAttendance {
    pub fn summary(&self) -> Vec<SummaryRow> {
        self.interns
            .iter()
            .map(|row| SummaryRow {
                intern_id: row.intern.id,
                full_name: row.intern.full_name.clone(),
                matricule: row.intern.matricule.clone(),
                office: row.intern.office.clone(),
                total: row.total,
            })
            .collect()
    }
}
