use crate::model::{attendance::AttendanceRecord, attendance::Presence, month::YearMonth};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, Sqlite, SqlitePool};
use std::collections::HashMap;

/// Writes the presence for (intern, date), replacing any previous value.
pub async fn upsert<'e, E>(
    executor: E,
    intern_id: i64,
    date: NaiveDate,
    presence: Presence,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO attendance (intern_id, date, presence)
        VALUES (?, ?, ?)
        ON CONFLICT (intern_id, date)
        DO UPDATE SET presence = excluded.presence
        "#,
    )
    .bind(intern_id)
    .bind(date)
    .bind(presence.value())
    .execute(executor)
    .await?;

    Ok(())
}

/// Records a full day for (intern, date) unless the day already has a record.
/// Returns `false` when nothing was written.
pub async fn insert_check_in(
    pool: &SqlitePool,
    intern_id: i64,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (intern_id, date, presence, time_of_day)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (intern_id, date) DO NOTHING
        "#,
    )
    .bind(intern_id)
    .bind(date)
    .bind(Presence::FullDay.value())
    .bind(time.format("%H:%M:%S").to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get(
    pool: &SqlitePool,
    intern_id: i64,
    date: NaiveDate,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>("SELECT presence FROM attendance WHERE intern_id = ? AND date = ?")
        .bind(intern_id)
        .bind(date)
        .fetch_optional(pool)
        .await
}

/// Presence per intern id on one date.
pub async fn for_date(pool: &SqlitePool, date: NaiveDate) -> Result<HashMap<i64, f64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, f64)>(
        "SELECT intern_id, presence FROM attendance WHERE date = ?",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

pub async fn for_intern_month(
    pool: &SqlitePool,
    intern_id: i64,
    month: YearMonth,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT intern_id, date, presence, time_of_day
        FROM attendance
        WHERE intern_id = ? AND date >= ? AND date < ?
        ORDER BY date ASC
        "#,
    )
    .bind(intern_id)
    .bind(month.first_day())
    .bind(month.next_first_day())
    .fetch_all(pool)
    .await
}

pub async fn for_month(
    pool: &SqlitePool,
    month: YearMonth,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT intern_id, date, presence, time_of_day
        FROM attendance
        WHERE date >= ? AND date < ?
        ORDER BY intern_id, date
        "#,
    )
    .bind(month.first_day())
    .bind(month.next_first_day())
    .fetch_all(pool)
    .await
}
