use crate::model::intern::Intern;
use sqlx::SqlitePool;

/// Column values of an intern, without the id.
#[derive(Debug, Clone)]
pub struct InternFields {
    pub full_name: String,
    pub office: String,
    pub surface_id: String,
    pub matricule: String,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Intern>, sqlx::Error> {
    sqlx::query_as::<_, Intern>(
        "SELECT id, full_name, surface_id, office, matricule FROM interns ORDER BY matricule ASC",
    )
    .fetch_all(pool)
    .await
}

/// The month grid picks interns by name.
pub async fn list_by_name(pool: &SqlitePool) -> Result<Vec<Intern>, sqlx::Error> {
    sqlx::query_as::<_, Intern>(
        "SELECT id, full_name, surface_id, office, matricule FROM interns ORDER BY full_name ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Intern>, sqlx::Error> {
    sqlx::query_as::<_, Intern>(
        "SELECT id, full_name, surface_id, office, matricule FROM interns WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_matricule(
    pool: &SqlitePool,
    matricule: &str,
) -> Result<Option<Intern>, sqlx::Error> {
    sqlx::query_as::<_, Intern>(
        "SELECT id, full_name, surface_id, office, matricule FROM interns WHERE matricule = ?",
    )
    .bind(matricule)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &SqlitePool, fields: &InternFields) -> Result<Intern, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO interns (full_name, surface_id, office, matricule)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&fields.full_name)
    .bind(&fields.surface_id)
    .bind(&fields.office)
    .bind(&fields.matricule)
    .execute(pool)
    .await?;

    Ok(Intern {
        id: result.last_insert_rowid(),
        full_name: fields.full_name.clone(),
        surface_id: fields.surface_id.clone(),
        office: fields.office.clone(),
        matricule: fields.matricule.clone(),
    })
}

/// Returns the number of rows touched (0 when the id does not exist).
pub async fn update(pool: &SqlitePool, id: i64, fields: &InternFields) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE interns
        SET full_name = ?, surface_id = ?, office = ?, matricule = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.full_name)
    .bind(&fields.surface_id)
    .bind(&fields.office)
    .bind(&fields.matricule)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Attendance rows go with the intern; a linked account stays, unlinked.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM interns WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
