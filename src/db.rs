use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::catalog::Discipline;

#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub summary: ReportSummary,
    pub data: Value,
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn insert_report(
    pool: &PgPool,
    name: &str,
    title: &str,
    data: &Value,
    user_email: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO performance_report.reports (id, name, title, data, user_email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(title)
    .bind(data)
    .bind(user_email)
    .fetch_one(pool)
    .await?
    .get("id");

    tracing::info!(%id, name, "stored report");
    Ok(id)
}

pub async fn list_reports(pool: &PgPool) -> anyhow::Result<Vec<ReportSummary>> {
    let rows = sqlx::query(
        "SELECT id, name, title, user_email, created_at \
         FROM performance_report.reports \
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ReportSummary {
            id: row.get("id"),
            name: row.get("name"),
            title: row.get("title"),
            user_email: row.get("user_email"),
            created_at: row.get("created_at"),
        })
        .collect())
}

pub async fn fetch_report(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<StoredReport>> {
    let row = sqlx::query(
        "SELECT id, name, title, user_email, created_at, data \
         FROM performance_report.reports \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| StoredReport {
        summary: ReportSummary {
            id: row.get("id"),
            name: row.get("name"),
            title: row.get("title"),
            user_email: row.get("user_email"),
            created_at: row.get("created_at"),
        },
        data: row.get("data"),
    }))
}

pub async fn update_report_data(pool: &PgPool, id: Uuid, data: &Value) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE performance_report.reports SET data = $2, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_report(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM performance_report.reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn insert_discipline(pool: &PgPool, discipline: &Discipline) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO performance_report.disciplines (id, code, name)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(discipline.id)
    .bind(discipline.code.as_deref())
    .bind(discipline.name.as_deref())
    .execute(pool)
    .await?;

    tracing::info!(id = %discipline.id, code_name = %discipline.code_name(), "added discipline");
    Ok(())
}

pub async fn list_disciplines(pool: &PgPool) -> anyhow::Result<Vec<Discipline>> {
    let rows = sqlx::query(
        "SELECT id, code, name FROM performance_report.disciplines \
         ORDER BY code NULLS LAST, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Discipline {
            id: row.get("id"),
            code: row.get("code"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn delete_discipline(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM performance_report.disciplines WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
