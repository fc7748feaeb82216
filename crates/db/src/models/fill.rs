use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::validation::{BodyIssue, Validate, require_non_empty};
use uuid::Uuid;

use super::field::{DataType, Field};

/// A value submitted against a field, stored as text
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub id: Uuid,
    pub field_id: Uuid, // Foreign key to Field
    pub value: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS, utoipa::ToSchema)]
pub struct FillWithField {
    #[serde(flatten)]
    #[ts(flatten)]
    pub fill: Fill,
    pub field: Field,
}

impl std::ops::Deref for FillWithField {
    type Target = Fill;
    fn deref(&self) -> &Self::Target {
        &self.fill
    }
}

/// `field_id` stays a string here so a malformed id surfaces as a missing
/// field rather than a body error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFill {
    pub field_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, utoipa::ToSchema)]
pub struct UpdateFill {
    pub value: String,
}

impl Validate for CreateFill {
    fn validate(&self) -> Vec<BodyIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "value", &self.value, "value is required");
        require_non_empty(&mut issues, "fieldId", &self.field_id, "fieldId is required");
        issues
    }
}

impl Validate for UpdateFill {
    fn validate(&self) -> Vec<BodyIssue> {
        let mut issues = Vec::new();
        require_non_empty(&mut issues, "value", &self.value, "value is required");
        issues
    }
}

#[derive(FromRow)]
struct FillFieldRow {
    id: Uuid,
    field_id: Uuid,
    value: String,
    created_at: DateTime<Utc>,
    field_name: String,
    field_datatype: DataType,
    field_created_at: DateTime<Utc>,
}

impl From<FillFieldRow> for FillWithField {
    fn from(row: FillFieldRow) -> Self {
        Self {
            fill: Fill {
                id: row.id,
                field_id: row.field_id,
                value: row.value,
                created_at: row.created_at,
            },
            field: Field {
                id: row.field_id,
                name: row.field_name,
                datatype: row.field_datatype,
                created_at: row.field_created_at,
            },
        }
    }
}

impl Fill {
    /// Inserts a fill for `field`, provided the field still exists with the
    /// datatype the value was checked against. Returns `None` otherwise.
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        field: &Field,
        value: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fill>(
            r#"INSERT INTO fills (id, field_id, value)
               SELECT $1, $2, $3
               WHERE EXISTS (SELECT 1 FROM fields WHERE id = $2 AND datatype = $4)
               RETURNING id, field_id, value, created_at"#,
        )
        .bind(id)
        .bind(field.id)
        .bind(value)
        .bind(field.datatype)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fill>(
            r#"SELECT id, field_id, value, created_at
               FROM fills
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fill>(
            r#"SELECT id, field_id, value, created_at
               FROM fills
               ORDER BY created_at ASC, rowid ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_field_id(
        pool: &SqlitePool,
        field_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fill>(
            r#"SELECT id, field_id, value, created_at
               FROM fills
               WHERE field_id = $1
               ORDER BY created_at ASC, rowid ASC"#,
        )
        .bind(field_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_field_id(pool: &SqlitePool, field_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM fills WHERE field_id = $1")
            .bind(field_id)
            .fetch_one(pool)
            .await
    }

    /// All fills in creation order, each joined with the field it belongs to
    pub async fn find_all_with_field(pool: &SqlitePool) -> Result<Vec<FillWithField>, sqlx::Error> {
        let rows = sqlx::query_as::<_, FillFieldRow>(
            r#"SELECT
                f.id,
                f.field_id,
                f.value,
                f.created_at,
                fd.name       AS field_name,
                fd.datatype   AS field_datatype,
                fd.created_at AS field_created_at
            FROM fills f
            JOIN fields fd ON fd.id = f.field_id
            ORDER BY f.created_at ASC, f.rowid ASC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(FillWithField::from).collect())
    }

    pub async fn update_value(
        pool: &SqlitePool,
        id: Uuid,
        value: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Fill>(
            r#"UPDATE fills
               SET value = $2
               WHERE id = $1
               RETURNING id, field_id, value, created_at"#,
        )
        .bind(id)
        .bind(value)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM fills WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
