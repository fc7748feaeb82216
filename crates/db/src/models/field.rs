use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use utils::validation::{BodyIssue, Validate, require_non_empty};
use uuid::Uuid;

use super::fill::Fill;

/// Declared type of the values a field accepts
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    Display,
    utoipa::ToSchema,
)]
#[sqlx(type_name = "datatype", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    pub datatype: DataType,
    pub created_at: DateTime<Utc>,
}

/// A field together with every fill submitted against it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS, utoipa::ToSchema)]
pub struct FieldWithFills {
    #[serde(flatten)]
    #[ts(flatten)]
    pub field: Field,
    pub fills: Vec<Fill>,
}

impl std::ops::Deref for FieldWithFills {
    type Target = Field;
    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl FieldWithFills {
    pub fn without_fills(field: Field) -> Self {
        Self {
            field,
            fills: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, utoipa::ToSchema)]
pub struct CreateField {
    pub name: String,
    pub datatype: DataType,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, utoipa::ToSchema)]
pub struct UpdateField {
    pub name: String,
    pub datatype: DataType,
}

fn validate_name(name: &str) -> Vec<BodyIssue> {
    let mut issues = Vec::new();
    require_non_empty(&mut issues, "name", name, "name is required");
    issues
}

impl Validate for CreateField {
    fn validate(&self) -> Vec<BodyIssue> {
        validate_name(&self.name)
    }
}

impl Validate for UpdateField {
    fn validate(&self) -> Vec<BodyIssue> {
        validate_name(&self.name)
    }
}

impl Field {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateField,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            r#"INSERT INTO fields (id, name, datatype)
               VALUES ($1, $2, $3)
               RETURNING id, name, datatype, created_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.datatype)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            r#"SELECT id, name, datatype, created_at
               FROM fields
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            r#"SELECT id, name, datatype, created_at
               FROM fields
               WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            r#"SELECT id, name, datatype, created_at
               FROM fields
               ORDER BY created_at ASC, rowid ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// All fields in creation order, each carrying its fills in creation order
    pub async fn find_all_with_fills(pool: &SqlitePool) -> Result<Vec<FieldWithFills>, sqlx::Error> {
        let fields = Self::find_all(pool).await?;
        let mut fills_by_field: HashMap<Uuid, Vec<Fill>> = HashMap::new();
        for fill in Fill::find_all(pool).await? {
            fills_by_field.entry(fill.field_id).or_default().push(fill);
        }

        Ok(fields
            .into_iter()
            .map(|field| {
                let fills = fills_by_field.remove(&field.id).unwrap_or_default();
                FieldWithFills { field, fills }
            })
            .collect())
    }

    pub async fn find_by_id_with_fills(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<FieldWithFills>, sqlx::Error> {
        let Some(field) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let fills = Fill::find_by_field_id(pool, id).await?;
        Ok(Some(FieldWithFills { field, fills }))
    }

    /// Renames the field and sets its datatype. The datatype may only change
    /// while the field has no fills; returns `None` when that guard fails or
    /// the field no longer exists.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        name: &str,
        datatype: DataType,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Field>(
            r#"UPDATE fields
               SET name = $2, datatype = $3
               WHERE id = $1
                 AND (datatype = $3
                      OR NOT EXISTS (SELECT 1 FROM fills WHERE field_id = $1))
               RETURNING id, name, datatype, created_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(datatype)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the field; its fills go with it through the cascading foreign key.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
