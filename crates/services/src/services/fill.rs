//! Business rules for fills: every value must parse as its field's datatype.

use db::models::{
    field::Field,
    fill::{CreateFill, Fill, FillWithField, UpdateFill},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::value::{ValueError, validate_value};

/// Attempts before giving up on a field whose datatype keeps changing underneath.
const CREATE_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Fill not found")]
    NotFound,
    #[error("Field not found")]
    FieldNotFound,
    #[error(transparent)]
    InvalidValue(#[from] ValueError),
    #[error("Field was modified concurrently. Try again.")]
    FieldChanged,
}

pub struct FillService;

impl FillService {
    pub async fn create(pool: &SqlitePool, data: CreateFill) -> Result<Fill, FillError> {
        // A malformed id can't name a field, so it gets the same answer as an unknown one.
        let field_id = Uuid::parse_str(data.field_id.trim()).map_err(|_| FillError::FieldNotFound)?;
        for attempt in 1..=CREATE_ATTEMPTS {
            let field = Field::find_by_id(pool, field_id)
                .await?
                .ok_or(FillError::FieldNotFound)?;

            let typed = validate_value(field.datatype, &data.value)?;
            debug!(field_id = %field.id, value = ?typed, "Fill value accepted");

            // The insert only lands while the field still has the datatype checked above.
            if let Some(fill) = Fill::create(pool, Uuid::new_v4(), &field, &data.value).await? {
                info!(fill_id = %fill.id, field_id = %field.id, "Created fill");
                return Ok(fill);
            }
            warn!(field_id = %field.id, attempt, "Field changed while creating fill");
        }

        Err(FillError::FieldChanged)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<FillWithField>, FillError> {
        Ok(Fill::find_all_with_field(pool).await?)
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: UpdateFill) -> Result<Fill, FillError> {
        let existing = Fill::find_by_id(pool, id).await?.ok_or(FillError::NotFound)?;
        let field = Field::find_by_id(pool, existing.field_id)
            .await?
            .ok_or(FillError::FieldNotFound)?;

        validate_value(field.datatype, &data.value)?;

        let fill = Fill::update_value(pool, id, &data.value)
            .await?
            .ok_or(FillError::NotFound)?;
        info!(fill_id = %id, field_id = %field.id, "Updated fill");
        Ok(fill)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), FillError> {
        let rows = Fill::delete(pool, id).await?;
        if rows == 0 {
            return Err(FillError::NotFound);
        }
        info!(fill_id = %id, "Deleted fill");
        Ok(())
    }
}
