//! Business rules for field definitions.

use db::models::field::{CreateField, Field, FieldWithFills, UpdateField};
use db::models::fill::Fill;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("Field not found")]
    NotFound,
    #[error("This name already exists")]
    NameTaken,
    #[error(
        "Cannot change the type of a field that already has fills. Delete them or create a new field."
    )]
    DatatypeLocked,
}

impl From<sqlx::Error> for FieldError {
    fn from(err: sqlx::Error) -> Self {
        // Two concurrent creates can both pass the lookup; the UNIQUE index decides.
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return FieldError::NameTaken;
        }
        FieldError::Database(err)
    }
}

pub struct FieldService;

impl FieldService {
    pub async fn create(pool: &SqlitePool, data: CreateField) -> Result<FieldWithFills, FieldError> {
        if Field::find_by_name(pool, &data.name).await?.is_some() {
            warn!(name = %data.name, "Rejected field with duplicate name");
            return Err(FieldError::NameTaken);
        }

        let field = Field::create(pool, Uuid::new_v4(), &data).await?;
        info!(
            field_id = %field.id,
            name = %field.name,
            datatype = %field.datatype,
            "Created field"
        );

        Ok(FieldWithFills::without_fills(field))
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<FieldWithFills>, FieldError> {
        Ok(Field::find_all_with_fills(pool).await?)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: UpdateField,
    ) -> Result<FieldWithFills, FieldError> {
        let existing = Field::find_by_id(pool, id)
            .await?
            .ok_or(FieldError::NotFound)?;

        let name_owner = Field::find_by_name(pool, &data.name).await?;
        if name_owner.is_some_and(|other| other.id != id) {
            return Err(FieldError::NameTaken);
        }

        if data.datatype != existing.datatype && Fill::count_by_field_id(pool, id).await? > 0 {
            warn!(
                field_id = %id,
                from = %existing.datatype,
                to = %data.datatype,
                "Refused datatype change on a field with fills"
            );
            return Err(FieldError::DatatypeLocked);
        }

        // The write re-checks the fill guard, so a fill created after the check above
        // still blocks the datatype change.
        if Field::update(pool, id, &data.name, data.datatype).await?.is_none() {
            return match Field::find_by_id(pool, id).await? {
                None => Err(FieldError::NotFound),
                Some(_) => Err(FieldError::DatatypeLocked),
            };
        }
        info!(field_id = %id, name = %data.name, datatype = %data.datatype, "Updated field");

        Field::find_by_id_with_fills(pool, id)
            .await?
            .ok_or(FieldError::NotFound)
    }

    /// Removes the field and, through the cascading key, every fill it owns.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), FieldError> {
        let rows = Field::delete(pool, id).await?;
        if rows == 0 {
            return Err(FieldError::NotFound);
        }
        info!(field_id = %id, "Deleted field");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::field::DataType};

    use super::*;

    fn create(name: &str, datatype: DataType) -> CreateField {
        CreateField {
            name: name.to_string(),
            datatype,
        }
    }

    fn update(name: &str, datatype: DataType) -> UpdateField {
        UpdateField {
            name: name.to_string(),
            datatype,
        }
    }

    #[tokio::test]
    async fn test_create_returns_empty_fills() {
        let db = DBService::new_in_memory().await.unwrap();
        let field = FieldService::create(&db.pool, create("Test", DataType::String))
            .await
            .unwrap();
        assert_eq!(field.name, "Test");
        assert_eq!(field.datatype, DataType::String);
        assert!(field.fills.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let db = DBService::new_in_memory().await.unwrap();
        FieldService::create(&db.pool, create("Test", DataType::String))
            .await
            .unwrap();

        let err = FieldService::create(&db.pool, create("Test", DataType::Number))
            .await
            .unwrap_err();
        assert!(matches!(err, FieldError::NameTaken));
        assert_eq!(err.to_string(), "This name already exists");
        assert_eq!(FieldService::list(&db.pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_in_creation_order_with_fills() {
        let db = DBService::new_in_memory().await.unwrap();
        let a = FieldService::create(&db.pool, create("a", DataType::String))
            .await
            .unwrap();
        let b = FieldService::create(&db.pool, create("b", DataType::String))
            .await
            .unwrap();
        Fill::create(&db.pool, Uuid::new_v4(), &a, "abc")
            .await
            .unwrap()
            .unwrap();

        let fields = FieldService::list(&db.pool).await.unwrap();
        let ids: Vec<Uuid> = fields.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(fields[0].fills.len(), 1);
        assert!(fields[1].fills.is_empty());
    }

    #[tokio::test]
    async fn test_update_name_and_datatype() {
        let db = DBService::new_in_memory().await.unwrap();
        let field = FieldService::create(&db.pool, create("Origin", DataType::String))
            .await
            .unwrap();

        let updated = FieldService::update(&db.pool, field.id, update("Target", DataType::Number))
            .await
            .unwrap();
        assert_eq!(updated.id, field.id);
        assert_eq!(updated.name, "Target");
        assert_eq!(updated.datatype, DataType::Number);
    }

    #[tokio::test]
    async fn test_update_keeping_own_name() {
        let db = DBService::new_in_memory().await.unwrap();
        let field = FieldService::create(&db.pool, create("Origin", DataType::String))
            .await
            .unwrap();

        let updated = FieldService::update(&db.pool, field.id, update("Origin", DataType::Date))
            .await
            .unwrap();
        assert_eq!(updated.datatype, DataType::Date);
    }

    #[tokio::test]
    async fn test_update_missing_field() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = FieldService::update(&db.pool, Uuid::new_v4(), update("New", DataType::Boolean))
            .await
            .unwrap_err();
        assert!(matches!(err, FieldError::NotFound));
    }

    #[tokio::test]
    async fn test_update_to_taken_name() {
        let db = DBService::new_in_memory().await.unwrap();
        FieldService::create(&db.pool, create("Taken", DataType::String))
            .await
            .unwrap();
        let field = FieldService::create(&db.pool, create("Origin", DataType::String))
            .await
            .unwrap();

        let err = FieldService::update(&db.pool, field.id, update("Taken", DataType::String))
            .await
            .unwrap_err();
        assert!(matches!(err, FieldError::NameTaken));
    }

    #[tokio::test]
    async fn test_datatype_locked_once_filled() {
        let db = DBService::new_in_memory().await.unwrap();
        let field = FieldService::create(&db.pool, create("Origin", DataType::String))
            .await
            .unwrap();
        Fill::create(&db.pool, Uuid::new_v4(), &field, "abc")
            .await
            .unwrap()
            .unwrap();

        let err = FieldService::update(&db.pool, field.id, update("Origin", DataType::Number))
            .await
            .unwrap_err();
        assert!(matches!(err, FieldError::DatatypeLocked));
        assert_eq!(
            err.to_string(),
            "Cannot change the type of a field that already has fills. Delete them or create a new field."
        );

        // Renaming without touching the type is still allowed.
        let renamed = FieldService::update(&db.pool, field.id, update("Renamed", DataType::String))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.fills.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = DBService::new_in_memory().await.unwrap();
        let field = FieldService::create(&db.pool, create("Origin", DataType::String))
            .await
            .unwrap();
        Fill::create(&db.pool, Uuid::new_v4(), &field, "abc")
            .await
            .unwrap()
            .unwrap();

        FieldService::delete(&db.pool, field.id).await.unwrap();
        assert!(FieldService::list(&db.pool).await.unwrap().is_empty());
        assert!(Fill::find_all(&db.pool).await.unwrap().is_empty());

        let err = FieldService::delete(&db.pool, field.id).await.unwrap_err();
        assert!(matches!(err, FieldError::NotFound));
    }
}
