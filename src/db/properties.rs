use sqlx::{Executor, Sqlite};

use crate::models::property::Property;

pub async fn list<'e, E>(ex: E) -> Result<Vec<Property>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Property>("SELECT * FROM properties ORDER BY name, id")
        .fetch_all(ex)
        .await
}

pub async fn find<'e, E>(ex: E, id: i64) -> Result<Option<Property>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await
}

pub async fn insert<'e, E>(ex: E, name: &str) -> Result<Property, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Property>("INSERT INTO properties (name) VALUES (?) RETURNING *")
        .bind(name)
        .fetch_one(ex)
        .await
}

pub async fn rename<'e, E>(ex: E, id: i64, name: &str) -> Result<Option<Property>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Property>(
        "UPDATE properties SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(ex)
    .await
}

/// Rooms plus bookings that point at the property.
pub async fn reference_count<'e, E>(ex: E, id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"
        SELECT (SELECT COUNT(*) FROM rooms WHERE property_id = ?1)
             + (SELECT COUNT(*) FROM bookings WHERE property_id = ?1)
        "#,
    )
    .bind(id)
    .fetch_one(ex)
    .await
}

pub async fn delete<'e, E>(ex: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM properties WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}
