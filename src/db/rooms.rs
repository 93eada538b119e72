use sqlx::{Executor, Sqlite};

use crate::models::room::{Room, RoomStatus};

pub async fn list<'e, E>(ex: E, property_id: Option<i64>) -> Result<Vec<Room>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Room>(
        r#"
        SELECT * FROM rooms
        WHERE (?1 IS NULL OR property_id = ?1)
        ORDER BY property_id, length(room_no), room_no
        "#,
    )
    .bind(property_id)
    .fetch_all(ex)
    .await
}

pub async fn find<'e, E>(ex: E, id: i64) -> Result<Option<Room>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await
}

pub async fn insert<'e, E>(ex: E, property_id: i64, room_no: &str) -> Result<Room, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (property_id, room_no, status) VALUES (?, ?, 'available') RETURNING *",
    )
    .bind(property_id)
    .bind(room_no)
    .fetch_one(ex)
    .await
}

pub async fn set_status<'e, E>(ex: E, id: i64, status: RoomStatus) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE rooms SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Bookings of any status that point at the room.
pub async fn booking_count<'e, E>(ex: E, id: i64) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE room_id = ?")
        .bind(id)
        .fetch_one(ex)
        .await
}

pub async fn delete<'e, E>(ex: E, id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}
