use chrono::NaiveDate;
use sqlx::{Executor, QueryBuilder, Sqlite};

use crate::income::IncomeFilter;
use crate::models::booking::{Booking, BookingRecord, BookingStatus, CreateBooking};

const RECORD_SELECT: &str = r#"
    SELECT b.*, p.name AS property_name, r.room_no AS room_no
    FROM bookings b
    JOIN properties p ON p.id = b.property_id
    LEFT JOIN rooms r ON r.id = b.room_id
"#;

pub async fn find<'e, E>(ex: E, id: i64) -> Result<Option<Booking>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(ex)
        .await
}

pub async fn find_record<'e, E>(ex: E, id: i64) -> Result<Option<BookingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, BookingRecord>(&format!("{RECORD_SELECT} WHERE b.id = ?"))
        .bind(id)
        .fetch_optional(ex)
        .await
}

pub async fn insert<'e, E>(
    ex: E,
    body: &CreateBooking,
    status: BookingStatus,
) -> Result<Booking, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            guest_name, email, phone, id_number, reservation_id,
            property_id, room_id, platform, payment_method, amount,
            payment_date, check_in_date, check_out_date, status
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&body.guest_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.id_number)
    .bind(&body.reservation_id)
    .bind(body.property_id)
    .bind(body.room_id)
    .bind(body.platform)
    .bind(body.payment_method)
    .bind(body.amount)
    .bind(body.payment_date)
    .bind(body.check_in_date)
    .bind(body.check_out_date)
    .bind(status)
    .fetch_one(ex)
    .await
}

/// Non-cancelled bookings whose stay includes `date`, departure day included.
pub async fn covering<'e, E>(
    ex: E,
    date: NaiveDate,
    property_id: Option<i64>,
) -> Result<Vec<BookingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, BookingRecord>(&format!(
        r#"{RECORD_SELECT}
        WHERE b.status != 'cancel'
          AND b.check_in_date <= ?1
          AND b.check_out_date >= ?1
          AND (?2 IS NULL OR b.property_id = ?2)
        ORDER BY b.check_in_date, b.id
        "#
    ))
    .bind(date)
    .bind(property_id)
    .fetch_all(ex)
    .await
}

pub async fn unassigned<'e, E>(
    ex: E,
    property_id: Option<i64>,
) -> Result<Vec<BookingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, BookingRecord>(&format!(
        r#"{RECORD_SELECT}
        WHERE b.room_id IS NULL
          AND b.status != 'cancel'
          AND (?1 IS NULL OR b.property_id = ?1)
        ORDER BY b.check_in_date, b.id
        "#
    ))
    .bind(property_id)
    .fetch_all(ex)
    .await
}

pub async fn with_status<'e, E>(
    ex: E,
    status: BookingStatus,
    property_id: Option<i64>,
) -> Result<Vec<BookingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, BookingRecord>(&format!(
        r#"{RECORD_SELECT}
        WHERE b.status = ?1
          AND (?2 IS NULL OR b.property_id = ?2)
        ORDER BY b.check_in_date, b.id
        "#
    ))
    .bind(status)
    .bind(property_id)
    .fetch_all(ex)
    .await
}

/// Booked or checked-in stays that hold `room_id`.
pub async fn holding_room<'e, E>(ex: E, room_id: i64) -> Result<Vec<Booking>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE room_id = ? AND status IN ('booked', 'checkin')
        ORDER BY check_in_date
        "#,
    )
    .bind(room_id)
    .fetch_all(ex)
    .await
}

pub async fn set_room<'e, E>(ex: E, id: i64, room_id: Option<i64>) -> Result<Booking, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET room_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
    )
    .bind(room_id)
    .bind(id)
    .fetch_one(ex)
    .await
}

pub async fn set_status<'e, E>(
    ex: E,
    id: i64,
    status: BookingStatus,
) -> Result<Booking, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_one(ex)
    .await
}

/// Income records: paid inside the period, or created inside it when no
/// payment date was recorded.
pub async fn income<'e, E>(ex: E, filter: &IncomeFilter) -> Result<Vec<BookingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb = QueryBuilder::<Sqlite>::new(RECORD_SELECT);
    qb.push(" WHERE b.status != 'cancel'");

    if let Some(property_id) = filter.property_id {
        qb.push(" AND b.property_id = ").push_bind(property_id);
    }
    if let Some(platform) = filter.platform {
        qb.push(" AND b.platform = ").push_bind(platform.platform());
        if let Some(method) = platform.payment_method() {
            qb.push(" AND b.payment_method = ").push_bind(method);
        }
    }
    if let Some(period) = filter.period {
        qb.push(" AND ((b.payment_date BETWEEN ")
            .push_bind(period.start)
            .push(" AND ")
            .push_bind(period.end)
            .push(") OR (b.payment_date IS NULL AND date(b.created_at) BETWEEN ")
            .push_bind(period.start)
            .push(" AND ")
            .push_bind(period.end)
            .push("))");
    }
    qb.push(" ORDER BY b.payment_date DESC, b.created_at DESC, b.id DESC");

    qb.build_query_as::<BookingRecord>().fetch_all(ex).await
}
