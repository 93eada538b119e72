//! In-memory database and fixtures shared by the test modules.

use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::db;
use crate::models::booking::{BookingStatus, CreateBooking, PaymentMethod, Platform};

/// One connection, never recycled: every connection to `sqlite::memory:`
/// opens its own empty database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn seed_property(pool: &SqlitePool, name: &str) -> i64 {
    db::properties::insert(pool, name).await.unwrap().id
}

pub async fn seed_room(pool: &SqlitePool, property_id: i64, room_no: &str) -> i64 {
    db::rooms::insert(pool, property_id, room_no).await.unwrap().id
}

pub fn new_booking(property_id: i64, room_id: Option<i64>, check_in: &str, check_out: &str) -> CreateBooking {
    CreateBooking {
        guest_name: "Test Guest".into(),
        email: Some("guest@example.com".into()),
        phone: None,
        id_number: None,
        reservation_id: None,
        property_id,
        room_id,
        platform: Platform::Direct,
        payment_method: PaymentMethod::Cash,
        amount: 100.0,
        payment_date: None,
        check_in_date: date(check_in),
        check_out_date: date(check_out),
        status: None,
    }
}

pub async fn seed_booking(
    pool: &SqlitePool,
    property_id: i64,
    room_id: Option<i64>,
    check_in: &str,
    check_out: &str,
) -> i64 {
    let body = new_booking(property_id, room_id, check_in, check_out);
    db::bookings::insert(pool, &body, BookingStatus::Booked)
        .await
        .unwrap()
        .id
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
