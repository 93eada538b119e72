use actix_web::{web, HttpResponse};
use serde_json::Value;
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::{self, bookings, properties};
use crate::error::ApiError;
use crate::handlers::today;
use crate::models::booking::{
    Booking, BookingAction, BookingQuery, BookingRecord, BookingStatus, BulkRowResult,
    BulkRowStatus, CreateBooking,
};
use crate::occupancy::{is_active_on, OccupancyEntry};
use crate::stays;

const MAX_BULK_ROWS: usize = 500;

/// `unassigned` wins over `active`, which wins over the per-day listing.
pub async fn list_bookings(
    pool: web::Data<SqlitePool>,
    params: web::Query<BookingQuery>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();

    if params.unassigned == Some(true) {
        let waiting = bookings::unassigned(pool.get_ref(), params.property_id).await?;
        return Ok(HttpResponse::Ok().json(waiting));
    }

    let today = today();
    if params.active == Some(true) {
        let active: Vec<BookingRecord> =
            bookings::with_status(pool.get_ref(), BookingStatus::CheckedIn, params.property_id)
                .await?
                .into_iter()
                .filter(|r| is_active_on(&r.booking, today))
                .collect();
        return Ok(HttpResponse::Ok().json(active));
    }

    let date = match (params.today, params.date) {
        (Some(true), _) | (_, None) => today,
        (_, Some(date)) => date,
    };
    let entries: Vec<OccupancyEntry> = bookings::covering(pool.get_ref(), date, params.property_id)
        .await?
        .into_iter()
        .map(|r| OccupancyEntry::new(r, date))
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

/// Shared by the single and bulk endpoints. The insert and the room check run
/// in one transaction so a clashing row never lands.
async fn create_one(pool: &SqlitePool, body: &CreateBooking) -> Result<Booking, ApiError> {
    body.validate()?;
    if matches!(body.status, Some(s) if s != BookingStatus::Booked) {
        return Err(ApiError::bad_request("New bookings start with status 'booked'"));
    }

    let mut tx = db::begin_immediate(pool).await?;
    if properties::find(&mut *tx, body.property_id).await?.is_none() {
        return Err(ApiError::NotFound("Property"));
    }

    // the room goes through the same checks as a later assignment
    let unplaced = CreateBooking {
        guest_name: body.guest_name.trim().to_string(),
        room_id: None,
        ..body.clone()
    };
    let mut booking = bookings::insert(&mut *tx, &unplaced, BookingStatus::Booked).await?;
    if body.room_id.is_some() {
        booking = stays::assign_room(&mut tx, booking.id, body.room_id).await?;
    }
    tx.commit().await?;

    log::info!(
        "created booking {} for {} ({} to {})",
        booking.id,
        booking.guest_name,
        booking.check_in_date,
        booking.check_out_date
    );
    Ok(booking)
}

pub async fn create_booking(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateBooking>,
) -> Result<HttpResponse, ApiError> {
    let booking = create_one(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(booking))
}

/// Imports rows parsed from a channel export. Rows are independent: a bad row
/// is reported and the rest still go in.
pub async fn bulk_create_bookings(
    pool: web::Data<SqlitePool>,
    rows: web::Json<Vec<Value>>,
) -> Result<HttpResponse, ApiError> {
    let rows = rows.into_inner();
    if rows.len() > MAX_BULK_ROWS {
        return Err(ApiError::bad_request(format!(
            "At most {MAX_BULK_ROWS} rows per import"
        )));
    }

    let mut results = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let reservation_id = row
            .get("reservationId")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let outcome = match serde_json::from_value::<CreateBooking>(row) {
            Ok(body) => create_one(pool.get_ref(), &body).await,
            Err(e) => Err(ApiError::bad_request(e.to_string())),
        };

        results.push(match outcome {
            Ok(booking) => BulkRowResult {
                index,
                reservation_id,
                status: BulkRowStatus::Saved,
                booking_id: Some(booking.id),
                error: None,
            },
            Err(err) => {
                log::warn!("bulk row {index} rejected: {err}");
                let error = match err {
                    ApiError::Database(_) => "Database error".to_string(),
                    other => other.to_string(),
                };
                BulkRowResult {
                    index,
                    reservation_id,
                    status: BulkRowStatus::Failed,
                    booking_id: None,
                    error: Some(error),
                }
            }
        });
    }

    let saved = results
        .iter()
        .filter(|r| r.status == BulkRowStatus::Saved)
        .count();
    log::info!("bulk import: {saved} of {} rows saved", results.len());
    Ok(HttpResponse::Ok().json(results))
}

pub async fn get_booking(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let record = bookings::find_record(pool.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_booking(
    pool: web::Data<SqlitePool>,
    body: web::Json<BookingAction>,
) -> Result<HttpResponse, ApiError> {
    let mut tx = db::begin_immediate(pool.get_ref()).await?;
    let booking = match body.into_inner() {
        BookingAction::Assign {
            booking_id,
            room_id,
        } => stays::assign_room(&mut tx, booking_id, room_id).await?,
        BookingAction::Checkin { booking_id } => stays::check_in(&mut tx, booking_id).await?,
        BookingAction::Checkout { booking_id } => stays::check_out(&mut tx, booking_id).await?,
    };
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(booking))
}

/// Soft delete: the row stays with status `cancel`.
pub async fn cancel_booking(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let mut tx = db::begin_immediate(pool.get_ref()).await?;
    let booking = stays::cancel(&mut tx, path.into_inner()).await?;
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(booking))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use chrono::Duration;
    use serde_json::{json, Value};

    use crate::handlers::{self, today};
    use crate::test_support::{seed_booking, seed_property, seed_room, test_pool};

    fn booking_json(property: i64, check_in: &str, check_out: &str) -> Value {
        json!({
            "guestName": "Ravi",
            "email": "ravi@example.com",
            "phone": "+91 98000 00000",
            "propertyId": property,
            "platform": "Agoda",
            "paymentMethod": "online",
            "amount": 3200.0,
            "paymentDate": "2024-08-01",
            "checkInDate": check_in,
            "checkOutDate": check_out,
        })
    }

    #[actix_web::test]
    async fn create_and_fetch() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/bookings")
            .set_json(booking_json(property, "2024-08-10", "2024-08-12"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["status"], "booked");
        assert_eq!(created["platform"], "Agoda");
        let id = created["id"].as_i64().unwrap();

        let req = test::TestRequest::get().uri(&format!("/bookings/{id}")).to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["propertyName"], "Hillside");
        assert_eq!(fetched["guestName"], "Ravi");
        assert!(fetched["roomNo"].is_null());

        let req = test::TestRequest::get().uri("/bookings/999").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn create_validates_input() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let inverted = booking_json(property, "2024-08-12", "2024-08-10");
        let req = test::TestRequest::post().uri("/bookings").set_json(inverted).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let mut checked_in = booking_json(property, "2024-08-10", "2024-08-12");
        checked_in["status"] = json!("checkin");
        let req = test::TestRequest::post().uri("/bookings").set_json(checked_in).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let mut blank_name = booking_json(property, "2024-08-10", "2024-08-12");
        blank_name["guestName"] = json!("   ");
        let req = test::TestRequest::post().uri("/bookings").set_json(blank_name).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let errors: Value = test::read_body_json(resp).await;
        assert!(errors["guest_name"].is_array());

        let missing_property = booking_json(999, "2024-08-10", "2024-08-12");
        let req = test::TestRequest::post()
            .uri("/bookings")
            .set_json(missing_property)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn create_with_clashing_room_is_rolled_back() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let room = seed_room(&pool, property, "101").await;
        seed_booking(&pool, property, Some(room), "2024-08-10", "2024-08-15").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let mut body = booking_json(property, "2024-08-12", "2024-08-13");
        body["roomId"] = json!(room);
        let req = test::TestRequest::post().uri("/bookings").set_json(body).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::get()
            .uri("/bookings?date=2024-08-12")
            .to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
    }

    #[actix_web::test]
    async fn list_by_date_marks_stay_type() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let other = seed_property(&pool, "Lakeview").await;
        seed_booking(&pool, property, None, "2024-08-10", "2024-08-12").await;
        seed_booking(&pool, property, None, "2024-08-08", "2024-08-10").await;
        seed_booking(&pool, property, None, "2024-08-09", "2024-08-11").await;
        seed_booking(&pool, property, None, "2024-08-11", "2024-08-13").await;
        seed_booking(&pool, other, None, "2024-08-10", "2024-08-11").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/bookings?propertyId={property}&date=2024-08-10"))
            .to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let kinds: Vec<&str> = listed.iter().map(|b| b["type"].as_str().unwrap()).collect();
        assert_eq!(kinds, vec!["checkout", "stay", "checkin"]);
    }

    #[actix_web::test]
    async fn today_flag_overrides_date() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let day = today();
        let current = seed_booking(
            &pool,
            property,
            None,
            &(day - Duration::days(1)).to_string(),
            &(day + Duration::days(1)).to_string(),
        )
        .await;
        seed_booking(&pool, property, None, "2020-01-01", "2020-01-03").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/bookings?date=2020-01-02&today=true")
            .to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], current);
        assert_eq!(listed[0]["type"], "stay");

        let req = test::TestRequest::get().uri("/bookings?date=2020-01-02").to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_ne!(listed[0]["id"], current);
    }

    #[actix_web::test]
    async fn assign_null_unassigns_booked_booking() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let room = seed_room(&pool, property, "101").await;
        let booking = seed_booking(&pool, property, Some(room), "2024-08-10", "2024-08-12").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "assign", "bookingId": booking, "roomId": null }))
            .to_request();
        let unassigned: Value = test::call_and_read_body_json(&app, req).await;
        assert!(unassigned["roomId"].is_null());
        assert_eq!(unassigned["status"], "booked");

        let req = test::TestRequest::get().uri("/bookings?unassigned=true").to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], booking);

        let req = test::TestRequest::get().uri(&format!("/rooms/{room}")).to_request();
        let r: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(r["status"], "available");
    }

    #[actix_web::test]
    async fn unassigned_and_cancel() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let room = seed_room(&pool, property, "101").await;
        let waiting = seed_booking(&pool, property, None, "2024-08-10", "2024-08-12").await;
        let dropped = seed_booking(&pool, property, None, "2024-08-11", "2024-08-12").await;
        seed_booking(&pool, property, Some(room), "2024-08-10", "2024-08-12").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/bookings/{dropped}"))
            .to_request();
        let cancelled: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cancelled["status"], "cancel");

        let req = test::TestRequest::delete()
            .uri(&format!("/bookings/{dropped}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::get().uri("/bookings?unassigned=true").to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], waiting);
    }

    #[actix_web::test]
    async fn patch_assign_checkin_checkout() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let room = seed_room(&pool, property, "101").await;
        let booking = seed_booking(&pool, property, None, "2024-08-10", "2024-08-12").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "checkin", "bookingId": booking }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "assign", "bookingId": booking, "roomId": room }))
            .to_request();
        let assigned: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(assigned["roomId"], room);
        assert_eq!(assigned["status"], "booked");

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "checkin", "bookingId": booking }))
            .to_request();
        let checked_in: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(checked_in["status"], "checkin");

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "checkout", "bookingId": booking }))
            .to_request();
        let out: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(out["status"], "checkout");

        let req = test::TestRequest::patch()
            .uri("/bookings")
            .set_json(json!({ "action": "assign", "bookingId": booking, "roomId": null }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);
    }

    #[actix_web::test]
    async fn bulk_reports_each_row() {
        let pool = test_pool().await;
        let property = seed_property(&pool, "Hillside").await;
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(pool))
                .configure(handlers::configure),
        )
        .await;

        let mut good = booking_json(property, "2024-09-01", "2024-09-03");
        good["reservationId"] = json!("BK-1001");
        good["platform"] = json!("Booking.com");
        let mut inverted = booking_json(property, "2024-09-03", "2024-09-01");
        inverted["reservationId"] = json!("BK-1002");
        let malformed = json!({ "reservationId": "BK-1003", "guestName": "No dates" });

        let req = test::TestRequest::post()
            .uri("/bookings/bulk")
            .set_json(json!([good, inverted, malformed]))
            .to_request();
        let results: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["status"], "saved");
        assert!(results[0]["bookingId"].is_i64());
        assert_eq!(results[1]["status"], "failed");
        assert_eq!(results[1]["reservationId"], "BK-1002");
        assert_eq!(results[2]["status"], "failed");
        assert!(results[2]["error"].is_string());
    }
}
