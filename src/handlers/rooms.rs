use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::{self, properties, rooms};
use crate::error::ApiError;
use crate::models::room::{CreateRoom, RoomAction, RoomStatus};
use crate::stays;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSearch {
    pub property_id: Option<i64>,
}

pub async fn list_rooms(
    pool: web::Data<SqlitePool>,
    params: web::Query<RoomSearch>,
) -> Result<HttpResponse, ApiError> {
    let all = rooms::list(pool.get_ref(), params.property_id).await?;
    Ok(HttpResponse::Ok().json(all))
}

pub async fn create_room(
    pool: web::Data<SqlitePool>,
    body: web::Json<CreateRoom>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let room_no = body.room_no.trim();
    if room_no.is_empty() {
        return Err(ApiError::bad_request("Room number must not be blank"));
    }
    if properties::find(pool.get_ref(), body.property_id).await?.is_none() {
        return Err(ApiError::NotFound("Property"));
    }

    let room = rooms::insert(pool.get_ref(), body.property_id, room_no)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::conflict(format!("Room {room_no} already exists")),
            other => other,
        })?;
    log::info!("created room {} in property {}", room.room_no, room.property_id);
    Ok(HttpResponse::Created().json(room))
}

pub async fn get_room(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let room = rooms::find(pool.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Room"))?;
    Ok(HttpResponse::Ok().json(room))
}

pub async fn delete_room(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let mut tx = db::begin_immediate(pool.get_ref()).await?;

    let room = rooms::find(&mut *tx, id)
        .await?
        .ok_or(ApiError::NotFound("Room"))?;
    if room.status == RoomStatus::Occupied {
        return Err(ApiError::conflict(format!("Room {} is occupied", room.room_no)));
    }
    if rooms::booking_count(&mut *tx, id).await? > 0 {
        return Err(ApiError::conflict(format!(
            "Room {} is referenced by bookings",
            room.room_no
        )));
    }
    rooms::delete(&mut *tx, id).await?;
    tx.commit().await?;

    log::info!("deleted room {id}");
    Ok(HttpResponse::NoContent().finish())
}

/// Room board actions. Both touch a booking and a room, so they share one
/// transaction.
pub async fn update_room(
    pool: web::Data<SqlitePool>,
    body: web::Json<RoomAction>,
) -> Result<HttpResponse, ApiError> {
    let mut tx = db::begin_immediate(pool.get_ref()).await?;
    let booking = match body.into_inner() {
        RoomAction::Assign {
            room_id,
            booking_id,
        } => stays::assign_and_check_in(&mut tx, booking_id, room_id).await?,
        RoomAction::Checkout { booking_id } => stays::check_out(&mut tx, booking_id).await?,
    };
    tx.commit().await?;

    Ok(HttpResponse::Ok().json(booking))
}
