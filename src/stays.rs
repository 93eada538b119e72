//! Booking and room state changes that have to move together.
//!
//! Every function takes a connection that the caller has put inside a
//! transaction; nothing here commits.

use sqlx::SqliteConnection;

use crate::db::{bookings, rooms};
use crate::error::ApiError;
use crate::models::booking::{Booking, BookingStatus, StayAction};
use crate::models::room::{Room, RoomStatus};
use crate::occupancy::nights_overlap;

async fn load_booking(conn: &mut SqliteConnection, id: i64) -> Result<Booking, ApiError> {
    bookings::find(&mut *conn, id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))
}

async fn load_room(conn: &mut SqliteConnection, id: i64) -> Result<Room, ApiError> {
    rooms::find(&mut *conn, id)
        .await?
        .ok_or(ApiError::NotFound("Room"))
}

fn next_status(booking: &Booking, action: StayAction) -> Result<BookingStatus, ApiError> {
    booking.status.apply(action).ok_or_else(|| {
        ApiError::conflict(format!(
            "Cannot {} a booking with status '{}'",
            action.verb(),
            booking.status.as_str()
        ))
    })
}

/// Fails unless `room` is in the booking's property and free for every night
/// of the stay.
async fn ensure_room_fits(
    conn: &mut SqliteConnection,
    booking: &Booking,
    room: &Room,
) -> Result<(), ApiError> {
    if room.property_id != booking.property_id {
        return Err(ApiError::bad_request(format!(
            "Room {} does not belong to the booking's property",
            room.room_no
        )));
    }
    let clash = bookings::holding_room(&mut *conn, room.id)
        .await?
        .into_iter()
        .find(|other| other.id != booking.id && nights_overlap(other, booking));
    if let Some(other) = clash {
        return Err(ApiError::conflict(format!(
            "Room {} is already booked by {} from {} to {}",
            room.room_no, other.guest_name, other.check_in_date, other.check_out_date
        )));
    }
    Ok(())
}

/// Points the booking at `room_id`, or takes it out of its room when `None`.
/// A checked-in guest moves with their room status: the old room is freed and
/// the new one occupied.
pub async fn assign_room(
    conn: &mut SqliteConnection,
    booking_id: i64,
    room_id: Option<i64>,
) -> Result<Booking, ApiError> {
    let booking = load_booking(conn, booking_id).await?;
    if !booking.status.accepts_room_change() {
        return Err(ApiError::conflict(format!(
            "Cannot change the room of a booking with status '{}'",
            booking.status.as_str()
        )));
    }
    if booking.room_id == room_id {
        return Ok(booking);
    }

    let checked_in = booking.status == BookingStatus::CheckedIn;
    let target = match room_id {
        Some(id) => {
            let room = load_room(conn, id).await?;
            ensure_room_fits(conn, &booking, &room).await?;
            if checked_in && room.status == RoomStatus::Occupied {
                return Err(ApiError::conflict(format!("Room {} is occupied", room.room_no)));
            }
            Some(room)
        }
        None if checked_in => {
            return Err(ApiError::conflict(
                "A checked-in guest must be checked out before leaving the room",
            ))
        }
        None => None,
    };

    if checked_in {
        if let Some(old) = booking.room_id {
            rooms::set_status(&mut *conn, old, RoomStatus::Available).await?;
        }
        if let Some(room) = &target {
            rooms::set_status(&mut *conn, room.id, RoomStatus::Occupied).await?;
        }
    }

    let updated = bookings::set_room(&mut *conn, booking.id, target.map(|r| r.id)).await?;
    log::info!(
        "booking {} assigned to room {:?}",
        updated.id,
        updated.room_id
    );
    Ok(updated)
}

pub async fn check_in(conn: &mut SqliteConnection, booking_id: i64) -> Result<Booking, ApiError> {
    let booking = load_booking(conn, booking_id).await?;
    let next = next_status(&booking, StayAction::CheckIn)?;
    let room_id = booking
        .room_id
        .ok_or_else(|| ApiError::conflict("Booking has no room assigned"))?;
    let room = load_room(conn, room_id).await?;
    if room.status == RoomStatus::Occupied {
        return Err(ApiError::conflict(format!("Room {} is occupied", room.room_no)));
    }

    rooms::set_status(&mut *conn, room.id, RoomStatus::Occupied).await?;
    let updated = bookings::set_status(&mut *conn, booking.id, next).await?;
    log::info!("booking {} checked in to room {}", updated.id, room.room_no);
    Ok(updated)
}

/// The booking keeps its room id afterwards so the history stays readable.
pub async fn check_out(conn: &mut SqliteConnection, booking_id: i64) -> Result<Booking, ApiError> {
    let booking = load_booking(conn, booking_id).await?;
    let next = next_status(&booking, StayAction::CheckOut)?;

    // a booking that never checked in does not hold the room
    if booking.status == BookingStatus::CheckedIn {
        if let Some(room_id) = booking.room_id {
            rooms::set_status(&mut *conn, room_id, RoomStatus::Available).await?;
        }
    }
    let updated = bookings::set_status(&mut *conn, booking.id, next).await?;
    log::info!("booking {} checked out", updated.id);
    Ok(updated)
}

pub async fn cancel(conn: &mut SqliteConnection, booking_id: i64) -> Result<Booking, ApiError> {
    let booking = load_booking(conn, booking_id).await?;
    let next = next_status(&booking, StayAction::Cancel)?;
    let updated = bookings::set_status(&mut *conn, booking.id, next).await?;
    log::info!("booking {} cancelled", updated.id);
    Ok(updated)
}

/// Room assignment from the room board: place the guest and check them in.
pub async fn assign_and_check_in(
    conn: &mut SqliteConnection,
    booking_id: i64,
    room_id: i64,
) -> Result<Booking, ApiError> {
    let booking = load_booking(conn, booking_id).await?;
    next_status(&booking, StayAction::CheckIn)?;
    assign_room(conn, booking_id, Some(room_id)).await?;
    check_in(conn, booking_id).await
}
