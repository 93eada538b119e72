//! Date rules that decide who is in which room on a given day.
//!
//! A booking covers every calendar day from check-in through check-out,
//! inclusive, so the departure day still lists the guest. For conflicts the
//! stay is treated as the half-open night range `[check_in, check_out)`: a
//! guest leaving on the 5th and another arriving on the 5th can share a room.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::booking::{Booking, BookingRecord, BookingStatus};
use crate::models::room::Room;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StayKind {
    Checkin,
    Checkout,
    Stay,
}

impl StayKind {
    pub fn classify(booking: &Booking, date: NaiveDate) -> StayKind {
        if booking.check_in_date == date {
            StayKind::Checkin
        } else if booking.check_out_date == date {
            StayKind::Checkout
        } else {
            StayKind::Stay
        }
    }
}

pub fn covers(booking: &Booking, date: NaiveDate) -> bool {
    booking.check_in_date <= date && date <= booking.check_out_date
}

/// True when the two stays share at least one night.
pub fn nights_overlap(a: &Booking, b: &Booking) -> bool {
    a.check_in_date < b.check_out_date && b.check_in_date < a.check_out_date
}

/// Guests currently in the house: checked in and not yet past their last night.
pub fn is_active_on(booking: &Booking, date: NaiveDate) -> bool {
    booking.status == BookingStatus::CheckedIn
        && booking.check_in_date <= date
        && date < booking.check_out_date
}

/// `bookings` must already be narrowed to one room and to `date`.
pub fn room_is_available<'a, I>(bookings: I, date: NaiveDate) -> bool
where
    I: IntoIterator<Item = &'a Booking>,
{
    bookings
        .into_iter()
        .filter(|b| b.status != BookingStatus::Cancelled)
        .all(|b| StayKind::classify(b, date) == StayKind::Checkout)
}

/// A booking annotated with what it means on the selected day.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancyEntry {
    #[serde(flatten)]
    pub record: BookingRecord,
    #[serde(rename = "type")]
    pub kind: StayKind,
}

impl OccupancyEntry {
    pub fn new(record: BookingRecord, date: NaiveDate) -> Self {
        let kind = StayKind::classify(&record.booking, date);
        Self { record, kind }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomOccupancy {
    pub room: Room,
    pub available: bool,
    pub bookings: Vec<OccupancyEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OccupancyReport {
    pub date: NaiveDate,
    pub rooms: Vec<RoomOccupancy>,
    pub unassigned: Vec<OccupancyEntry>,
}

impl OccupancyReport {
    /// Bookings that do not cover `date` or are cancelled are dropped. A
    /// booking whose room is missing from `rooms` lands in `unassigned`.
    pub fn build(rooms: Vec<Room>, bookings: Vec<BookingRecord>, date: NaiveDate) -> Self {
        let mut rooms: Vec<RoomOccupancy> = rooms
            .into_iter()
            .map(|room| RoomOccupancy {
                room,
                available: true,
                bookings: Vec::new(),
            })
            .collect();
        let mut unassigned = Vec::new();

        for record in bookings {
            let b = &record.booking;
            if b.status == BookingStatus::Cancelled || !covers(b, date) {
                continue;
            }
            let slot = b
                .room_id
                .and_then(|id| rooms.iter_mut().find(|r| r.room.id == id));
            match slot {
                Some(slot) => slot.bookings.push(OccupancyEntry::new(record, date)),
                None => unassigned.push(OccupancyEntry::new(record, date)),
            }
        }

        for slot in &mut rooms {
            slot.available = room_is_available(slot.bookings.iter().map(|e| &e.record.booking), date);
        }

        Self {
            date,
            rooms,
            unassigned,
        }
    }
}
