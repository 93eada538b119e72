use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Platform {
    #[serde(rename = "Booking.com")]
    #[sqlx(rename = "Booking.com")]
    BookingCom,
    Agoda,
    Airbnb,
    Expedia,
    Direct,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::BookingCom => "Booking.com",
            Platform::Agoda => "Agoda",
            Platform::Airbnb => "Airbnb",
            Platform::Expedia => "Expedia",
            Platform::Direct => "Direct",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Platform::BookingCom,
            Platform::Agoda,
            Platform::Airbnb,
            Platform::Expedia,
            Platform::Direct,
        ]
        .into_iter()
        .find(|p| p.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Bank,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum BookingStatus {
    #[serde(rename = "booked")]
    #[sqlx(rename = "booked")]
    Booked,
    #[serde(rename = "checkin")]
    #[sqlx(rename = "checkin")]
    CheckedIn,
    #[serde(rename = "checkout")]
    #[sqlx(rename = "checkout")]
    CheckedOut,
    #[serde(rename = "cancel")]
    #[sqlx(rename = "cancel")]
    Cancelled,
}

/// Lifecycle moves a booking can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayAction {
    CheckIn,
    CheckOut,
    Cancel,
}

impl StayAction {
    pub fn verb(self) -> &'static str {
        match self {
            StayAction::CheckIn => "check in",
            StayAction::CheckOut => "check out",
            StayAction::Cancel => "cancel",
        }
    }
}

impl BookingStatus {
    /// Next status for `action`, or `None` when the move is not allowed.
    pub fn apply(self, action: StayAction) -> Option<BookingStatus> {
        use BookingStatus::*;
        match (self, action) {
            (Booked, StayAction::CheckIn) => Some(CheckedIn),
            (Booked | CheckedIn, StayAction::CheckOut) => Some(CheckedOut),
            (Booked, StayAction::Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    /// Whether the booking may still be moved between rooms.
    pub fn accepts_room_change(self) -> bool {
        matches!(self, BookingStatus::Booked | BookingStatus::CheckedIn)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::CheckedIn => "checkin",
            BookingStatus::CheckedOut => "checkout",
            BookingStatus::Cancelled => "cancel",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub guest_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub reservation_id: Option<String>,
    pub property_id: i64,
    pub room_id: Option<i64>,
    pub platform: Platform,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub payment_date: Option<NaiveDate>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: BookingStatus,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// A booking with its property and room resolved for display.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub property_name: String,
    pub room_no: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_stay_dates"))]
pub struct CreateBooking {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub guest_name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_number: Option<String>,
    pub reservation_id: Option<String>,
    pub property_id: i64,
    pub room_id: Option<i64>,
    pub platform: Platform,
    pub payment_method: PaymentMethod,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub amount: f64,
    pub payment_date: Option<NaiveDate>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: Option<BookingStatus>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn validate_stay_dates(body: &CreateBooking) -> Result<(), ValidationError> {
    if body.check_in_date >= body.check_out_date {
        let mut err = ValidationError::new("stay_dates");
        err.message = Some("Check-out must be after check-in".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub property_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub today: Option<bool>,
    pub unassigned: Option<bool>,
    pub active: Option<bool>,
}

/// Body of `PATCH /bookings`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BookingAction {
    /// A missing or null `roomId` takes the booking out of its room.
    #[serde(rename_all = "camelCase")]
    Assign {
        booking_id: i64,
        room_id: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Checkin { booking_id: i64 },
    #[serde(rename_all = "camelCase")]
    Checkout { booking_id: i64 },
}

/// Outcome of one row in a bulk import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRowResult {
    pub index: usize,
    pub reservation_id: Option<String>,
    pub status: BulkRowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkRowStatus {
    Saved,
    Failed,
}
