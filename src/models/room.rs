use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub property_id: i64,
    pub room_no: String,
    pub status: RoomStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub property_id: i64,
    #[validate(length(min = 1, max = 20))]
    pub room_no: String,
}

/// Body of `PATCH /rooms`. The action decides which fields are required.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RoomAction {
    #[serde(rename_all = "camelCase")]
    Assign { room_id: i64, booking_id: i64 },
    #[serde(rename_all = "camelCase")]
    Checkout { booking_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_action_reads_tagged_body() {
        let assign: RoomAction =
            serde_json::from_str(r#"{"action":"assign","roomId":3,"bookingId":9}"#).unwrap();
        assert!(matches!(
            assign,
            RoomAction::Assign {
                room_id: 3,
                booking_id: 9
            }
        ));

        let checkout: RoomAction =
            serde_json::from_str(r#"{"action":"checkout","bookingId":9}"#).unwrap();
        assert!(matches!(checkout, RoomAction::Checkout { booking_id: 9 }));

        assert!(serde_json::from_str::<RoomAction>(r#"{"action":"assign","bookingId":9}"#).is_err());
    }
}
