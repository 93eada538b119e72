use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::{bookings, properties, rooms};
use crate::error::ApiError;
use crate::handlers::today;
use crate::occupancy::OccupancyReport;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySearch {
    pub property_id: i64,
    pub date: Option<NaiveDate>,
}

/// Room board for one property on one day.
pub async fn get_occupancy(
    pool: web::Data<SqlitePool>,
    params: web::Query<OccupancySearch>,
) -> Result<HttpResponse, ApiError> {
    let date = params.date.unwrap_or_else(today);
    if properties::find(pool.get_ref(), params.property_id).await?.is_none() {
        return Err(ApiError::NotFound("Property"));
    }

    let room_list = rooms::list(pool.get_ref(), Some(params.property_id)).await?;
    let covering = bookings::covering(pool.get_ref(), date, Some(params.property_id)).await?;
    Ok(HttpResponse::Ok().json(OccupancyReport::build(room_list, covering, date)))
}
