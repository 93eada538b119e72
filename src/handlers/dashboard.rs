use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::bookings;
use crate::error::ApiError;
use crate::handlers::today;
use crate::income::{IncomeFilter, IncomeReport, ReportPeriod};
use crate::models::booking::{BookingRecord, BookingStatus};
use crate::occupancy::is_active_on;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub today_income: f64,
    pub today_bookings: usize,
    pub active_guests: Vec<BookingRecord>,
}

pub async fn get_dashboard(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let date = today();

    let income_filter = IncomeFilter {
        period: Some(ReportPeriod::day(date)),
        ..Default::default()
    };
    let income = IncomeReport::new(bookings::income(pool.get_ref(), &income_filter).await?);
    let today_bookings = bookings::covering(pool.get_ref(), date, None).await?.len();
    let active_guests = bookings::with_status(pool.get_ref(), BookingStatus::CheckedIn, None)
        .await?
        .into_iter()
        .filter(|r| is_active_on(&r.booking, date))
        .collect();

    Ok(HttpResponse::Ok().json(DashboardSummary {
        date,
        today_income: income.totals.net_total,
        today_bookings,
        active_guests,
    }))
}
