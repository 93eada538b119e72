use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::db::bookings;
use crate::error::ApiError;
use crate::income::{IncomeFilter, IncomeQuery, IncomeReport};

pub async fn get_income(
    pool: web::Data<SqlitePool>,
    params: web::Query<IncomeQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = IncomeFilter::from_query(&params)?;
    let records = bookings::income(pool.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(IncomeReport::new(records)))
}
