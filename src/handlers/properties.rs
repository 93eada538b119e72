use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db::{self, properties};
use crate::error::ApiError;
use crate::models::property::PropertyInput;

fn checked_name(body: &PropertyInput) -> Result<&str, ApiError> {
    body.validate()?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Property name must not be blank"));
    }
    Ok(name)
}

pub async fn list_properties(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let all = properties::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(all))
}

pub async fn create_property(
    pool: web::Data<SqlitePool>,
    body: web::Json<PropertyInput>,
) -> Result<HttpResponse, ApiError> {
    let name = checked_name(&body)?;
    let property = properties::insert(pool.get_ref(), name).await?;
    log::info!("created property {} ({})", property.id, property.name);
    Ok(HttpResponse::Created().json(property))
}

pub async fn get_property(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let property = properties::find(pool.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Property"))?;
    Ok(HttpResponse::Ok().json(property))
}

pub async fn rename_property(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<PropertyInput>,
) -> Result<HttpResponse, ApiError> {
    let name = checked_name(&body)?;
    let property = properties::rename(pool.get_ref(), path.into_inner(), name)
        .await?
        .ok_or(ApiError::NotFound("Property"))?;
    Ok(HttpResponse::Ok().json(property))
}

pub async fn delete_property(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let mut tx = db::begin_immediate(pool.get_ref()).await?;

    if properties::find(&mut *tx, id).await?.is_none() {
        return Err(ApiError::NotFound("Property"));
    }
    if properties::reference_count(&mut *tx, id).await? > 0 {
        return Err(ApiError::conflict("Property still has rooms or bookings"));
    }
    properties::delete(&mut *tx, id).await?;
    tx.commit().await?;

    log::info!("deleted property {id}");
    Ok(HttpResponse::NoContent().finish())
}
