use actix_web::web;

use crate::error::ApiError;

pub mod bookings;
pub mod dashboard;
pub mod income;
pub mod occupancy;
pub mod properties;
pub mod rooms;

/// Calendar day the service treats as "today".
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().naive_utc().date()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // extractor failures answer with the same JSON error body as the handlers
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .service(
        web::scope("/properties")
            .route("", web::get().to(properties::list_properties))
            .route("", web::post().to(properties::create_property))
            .route("/{id}", web::get().to(properties::get_property))
            .route("/{id}", web::put().to(properties::rename_property))
            .route("/{id}", web::delete().to(properties::delete_property)),
    )
    .service(
        web::scope("/rooms")
            .route("", web::get().to(rooms::list_rooms))
            .route("", web::post().to(rooms::create_room))
            .route("", web::patch().to(rooms::update_room))
            .route("/{id}", web::get().to(rooms::get_room))
            .route("/{id}", web::delete().to(rooms::delete_room)),
    )
    .service(
        web::scope("/bookings")
            .route("", web::get().to(bookings::list_bookings))
            .route("", web::post().to(bookings::create_booking))
            .route("", web::patch().to(bookings::update_booking))
            .route("/bulk", web::post().to(bookings::bulk_create_bookings))
            .route("/{id}", web::get().to(bookings::get_booking))
            .route("/{id}", web::delete().to(bookings::cancel_booking)),
    )
    .route("/occupancy", web::get().to(occupancy::get_occupancy))
    .route("/income", web::get().to(income::get_income))
    .route("/dashboard", web::get().to(dashboard::get_dashboard));
}
