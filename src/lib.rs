// src/lib.rs
// DOCUMENTATION: Library root shared by the HTTP server and the manage CLI
// PURPOSE: Module tree plus the route table used by main.rs and tests

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;

use actix_web::web;
use errors::ApiError;

/// Extractor failures answer with the standard error body
/// DOCUMENTATION: A path segment that is not a valid id names no resource,
/// so it is a 404 like any other unknown URL
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::InvalidInput(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        log::debug!("Unroutable path parameter: {}", err);
        ApiError::NotFound("Resource".to_string()).into()
    }));
}

/// Register every route; application state is added by the caller
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_configs)
        .configure(handlers::health_config)
        .configure(handlers::user_config)
        .configure(handlers::recipe_config)
        .default_service(web::to(handlers::not_found));
}
