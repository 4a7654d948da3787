// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod attributes;
pub mod auth;
pub mod health;
pub mod recipes;
pub mod users;

use crate::errors::ApiError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;

pub use health::config as health_config;
pub use users::config as user_config;

/// Decode a JSON request body
/// DOCUMENTATION: Protected handlers take the raw body and call this after
/// `authenticate`, so anonymous callers get 401 whatever they send
pub fn json_body<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidInput(format!("Json deserialize error: {}", e)))
}

/// Decode the query string, after `authenticate` like `json_body`
pub fn query_params<T: DeserializeOwned>(req: &HttpRequest) -> Result<T, ApiError> {
    web::Query::<T>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))
}

/// Fallback for paths no route matches
pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("Resource".to_string()))
}

/// Fallback for a known path hit with a method it does not serve
pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

/// Recipes, tags and ingredients share the /api/recipe scope
pub fn recipe_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/recipe")
            .configure(recipes::config)
            .configure(attributes::config),
    );
}
