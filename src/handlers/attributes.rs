// src/handlers/attributes.rs
// DOCUMENTATION: HTTP handlers for tags and ingredients
// PURPOSE: One generic handler set instantiated per RecipeAttribute kind;
// items are created through recipes, so there is no POST here

use crate::errors::ApiError;
use crate::handlers::auth::authenticate;
use crate::handlers::{json_body, method_not_allowed, query_params};
use crate::models::{
    AttributeQuery, AttributeRequest, Ingredient, PatchAttributeRequest, RecipeAttribute, Tag,
};
use crate::services::AttributeService;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /api/recipe/{tags|ingredients}
pub async fn list_attributes<T: RecipeAttribute>(
    pool: web::Data<PgPool>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let query: AttributeQuery = query_params(&req)?;
    let items = AttributeService::list::<T>(pool.get_ref(), user.id, &query).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// PUT /api/recipe/{tags|ingredients}/{id}
pub async fn update_attribute<T: RecipeAttribute>(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let body: AttributeRequest = json_body(&body)?;
    let item =
        AttributeService::update::<T>(pool.get_ref(), user.id, path.into_inner(), body).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PATCH /api/recipe/{tags|ingredients}/{id}
pub async fn partial_update_attribute<T: RecipeAttribute>(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let body: PatchAttributeRequest = json_body(&body)?;
    let item =
        AttributeService::partial_update::<T>(pool.get_ref(), user.id, path.into_inner(), body)
            .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// DELETE /api/recipe/{tags|ingredients}/{id}
pub async fn delete_attribute<T: RecipeAttribute>(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    AttributeService::delete::<T>(pool.get_ref(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn attribute_routes<T: RecipeAttribute>(cfg: &mut web::ServiceConfig, base: &str) {
    cfg.service(
        web::resource(base)
            .route(web::get().to(list_attributes::<T>))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource(format!("{}/{{id}}", base))
            .route(web::put().to(update_attribute::<T>))
            .route(web::patch().to(partial_update_attribute::<T>))
            .route(web::delete().to(delete_attribute::<T>))
            .default_service(web::to(method_not_allowed)),
    );
}

/// Tag and ingredient routes, mounted inside the /api/recipe scope
pub fn config(cfg: &mut web::ServiceConfig) {
    attribute_routes::<Tag>(cfg, "/tags");
    attribute_routes::<Ingredient>(cfg, "/ingredients");
}
