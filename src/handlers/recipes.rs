// src/handlers/recipes.rs
// DOCUMENTATION: HTTP handlers for recipe operations
// PURPOSE: Parse requests, call services, return responses

use crate::errors::ApiError;
use crate::handlers::auth::authenticate;
use crate::handlers::{json_body, method_not_allowed, query_params};
use crate::models::{RecipeFilter, RecipePayload};
use crate::services::{ImageStorage, RecipeService};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::StreamExt;
use sqlx::PgPool;

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// GET /api/recipe/recipes
/// List the caller's recipes, optionally filtered by ?tags=1,2&ingredients=3
pub async fn list_recipes(
    pool: web::Data<PgPool>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let filter: RecipeFilter = query_params(&req)?;
    let recipes = RecipeService::list_recipes(pool.get_ref(), user.id, &filter).await?;
    Ok(HttpResponse::Ok().json(recipes))
}

/// POST /api/recipe/recipes
pub async fn create_recipe(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let payload: RecipePayload = json_body(&body)?;
    let recipe = RecipeService::create_recipe(pool.get_ref(), user.id, payload).await?;
    Ok(HttpResponse::Created().json(recipe))
}

/// GET /api/recipe/recipes/{id}
pub async fn get_recipe(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let recipe = RecipeService::get_recipe(pool.get_ref(), user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(recipe))
}

async fn update(
    pool: &PgPool,
    req: &HttpRequest,
    id: i64,
    body: &web::Bytes,
    partial: bool,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(req, pool).await?;
    let payload: RecipePayload = json_body(body)?;
    let recipe = RecipeService::update_recipe(pool, user.id, id, payload, partial).await?;
    Ok(HttpResponse::Ok().json(recipe))
}

/// PUT /api/recipe/recipes/{id}
pub async fn update_recipe(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    update(pool.get_ref(), &req, path.into_inner(), &body, false).await
}

/// PATCH /api/recipe/recipes/{id}
pub async fn partial_update_recipe(
    pool: web::Data<PgPool>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    update(pool.get_ref(), &req, path.into_inner(), &body, true).await
}

/// DELETE /api/recipe/recipes/{id}
pub async fn delete_recipe(
    pool: web::Data<PgPool>,
    storage: web::Data<ImageStorage>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    RecipeService::delete_recipe(pool.get_ref(), storage.get_ref(), user.id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/recipe/recipes/{id}/upload-image
/// Multipart body with an `image` file part
pub async fn upload_image(
    pool: web::Data<PgPool>,
    storage: web::Data<ImageStorage>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Payload,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let max_bytes = storage.max_bytes();
    let mut payload = Multipart::new(req.headers(), body);

    let mut upload: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let disposition = field.content_disposition();
        let wanted = upload.is_none() && disposition.get_name() == Some(IMAGE_FIELD);
        let filename = disposition.get_filename().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::InvalidInput(e.to_string()))?;
            if !wanted {
                continue;
            }
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::PayloadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        if wanted {
            upload = Some((filename, bytes));
        }
    }

    let (filename, bytes) = upload
        .ok_or_else(|| ApiError::ValidationError("image: No file was submitted.".to_string()))?;

    let response = RecipeService::upload_image(
        pool.get_ref(),
        storage.get_ref(),
        user.id,
        path.into_inner(),
        filename.as_deref(),
        bytes,
    )
    .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Recipe routes, mounted inside the /api/recipe scope
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recipes")
            .route(web::get().to(list_recipes))
            .route(web::post().to(create_recipe))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/recipes/{id}")
            .route(web::get().to(get_recipe))
            .route(web::put().to(update_recipe))
            .route(web::patch().to(partial_update_recipe))
            .route(web::delete().to(delete_recipe))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/recipes/{id}/upload-image")
            .route(web::post().to(upload_image))
            .default_service(web::to(method_not_allowed)),
    );
}
