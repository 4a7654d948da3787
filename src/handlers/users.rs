// src/handlers/users.rs
// DOCUMENTATION: HTTP handlers for user accounts and tokens
// PURPOSE: Registration, token issue, and self-service profile updates

use crate::errors::ApiError;
use crate::handlers::auth::authenticate;
use crate::handlers::{json_body, method_not_allowed};
use crate::models::{CreateUserRequest, TokenRequest, UpdateUserRequest};
use crate::services::{PasswordHasher, UserService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;

/// POST /api/user/create
pub async fn create_user(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    req: web::Json<CreateUserRequest>,
) -> Result<impl Responder, ApiError> {
    let user =
        UserService::register(pool.get_ref(), *hasher.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(user.to_response()))
}

/// POST /api/user/token
pub async fn create_token(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    req: web::Json<TokenRequest>,
) -> Result<impl Responder, ApiError> {
    let token =
        UserService::issue_token(pool.get_ref(), *hasher.get_ref(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// GET /api/user/me
pub async fn get_me(pool: web::Data<PgPool>, req: HttpRequest) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    Ok(HttpResponse::Ok().json(user.to_response()))
}

/// PUT and PATCH /api/user/me
/// Absent fields are left unchanged for both methods
pub async fn update_me(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<impl Responder, ApiError> {
    let user = authenticate(&req, &pool).await?;
    let changes: UpdateUserRequest = json_body(&body)?;
    let updated =
        UserService::update_user(pool.get_ref(), *hasher.get_ref(), &user, changes).await?;
    Ok(HttpResponse::Ok().json(updated.to_response()))
}

/// Configuration for user routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .service(
                web::resource("/create")
                    .route(web::post().to(create_user))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/token")
                    .route(web::post().to(create_token))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/me")
                    .route(web::get().to(get_me))
                    .route(web::put().to(update_me))
                    .route(web::patch().to(update_me))
                    .default_service(web::to(method_not_allowed)),
            ),
    );
}
