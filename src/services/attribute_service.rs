// src/services/attribute_service.rs
// DOCUMENTATION: Business logic shared by tags and ingredients

use crate::db::AttributeRepository;
use crate::errors::ApiError;
use crate::models::{AttributeQuery, AttributeRequest, PatchAttributeRequest, RecipeAttribute};
use sqlx::PgPool;
use validator::Validate;

pub struct AttributeService;

impl AttributeService {
    pub async fn list<T: RecipeAttribute>(
        pool: &PgPool,
        user_id: i64,
        query: &AttributeQuery,
    ) -> Result<Vec<T>, ApiError> {
        AttributeRepository::list::<T>(pool, user_id, query.assigned_only()).await
    }

    /// Full update (PUT), name required
    pub async fn update<T: RecipeAttribute>(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        req: AttributeRequest,
    ) -> Result<T, ApiError> {
        req.validate()?;
        AttributeRepository::rename::<T>(pool, id, user_id, &req.name).await
    }

    /// Partial update (PATCH); an empty body returns the item unchanged
    pub async fn partial_update<T: RecipeAttribute>(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        req: PatchAttributeRequest,
    ) -> Result<T, ApiError> {
        req.validate()?;
        match req.name {
            Some(name) => AttributeRepository::rename::<T>(pool, id, user_id, &name).await,
            None => AttributeRepository::get_for_user::<T>(pool, id, user_id).await,
        }
    }

    pub async fn delete<T: RecipeAttribute>(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<(), ApiError> {
        AttributeRepository::delete::<T>(pool, id, user_id).await
    }
}
