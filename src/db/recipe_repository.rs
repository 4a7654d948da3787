// src/db/recipe_repository.rs
// DOCUMENTATION: Recipe database operations
// PURPOSE: Owner-scoped CRUD and filtered listing for recipes

use crate::errors::{db_error, ApiError};
use crate::models::Recipe;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

const RECIPE_COLUMNS: &str = "id, user_id, title, description, time_minutes, price, link, image";

/// Scalar recipe fields written on insert and update
#[derive(Debug, Clone)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

impl From<&Recipe> for RecipeFields {
    fn from(recipe: &Recipe) -> Self {
        RecipeFields {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.clone(),
        }
    }
}

pub struct RecipeRepository;

impl RecipeRepository {
    /// List a user's recipes, newest first
    /// DOCUMENTATION: A recipe matches a tag filter when it has any of the
    /// given tags; same for ingredients; both filters must hold when given.
    /// EXISTS subqueries keep each recipe once.
    pub async fn list(
        pool: &PgPool,
        user_id: i64,
        tag_ids: Option<&[i64]>,
        ingredient_ids: Option<&[i64]>,
    ) -> Result<Vec<Recipe>, ApiError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM recipes r
            WHERE r.user_id = $1
              AND ($2::BIGINT[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_tags rt
                  WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
              ))
              AND ($3::BIGINT[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_ingredients ri
                  WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
              ))
            ORDER BY r.id DESC
            "#,
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(tag_ids)
            .bind(ingredient_ids)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("List recipes failed", e))
    }

    /// Fetch a recipe owned by `user_id`; other users' recipes are NotFound
    pub async fn get_for_user(pool: &PgPool, id: i64, user_id: i64) -> Result<Recipe, ApiError> {
        let sql = format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Fetch recipe failed", e))?
            .ok_or_else(|| ApiError::NotFound("Recipe".to_string()))
    }

    pub async fn insert(
        conn: &mut PgConnection,
        user_id: i64,
        fields: &RecipeFields,
    ) -> Result<Recipe, ApiError> {
        let sql = format!(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );

        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(user_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.time_minutes)
            .bind(fields.price)
            .bind(&fields.link)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| db_error("Create recipe failed", e))?;

        log::info!("Created recipe with id: {}", recipe.id);
        Ok(recipe)
    }

    /// Overwrite the scalar fields; the row lock is held until commit
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        user_id: i64,
        fields: &RecipeFields,
    ) -> Result<Recipe, ApiError> {
        let sql = format!(
            r#"
            UPDATE recipes
            SET title = $1, description = $2, time_minutes = $3, price = $4, link = $5
            WHERE id = $6 AND user_id = $7
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&sql)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.time_minutes)
            .bind(fields.price)
            .bind(&fields.link)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Update recipe failed", e))?
            .ok_or_else(|| ApiError::NotFound("Recipe".to_string()))
    }

    /// Point the recipe at a new image, returning the previous path
    pub async fn set_image(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        image: &str,
    ) -> Result<(Recipe, Option<String>), ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT image FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Fetch recipe image failed", e))?;

        let previous = previous
            .ok_or_else(|| ApiError::NotFound("Recipe".to_string()))?
            .0;

        let sql = format!(
            "UPDATE recipes SET image = $1 WHERE id = $2 RETURNING {}",
            RECIPE_COLUMNS
        );
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(image)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Update recipe image failed", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        Ok((recipe, previous))
    }

    /// Delete a recipe, returning its image path so the file can be removed
    pub async fn delete(pool: &PgPool, id: i64, user_id: i64) -> Result<Option<String>, ApiError> {
        let deleted: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM recipes WHERE id = $1 AND user_id = $2 RETURNING image")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await
                .map_err(|e| db_error("Delete recipe failed", e))?;

        match deleted {
            Some((image,)) => {
                log::info!("Deleted recipe {}", id);
                Ok(image)
            }
            None => Err(ApiError::NotFound("Recipe".to_string())),
        }
    }
}
