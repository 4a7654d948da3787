// src/db/attribute_repository.rs
// DOCUMENTATION: Tag and ingredient database operations
// PURPOSE: One generic repository over RecipeAttribute; table names come
// from the trait constants, never from user input

use crate::errors::{db_error, ApiError};
use crate::models::RecipeAttribute;
use sqlx::{PgConnection, PgPool, Row};
use std::collections::HashMap;

pub struct AttributeRepository;

impl AttributeRepository {
    /// List a user's items ordered by name descending
    /// DOCUMENTATION: `assigned_only` keeps items linked to at least one
    /// recipe; EXISTS keeps each item once however many recipes use it
    pub async fn list<T: RecipeAttribute>(
        pool: &PgPool,
        user_id: i64,
        assigned_only: bool,
    ) -> Result<Vec<T>, ApiError> {
        let sql = format!(
            r#"
            SELECT a.id, a.user_id, a.name
            FROM {table} a
            WHERE a.user_id = $1
              AND (NOT $2 OR EXISTS (
                  SELECT 1 FROM {link} l WHERE l.{column} = a.id
              ))
            ORDER BY a.name DESC, a.id DESC
            "#,
            table = T::TABLE,
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN,
        );

        sqlx::query_as::<_, T>(&sql)
            .bind(user_id)
            .bind(assigned_only)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error(&format!("List {} failed", T::TABLE), e))
    }

    /// Fetch one item owned by `user_id`; other users' items are NotFound
    pub async fn get_for_user<T: RecipeAttribute>(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<T, ApiError> {
        let sql = format!(
            "SELECT id, user_id, name FROM {} WHERE id = $1 AND user_id = $2",
            T::TABLE
        );

        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error(&format!("Fetch {} failed", T::LABEL), e))?
            .ok_or_else(|| ApiError::NotFound(T::LABEL.to_string()))
    }

    pub async fn rename<T: RecipeAttribute>(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        name: &str,
    ) -> Result<T, ApiError> {
        let sql = format!(
            r#"
            UPDATE {} SET name = $1
            WHERE id = $2 AND user_id = $3
            RETURNING id, user_id, name
            "#,
            T::TABLE
        );

        sqlx::query_as::<_, T>(&sql)
            .bind(name)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error(&format!("Update {} failed", T::LABEL), e))?
            .ok_or_else(|| ApiError::NotFound(T::LABEL.to_string()))
    }

    /// Delete an item; its recipe links go with it through ON DELETE CASCADE
    pub async fn delete<T: RecipeAttribute>(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<(), ApiError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", T::TABLE);

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| db_error(&format!("Delete {} failed", T::LABEL), e))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(T::LABEL.to_string()));
        }

        log::info!("Deleted {} {}", T::LABEL, id);
        Ok(())
    }

    /// Find the user's item by exact name or create it
    /// DOCUMENTATION: Runs on the caller's transaction. When duplicates
    /// already exist the oldest one is reused.
    pub async fn get_or_create<T: RecipeAttribute>(
        conn: &mut PgConnection,
        user_id: i64,
        name: &str,
    ) -> Result<T, ApiError> {
        let select = format!(
            r#"
            SELECT id, user_id, name FROM {}
            WHERE user_id = $1 AND name = $2
            ORDER BY id
            LIMIT 1
            "#,
            T::TABLE
        );

        let existing = sqlx::query_as::<_, T>(&select)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error(&format!("Fetch {} failed", T::LABEL), e))?;

        if let Some(item) = existing {
            return Ok(item);
        }

        let insert = format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
            T::TABLE
        );

        let created = sqlx::query_as::<_, T>(&insert)
            .bind(user_id)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| db_error(&format!("Create {} failed", T::LABEL), e))?;

        log::debug!("Created {} '{}' for user {}", T::LABEL, name, user_id);
        Ok(created)
    }

    /// Replace the set of items linked to a recipe
    pub async fn set_links<T: RecipeAttribute>(
        conn: &mut PgConnection,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<(), ApiError> {
        let clear = format!("DELETE FROM {} WHERE recipe_id = $1", T::LINK_TABLE);
        sqlx::query(&clear)
            .bind(recipe_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error(&format!("Clear {} links failed", T::LABEL), e))?;

        if ids.is_empty() {
            return Ok(());
        }

        let insert = format!(
            r#"
            INSERT INTO {} (recipe_id, {})
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
            T::LINK_TABLE,
            T::LINK_COLUMN
        );
        sqlx::query(&insert)
            .bind(recipe_id)
            .bind(ids)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error(&format!("Link {} failed", T::LABEL), e))?;

        Ok(())
    }

    /// Load the items linked to each of `recipe_ids`, keyed by recipe id
    /// DOCUMENTATION: One query for a whole listing page. Items per recipe
    /// are ordered by id.
    pub async fn for_recipes<T: RecipeAttribute>(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<T>>, ApiError> {
        let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
        if recipe_ids.is_empty() {
            return Ok(grouped);
        }

        let sql = format!(
            r#"
            SELECT l.recipe_id, a.id, a.user_id, a.name
            FROM {link} l
            JOIN {table} a ON a.id = l.{column}
            WHERE l.recipe_id = ANY($1)
            ORDER BY a.id
            "#,
            link = T::LINK_TABLE,
            table = T::TABLE,
            column = T::LINK_COLUMN,
        );

        let rows = sqlx::query(&sql)
            .bind(recipe_ids)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error(&format!("Fetch recipe {} failed", T::TABLE), e))?;

        for row in rows {
            let recipe_id: i64 = row
                .try_get("recipe_id")
                .map_err(|e| db_error("Decode recipe_id failed", e))?;
            let item = T::from_row(&row)
                .map_err(|e| db_error(&format!("Decode {} failed", T::LABEL), e))?;
            grouped.entry(recipe_id).or_default().push(item);
        }

        Ok(grouped)
    }
}
