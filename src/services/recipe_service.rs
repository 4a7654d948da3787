// src/services/recipe_service.rs
// DOCUMENTATION: Business logic for recipes
// PURPOSE: Intermediary between recipe handlers and repositories; owns the
// transaction boundaries for recipe + tag/ingredient writes

use crate::db::{AttributeRepository, RecipeFields, RecipeRepository};
use crate::errors::{db_error, ApiError};
use crate::models::{
    AttributeRequest, Ingredient, Recipe, RecipeAttribute, RecipeDetailResponse, RecipeFilter,
    RecipeImageResponse, RecipePayload, RecipeResponse, Tag,
};
use crate::services::ImageStorage;
use sqlx::{PgConnection, PgPool};

/// Fetch-or-create each named item for the user and make them the recipe's full set
async fn replace_attributes<T: RecipeAttribute>(
    conn: &mut PgConnection,
    user_id: i64,
    recipe_id: i64,
    items: &[AttributeRequest],
) -> Result<(), ApiError> {
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let attribute = AttributeRepository::get_or_create::<T>(conn, user_id, &item.name).await?;
        if !ids.contains(&attribute.id()) {
            ids.push(attribute.id());
        }
    }

    AttributeRepository::set_links::<T>(conn, recipe_id, &ids).await
}

/// Apply payload values over the current ones; absent fields keep their value
fn merge_fields(current: RecipeFields, payload: &RecipePayload) -> RecipeFields {
    RecipeFields {
        title: payload.title.clone().unwrap_or(current.title),
        description: payload.description.clone().unwrap_or(current.description),
        time_minutes: payload.time_minutes.unwrap_or(current.time_minutes),
        price: payload.price.unwrap_or(current.price),
        link: payload.link.clone().unwrap_or(current.link),
    }
}

pub struct RecipeService;

impl RecipeService {
    /// List the user's recipes with optional tag/ingredient filters
    pub async fn list_recipes(
        pool: &PgPool,
        user_id: i64,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeResponse>, ApiError> {
        let tag_ids = filter.tag_ids()?;
        let ingredient_ids = filter.ingredient_ids()?;

        let recipes =
            RecipeRepository::list(pool, user_id, tag_ids.as_deref(), ingredient_ids.as_deref())
                .await?;

        let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
        let mut tags = AttributeRepository::for_recipes::<Tag>(pool, &ids).await?;
        let mut ingredients = AttributeRepository::for_recipes::<Ingredient>(pool, &ids).await?;

        Ok(recipes
            .iter()
            .map(|recipe| {
                recipe.to_response(
                    tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients.remove(&recipe.id).unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Get one recipe in detail shape
    pub async fn get_recipe(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<RecipeDetailResponse, ApiError> {
        let recipe = RecipeRepository::get_for_user(pool, id, user_id).await?;
        Self::detail(pool, &recipe).await
    }

    async fn detail(pool: &PgPool, recipe: &Recipe) -> Result<RecipeDetailResponse, ApiError> {
        let ids = [recipe.id];
        let tags = AttributeRepository::for_recipes::<Tag>(pool, &ids)
            .await?
            .remove(&recipe.id)
            .unwrap_or_default();
        let ingredients = AttributeRepository::for_recipes::<Ingredient>(pool, &ids)
            .await?
            .remove(&recipe.id)
            .unwrap_or_default();

        Ok(recipe.to_detail_response(tags, ingredients))
    }

    /// Create a recipe owned by `user_id`, with its tags and ingredients
    pub async fn create_recipe(
        pool: &PgPool,
        user_id: i64,
        payload: RecipePayload,
    ) -> Result<RecipeDetailResponse, ApiError> {
        payload.check()?;
        payload.require_complete()?;

        let fields = RecipeFields {
            title: payload.title.clone().unwrap_or_default(),
            description: payload.description.clone().unwrap_or_default(),
            time_minutes: payload.time_minutes.unwrap_or_default(),
            price: payload.price.unwrap_or_default(),
            link: payload.link.clone().unwrap_or_default(),
        };

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        let recipe = RecipeRepository::insert(&mut *tx, user_id, &fields).await?;
        if let Some(tags) = &payload.tags {
            replace_attributes::<Tag>(&mut *tx, user_id, recipe.id, tags).await?;
        }
        if let Some(ingredients) = &payload.ingredients {
            replace_attributes::<Ingredient>(&mut *tx, user_id, recipe.id, ingredients).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        Self::detail(pool, &recipe).await
    }

    /// Update a recipe; `partial` distinguishes PATCH from PUT
    /// DOCUMENTATION: A present `tags`/`ingredients` list replaces the current
    /// set, an empty list clears it, an absent one leaves it alone
    pub async fn update_recipe(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        payload: RecipePayload,
        partial: bool,
    ) -> Result<RecipeDetailResponse, ApiError> {
        payload.check()?;
        if !partial {
            payload.require_complete()?;
        }

        let current = RecipeRepository::get_for_user(pool, id, user_id).await?;
        let fields = merge_fields(RecipeFields::from(&current), &payload);

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Begin transaction failed", e))?;

        let recipe = RecipeRepository::update(&mut *tx, id, user_id, &fields).await?;
        if let Some(tags) = &payload.tags {
            replace_attributes::<Tag>(&mut *tx, user_id, recipe.id, tags).await?;
        }
        if let Some(ingredients) = &payload.ingredients {
            replace_attributes::<Ingredient>(&mut *tx, user_id, recipe.id, ingredients).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Commit failed", e))?;

        Self::detail(pool, &recipe).await
    }

    pub async fn delete_recipe(
        pool: &PgPool,
        storage: &ImageStorage,
        user_id: i64,
        id: i64,
    ) -> Result<(), ApiError> {
        if let Some(image) = RecipeRepository::delete(pool, id, user_id).await? {
            storage.remove(&image).await;
        }
        Ok(())
    }

    /// Store an uploaded image and attach it to the recipe
    /// DOCUMENTATION: Ownership is checked before anything is written. The
    /// replaced image file is removed after the row points at the new one.
    pub async fn upload_image(
        pool: &PgPool,
        storage: &ImageStorage,
        user_id: i64,
        id: i64,
        filename: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<RecipeImageResponse, ApiError> {
        RecipeRepository::get_for_user(pool, id, user_id).await?;

        let relative = storage.save_recipe_image(filename, bytes).await?;

        let (recipe, previous) =
            match RecipeRepository::set_image(pool, id, user_id, &relative).await {
                Ok(result) => result,
                Err(e) => {
                    storage.remove(&relative).await;
                    return Err(e);
                }
            };

        if let Some(previous) = previous.filter(|p| p != &relative) {
            storage.remove(&previous).await;
        }

        Ok(RecipeImageResponse {
            id: recipe.id,
            image: recipe.image.as_deref().map(|image| storage.url(image)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn current() -> RecipeFields {
        RecipeFields {
            title: "Sample recipe test".into(),
            description: "Sample description".into(),
            time_minutes: 22,
            price: Decimal::from_str("5.25").unwrap(),
            link: "https://example.com/recipe.pdf".into(),
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let payload = RecipePayload {
            title: Some("New Title".into()),
            ..Default::default()
        };

        let merged = merge_fields(current(), &payload);
        assert_eq!(merged.title, "New Title");
        assert_eq!(merged.link, "https://example.com/recipe.pdf");
        assert_eq!(merged.time_minutes, 22);
    }

    #[test]
    fn test_merge_overwrites_all_present_fields() {
        let payload = RecipePayload {
            title: Some("New recipe test".into()),
            link: Some("https://example.com/new-recipe.pdf".into()),
            description: Some("New recipe description".into()),
            time_minutes: Some(5),
            price: Some(Decimal::from_str("5.26").unwrap()),
            ..Default::default()
        };

        let merged = merge_fields(current(), &payload);
        assert_eq!(merged.title, "New recipe test");
        assert_eq!(merged.link, "https://example.com/new-recipe.pdf");
        assert_eq!(merged.description, "New recipe description");
        assert_eq!(merged.time_minutes, 5);
        assert_eq!(merged.price, Decimal::from_str("5.26").unwrap());
    }

    #[test]
    fn test_merge_allows_clearing_optional_text() {
        let payload = RecipePayload {
            link: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(merge_fields(current(), &payload).link, "");
    }
}
