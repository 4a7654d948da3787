// src/models/recipe.rs
// DOCUMENTATION: Core data structures for recipes
// PURPOSE: Database row, request payloads and response DTOs for the recipe API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::{Validate, ValidationError};

use super::{AttributeRequest, Ingredient, Tag};
use crate::errors::ApiError;

/// Largest price representable by NUMERIC(5, 2)
const PRICE_LIMIT: i64 = 1000;

/// Represents a recipe row from the database
/// DOCUMENTATION: Tags and ingredients live in link tables and are loaded separately
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    /// Path relative to the media root, e.g. uploads/recipe/<uuid>.jpg
    pub image: Option<String>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Recipe DTO used by listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

/// Recipe DTO for single-recipe endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeDetailResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: Option<String>,
}

impl Recipe {
    pub fn to_response(&self, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> RecipeResponse {
        RecipeResponse {
            id: self.id,
            title: self.title.clone(),
            time_minutes: self.time_minutes,
            price: self.price,
            link: self.link.clone(),
            tags,
            ingredients,
        }
    }

    pub fn to_detail_response(
        &self,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> RecipeDetailResponse {
        RecipeDetailResponse {
            recipe: self.to_response(tags, ingredients),
            description: self.description.clone(),
        }
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("price_negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_max_decimal_places"));
    }
    if *price >= Decimal::from(PRICE_LIMIT) {
        return Err(ValidationError::new("price_max_digits"));
    }
    Ok(())
}

/// Request body for creating and updating recipes
/// DOCUMENTATION: Every field is optional at the serde level so one type can
/// back POST, PUT and PATCH. `require_complete` enforces the fields that
/// POST and PUT need. Unknown fields such as `user` are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecipePayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(range(min = 0))]
    pub time_minutes: Option<i32>,

    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,

    pub description: Option<String>,

    #[validate(length(max = 255))]
    pub link: Option<String>,

    /// Some(vec![]) clears the recipe's tags, None leaves them untouched
    pub tags: Option<Vec<AttributeRequest>>,

    pub ingredients: Option<Vec<AttributeRequest>>,
}

impl RecipePayload {
    /// Validate scalar fields and every nested tag/ingredient name
    pub fn check(&self) -> Result<(), ApiError> {
        self.validate()?;
        for item in self.tags.iter().flatten() {
            item.validate()?;
        }
        for item in self.ingredients.iter().flatten() {
            item.validate()?;
        }
        Ok(())
    }

    /// Ensure fields required for create and full update are present
    pub fn require_complete(&self) -> Result<(), ApiError> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.time_minutes.is_none() {
            missing.push("time_minutes");
        }
        if self.price.is_none() {
            missing.push("price");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Query string for recipe listings
#[derive(Debug, Default, Deserialize)]
pub struct RecipeFilter {
    /// Comma separated list of tag IDs to filter
    pub tags: Option<String>,
    /// Comma separated list of ingredient IDs to filter
    pub ingredients: Option<String>,
}

impl RecipeFilter {
    pub fn tag_ids(&self) -> Result<Option<Vec<i64>>, ApiError> {
        parse_ids("tags", self.tags.as_deref())
    }

    pub fn ingredient_ids(&self) -> Result<Option<Vec<i64>>, ApiError> {
        parse_ids("ingredients", self.ingredients.as_deref())
    }
}

/// Parse "1,2,3" into ids; an absent or empty parameter means no filter
pub fn parse_ids(param: &str, raw: Option<&str>) -> Result<Option<Vec<i64>>, ApiError> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(None),
    };

    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                ApiError::InvalidInput(format!("{} must be a comma separated list of IDs", param))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: 1,
            user_id: 1,
            title: "Sample recipe name.".into(),
            description: "Sample recipe description.".into(),
            time_minutes: 5,
            price: Decimal::from_str("5.50").unwrap(),
            link: String::new(),
            image: None,
        }
    }

    #[test]
    fn test_recipe_display_is_title() {
        let recipe = sample_recipe();
        assert_eq!(recipe.to_string(), recipe.title);
    }

    #[test]
    fn test_price_serialized_as_string() {
        let value = serde_json::to_value(sample_recipe().to_response(vec![], vec![])).unwrap();
        assert_eq!(value["price"], "5.50");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_detail_response_adds_description() {
        let value =
            serde_json::to_value(sample_recipe().to_detail_response(vec![], vec![])).unwrap();
        assert_eq!(value["description"], "Sample recipe description.");
        assert_eq!(value["title"], "Sample recipe name.");
        assert_eq!(value["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_payload_accepts_string_and_number_price() {
        let from_string: RecipePayload =
            serde_json::from_str(r#"{"title": "Soup", "time_minutes": 25, "price": "4.29"}"#)
                .unwrap();
        let from_number: RecipePayload =
            serde_json::from_str(r#"{"title": "Soup", "time_minutes": 25, "price": 4.29}"#)
                .unwrap();
        assert_eq!(from_string.price, from_number.price);
        assert_eq!(from_string.price, Some(Decimal::from_str("4.29").unwrap()));
    }

    #[test]
    fn test_payload_ignores_user_field() {
        let payload: RecipePayload = serde_json::from_str(r#"{"user": 99}"#).unwrap();
        assert!(payload.check().is_ok());
        assert!(payload.title.is_none());
    }

    #[test]
    fn test_price_rules() {
        assert!(validate_price(&Decimal::from_str("5.25").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("999.99").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("5.250").unwrap()).is_ok());
        assert!(validate_price(&Decimal::from_str("5.255").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("1000").unwrap()).is_err());
        assert!(validate_price(&Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn test_require_complete_lists_missing_fields() {
        let payload = RecipePayload {
            title: Some("Title".into()),
            ..Default::default()
        };
        let err = payload.require_complete().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("time_minutes"));
        assert!(message.contains("price"));
        assert!(!message.contains("title,"));
    }

    #[test]
    fn test_nested_names_validated() {
        let payload = RecipePayload {
            tags: Some(vec![AttributeRequest { name: String::new() }]),
            ..Default::default()
        };
        assert!(payload.check().is_err());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("tags", None).unwrap(), None);
        assert_eq!(parse_ids("tags", Some("")).unwrap(), None);
        assert_eq!(parse_ids("tags", Some("1,2")).unwrap(), Some(vec![1, 2]));
        assert_eq!(parse_ids("tags", Some(" 3 , 4 ")).unwrap(), Some(vec![3, 4]));
        assert!(parse_ids("tags", Some("1,abc")).is_err());
    }
}
