// src/models/attribute.rs
// DOCUMENTATION: Tags and ingredients attached to recipes
// PURPOSE: Both kinds share storage layout and API behaviour, see RecipeAttribute

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use validator::Validate;

/// A per-user label that can be linked to many recipes
/// DOCUMENTATION: Implemented by Tag and Ingredient. The constants name the
/// owning table and the recipe link table so one repository serves both.
pub trait RecipeAttribute:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static
{
    /// Table holding the attribute rows
    const TABLE: &'static str;
    /// Many-to-many table linking recipes to attribute rows
    const LINK_TABLE: &'static str;
    /// Column in LINK_TABLE referencing TABLE
    const LINK_COLUMN: &'static str;
    /// Human readable name used in errors and logs
    const LABEL: &'static str;

    fn id(&self) -> i64;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Tag {
    pub name: String,
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub user_id: i64,
}

impl RecipeAttribute for Tag {
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "recipe_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const LABEL: &'static str = "Tag";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl RecipeAttribute for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LINK_TABLE: &'static str = "recipe_ingredients";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const LABEL: &'static str = "Ingredient";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Body for tag/ingredient updates, and for nested items in recipe payloads
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AttributeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Partial body for PATCH
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchAttributeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

/// Query string for attribute listings
#[derive(Debug, Default, Deserialize)]
pub struct AttributeQuery {
    /// 1 restricts the listing to items linked to at least one recipe
    pub assigned_only: Option<u8>,
}

impl AttributeQuery {
    pub fn assigned_only(&self) -> bool {
        matches!(self.assigned_only, Some(v) if v != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape_hides_owner() {
        let tag = Tag {
            name: "Vegan".into(),
            id: 3,
            user_id: 42,
        };
        let value = serde_json::to_value(&tag).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Vegan", "id": 3}));

        let ingredient = Ingredient {
            id: 7,
            name: "Kale".into(),
            user_id: 42,
        };
        let value = serde_json::to_value(&ingredient).unwrap();
        assert_eq!(value, serde_json::json!({"id": 7, "name": "Kale"}));
    }

    #[test]
    fn test_assigned_only_flag() {
        assert!(!AttributeQuery::default().assigned_only());
        assert!(!AttributeQuery { assigned_only: Some(0) }.assigned_only());
        assert!(AttributeQuery { assigned_only: Some(1) }.assigned_only());
    }

    #[test]
    fn test_empty_name_rejected() {
        let req = AttributeRequest { name: String::new() };
        assert!(req.validate().is_err());

        let req = PatchAttributeRequest { name: None };
        assert!(req.validate().is_ok());
    }
}
