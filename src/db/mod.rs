// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod attribute_repository;
pub mod recipe_repository;
pub mod user_repository;

pub use attribute_repository::*;
pub use recipe_repository::*;
pub use user_repository::*;
