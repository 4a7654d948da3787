// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod attribute_service;
pub mod image_storage;
pub mod password;
pub mod recipe_service;
pub mod token;
pub mod user_service;
pub mod wait_for_db;

pub use attribute_service::*;
pub use image_storage::*;
pub use password::PasswordHasher;
pub use recipe_service::*;
pub use user_service::*;
pub use wait_for_db::{check_database, wait_for_db};
