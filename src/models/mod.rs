// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod attribute;
pub mod recipe;
pub mod user;

pub use attribute::*;
pub use recipe::*;
pub use user::*;
