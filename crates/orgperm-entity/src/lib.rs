//! # orgperm-entity
//!
//! Domain entity models for OrgPerm. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod assignment;
pub mod conflict;
pub mod department;
pub mod effective;
pub mod history;
pub mod permission;
pub mod template;
