//! Request handlers, organized by domain.

pub mod assignment;
pub mod conflict;
pub mod department;
pub mod effective;
pub mod health;
pub mod history;
pub mod permission;
pub mod template;
