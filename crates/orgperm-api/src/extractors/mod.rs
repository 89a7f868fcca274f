//! Custom Axum extractors.

pub mod operator;
pub mod pagination;

pub use operator::Operator;
pub use pagination::PaginationParams;
