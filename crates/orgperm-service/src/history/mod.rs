//! History queries and retention.

pub mod service;

pub use service::HistoryService;
