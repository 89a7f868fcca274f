//! Effective permission and conflict reads.

pub mod service;

pub use service::ResolutionService;
