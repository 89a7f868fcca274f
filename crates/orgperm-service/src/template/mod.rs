//! Template application.

pub mod service;

pub use service::{
    ApplyTemplateRequest, TemplateApplyItem, TemplateApplyOutcome, TemplateService,
};
