// Domain layer - reference data, views and result models
pub mod dashboard;
pub mod error;
pub mod funnel;
pub mod identifiers;
pub mod program;
pub mod view;
