// Application layer - filter/aggregate pipeline and the service facade
pub mod aggregator;
pub mod dashboard_service;
pub mod dataset_source;
pub mod filter;
