// Infrastructure layer - Dataset sources, configuration and HTTP adapters
pub mod ccs_export;
pub mod config;
pub mod dataset_file;
pub mod embedded_dataset;
pub mod http_response;
pub mod summary_csv;
