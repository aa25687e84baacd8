use crate::application::dataset_source::DatasetSource;
use crate::infrastructure::ccs_export::CcsExportDataset;
use crate::infrastructure::dataset_file::JsonFileDataset;
use crate::infrastructure::embedded_dataset::EmbeddedDataset;
use crate::infrastructure::summary_csv::SummaryCsvDataset;
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub dataset: DatasetSourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

/// Where the dashboard data comes from
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DatasetSourceConfig {
    Embedded,
    Json {
        path: PathBuf,
    },
    SummaryCsv {
        path: PathBuf,
    },
    CcsExports {
        dir: PathBuf,
        #[serde(default)]
        summary_out: Option<PathBuf>,
    },
}

/// Loads `config/dashboard.*` (optional) with `DASHBOARD__*` overrides,
/// e.g. `DASHBOARD__SERVER__BIND=127.0.0.1:3000`
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from(CONFIG_FILE)
}

pub fn load_app_config_from(file: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("dataset.source", "embedded")?
        .add_source(config::File::with_name(file).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn build_source(config: &DatasetSourceConfig) -> Box<dyn DatasetSource> {
    match config {
        DatasetSourceConfig::Embedded => Box::new(EmbeddedDataset),
        DatasetSourceConfig::Json { path } => Box::new(JsonFileDataset::new(path)),
        DatasetSourceConfig::SummaryCsv { path } => Box::new(SummaryCsvDataset::new(path)),
        DatasetSourceConfig::CcsExports { dir, summary_out } => {
            Box::new(CcsExportDataset::new(dir, summary_out.clone()))
        }
    }
}
