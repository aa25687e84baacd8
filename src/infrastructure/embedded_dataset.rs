// Sample dataset compiled into the binary
use crate::application::dataset_source::DatasetSource;
use crate::domain::program::Dataset;
use crate::infrastructure::dataset_file::parse_dataset;

const SAMPLE_DATASET: &str = include_str!("../../data/sample_dataset.json");

#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataset;

impl DatasetSource for EmbeddedDataset {
    fn describe(&self) -> String {
        "embedded sample data".to_string()
    }

    fn load(&self) -> anyhow::Result<Dataset> {
        parse_dataset(SAMPLE_DATASET)
    }
}
