// Source trait for loading the reference dataset
use crate::domain::program::Dataset;

/// Anything that can produce the validated dataset at startup
pub trait DatasetSource: Send + Sync {
    /// Short human-readable origin, used in startup logs
    fn describe(&self) -> String;

    fn load(&self) -> anyhow::Result<Dataset>;
}
