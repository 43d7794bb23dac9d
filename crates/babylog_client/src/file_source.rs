//! Local-directory data source.

use crate::delimited::{Delimiter, parse_table};
use crate::{Config, DataSource, DataSourceError, RawTable, TableName};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct FileDataSource {
    dir: PathBuf,
    sleep_file: String,
    feeding_file: String,
    delimiter: Delimiter,
}

impl FileDataSource {
    pub fn new(dir: impl Into<PathBuf>, delimiter: Delimiter) -> Self {
        let defaults = Config::default();
        Self {
            dir: dir.into(),
            sleep_file: defaults.object_name(TableName::Sleep),
            feeding_file: defaults.object_name(TableName::Feeding),
            delimiter,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            dir: PathBuf::from(&cfg.source),
            sleep_file: cfg.object_name(TableName::Sleep),
            feeding_file: cfg.object_name(TableName::Feeding),
            delimiter: cfg.delimiter,
        }
    }

    pub fn table_path(&self, table: TableName) -> PathBuf {
        let file = match table {
            TableName::Sleep => &self.sleep_file,
            TableName::Feeding => &self.feeding_file,
        };
        self.dir.join(Path::new(file))
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn fetch_table(&self, table: TableName) -> Result<RawTable, DataSourceError> {
        let path = self.table_path(table);
        tracing::debug!(path = %path.display(), %table, "reading table");
        let bytes = tokio::fs::read(&path).await?;
        parse_table(&bytes, self.delimiter)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}
