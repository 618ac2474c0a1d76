// CSV loading of the cleaned e-commerce export
use crate::model::{Column, Dataset, DatasetError, ProductRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

pub trait Loader {
    fn load(&self, path: &str) -> Result<Dataset, DatasetError>;
}

pub struct CsvLoader;

impl CsvLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parses a dataset from any reader. Unknown columns are ignored,
    /// known ones that are absent from the header are recorded as missing.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Dataset, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(|e| DatasetError::Malformed {
            line: 1,
            message: e.to_string(),
        })?;
        let columns: HashSet<Column> = headers.iter().filter_map(Column::from_header).collect();

        let mut records = Vec::new();
        for (line_num, result) in csv_reader.deserialize::<ProductRecord>().enumerate() {
            let record = result.map_err(|e| DatasetError::Malformed {
                line: e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(line_num as u64 + 2),
                message: e.to_string(),
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Dataset { records, columns })
    }
}

impl Loader for CsvLoader {
    fn load(&self, path: &str) -> Result<Dataset, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_string(),
            source,
        })?;
        let dataset = self.load_from_reader(file)?;

        info!("Loaded {} records from {}", dataset.len(), path);
        let absent: Vec<&str> = Column::ALL
            .iter()
            .filter(|c| !dataset.has(**c))
            .map(|c| c.header())
            .collect();
        if !absent.is_empty() {
            warn!("Columns not found, dependent analyses will be skipped: {}", absent.join(", "));
        }
        Ok(dataset)
    }
}
