use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use poster_core::{Flag, Queue, SchemaError, COL_POSTED};
use thiserror::Error;

use crate::persist::{backup_once, AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read queue {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid queue {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
    #[error("cannot encode queue: {0}")]
    Encode(#[from] csv::Error),
    #[error("cannot save queue: {0}")]
    Persist(#[from] PersistError),
}

/// The CSV file backing the queue.
///
/// The first save of a store copies the original file to `<path>.bak` when no
/// backup exists yet.
#[derive(Debug)]
pub struct QueueStore {
    path: PathBuf,
    backup: bool,
    backed_up: bool,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: true,
            backed_up: false,
        }
    }

    pub fn without_backup(mut self) -> Self {
        self.backup = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Queue, StoreError> {
        let read_err = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(read_err)?;

        let columns = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(str::to_string)
            .collect();
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            records.push(record.iter().map(str::to_string).collect());
        }

        let queue = Queue::new(columns, records).map_err(|source| StoreError::Schema {
            path: self.path.clone(),
            source,
        })?;
        warn_ambiguous_flags(&queue);
        engine_info!("Loaded {} queue rows from {:?}", queue.len(), self.path);
        Ok(queue)
    }

    pub fn save(&mut self, queue: &Queue) -> Result<(), StoreError> {
        if self.backup && !self.backed_up {
            if let Some(backup) = backup_once(&self.path)? {
                engine_info!("Backed up original queue to {:?}", backup);
            }
            self.backed_up = true;
        }
        let content = encode(queue)?;
        AtomicFileWriter::new(self.path.clone()).write(&content)?;
        Ok(())
    }
}

/// Serialise a queue to CSV bytes, header first.
pub(crate) fn encode(queue: &Queue) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(queue.columns())?;
    for record in queue.records() {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Encode(csv::Error::from(err.into_error())))
}

/// Warn about every `posted` cell that is neither truthy nor falsy and return
/// the offending row indices with their values.
fn warn_ambiguous_flags(queue: &Queue) -> Vec<(usize, String)> {
    let mut ambiguous = Vec::new();
    for index in 0..queue.len() {
        let value = queue.cell(index, COL_POSTED).unwrap_or("");
        if Flag::parse(value) == Flag::Ambiguous {
            engine_warn!(
                "Row {}: unrecognised {} value {:?}; treating it as not posted",
                index + 1,
                COL_POSTED,
                value
            );
            ambiguous.push((index, value.to_string()));
        }
    }
    ambiguous
}
