//! GGUF metadata reader
//!
//! Pulls the handful of header fields shown next to a selected model
//! (architecture, layer count, context length, quantization) without
//! touching tensor data. Malformed files are not errors: whatever could be
//! decoded before the problem is returned and the rest stays unknown.

pub mod quant;
pub mod reader;

use crate::types::model::ModelMetadata;
use reader::{GgufValue, HeaderError, HeaderReader};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures that prevent reporting anything about a path
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read header metadata from a model file.
///
/// Only a path that cannot be stat'ed is an error. A file that exists but
/// cannot be opened (permissions) reports its size and nothing else, the
/// same as a file without the GGUF magic, with an unsupported version, or
/// cut short: undecodable fields are `None`.
pub fn read_metadata(path: impl AsRef<Path>) -> Result<ModelMetadata, MetadataError> {
    let path = path.as_ref();
    let io_err = |source: io::Error| {
        if source.kind() == io::ErrorKind::NotFound {
            MetadataError::NotFound(path.to_path_buf())
        } else {
            MetadataError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let file_size = fs::metadata(path).map_err(io_err)?.len();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Cannot open {}, metadata unknown: {}", path.display(), e);
            return Ok(ModelMetadata::unknown(file_size));
        }
    };

    let metadata = read_metadata_from(BufReader::new(file), file_size);
    tracing::debug!(
        "Read metadata for {}: arch={:?} layers={:?} ctx={:?} quant={:?}",
        path.display(),
        metadata.architecture,
        metadata.layer_count,
        metadata.context_length,
        metadata.quantization
    );
    Ok(metadata)
}

/// Read header metadata from any seekable source of `len` bytes
pub fn read_metadata_from<R: Read + Seek>(source: R, len: u64) -> ModelMetadata {
    let mut reader = HeaderReader::new(source, len);
    let mut fields = HeaderFields::default();
    if let Err(e) = fields.walk(&mut reader) {
        tracing::debug!("Stopped reading GGUF header at byte {}: {}", reader.position(), e);
    }
    fields.resolve(len)
}

/// Entries the reader decodes; everything else is skipped
#[derive(Debug, PartialEq, Eq)]
enum Field {
    Architecture,
    Name,
    FileType,
    BlockCount(String),
    ContextLength(String),
}

impl Field {
    fn classify(key: &str) -> Option<Field> {
        match key {
            "general.architecture" => Some(Field::Architecture),
            "general.name" => Some(Field::Name),
            "general.file_type" => Some(Field::FileType),
            _ => {
                if let Some(prefix) = key.strip_suffix(".block_count") {
                    Some(Field::BlockCount(prefix.to_string()))
                } else {
                    key.strip_suffix(".context_length")
                        .map(|prefix| Field::ContextLength(prefix.to_string()))
                }
            }
        }
    }
}

/// Raw values gathered during the walk.
///
/// Per-architecture keys are collected by prefix and resolved once the
/// architecture is known, so entry order in the file does not matter.
#[derive(Debug, Default)]
struct HeaderFields {
    version: Option<u32>,
    architecture: Option<String>,
    name: Option<String>,
    file_type: Option<u64>,
    block_counts: HashMap<String, u64>,
    context_lengths: HashMap<String, u64>,
}

impl HeaderFields {
    fn walk<R: Read + Seek>(&mut self, reader: &mut HeaderReader<R>) -> Result<(), HeaderError> {
        let prefix = reader.read_prefix()?;
        self.version = Some(prefix.version);

        for _ in 0..prefix.metadata_count {
            let key = reader.read_string()?;
            let ty = reader.read_type()?;
            match Field::classify(&key) {
                Some(field) => {
                    let value = reader.read_value(ty)?;
                    self.record(field, value);
                }
                None => reader.skip_value(ty)?,
            }
        }
        Ok(())
    }

    fn record(&mut self, field: Field, value: GgufValue) {
        match field {
            Field::Architecture => self.architecture = value.as_str().map(str::to_string),
            Field::Name => self.name = value.as_str().map(str::to_string),
            Field::FileType => self.file_type = value.as_u64(),
            Field::BlockCount(prefix) => {
                if let Some(n) = value.as_u64() {
                    self.block_counts.insert(prefix, n);
                }
            }
            Field::ContextLength(prefix) => {
                if let Some(n) = value.as_u64() {
                    self.context_lengths.insert(prefix, n);
                }
            }
        }
    }

    fn resolve(self, file_size_bytes: u64) -> ModelMetadata {
        let (layer_count, context_length) = match &self.architecture {
            Some(arch) => (
                self.block_counts.get(arch).copied(),
                self.context_lengths.get(arch).copied(),
            ),
            None => (None, None),
        };

        let quantization = self.file_type.and_then(|code| {
            let label = quant::label_for(code);
            if label.is_none() {
                tracing::debug!(
                    "general.file_type {} not in quantization table revision {}",
                    code,
                    quant::TABLE_REVISION
                );
            }
            label
        });

        ModelMetadata {
            architecture: self.architecture,
            name: self.name,
            layer_count,
            context_length,
            quantization: quantization.map(str::to_string),
            format_version: self.version,
            file_size_bytes,
        }
    }
}
