//! In-memory item catalog
//!
//! Loads the artifact produced by the offline vectorization pipeline: a delimited file with
//! a header row, an integer item id column and a column holding the comma-joined,
//! unit-normalized feature vector. The catalog is read-only once loaded and is shared by
//! every session.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::models::{FeatureVector, ItemId};

/// Deviation from unit norm beyond which a stored vector is logged as unnormalized
pub const NORM_TOLERANCE: f64 = 1e-3;

/// Error types for catalog loading
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to open catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Catalog contains no items")]
    Empty,

    #[error("Line {line}: invalid item id '{value}'")]
    InvalidId { line: u64, value: String },

    #[error("Line {line}: invalid vector component '{value}'")]
    InvalidComponent { line: u64, value: String },

    #[error("Line {line}: vector contains a non-finite component")]
    NonFinite { line: u64 },

    #[error("Line {line}: expected dimension {expected}, found {found}")]
    DimensionMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: duplicate item id {id}")]
    DuplicateId { line: u64, id: ItemId },

    #[error("Line {line}: vector for item {id} has zero magnitude")]
    ZeroVector { line: u64, id: ItemId },

    #[error("Expected {expected} items, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("Item {0} is missing from a catalog expected to cover 1..=N")]
    MissingId(ItemId),
}

/// Requested item is not in the catalog
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Unknown item: {0}")]
pub struct UnknownItemError(pub ItemId);

/// How to read the catalog file
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub delimiter: u8,
    pub id_column: String,
    pub vector_column: String,
    /// When set, every vector must have exactly this dimension
    pub expected_dimension: Option<usize>,
    /// When set, the catalog must contain exactly the ids 1..=N
    pub expected_size: Option<usize>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            id_column: "movie_id".to_string(),
            vector_column: "normalized_vector".to_string(),
            expected_dimension: None,
            expected_size: None,
        }
    }
}

/// Immutable table of item id to unit-normalized feature vector
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<(ItemId, FeatureVector)>,
    index: HashMap<ItemId, usize>,
    dimension: usize,
}

impl Catalog {
    /// Loads a catalog file from disk
    pub fn load(path: impl AsRef<Path>, options: &CatalogOptions) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file, options)?;

        tracing::info!(
            path = %path.display(),
            items = catalog.len(),
            dimension = catalog.dimension(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parses a catalog from any reader. No partial catalog is ever returned.
    pub fn from_reader<R: Read>(reader: R, options: &CatalogOptions) -> Result<Self, CatalogLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CatalogLoadError::MissingColumn(name.to_string()))
        };
        let id_col = column(&options.id_column)?;
        let vector_col = column(&options.vector_column)?;

        let mut builder = CatalogBuilder::new(options.expected_dimension);

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            // Header is line 1
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(row_idx as u64 + 2);

            let raw_id = record.get(id_col).unwrap_or_default();
            let id = raw_id
                .parse::<u32>()
                .map(ItemId)
                .map_err(|_| CatalogLoadError::InvalidId {
                    line,
                    value: raw_id.to_string(),
                })?;

            let vector = parse_vector(record.get(vector_col).unwrap_or_default(), line)?;
            builder.push(line, id, vector)?;
        }

        let catalog = builder.finish()?;

        if let Some(expected) = options.expected_size {
            if catalog.len() != expected {
                return Err(CatalogLoadError::SizeMismatch {
                    expected,
                    found: catalog.len(),
                });
            }
            if let Some(missing) = (1..=expected as u32).map(ItemId).find(|id| !catalog.contains(*id)) {
                return Err(CatalogLoadError::MissingId(missing));
            }
        }

        Ok(catalog)
    }

    /// Builds a catalog from in-memory entries, applying the same validation as a file load
    pub fn from_entries(
        entries: impl IntoIterator<Item = (ItemId, FeatureVector)>,
    ) -> Result<Self, CatalogLoadError> {
        let mut builder = CatalogBuilder::new(None);
        for (row_idx, (id, vector)) in entries.into_iter().enumerate() {
            builder.push(row_idx as u64 + 1, id, vector)?;
        }
        builder.finish()
    }

    /// Returns the vector for `id`, failing loudly for ids outside the catalog
    pub fn lookup(&self, id: ItemId) -> Result<&FeatureVector, UnknownItemError> {
        self.index
            .get(&id)
            .map(|&pos| &self.entries[pos].1)
            .ok_or(UnknownItemError(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// All entries in file order. Restartable: each call yields a fresh pass.
    pub fn entries(&self) -> impl Iterator<Item = (ItemId, &FeatureVector)> + '_ {
        self.entries.iter().map(|(id, v)| (*id, v))
    }

    /// Item at a file-order position, used for random sampling
    pub fn entry_at(&self, position: usize) -> Option<(ItemId, &FeatureVector)> {
        self.entries.get(position).map(|(id, v)| (*id, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality D shared by every vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Validates rows one at a time so a load never yields a partial catalog
struct CatalogBuilder {
    entries: Vec<(ItemId, FeatureVector)>,
    index: HashMap<ItemId, usize>,
    dimension: Option<usize>,
}

impl CatalogBuilder {
    fn new(dimension: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            dimension,
        }
    }

    fn push(&mut self, line: u64, id: ItemId, vector: FeatureVector) -> Result<(), CatalogLoadError> {
        if !vector.is_finite() {
            return Err(CatalogLoadError::NonFinite { line });
        }

        let expected = *self.dimension.get_or_insert(vector.dimension());
        if vector.dimension() != expected {
            return Err(CatalogLoadError::DimensionMismatch {
                line,
                expected,
                found: vector.dimension(),
            });
        }

        let norm = vector.magnitude();
        if norm == 0.0 {
            return Err(CatalogLoadError::ZeroVector { line, id });
        }
        // Ranking is cosine, so an off-norm vector still ranks correctly
        if (norm - 1.0).abs() > NORM_TOLERANCE {
            tracing::warn!(line, item_id = %id, norm, "Catalog vector is not unit length");
        }

        if self.index.insert(id, self.entries.len()).is_some() {
            return Err(CatalogLoadError::DuplicateId { line, id });
        }
        self.entries.push((id, vector));
        Ok(())
    }

    fn finish(self) -> Result<Catalog, CatalogLoadError> {
        let dimension = match self.dimension {
            Some(d) if !self.entries.is_empty() => d,
            _ => return Err(CatalogLoadError::Empty),
        };

        Ok(Catalog {
            entries: self.entries,
            index: self.index,
            dimension,
        })
    }
}

/// Parses a comma-joined vector, tolerating surrounding brackets
fn parse_vector(raw: &str, line: u64) -> Result<FeatureVector, CatalogLoadError> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    if trimmed.trim().is_empty() {
        return Err(CatalogLoadError::InvalidComponent {
            line,
            value: raw.to_string(),
        });
    }

    let components = trimmed
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| CatalogLoadError::InvalidComponent {
                    line,
                    value: part.to_string(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(FeatureVector::new(components))
}
