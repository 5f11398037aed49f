//! Zarr V3 writer for field collections.
//!
//! A collection is stored as one hierarchy: the root group lists the field
//! names and carries collection metadata, and each field is a `Float32`
//! array at `/<name>` whose attributes hold its units and dimensional
//! coordinates.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};
use zarrs_filesystem::FilesystemStore;

use field_common::{DimCoord, Field, FieldCollection};

use crate::config::{StoreConfig, ZarrCompression};
use crate::error::{Result, StoreError};

/// Root group attribute listing the stored fields.
pub const FIELDS_ATTR: &str = "fields";
/// Root group attribute holding [`CollectionMetadata`].
pub const METADATA_ATTR: &str = "collection";
/// Array attribute holding the field's dimensional coordinates.
pub const COORDS_ATTR: &str = "dim_coords";

/// Forecast context stored alongside a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_hours: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

/// A dimensional coordinate and the dimension it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredCoord {
    pub dim: usize,
    pub coord: DimCoord,
}

/// Result of writing a collection.
#[derive(Debug)]
pub struct WriteSummary {
    /// Number of arrays written.
    pub fields: usize,
    /// Uncompressed bytes of field data.
    pub bytes_written: u64,
}

/// Writer for saving field collections as Zarr V3 hierarchies.
pub struct ZarrFieldWriter {
    config: StoreConfig,
}

impl ZarrFieldWriter {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Save `collection` to a filesystem hierarchy at `path`, replacing any
    /// existing hierarchy there.
    pub fn write_collection(
        &self,
        path: &Path,
        collection: &FieldCollection,
        metadata: &CollectionMetadata,
    ) -> Result<WriteSummary> {
        if path.exists() {
            debug!(path = %path.display(), "Replacing existing collection");
            std::fs::remove_dir_all(path)?;
        }
        std::fs::create_dir_all(path)?;

        let store = FilesystemStore::new(path)
            .map_err(|e| StoreError::open_failed(path.display(), e))?;
        let summary = self.write_to_store(Arc::new(store), collection, metadata)?;

        debug!(
            path = %path.display(),
            fields = summary.fields,
            bytes = summary.bytes_written,
            "Wrote field collection"
        );
        Ok(summary)
    }

    /// Save `collection` into any writable Zarr store.
    pub fn write_to_store<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        store: Arc<S>,
        collection: &FieldCollection,
        metadata: &CollectionMetadata,
    ) -> Result<WriteSummary> {
        let names: Vec<&str> = collection.names().collect();

        let mut attrs = serde_json::Map::new();
        attrs.insert(FIELDS_ATTR.to_string(), serde_json::json!(names));
        attrs.insert(METADATA_ATTR.to_string(), serde_json::to_value(metadata)?);

        let mut builder = GroupBuilder::new();
        builder.attributes(attrs);
        let group = builder
            .build(store.clone(), "/")
            .map_err(|e| StoreError::write_failed(e.to_string()))?;
        group
            .store_metadata()
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        let mut bytes_written = 0;
        for field in collection.iter() {
            bytes_written += self.write_field(store.clone(), field)?;
        }

        Ok(WriteSummary {
            fields: collection.len(),
            bytes_written,
        })
    }

    /// Write one field as an array at `/<name>`; returns the bytes written.
    fn write_field<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        store: Arc<S>,
        field: &Field,
    ) -> Result<u64> {
        let name = field.name();
        if name.is_empty() || name.contains('/') || name.starts_with("__") {
            return Err(StoreError::write_failed(format!(
                "'{}' is not a valid array name",
                name
            )));
        }
        if field.ndim() == 0 || field.shape().iter().any(|&n| n == 0) {
            return Err(StoreError::write_failed(format!(
                "field '{}' has empty shape {:?}",
                name,
                field.shape()
            )));
        }

        let shape: Vec<u64> = field.shape().iter().map(|&n| n as u64).collect();

        let coords: Vec<StoredCoord> = field
            .dim_coords()
            .map(|(dim, coord)| StoredCoord {
                dim,
                coord: coord.clone(),
            })
            .collect();
        let mut attrs = serde_json::Map::new();
        attrs.insert("name".to_string(), serde_json::json!(name));
        if let Some(units) = field.units() {
            attrs.insert("units".to_string(), serde_json::json!(units));
        }
        attrs.insert(COORDS_ATTR.to_string(), serde_json::to_value(&coords)?);

        // Fields are small after regridding, so a single chunk covers each one.
        let chunk_grid: zarrs::array::ChunkGrid = shape
            .clone()
            .try_into()
            .map_err(|e| StoreError::ConfigError(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(
            shape.clone(),
            DataType::Float32,
            chunk_grid,
            FillValue::from(f32::NAN),
        );
        let mut builder = binding.attributes(attrs);
        if self.config.compression != ZarrCompression::None {
            builder = builder.bytes_to_bytes_codecs(vec![self.create_compression_codec()?]);
        }

        let path = format!("/{}", name);
        let array = builder
            .build(store, &path)
            .map_err(|e| StoreError::write_failed(e.to_string()))?;
        array
            .store_metadata()
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)
            .map_err(|e| StoreError::write_failed(e.to_string()))?;
        let values: Vec<f32> = field.data().iter().copied().collect();
        array
            .store_array_subset_elements(&subset, &values)
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        Ok((values.len() * std::mem::size_of::<f32>()) as u64)
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(
        &self,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| StoreError::ConfigError("Invalid compression level".to_string()))?;

        let shuffle = if self.config.shuffle {
            BloscShuffleMode::Shuffle
        } else {
            BloscShuffleMode::NoShuffle
        };

        // typesize is required when shuffle is enabled
        let typesize = if self.config.shuffle {
            Some(std::mem::size_of::<f32>())
        } else {
            None
        };

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(StoreError::ConfigError(
                    "No compression configured".to_string(),
                ))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}

impl Default for ZarrFieldWriter {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{lon_lat_field, regular_points};

    fn sample() -> FieldCollection {
        let lons = regular_points(0.0, 1.0, 4);
        let lats = regular_points(0.0, 1.0, 3);
        std::iter::once(lon_lat_field("t", &lons, &lats, |lon, lat| (lon + lat) as f32)).collect()
    }

    #[test]
    fn test_write_collection_creates_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.zarr");

        let summary = ZarrFieldWriter::default()
            .write_collection(&path, &sample(), &CollectionMetadata::default())
            .unwrap();

        assert_eq!(summary.fields, 1);
        assert_eq!(summary.bytes_written, 12 * 4);
        assert!(path.join("zarr.json").exists());
        assert!(path.join("t").join("zarr.json").exists());
    }

    #[test]
    fn test_write_uncompressed_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.zarr");
        std::fs::create_dir_all(path.join("stale")).unwrap();

        let writer = ZarrFieldWriter::new(StoreConfig {
            compression: ZarrCompression::None,
            ..Default::default()
        });
        writer
            .write_collection(&path, &sample(), &CollectionMetadata::default())
            .unwrap();

        assert!(!path.join("stale").exists());
    }

    #[test]
    fn test_rejects_invalid_array_name() {
        let dir = tempfile::tempdir().unwrap();
        let lons = regular_points(0.0, 1.0, 2);
        let collection: FieldCollection =
            std::iter::once(lon_lat_field("a/b", &lons, &lons, |_, _| 0.0)).collect();

        let result = ZarrFieldWriter::default().write_collection(
            &dir.path().join("bad.zarr"),
            &collection,
            &CollectionMetadata::default(),
        );
        assert!(matches!(result, Err(StoreError::WriteFailed(_))));
    }
}
