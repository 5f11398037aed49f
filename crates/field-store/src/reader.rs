//! Loading field collections and grids saved by [`crate::ZarrFieldWriter`].

use std::path::Path;
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use tracing::debug;
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs::group::Group;
use zarrs::storage::ReadableStorageTraits;
use zarrs_filesystem::FilesystemStore;

use field_common::{CoordAxis, Field, FieldCollection, FieldError, Grid};

use crate::error::{Result, StoreError};
use crate::writer::{CollectionMetadata, StoredCoord, COORDS_ATTR, FIELDS_ATTR, METADATA_ATTR};

/// Reader for field collections stored as Zarr V3 hierarchies.
pub struct ZarrFieldReader<S: ReadableStorageTraits + 'static> {
    store: Arc<S>,
    names: Vec<String>,
    metadata: CollectionMetadata,
}

impl ZarrFieldReader<FilesystemStore> {
    /// Open the hierarchy stored at `path`.
    pub fn open_path(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(StoreError::open_failed(path.display(), "no such directory"));
        }
        let store = FilesystemStore::new(path)
            .map_err(|e| StoreError::open_failed(path.display(), e))?;
        Self::open(Arc::new(store))
            .map_err(|e| StoreError::open_failed(path.display(), e))
    }
}

impl<S: ReadableStorageTraits + 'static> ZarrFieldReader<S> {
    /// Open the root group of a store and read the field list.
    pub fn open(store: Arc<S>) -> Result<Self> {
        let group = Group::open(store.clone(), "/")
            .map_err(|e| StoreError::invalid_metadata(e.to_string()))?;
        let attrs = group.attributes();

        let names: Vec<String> = attrs
            .get(FIELDS_ATTR)
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| {
                StoreError::invalid_metadata(format!(
                    "root group has no '{}' attribute",
                    FIELDS_ATTR
                ))
            })?;
        let metadata: CollectionMetadata = attrs
            .get(METADATA_ATTR)
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            store,
            names,
            metadata,
        })
    }

    /// Names of the stored fields.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn metadata(&self) -> &CollectionMetadata {
        &self.metadata
    }

    /// Read one field by name.
    pub fn read_field(&self, name: &str) -> Result<Field> {
        if !self.names.iter().any(|n| n == name) {
            return Err(FieldError::FieldNotFound(name.to_string()).into());
        }

        let path = format!("/{}", name);
        let array = Array::open(self.store.clone(), &path)
            .map_err(|e| StoreError::read_failed(format!("{}: {}", path, e)))?;

        let shape: Vec<u64> = array.shape().to_vec();
        let subset = ArraySubset::new_with_shape(shape.clone());
        let values: Vec<f32> = array
            .retrieve_array_subset_elements(&subset)
            .map_err(|e| StoreError::read_failed(format!("{}: {}", path, e)))?;

        let dims: Vec<usize> = shape.iter().map(|&n| n as usize).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&dims), values).map_err(FieldError::from)?;

        let attrs = array.attributes();
        let coords: Vec<StoredCoord> = attrs
            .get(COORDS_ATTR)
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();
        let units = attrs.get("units").and_then(|v| v.as_str());

        let field = Field::new(
            name,
            data,
            coords.into_iter().map(|c| (c.coord, c.dim)).collect(),
        )?;
        Ok(match units {
            Some(units) => field.with_units(units),
            None => field,
        })
    }

    /// Read every stored field.
    pub fn read_collection(&self) -> Result<FieldCollection> {
        let collection = self
            .names
            .iter()
            .map(|name| self.read_field(name))
            .collect::<Result<FieldCollection>>()?;
        debug!(fields = collection.len(), "Read field collection");
        Ok(collection)
    }
}

/// Read the whole collection stored at `path`.
pub fn read_collection(path: &Path) -> Result<FieldCollection> {
    ZarrFieldReader::open_path(path)?.read_collection()
}

/// Load a pre-built window grid from a saved collection.
///
/// Uses the x/y coordinates of `field_name`, or of the first stored field
/// that has both when no name is given.
pub fn load_grid(path: &Path, field_name: Option<&str>) -> Result<Grid> {
    let reader = ZarrFieldReader::open_path(path)?;

    if let Some(name) = field_name {
        return Ok(Grid::from_field(&reader.read_field(name)?)?);
    }

    for name in reader.names() {
        let field = reader.read_field(name)?;
        let horizontal = field.coord_by_axis(CoordAxis::X).is_some()
            && field.coord_by_axis(CoordAxis::Y).is_some();
        if horizontal {
            debug!(path = %path.display(), field = %name, "Loaded grid");
            return Ok(Grid::from_field(&field)?);
        }
    }

    Err(StoreError::invalid_metadata(format!(
        "no field in {} has both x and y coordinates",
        path.display()
    )))
}
