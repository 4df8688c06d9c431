//! This module defines the in-memory numeric vector and its Arrow column encoding.
//!
//! A vector column is a struct column `{type, size, indices, values}`:
//!
//! | field     | type             | dense (`type = 1`) | sparse (`type = 0`) |
//! |-----------|------------------|--------------------|---------------------|
//! | `type`    | `Int8`           | 1                  | 0                   |
//! | `size`    | `Int32` nullable | null               | logical length      |
//! | `indices` | `List<Int32>`    | null               | non-zero positions  |
//! | `values`  | `List<Float64>`  | all coordinates    | non-zero values     |
//!
//! The interchange format cannot store this struct, so the codec in [`codec`]
//! flattens it to `List<Float64>` for writing.

pub mod codec;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Int32Array, Int8Array, ListArray, StructArray};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Float64Type, Int32Type};

use crate::error::FerryError;

const SPARSE_TAG: i8 = 0;
const DENSE_TAG: i8 = 1;

//==================================================================================
// 1. Type Tags
//==================================================================================

fn vector_fields() -> Fields {
    Fields::from(vec![
        Field::new("type", DataType::Int8, false),
        Field::new("size", DataType::Int32, true),
        Field::new(
            "indices",
            DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
            true,
        ),
        Field::new(
            "values",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            true,
        ),
    ])
}

/// The type tag of an in-memory numeric vector column.
pub fn vector_data_type() -> DataType {
    DataType::Struct(vector_fields())
}

/// The type a vector column takes after encoding: an ordered sequence of doubles.
pub fn encoded_vector_type() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Float64, true)))
}

/// Exact-match test against the vector type tag.
pub fn is_vector_type(data_type: &DataType) -> bool {
    *data_type == vector_data_type()
}

//==================================================================================
// 2. NumericVector
//==================================================================================

/// A fixed-length sequence of doubles with a dense or sparse representation.
///
/// Equality is by value: a dense and a sparse vector with the same coordinates
/// compare equal. Coordinates compare as `f64` does, so `-0.0 == 0.0` and a vector
/// holding a NaN is not equal to itself.
#[derive(Debug, Clone)]
pub enum NumericVector {
    Dense(Vec<f64>),
    Sparse {
        size: usize,
        indices: Vec<u32>,
        values: Vec<f64>,
    },
}

impl NumericVector {
    pub fn dense(values: Vec<f64>) -> Self {
        NumericVector::Dense(values)
    }

    /// Builds a sparse vector. Indices must be strictly increasing and below `size`,
    /// with one value per index.
    pub fn sparse(size: usize, indices: Vec<u32>, values: Vec<f64>) -> Result<Self, FerryError> {
        if indices.len() != values.len() {
            return Err(FerryError::InvalidVector(format!(
                "sparse vector has {} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FerryError::InvalidVector(
                "sparse indices must be strictly increasing".to_string(),
            ));
        }
        if let Some(&last) = indices.last() {
            if last as usize >= size {
                return Err(FerryError::InvalidVector(format!(
                    "sparse index {} out of bounds for size {}",
                    last, size
                )));
            }
        }
        Ok(NumericVector::Sparse {
            size,
            indices,
            values,
        })
    }

    pub fn size(&self) -> usize {
        match self {
            NumericVector::Dense(values) => values.len(),
            NumericVector::Sparse { size, .. } => *size,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, NumericVector::Sparse { .. })
    }

    /// Number of stored entries other than `+0.0`. A `-0.0` counts, so its sign
    /// survives a sparse representation.
    pub fn num_nonzeros(&self) -> usize {
        match self {
            NumericVector::Dense(values) | NumericVector::Sparse { values, .. } => {
                values.iter().filter(|v| !is_positive_zero(**v)).count()
            }
        }
    }

    /// Coordinates in index order, zero-filling the implicit entries of a sparse vector.
    pub fn to_dense_vec(&self) -> Vec<f64> {
        match self {
            NumericVector::Dense(values) => values.clone(),
            NumericVector::Sparse {
                size,
                indices,
                values,
            } => {
                let mut dense = vec![0.0; *size];
                for (idx, value) in indices.iter().zip(values) {
                    dense[*idx as usize] = *value;
                }
                dense
            }
        }
    }

    /// Re-encodes into the more compact representation: sparse when the majority of
    /// coordinates are zero, dense otherwise.
    pub fn compressed(&self) -> Self {
        let size = self.size();
        let nnz = self.num_nonzeros();
        if nnz < size - nnz {
            let dense = self.to_dense_vec();
            let (indices, values) = dense
                .iter()
                .enumerate()
                .filter(|(_, v)| !is_positive_zero(**v))
                .map(|(i, v)| (i as u32, *v))
                .unzip();
            NumericVector::Sparse {
                size,
                indices,
                values,
            }
        } else {
            NumericVector::Dense(self.to_dense_vec())
        }
    }
}

fn is_positive_zero(v: f64) -> bool {
    v.to_bits() == 0
}

impl PartialEq for NumericVector {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.to_dense_vec() == other.to_dense_vec()
    }
}

impl From<Vec<f64>> for NumericVector {
    fn from(values: Vec<f64>) -> Self {
        NumericVector::Dense(values)
    }
}

//==================================================================================
// 3. Arrow Column Marshalling
//==================================================================================

/// Builds a vector column from per-row optional vectors.
pub fn vectors_to_array<I>(rows: I) -> Result<ArrayRef, FerryError>
where
    I: IntoIterator<Item = Option<NumericVector>>,
{
    let mut tags = Vec::new();
    let mut sizes = Vec::new();
    let mut indices = Vec::new();
    let mut values = Vec::new();
    let mut validity = Vec::new();

    for row in rows {
        match row {
            None => {
                tags.push(DENSE_TAG);
                sizes.push(None);
                indices.push(None);
                values.push(None);
                validity.push(false);
            }
            Some(NumericVector::Dense(coords)) => {
                tags.push(DENSE_TAG);
                sizes.push(None);
                indices.push(None);
                values.push(Some(coords.into_iter().map(Some).collect::<Vec<_>>()));
                validity.push(true);
            }
            Some(NumericVector::Sparse {
                size,
                indices: idx,
                values: vals,
            }) => {
                let size = i32::try_from(size).map_err(|_| {
                    FerryError::InvalidVector(format!("vector size {} exceeds Int32", size))
                })?;
                let idx = idx
                    .into_iter()
                    .map(|i| i32::try_from(i).map(Some))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| FerryError::InvalidVector("sparse index exceeds Int32".to_string()))?;
                tags.push(SPARSE_TAG);
                sizes.push(Some(size));
                indices.push(Some(idx));
                values.push(Some(vals.into_iter().map(Some).collect::<Vec<_>>()));
                validity.push(true);
            }
        }
    }

    let children: Vec<ArrayRef> = vec![
        Arc::new(Int8Array::from(tags)),
        Arc::new(Int32Array::from(sizes)),
        Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(indices)),
        Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(values)),
    ];
    let array = StructArray::try_new(vector_fields(), children, Some(NullBuffer::from(validity)))?;
    Ok(Arc::new(array))
}

/// Reads the vector stored at `row` of a vector column. Returns `None` for a null row.
pub fn vector_at(array: &dyn Array, row: usize) -> Result<Option<NumericVector>, FerryError> {
    let structs = array.as_struct_opt().ok_or_else(|| {
        FerryError::UnsupportedType(format!("expected a vector column, got {}", array.data_type()))
    })?;
    if structs.is_null(row) {
        return Ok(None);
    }

    let child = |name: &str| {
        structs
            .column_by_name(name)
            .ok_or_else(|| FerryError::InvalidVector(format!("vector column lacks '{}' field", name)))
    };
    let tags = child("type")?
        .as_primitive_opt::<arrow::datatypes::Int8Type>()
        .ok_or_else(|| FerryError::InvalidVector("'type' field is not Int8".to_string()))?;
    let values = list_values::<Float64Type>(child("values")?.as_ref(), row)?;

    match tags.value(row) {
        DENSE_TAG => Ok(Some(NumericVector::Dense(values))),
        SPARSE_TAG => {
            let sizes = child("size")?
                .as_primitive_opt::<Int32Type>()
                .ok_or_else(|| FerryError::InvalidVector("'size' field is not Int32".to_string()))?;
            if sizes.is_null(row) || sizes.value(row) < 0 {
                return Err(FerryError::InvalidVector(format!("sparse vector at row {} has no size", row)));
            }
            let indices = list_values::<Int32Type>(child("indices")?.as_ref(), row)?
                .into_iter()
                .map(|i| u32::try_from(i))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| FerryError::InvalidVector("negative sparse index".to_string()))?;
            NumericVector::sparse(sizes.value(row) as usize, indices, values).map(Some)
        }
        other => Err(FerryError::InvalidVector(format!("unknown vector type tag {}", other))),
    }
}

/// Collects the non-null primitive items of one list entry, rejecting null items.
fn list_values<T>(array: &dyn Array, row: usize) -> Result<Vec<T::Native>, FerryError>
where
    T: arrow::datatypes::ArrowPrimitiveType,
{
    let lists = array
        .as_list_opt::<i32>()
        .ok_or_else(|| FerryError::InvalidVector(format!("expected a list, got {}", array.data_type())))?;
    if lists.is_null(row) {
        return Err(FerryError::InvalidVector(format!("missing list entry at row {}", row)));
    }
    let items = lists.value(row);
    let items = items
        .as_primitive_opt::<T>()
        .ok_or_else(|| FerryError::InvalidVector(format!("unexpected list item type {}", items.data_type())))?;
    if items.null_count() > 0 {
        return Err(FerryError::InvalidVector(format!("null coordinate at row {}", row)));
    }
    Ok(items.values().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_and_sparse_compare_by_value() {
        let dense = NumericVector::dense(vec![0.0, 0.0, 3.5]);
        let sparse = NumericVector::sparse(3, vec![2], vec![3.5]).unwrap();
        assert_eq!(dense, sparse);
        assert_ne!(dense, NumericVector::dense(vec![0.0, 3.5, 0.0]));
        assert_ne!(NumericVector::dense(vec![]), NumericVector::dense(vec![0.0]));
    }

    #[test]
    fn test_sparse_constructor_rejects_bad_indices() {
        assert!(NumericVector::sparse(3, vec![1, 1], vec![1.0, 2.0]).is_err());
        assert!(NumericVector::sparse(3, vec![2, 1], vec![1.0, 2.0]).is_err());
        assert!(NumericVector::sparse(3, vec![3], vec![1.0]).is_err());
        assert!(NumericVector::sparse(3, vec![0], vec![]).is_err());
    }

    #[test]
    fn test_compressed_picks_sparse_for_mostly_zero() {
        let v = NumericVector::dense(vec![0.0, 0.0, 3.5]).compressed();
        assert!(v.is_sparse());
        assert_eq!(v.to_dense_vec(), vec![0.0, 0.0, 3.5]);

        let v = NumericVector::sparse(3, vec![0, 2], vec![1.0, 2.0]).unwrap().compressed();
        assert!(!v.is_sparse());
        assert_eq!(v.to_dense_vec(), vec![1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_compressed_edge_cases() {
        // Half zeros is not a majority.
        assert!(!NumericVector::dense(vec![0.0, 1.0]).compressed().is_sparse());
        assert!(NumericVector::dense(vec![0.0; 4]).compressed().is_sparse());
        let empty = NumericVector::dense(vec![]).compressed();
        assert_eq!(empty.size(), 0);
        assert!(!empty.is_sparse());
    }

    #[test]
    fn test_compressed_keeps_negative_zero() {
        let v = NumericVector::dense(vec![-0.0, 0.0, 0.0, 0.0, 1.0]).compressed();
        match &v {
            NumericVector::Sparse { indices, .. } => assert_eq!(indices, &vec![0, 4]),
            other => panic!("expected sparse, got {:?}", other),
        }
        assert!(v.to_dense_vec()[0].is_sign_negative());
        assert!(v.to_dense_vec()[1].is_sign_positive());
    }

    #[test]
    fn test_equality_follows_f64_semantics() {
        assert_eq!(NumericVector::dense(vec![-0.0]), NumericVector::dense(vec![0.0]));
        let nan = NumericVector::dense(vec![1.0, f64::NAN]);
        assert_ne!(nan, nan.clone());
    }

    #[test]
    fn test_vector_column_roundtrip_with_nulls() {
        let rows = vec![
            Some(NumericVector::dense(vec![1.0, 2.0])),
            None,
            Some(NumericVector::sparse(5, vec![1, 4], vec![7.0, -1.0]).unwrap()),
        ];
        let array = vectors_to_array(rows.clone()).unwrap();
        assert!(is_vector_type(array.data_type()));
        assert_eq!(array.len(), 3);
        assert_eq!(array.null_count(), 1);

        for (row, expected) in rows.iter().enumerate() {
            let got = vector_at(array.as_ref(), row).unwrap();
            assert_eq!(&got, expected);
        }
        assert!(vector_at(array.as_ref(), 2).unwrap().unwrap().is_sparse());
    }

    #[test]
    fn test_vector_at_rejects_non_vector_column() {
        let array = Int32Array::from(vec![1, 2]);
        assert!(matches!(
            vector_at(&array, 0),
            Err(FerryError::UnsupportedType(_))
        ));
    }
}
