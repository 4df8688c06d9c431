//! This module contains the pure, stateless transforms between numeric vectors and
//! the ordered double sequences the interchange format can store.
//!
//! The cell functions (`encode`, `decode`) are total over `None`. The column
//! functions apply them row by row and tolerate any null distribution. Nothing here
//! captures state, so every function is safe to call concurrently.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, ListArray};
use arrow::datatypes::{DataType, Float64Type};

use super::{vector_at, vectors_to_array, NumericVector};
use crate::error::FerryError;

//==================================================================================
// 1. Cell Transforms
//==================================================================================

/// Materializes a vector's dense coordinates in index order.
pub fn encode(vector: Option<&NumericVector>) -> Option<Vec<f64>> {
    vector.map(NumericVector::to_dense_vec)
}

/// Rebuilds a vector from its coordinates, compressed to the cheaper representation.
pub fn decode(coordinates: Option<&[f64]>) -> Option<NumericVector> {
    coordinates.map(|coords| NumericVector::dense(coords.to_vec()).compressed())
}

//==================================================================================
// 2. Column Transforms
//==================================================================================

/// Encodes a vector column into a `List<Float64>` column of the same length.
pub fn encode_column(array: &dyn Array) -> Result<ArrayRef, FerryError> {
    let mut rows = Vec::with_capacity(array.len());
    for row in 0..array.len() {
        let vector = vector_at(array, row)?;
        rows.push(encode(vector.as_ref()).map(|coords| coords.into_iter().map(Some)));
    }
    Ok(Arc::new(ListArray::from_iter_primitive::<Float64Type, _, _>(rows)))
}

/// Decodes a `List<Float64>` column back into a vector column of the same length.
pub fn decode_column(array: &dyn Array) -> Result<ArrayRef, FerryError> {
    let lists = array.as_list_opt::<i32>().ok_or_else(|| {
        FerryError::UnsupportedType(format!(
            "expected an encoded vector column (List<Float64>), got {}",
            array.data_type()
        ))
    })?;

    let mut rows = Vec::with_capacity(lists.len());
    for row in 0..lists.len() {
        if lists.is_null(row) {
            rows.push(None);
            continue;
        }
        let items = lists.value(row);
        let coords = match items.data_type() {
            DataType::Float64 => items.as_primitive::<Float64Type>(),
            other => {
                return Err(FerryError::UnsupportedType(format!(
                    "encoded vector items must be Float64, got {}",
                    other
                )))
            }
        };
        if coords.null_count() > 0 {
            return Err(FerryError::InvalidVector(format!(
                "encoded vector at row {} contains a null coordinate",
                row
            )));
        }
        rows.push(decode(Some(&coords.values()[..])));
    }
    vectors_to_array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{encoded_vector_type, is_vector_type};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_cell_null_in_null_out() {
        assert_eq!(encode(None), None);
        assert_eq!(decode(None), None);
    }

    #[test]
    fn test_cell_roundtrip_dense_sparse_and_all_zero() {
        let cases = vec![
            NumericVector::dense(vec![0.0, 0.0, 3.5]),
            NumericVector::sparse(6, vec![0, 5], vec![-2.0, 9.25]).unwrap(),
            NumericVector::dense(vec![0.0; 5]),
            NumericVector::sparse(4, vec![], vec![]).unwrap(),
            NumericVector::dense(vec![]),
            NumericVector::dense(vec![1.0, 2.0, 3.0]),
        ];
        for v in cases {
            let encoded = encode(Some(&v)).unwrap();
            assert_eq!(encoded.len(), v.size());
            let decoded = decode(Some(encoded.as_slice())).unwrap();
            assert_eq!(decoded, v);
        }
    }

    #[test]
    fn test_encode_zero_fills_sparse() {
        let v = NumericVector::sparse(4, vec![1, 3], vec![1.5, 2.5]).unwrap();
        assert_eq!(encode(Some(&v)).unwrap(), vec![0.0, 1.5, 0.0, 2.5]);
    }

    #[test]
    fn test_cell_roundtrip_keeps_sign_of_zero() {
        let coords = vec![0.0, -0.0, 0.0, 0.0, 2.0];
        let decoded = decode(Some(coords.as_slice())).unwrap();
        assert!(decoded.is_sparse());
        let back = encode(Some(&decoded)).unwrap();
        let bits: Vec<u64> = back.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, coords.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
    }

    #[test]
    fn test_cell_roundtrip_random_vectors() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let size = rng.random_range(0..20);
            let coords: Vec<f64> = (0..size)
                .map(|_| if rng.random_bool(0.6) { 0.0 } else { rng.random_range(-100.0..100.0) })
                .collect();
            let v = NumericVector::dense(coords).compressed();
            assert_eq!(decode(encode(Some(&v)).as_deref()).unwrap(), v);
        }
    }

    #[test]
    fn test_column_roundtrip_with_heterogeneous_nulls() {
        let rows = vec![
            None,
            Some(NumericVector::dense(vec![0.0, 0.0, 3.5])),
            None,
            Some(NumericVector::sparse(3, vec![0], vec![1.0]).unwrap()),
            Some(NumericVector::dense(vec![4.0, 5.0])),
        ];
        let column = vectors_to_array(rows.clone()).unwrap();

        let encoded = encode_column(column.as_ref()).unwrap();
        assert_eq!(encoded.data_type(), &encoded_vector_type());
        assert_eq!(encoded.len(), 5);
        assert_eq!(encoded.null_count(), 2);
        let first = encoded.as_list::<i32>().value(1);
        assert_eq!(first.as_primitive::<Float64Type>().values().to_vec(), vec![0.0, 0.0, 3.5]);

        let decoded = decode_column(encoded.as_ref()).unwrap();
        assert!(is_vector_type(decoded.data_type()));
        for (row, expected) in rows.iter().enumerate() {
            assert_eq!(&vector_at(decoded.as_ref(), row).unwrap(), expected);
        }
    }

    #[test]
    fn test_all_null_and_empty_columns() {
        let column = vectors_to_array(vec![None, None]).unwrap();
        let encoded = encode_column(column.as_ref()).unwrap();
        assert_eq!(encoded.null_count(), 2);
        let decoded = decode_column(encoded.as_ref()).unwrap();
        assert_eq!(decoded.null_count(), 2);

        let empty = vectors_to_array(Vec::new()).unwrap();
        assert_eq!(encode_column(empty.as_ref()).unwrap().len(), 0);
    }

    #[test]
    fn test_decode_column_rejects_wrong_types() {
        let ints = arrow::array::Int32Array::from(vec![1]);
        assert!(matches!(decode_column(&ints), Err(FerryError::UnsupportedType(_))));

        let int_lists = ListArray::from_iter_primitive::<arrow::datatypes::Int32Type, _, _>(vec![Some(vec![
            Some(1),
        ])]);
        assert!(matches!(decode_column(&int_lists), Err(FerryError::UnsupportedType(_))));

        let with_null = ListArray::from_iter_primitive::<Float64Type, _, _>(vec![Some(vec![Some(1.0), None])]);
        assert!(matches!(decode_column(&with_null), Err(FerryError::InvalidVector(_))));
    }
}
