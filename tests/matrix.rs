use proptest::prelude::*;
use ring_rotator::{Error, Matrix};

#[test]
fn test_from_rows_layout() {
    let matrix = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).expect("rectangular");
    assert_eq!(matrix.rows(), 2);
    assert_eq!(matrix.columns(), 3);
    assert!(!matrix.is_square());
    assert_eq!(matrix.row(0), &[1, 2, 3]);
    assert_eq!(matrix.row(1), &[4, 5, 6]);
    assert_eq!(matrix.get(1, 2), Some(&6));
    assert_eq!(matrix.get(2, 0), None);
    assert_eq!(matrix.get(0, 3), None);
}

#[test]
fn test_from_rows_rejects_ragged() {
    let err = Matrix::from_rows(vec![vec![1, 2], vec![3], vec![4, 5]]).unwrap_err();
    assert_eq!(
        err,
        Error::RaggedRow {
            row: 1,
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(err.to_string(), "row 1 has 1 elements, expected 2");
}

#[test]
fn test_from_rows_empty() {
    let matrix = Matrix::<i32>::from_rows(Vec::new()).expect("empty");
    assert_eq!(matrix.rows(), 0);
    assert_eq!(matrix.columns(), 0);
    assert!(matrix.is_square());
    assert!(matrix.is_empty());
    assert_eq!(matrix, Matrix::default());
}

#[test]
fn test_from_array_shapes() {
    let tall = Matrix::from([[1, 2], [3, 4], [5, 6]]);
    assert_eq!((tall.rows(), tall.columns()), (3, 2));

    let empty: Matrix<i32> = Matrix::from([[0; 0]; 0]);
    assert_eq!((empty.rows(), empty.columns()), (0, 0));

    let single = Matrix::from([[7]]);
    assert_eq!(single[(0, 0)], 7);
}

#[test]
fn test_filled_and_index_mut() {
    let mut matrix = Matrix::filled(2, 2, 0u8);
    matrix[(1, 0)] = 5;
    *matrix.get_mut(0, 1).expect("in bounds") = 3;
    matrix.row_mut(1)[1] = 9;
    assert_eq!(matrix.as_slice(), &[0, 3, 5, 9]);
    assert_eq!(matrix.get_mut(2, 2), None);
}

#[test]
fn test_display_matches_grid_layout() {
    let matrix = Matrix::from([[1, 2, 3], [8, 9, 4], [7, 6, 5]]);
    assert_eq!(matrix.to_string(), "1 2 3\n8 9 4\n7 6 5");
    assert_eq!(Matrix::<i32>::new_empty().to_string(), "");
    assert_eq!(Matrix::from([["a"]]).to_string(), "a");
}

#[test]
fn test_clone_is_deep_copy() {
    let matrix = Matrix::from([[1, 2], [3, 4]]);
    let mut cloned = matrix.clone();
    cloned[(0, 0)] = 10;
    assert_eq!(matrix[(0, 0)], 1);
    assert_eq!(cloned[(0, 0)], 10);
}

#[test]
fn test_iteration_and_conversions() {
    let matrix = Matrix::from_fn(3, 2, |row, column| row * 2 + column);
    let rows: Vec<&[usize]> = matrix.iter_rows().collect();
    assert_eq!(rows, vec![&[0, 1][..], &[2, 3][..], &[4, 5][..]]);
    assert_eq!((&matrix).into_iter().sum::<usize>(), 15);
    assert_eq!(matrix.to_rows(), vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    assert_eq!(matrix.len(), 6);
    assert_eq!(matrix.into_vec(), vec![0, 1, 2, 3, 4, 5]);
}

proptest! {
    #[test]
    fn prop_from_vec_accepts_exact_length(
        rows in 0usize..8,
        columns in 0usize..8,
        extra in 0usize..3,
    ) {
        let data: Vec<usize> = (0..rows * columns + extra).collect();
        let result = Matrix::from_vec(rows, columns, data);

        if extra == 0 {
            let matrix = result.expect("exact length");
            prop_assert_eq!(matrix.rows(), rows);
            prop_assert_eq!(matrix.columns(), columns);
            for row in 0..rows {
                for column in 0..columns {
                    prop_assert_eq!(matrix[(row, column)], row * columns + column);
                }
            }
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                Error::DataLength { rows, columns, len: rows * columns + extra }
            );
        }
    }

    #[test]
    fn prop_rows_round_trip_through_from_rows(
        rows in proptest::collection::vec(proptest::collection::vec(any::<i16>(), 4), 1..6),
    ) {
        let matrix = Matrix::from_rows(rows.clone()).expect("uniform rows");
        prop_assert_eq!(matrix.to_rows(), rows);
    }
}
