//! Sparse user × item interaction matrix.
//!
//! The matrix is stored in compressed sparse row (CSR) form:
//! - `indptr[u]..indptr[u + 1]` is the slice of row `u` in `indices`/`data`
//! - column indices are strictly ascending within a row
//! - only positive weights are stored, never explicit zeros
//!
//! Slicing one user's row is O(1) plus the row's own length, which is what
//! a recommendation request needs.

use crate::codec::IdentifierCodec;
use crate::error::{InteractionError, Result};
use data_loader::InteractionRecord;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    num_rows: usize,
    num_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

/// Borrowed view of one matrix row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub indices: &'a [usize],
    pub weights: &'a [f32],
}

impl<'a> RowView<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + 'a {
        let (indices, weights) = (self.indices, self.weights);
        indices.iter().copied().zip(weights.iter().copied())
    }
}

impl InteractionMatrix {
    /// Build a CSR matrix from (row, col, weight) triplets.
    ///
    /// Duplicate coordinates are summed. Zero weights are dropped. Callers
    /// are responsible for having validated the weights.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, f32)>,
    ) -> Self {
        triplets.sort_unstable_by_key(|&(row, col, _)| (row, col));

        let mut indptr = vec![0usize; num_rows + 1];
        let mut indices: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut data: Vec<f32> = Vec::with_capacity(triplets.len());
        let mut rows: Vec<usize> = Vec::with_capacity(triplets.len());

        for (row, col, weight) in triplets {
            if weight == 0.0 {
                continue;
            }
            match (rows.last(), indices.last()) {
                (Some(&last_row), Some(&last_col)) if last_row == row && last_col == col => {
                    if let Some(last) = data.last_mut() {
                        *last += weight;
                    }
                }
                _ => {
                    rows.push(row);
                    indices.push(col);
                    data.push(weight);
                }
            }
        }

        for &row in &rows {
            indptr[row + 1] += 1;
        }
        for row in 0..num_rows {
            indptr[row + 1] += indptr[row];
        }

        Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            data,
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Slice one row. Out-of-range rows return `None`.
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        if row >= self.num_rows {
            return None;
        }
        let range = self.indptr[row]..self.indptr[row + 1];
        Some(RowView {
            indices: &self.indices[range.clone()],
            weights: &self.data[range],
        })
    }

    /// Stored weight at (row, col), or 0.0 when absent.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.row(row)
            .and_then(|view| {
                view.indices
                    .binary_search(&col)
                    .ok()
                    .map(|pos| view.weights[pos])
            })
            .unwrap_or(0.0)
    }

    /// Item × user matrix with the same entries.
    pub fn transpose(&self) -> Self {
        let mut indptr = vec![0usize; self.num_cols + 1];
        for &col in &self.indices {
            indptr[col + 1] += 1;
        }
        for col in 0..self.num_cols {
            indptr[col + 1] += indptr[col];
        }

        let mut next = indptr.clone();
        let mut indices = vec![0usize; self.nnz()];
        let mut data = vec![0.0f32; self.nnz()];

        // Rows are visited in ascending order, so each transposed row comes
        // out sorted without an extra pass.
        for row in 0..self.num_rows {
            for pos in self.indptr[row]..self.indptr[row + 1] {
                let col = self.indices[pos];
                let dest = next[col];
                indices[dest] = row;
                data[dest] = self.data[pos];
                next[col] += 1;
            }
        }

        Self {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            indptr,
            indices,
            data,
        }
    }

    /// Dense copy, for inspection of small matrices only.
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        let mut dense = vec![vec![0.0f32; self.num_cols]; self.num_rows];
        for (row, dense_row) in dense.iter_mut().enumerate() {
            for pos in self.indptr[row]..self.indptr[row + 1] {
                dense_row[self.indices[pos]] = self.data[pos];
            }
        }
        dense
    }
}

/// Builds an `InteractionMatrix` from records and fitted codecs.
pub struct InteractionMatrixBuilder;

impl InteractionMatrixBuilder {
    /// Encode every record and assemble the sparse matrix.
    ///
    /// Weights of records that land on the same (user, item) cell are summed.
    /// Negative or non-finite weights fail with `InvalidWeight`, and so does
    /// a cell whose summed weight overflows; an
    /// identifier missing from its codec fails with `UnknownIdentifier`.
    pub fn build(
        records: &[InteractionRecord],
        user_codec: &IdentifierCodec,
        item_codec: &IdentifierCodec,
    ) -> Result<InteractionMatrix> {
        let mut triplets = Vec::with_capacity(records.len());

        for record in records {
            if !record.weight.is_finite() || record.weight < 0.0 {
                return Err(InteractionError::InvalidWeight {
                    user_id: record.user_id,
                    item_id: record.item_id,
                    weight: record.weight,
                });
            }
            let user_idx = user_codec.encode(record.user_id)?;
            let item_idx = item_codec.encode(record.item_id)?;
            triplets.push((user_idx, item_idx, record.weight));
        }

        let matrix = InteractionMatrix::from_triplets(user_codec.len(), item_codec.len(), triplets);

        // Summing finite duplicates can still overflow to infinity
        for row in 0..matrix.num_rows() {
            let Some(view) = matrix.row(row) else { continue };
            if let Some((col, weight)) = view.iter().find(|(_, weight)| !weight.is_finite()) {
                return Err(InteractionError::InvalidWeight {
                    user_id: user_codec.decode(row)?,
                    item_id: item_codec.decode(col)?,
                    weight,
                });
            }
        }

        debug!(
            "Built {}x{} interaction matrix with {} non-zeros from {} records",
            matrix.num_rows(),
            matrix.num_cols(),
            matrix.nnz(),
            records.len()
        );
        Ok(matrix)
    }
}

/// Codecs and matrix fitted together from one record stream.
#[derive(Debug, Clone)]
pub struct InteractionData {
    pub users: IdentifierCodec,
    pub items: IdentifierCodec,
    pub matrix: InteractionMatrix,
}

impl InteractionData {
    /// Fit both codecs on the records and build the matrix.
    pub fn fit(records: &[InteractionRecord]) -> Result<Self> {
        let users = IdentifierCodec::fit(records.iter().map(|r| r.user_id));
        let items = IdentifierCodec::fit(records.iter().map(|r| r.item_id));
        let matrix = InteractionMatrixBuilder::build(records, &users, &items)?;
        Ok(Self {
            users,
            items,
            matrix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase_records() -> Vec<InteractionRecord> {
        vec![
            InteractionRecord::new(0, 101, 1.0),
            InteractionRecord::new(1, 101, 1.0),
            InteractionRecord::new(1, 102, 2.0),
            InteractionRecord::new(2, 103, 1.0),
            InteractionRecord::new(3, 102, 1.0),
            InteractionRecord::new(3, 104, 1.0),
        ]
    }

    #[test]
    fn test_fit_shape_and_dense_layout() {
        let data = InteractionData::fit(&purchase_records()).unwrap();

        assert_eq!(data.matrix.shape(), (4, 4));
        assert_eq!(data.matrix.nnz(), 6);
        assert_eq!(
            data.matrix.to_dense(),
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![1.0, 2.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
                vec![0.0, 1.0, 0.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_duplicates_are_summed() {
        let records = vec![
            InteractionRecord::new(1, 101, 1.0),
            InteractionRecord::new(1, 101, 2.0),
        ];
        let data = InteractionData::fit(&records).unwrap();

        let u = data.users.encode(1).unwrap();
        let i = data.items.encode(101).unwrap();
        assert_eq!(data.matrix.get(u, i), 3.0);
        assert_eq!(data.matrix.nnz(), 1);
    }

    #[test]
    fn test_zero_weights_not_stored() {
        let records = vec![
            InteractionRecord::new(1, 101, 0.0),
            InteractionRecord::new(1, 102, 1.0),
            InteractionRecord::new(2, 101, 0.0),
        ];
        let data = InteractionData::fit(&records).unwrap();

        assert_eq!(data.matrix.nnz(), 1);
        assert!(data.matrix.row(1).unwrap().is_empty());
        assert!(data.matrix.to_dense().iter().flatten().filter(|&&w| w != 0.0).count() == 1);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        for weight in [-1.0, f32::NAN, f32::INFINITY] {
            let records = vec![InteractionRecord::new(1, 101, weight)];
            let err = InteractionData::fit(&records).unwrap_err();
            assert!(matches!(err, InteractionError::InvalidWeight { user_id: 1, item_id: 101, .. }));
        }
    }

    #[test]
    fn test_overflowing_duplicate_sum_rejected() {
        let records = vec![
            InteractionRecord::new(0, 100, 1.0),
            InteractionRecord::new(1, 101, f32::MAX),
            InteractionRecord::new(1, 101, f32::MAX),
        ];
        let err = InteractionData::fit(&records).unwrap_err();
        assert_eq!(
            err,
            InteractionError::InvalidWeight {
                user_id: 1,
                item_id: 101,
                weight: f32::INFINITY,
            }
        );
    }

    #[test]
    fn test_unknown_identifier_from_foreign_codec() {
        let records = purchase_records();
        let users = IdentifierCodec::fit(vec![0, 1, 2]);
        let items = IdentifierCodec::fit(records.iter().map(|r| r.item_id));

        let err = InteractionMatrixBuilder::build(&records, &users, &items).unwrap_err();
        assert_eq!(err, InteractionError::UnknownIdentifier { id: 3 });
    }

    #[test]
    fn test_row_slice() {
        let data = InteractionData::fit(&purchase_records()).unwrap();
        let row = data.matrix.row(1).unwrap();

        assert_eq!(row.indices, &[0, 1]);
        assert_eq!(row.weights, &[1.0, 2.0]);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 2.0)]);
        assert!(data.matrix.row(4).is_none());
    }

    #[test]
    fn test_transpose() {
        let data = InteractionData::fit(&purchase_records()).unwrap();
        let transposed = data.matrix.transpose();

        assert_eq!(transposed.shape(), (4, 4));
        assert_eq!(transposed.nnz(), data.matrix.nnz());
        for u in 0..4 {
            for i in 0..4 {
                assert_eq!(transposed.get(i, u), data.matrix.get(u, i));
            }
        }
        // item 102 (index 1) was bought by users 1 and 3
        assert_eq!(transposed.row(1).unwrap().indices, &[1, 3]);
    }

    #[test]
    fn test_from_triplets_unsorted_input() {
        let matrix = InteractionMatrix::from_triplets(
            3,
            3,
            vec![(2, 0, 1.0), (0, 2, 1.0), (0, 1, 4.0), (2, 0, 0.5)],
        );
        assert_eq!(matrix.row(0).unwrap().indices, &[1, 2]);
        assert_eq!(matrix.get(2, 0), 1.5);
        assert!(matrix.row(1).unwrap().is_empty());
    }
}
