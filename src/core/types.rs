//! Core type definitions for ratings data

use crate::core::{RecError, Result};
use nalgebra::DMatrix;

/// Sparse users x products ratings matrix in compressed row form
///
/// A stored value is always a positive rating; every other cell is
/// "unrated" and reads as zero.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingsMatrix {
    n_users: usize,
    n_products: usize,
    /// Offsets into `products`/`values`, one per user plus a terminator
    row_ptr: Vec<usize>,
    /// Product index of each stored rating, sorted within a row
    products: Vec<usize>,
    /// Rating values, parallel to `products`
    values: Vec<u32>,
}

impl RatingsMatrix {
    /// Build a matrix from `(user, product, rating)` triplets
    ///
    /// Zero ratings are dropped. When the same cell appears more than once
    /// the last triplet wins.
    pub fn from_triplets(
        n_users: usize,
        n_products: usize,
        triplets: &[(usize, usize, u32)],
    ) -> Result<Self> {
        let mut rows: Vec<Vec<(usize, u32)>> = vec![Vec::new(); n_users];

        for &(user, product, rating) in triplets {
            if user >= n_users {
                return Err(RecError::InvalidParameter(format!(
                    "User index {user} out of range for {n_users} users"
                )));
            }
            if product >= n_products {
                return Err(RecError::InvalidParameter(format!(
                    "Product index {product} out of range for {n_products} products"
                )));
            }
            rows[user].push((product, rating));
        }

        let mut row_ptr = Vec::with_capacity(n_users + 1);
        let mut products = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for mut row in rows {
            // Stable sort keeps insertion order among duplicates, so the
            // last entry of each run is the most recent triplet.
            row.sort_by_key(|&(product, _)| product);
            for (i, &(product, rating)) in row.iter().enumerate() {
                let overwritten = row.get(i + 1).is_some_and(|&(next, _)| next == product);
                if overwritten || rating == 0 {
                    continue;
                }
                products.push(product);
                values.push(rating);
            }
            row_ptr.push(products.len());
        }

        Ok(Self {
            n_users,
            n_products,
            row_ptr,
            products,
            values,
        })
    }

    /// Build a matrix from dense rows, all of the same length
    pub fn from_dense(rows: &[Vec<u32>]) -> Result<Self> {
        let n_products = rows.first().map_or(0, Vec::len);
        let mut triplets = Vec::new();

        for (user, row) in rows.iter().enumerate() {
            if row.len() != n_products {
                return Err(RecError::DimensionMismatch {
                    expected: n_products,
                    actual: row.len(),
                });
            }
            triplets.extend(
                row.iter()
                    .enumerate()
                    .filter(|&(_, &rating)| rating > 0)
                    .map(|(product, &rating)| (user, product, rating)),
            );
        }

        Self::from_triplets(rows.len(), n_products, &triplets)
    }

    /// Number of users (rows)
    pub fn n_users(&self) -> usize {
        self.n_users
    }

    /// Number of products (columns)
    pub fn n_products(&self) -> usize {
        self.n_products
    }

    /// Number of stored (positive) ratings
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Check if the matrix holds no ratings at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the `(product, rating)` pairs stored for one user
    ///
    /// # Panics
    /// Panics if `user >= n_users()`
    pub fn row(&self, user: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        let range = self.row_ptr[user]..self.row_ptr[user + 1];
        self.products[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Dense ratings vector of one user, zero meaning unrated
    pub fn user_ratings(&self, user: usize) -> Result<Vec<u32>> {
        self.check_user(user)?;
        let mut dense = vec![0; self.n_products];
        for (product, rating) in self.row(user) {
            dense[product] = rating;
        }
        Ok(dense)
    }

    /// Rating of a single cell (0 if unrated)
    pub fn get(&self, user: usize, product: usize) -> u32 {
        if user >= self.n_users {
            return 0;
        }
        let start = self.row_ptr[user];
        let end = self.row_ptr[user + 1];
        match self.products[start..end].binary_search(&product) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0,
        }
    }

    /// Sub-matrix made of the given user rows, in the given order
    ///
    /// The product dimension is preserved.
    pub fn select_users(&self, users: &[usize]) -> Result<Self> {
        let mut row_ptr = Vec::with_capacity(users.len() + 1);
        let mut products = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for &user in users {
            self.check_user(user)?;
            let start = self.row_ptr[user];
            let end = self.row_ptr[user + 1];
            products.extend_from_slice(&self.products[start..end]);
            values.extend_from_slice(&self.values[start..end]);
            row_ptr.push(products.len());
        }

        Ok(Self {
            n_users: users.len(),
            n_products: self.n_products,
            row_ptr,
            products,
            values,
        })
    }

    /// Dense floating point copy of the matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.n_users, self.n_products);
        for user in 0..self.n_users {
            for (product, rating) in self.row(user) {
                dense[(user, product)] = f64::from(rating);
            }
        }
        dense
    }

    fn check_user(&self, user: usize) -> Result<()> {
        if user >= self.n_users {
            return Err(RecError::InvalidParameter(format!(
                "User index {user} out of range for {} users",
                self.n_users
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_matrix() -> RatingsMatrix {
        RatingsMatrix::from_dense(&[vec![5, 0, 3], vec![0, 0, 0], vec![1, 2, 0]])
            .expect("valid dense rows")
    }

    #[test]
    fn test_from_dense_shape() {
        let m = small_matrix();
        assert_eq!(m.n_users(), 3);
        assert_eq!(m.n_products(), 3);
        assert_eq!(m.nnz(), 4);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_from_dense_ragged_rows() {
        let result = RatingsMatrix::from_dense(&[vec![1, 2], vec![1]]);
        assert!(matches!(
            result,
            Err(RecError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_triplets_last_wins_and_zero_dropped() {
        let m = RatingsMatrix::from_triplets(2, 3, &[(0, 1, 2), (0, 1, 4), (1, 2, 0), (1, 0, 3)])
            .expect("valid triplets");

        assert_eq!(m.get(0, 1), 4);
        assert_eq!(m.get(1, 2), 0);
        assert_eq!(m.get(1, 0), 3);
        assert_eq!(m.nnz(), 2);
    }

    #[test]
    fn test_triplets_out_of_range() {
        assert!(RatingsMatrix::from_triplets(1, 1, &[(1, 0, 1)]).is_err());
        assert!(RatingsMatrix::from_triplets(1, 1, &[(0, 1, 1)]).is_err());
    }

    #[test]
    fn test_user_ratings_dense_row() {
        let m = small_matrix();
        assert_eq!(m.user_ratings(0).expect("user 0"), vec![5, 0, 3]);
        assert_eq!(m.user_ratings(1).expect("user 1"), vec![0, 0, 0]);
        assert!(m.user_ratings(3).is_err());
    }

    #[test]
    fn test_row_iterator_sorted() {
        let m = small_matrix();
        let row: Vec<_> = m.row(2).collect();
        assert_eq!(row, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_select_users_keeps_columns() {
        let m = small_matrix();
        let sub = m.select_users(&[2, 0]).expect("valid users");

        assert_eq!(sub.n_users(), 2);
        assert_eq!(sub.n_products(), 3);
        assert_eq!(sub.user_ratings(0).expect("row 0"), vec![1, 2, 0]);
        assert_eq!(sub.user_ratings(1).expect("row 1"), vec![5, 0, 3]);
        assert!(m.select_users(&[7]).is_err());
    }

    #[test]
    fn test_to_dense() {
        let dense = small_matrix().to_dense();
        assert_eq!(dense.nrows(), 3);
        assert_eq!(dense.ncols(), 3);
        assert_eq!(dense[(0, 0)], 5.0);
        assert_eq!(dense[(0, 1)], 0.0);
        assert_eq!(dense[(2, 1)], 2.0);
    }
}
