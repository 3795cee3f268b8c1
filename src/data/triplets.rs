//! Rating triplet files
//!
//! Supports loading ratings from delimited text where every line is:
//! user<sep>product<sep>rating[<sep>ignored...]
//!
//! The separator is detected per line among `::`, tab, comma and
//! whitespace, which covers the common MovieLens layouts:
//! 196	242	3	881250949
//! 1::1193::5::978300760
//! userId,movieId,rating,timestamp

use crate::core::{RatingsMatrix, RecError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Ratings matrix together with the original user and product labels
#[derive(Debug, Clone)]
pub struct RatingsDataset {
    matrix: RatingsMatrix,
    user_ids: Vec<String>,
    product_ids: Vec<String>,
}

/// Label to dense index mapping in first-seen order
#[derive(Default)]
struct IdMap {
    index: HashMap<String, usize>,
    labels: Vec<String>,
}

impl IdMap {
    fn intern(&mut self, label: &str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.labels.len();
        self.index.insert(label.to_string(), i);
        self.labels.push(label.to_string());
        i
    }
}

impl RatingsDataset {
    /// Load a dataset from a triplet file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(RecError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut users = IdMap::default();
        let mut products = IdMap::default();
        let mut triplets = Vec::new();
        let mut first_data_line = true;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(RecError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields = split_fields(line);
            if first_data_line {
                first_data_line = false;
                if Self::is_header(&fields) {
                    continue;
                }
            }

            let (user, product, rating) = Self::parse_fields(&fields).map_err(|e| {
                RecError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            triplets.push((users.intern(user), products.intern(product), rating));
        }

        if triplets.is_empty() {
            return Err(RecError::EmptyDataset);
        }

        let matrix =
            RatingsMatrix::from_triplets(users.labels.len(), products.labels.len(), &triplets)?;
        Ok(Self {
            matrix,
            user_ids: users.labels,
            product_ids: products.labels,
        })
    }

    /// A header line has a non-numeric rating column
    fn is_header(fields: &[&str]) -> bool {
        fields
            .get(2)
            .is_some_and(|rating| rating.parse::<f64>().is_err())
    }

    fn parse_fields<'a>(fields: &[&'a str]) -> std::result::Result<(&'a str, &'a str, u32), String> {
        match fields {
            [user, product, rating, ..] => Ok((*user, *product, parse_rating(rating)?)),
            _ => Err(format!("expected at least 3 fields, got {}", fields.len())),
        }
    }

    /// The ratings matrix
    pub fn matrix(&self) -> &RatingsMatrix {
        &self.matrix
    }

    /// Consume the dataset and return the ratings matrix
    pub fn into_matrix(self) -> RatingsMatrix {
        self.matrix
    }

    /// Original user labels, indexed by matrix row
    pub fn user_ids(&self) -> &[String] {
        &self.user_ids
    }

    /// Original product labels, indexed by matrix column
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    /// Matrix row of a user label
    pub fn user_index(&self, label: &str) -> Option<usize> {
        self.user_ids.iter().position(|id| id == label)
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    let fields: Vec<&str> = if line.contains("::") {
        line.split("::").collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains(',') {
        line.split(',').collect()
    } else {
        line.split_whitespace().collect()
    };
    fields.into_iter().map(str::trim).collect()
}

/// Parse a non-negative integral rating; "4" and "4.0" are both accepted
fn parse_rating(field: &str) -> std::result::Result<u32, String> {
    if let Ok(rating) = field.parse::<u32>() {
        return Ok(rating);
    }
    match field.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) => {
            Ok(value as u32)
        }
        _ => Err(format!("Invalid rating: {field}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_tab_separated_with_timestamps() {
        let data = "196\t242\t3\t881250949\n186\t302\t3\t891717742\n196\t302\t5\t881250949\n";
        let dataset = RatingsDataset::from_reader(Cursor::new(data)).unwrap();

        let m = dataset.matrix();
        assert_eq!(m.n_users(), 2);
        assert_eq!(m.n_products(), 2);
        assert_eq!(m.nnz(), 3);
        assert_eq!(dataset.user_ids(), &["196", "186"]);
        assert_eq!(dataset.product_ids(), &["242", "302"]);
        assert_eq!(m.get(0, 1), 5);
        assert_eq!(m.get(1, 0), 0);
    }

    #[test]
    fn test_double_colon_separated() {
        let data = "1::1193::5::978300760\n1::661::3::978302109\n2::1193::4::978298413\n";
        let dataset = RatingsDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.matrix().n_users(), 2);
        assert_eq!(dataset.matrix().get(1, 0), 4);
    }

    #[test]
    fn test_csv_with_header_and_float_ratings() {
        let data = "userId,movieId,rating,timestamp\n1,31,2.0,1260759144\n1,1029,3.0,1260759179\n";
        let dataset = RatingsDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.matrix().nnz(), 2);
        assert_eq!(dataset.matrix().get(0, 1), 3);
    }

    #[test]
    fn test_whitespace_comments_and_blank_lines() {
        let data = "# users products ratings\n\na x 1\nb y 2\n\n# trailing\n";
        let dataset = RatingsDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.matrix().nnz(), 2);
        assert_eq!(dataset.user_index("b"), Some(1));
        assert_eq!(dataset.user_index("c"), None);
    }

    #[test]
    fn test_invalid_ratings() {
        assert!(RatingsDataset::from_reader(Cursor::new("1,2,3\n1,3,3.5\n")).is_err());
        assert!(RatingsDataset::from_reader(Cursor::new("1,2,3\n1,3,-1\n")).is_err());
        assert!(RatingsDataset::from_reader(Cursor::new("1,2,3\n1,3\n")).is_err());
    }

    #[test]
    fn test_empty_input() {
        let result = RatingsDataset::from_reader(Cursor::new("# nothing here\n\n"));
        assert!(matches!(result, Err(RecError::EmptyDataset)));
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4"), Ok(4));
        assert_eq!(parse_rating("4.0"), Ok(4));
        assert!(parse_rating("4.5").is_err());
        assert!(parse_rating("five").is_err());
    }
}
