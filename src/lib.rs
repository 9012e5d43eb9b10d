//! # colframe
//!
//! An in-memory, typed, columnar `DataFrame`. Every column stores its values
//! in a buffer of a single primitive type, with an optional null mask, and a
//! `DataFrame` is an ordered set of equally long named columns.
//!
//! Tables can be stored in a compact binary `.df` format, batch read from
//! and written to directories of such files, and exchanged as CSV. See the
//! [`io`] module.
//!
//! ```
//! use colframe::dataframe::{Column, DataFrame, Mode};
//!
//! let mut df = DataFrame::new(Mode::Default);
//! df.add_column(Column::from_vec("A", vec![1, 2, 3]).unwrap()).unwrap();
//! df.add_column(Column::from_vec("C", vec!["cat", "dog", "horse"]).unwrap())
//!     .unwrap();
//!
//! let big = df
//!     .filter_by(|row| row.get("A").unwrap().as_i64() > Some(1))
//!     .unwrap();
//! assert_eq!(big.n_rows(), 2);
//! assert_eq!(df.index_of("C", "dog").unwrap(), Some(1));
//!
//! let bytes = colframe::io::serialize(&df).unwrap();
//! assert_eq!(colframe::io::deserialize(&bytes).unwrap(), df);
//! ```

pub mod dataframe;
pub mod error;
pub mod io;

pub use dataframe::{Column, DataFrame, DataType, Mode, Value};
pub use error::{DataFrameError, Result};
