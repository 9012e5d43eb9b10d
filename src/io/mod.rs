//! Reading and writing `DataFrame`s: the compact `.df` binary format, whole
//! directories of `.df` files, and CSV text.

pub mod binary;
pub use binary::{
    deserialize, from_base64, read_dir, read_dir_strict, read_file, serialize,
    serialize_with, to_base64, write_dir, write_file, write_file_with,
    CodecOptions,
};

pub mod csv;
pub use self::csv::{
    read_csv, read_csv_from, to_csv_string, write_csv, write_csv_to, CsvOptions,
};
