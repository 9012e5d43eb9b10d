//! The `.df` binary file format: one file holds one `DataFrame`.
//!
//! All multi-byte integers and floats are big-endian.
//!
//! ```text
//! magic "DFRM" (4B) | version u16 (2B) | mode (1B: 'd' default, 'n' nullable)
//! columnCount (varint)
//! per column: nameLen (varint) name (UTF-8) typeTag (1B) rowCount (varint)
//! per column payload: [null bitmap: ceil(rows/8) bytes, MSB first]? values
//! ```
//!
//! Fixed width values are packed at their native width, booleans are bit
//! packed MSB first, chars take one ASCII byte, and strings and binary
//! values are written as a varint length followed by their bytes. Null
//! slots carry the default value of the column type.
//!
//! A file may also hold the zlib compressed form of the above, which is
//! detected automatically when reading.
use crate::dataframe::{Column, ColumnData, DataFrame, DataType, Mode, NullMask};
use crate::error::{DataFrameError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

/// The first four bytes of every uncompressed `.df` file.
pub const MAGIC: &[u8; 4] = b"DFRM";

/// The format version written by this crate.
pub const VERSION: u16 = 1;

/// The file extension of the binary format.
pub const EXTENSION: &str = "df";

const MODE_DEFAULT: u8 = b'd';
const MODE_NULLABLE: u8 = b'n';

/// First byte of a zlib stream with the usual 32K window.
const ZLIB_CMF: u8 = 0x78;

/// Options for writing the binary format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Whether to zlib compress the encoded table
    pub compress: bool,
}

impl CodecOptions {
    pub fn new() -> Self {
        CodecOptions::default()
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

fn malformed(msg: impl Into<String>) -> DataFrameError {
    DataFrameError::MalformedFile(msg.into())
}

fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn write_bits(buf: &mut Vec<u8>, bits: impl Iterator<Item = bool>) {
    let mut byte = 0u8;
    let mut n = 0;
    for bit in bits {
        if bit {
            byte |= 0x80 >> n;
        }
        n += 1;
        if n == 8 {
            buf.push(byte);
            byte = 0;
            n = 0;
        }
    }
    if n > 0 {
        buf.push(byte);
    }
}

/// The number of bytes holding `bits` packed bits.
fn packed_len(bits: usize) -> usize {
    bits / 8 + usize::from(bits % 8 != 0)
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_column(buf: &mut Vec<u8>, col: &Column) -> Result<()> {
    let mask = col.null_mask();
    let is_null = |i: usize| mask.map_or(false, |m| m.get(i));
    if let Some(mask) = mask {
        write_bits(buf, mask.iter());
    }

    macro_rules! fixed {
        ($v:ident, $write:ident) => {
            for (i, x) in $v.iter().enumerate() {
                buf.$write::<BigEndian>(if is_null(i) { Default::default() } else { *x })?;
            }
        };
    }

    match col.data() {
        ColumnData::Byte(v) => {
            for (i, x) in v.iter().enumerate() {
                buf.write_i8(if is_null(i) { 0 } else { *x })?;
            }
        }
        ColumnData::Short(v) => fixed!(v, write_i16),
        ColumnData::Int(v) => fixed!(v, write_i32),
        ColumnData::Long(v) => fixed!(v, write_i64),
        ColumnData::Float(v) => fixed!(v, write_f32),
        ColumnData::Double(v) => fixed!(v, write_f64),
        ColumnData::Boolean(v) => {
            write_bits(buf, v.iter().enumerate().map(|(i, b)| *b && !is_null(i)))
        }
        ColumnData::Char(v) => {
            for (i, c) in v.iter().enumerate() {
                buf.push(if is_null(i) { 0 } else { *c });
            }
        }
        ColumnData::String(v) => {
            for (i, s) in v.iter().enumerate() {
                write_bytes(buf, if is_null(i) { b"" } else { s.as_bytes() });
            }
        }
        ColumnData::Binary(v) => {
            for (i, b) in v.iter().enumerate() {
                write_bytes(buf, if is_null(i) { &[] } else { b });
            }
        }
    }
    Ok(())
}

/// Encodes `df` into the binary format.
pub fn serialize(df: &DataFrame) -> Result<Vec<u8>> {
    serialize_with(df, &CodecOptions::default())
}

/// Encodes `df` into the binary format using the given `options`.
pub fn serialize_with(df: &DataFrame, options: &CodecOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.write_u16::<BigEndian>(VERSION)?;
    buf.push(if df.is_nullable() {
        MODE_NULLABLE
    } else {
        MODE_DEFAULT
    });
    write_varint(&mut buf, df.n_cols() as u64);
    for col in df.columns() {
        write_bytes(&mut buf, col.name().as_bytes());
        buf.push(col.data_type().type_code(col.is_nullable()));
        write_varint(&mut buf, col.len() as u64);
    }
    for col in df.columns() {
        encode_column(&mut buf, col)?;
    }

    if options.compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&buf)?;
        let compressed = encoder.finish()?;
        debug!(
            "compressed table from {} to {} bytes",
            buf.len(),
            compressed.len()
        );
        Ok(compressed)
    } else {
        Ok(buf)
    }
}

/// A cursor over encoded bytes that reports running out of data as a
/// `MalformedFile` error.
struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader {
            cursor: Cursor::new(bytes),
        }
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len();
        len.saturating_sub(self.cursor.position() as usize)
    }

    fn truncated(what: &str) -> DataFrameError {
        malformed(format!("unexpected end of data while reading {}", what))
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        self.cursor.read_u8().map_err(|_| Reader::truncated(what))
    }

    fn varint(&mut self, what: &str) -> Result<usize> {
        let mut value: u64 = 0;
        for shift in (0..64).step_by(7) {
            let byte = self.u8(what)?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return usize::try_from(value)
                    .map_err(|_| malformed(format!("{} {} is too large", what, value)));
            }
        }
        Err(malformed(format!("varint for {} is too long", what)))
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Reader::truncated(what));
        }
        let start = self.cursor.position() as usize;
        let bytes = *self.cursor.get_ref();
        self.cursor.set_position((start + n) as u64);
        Ok(&bytes[start..start + n])
    }

    fn bytes(&mut self, what: &str) -> Result<&'a [u8]> {
        let n = self.varint(what)?;
        self.take(n, what)
    }

    fn bits(&mut self, n: usize, what: &str) -> Result<Vec<bool>> {
        let packed = self.take(packed_len(n), what)?;
        Ok((0..n)
            .map(|i| packed[i / 8] & (0x80 >> (i % 8)) != 0)
            .collect())
    }
}

struct ColumnHeader {
    name: String,
    data_type: DataType,
    nullable: bool,
    rows: usize,
}

impl ColumnHeader {
    /// The fewest payload bytes a column with this header can occupy.
    fn min_payload(&self) -> usize {
        let bitmap = if self.nullable { packed_len(self.rows) } else { 0 };
        let values = match self.data_type {
            DataType::Boolean => packed_len(self.rows),
            // one length byte per value
            DataType::String | DataType::Binary => self.rows,
            t => t.width().saturating_mul(self.rows),
        };
        bitmap.saturating_add(values)
    }
}

fn decode_column(reader: &mut Reader<'_>, header: ColumnHeader) -> Result<Column> {
    if header.min_payload() > reader.remaining() {
        return Err(malformed(format!(
            "column '{}' claims {} rows but only {} bytes remain",
            header.name,
            header.rows,
            reader.remaining()
        )));
    }
    let rows = header.rows;
    let what = format!("column '{}'", header.name);
    let nulls = if header.nullable {
        Some(NullMask::from_bools(&reader.bits(rows, &what)?))
    } else {
        None
    };

    macro_rules! fixed {
        ($variant:ident, $read:ident) => {{
            let mut v = Vec::with_capacity(rows);
            for _ in 0..rows {
                v.push(
                    reader
                        .cursor
                        .$read::<BigEndian>()
                        .map_err(|_| Reader::truncated(&what))?,
                );
            }
            ColumnData::$variant(v)
        }};
    }

    let data = match header.data_type {
        DataType::Byte => {
            let mut v = Vec::with_capacity(rows);
            for _ in 0..rows {
                v.push(reader.u8(&what)? as i8);
            }
            ColumnData::Byte(v)
        }
        DataType::Short => fixed!(Short, read_i16),
        DataType::Int => fixed!(Int, read_i32),
        DataType::Long => fixed!(Long, read_i64),
        DataType::Float => fixed!(Float, read_f32),
        DataType::Double => fixed!(Double, read_f64),
        DataType::Boolean => ColumnData::Boolean(reader.bits(rows, &what)?),
        DataType::Char => {
            let bytes = reader.take(rows, &what)?;
            if let Some(c) = bytes.iter().find(|c| !c.is_ascii()) {
                return Err(malformed(format!("{}: byte {:#04x} is not ASCII", what, c)));
            }
            ColumnData::Char(bytes.to_vec())
        }
        DataType::String => {
            let mut v = Vec::with_capacity(rows);
            for _ in 0..rows {
                let bytes = reader.bytes(&what)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| malformed(format!("{}: {}", what, e)))?;
                v.push(s.to_string());
            }
            ColumnData::String(v)
        }
        DataType::Binary => {
            let mut v = Vec::with_capacity(rows);
            for _ in 0..rows {
                v.push(reader.bytes(&what)?.to_vec());
            }
            ColumnData::Binary(v)
        }
    };
    Ok(Column::from_parts(header.name, data, nulls))
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| malformed(format!("invalid zlib stream: {}", e)))?;
    Ok(out)
}

/// Decodes a `DataFrame` from the binary format. Compressed input is
/// detected and inflated first.
pub fn deserialize(bytes: &[u8]) -> Result<DataFrame> {
    if !bytes.starts_with(MAGIC) && bytes.first() == Some(&ZLIB_CMF) {
        let inflated = inflate(bytes)?;
        debug!("inflated {} bytes to {}", bytes.len(), inflated.len());
        return decode(&inflated);
    }
    decode(bytes)
}

fn decode(bytes: &[u8]) -> Result<DataFrame> {
    let mut reader = Reader::new(bytes);
    if reader.take(MAGIC.len(), "magic")? != MAGIC {
        return Err(malformed("missing DFRM magic"));
    }
    let version = reader
        .cursor
        .read_u16::<BigEndian>()
        .map_err(|_| Reader::truncated("version"))?;
    if version == 0 || version > VERSION {
        return Err(malformed(format!("unsupported format version {}", version)));
    }
    let mode = match reader.u8("mode")? {
        MODE_DEFAULT => Mode::Default,
        MODE_NULLABLE => Mode::Nullable,
        other => return Err(malformed(format!("unknown table mode {:#04x}", other))),
    };

    let n_cols = reader.varint("column count")?;
    // every column header takes at least three bytes
    if n_cols > reader.remaining() / 3 {
        return Err(malformed(format!("column count {} exceeds the data", n_cols)));
    }
    let mut headers: Vec<ColumnHeader> = Vec::with_capacity(n_cols);
    for i in 0..n_cols {
        let name = std::str::from_utf8(reader.bytes("column name")?)
            .map_err(|e| malformed(format!("column name {}: {}", i, e)))?
            .to_string();
        let tag = reader.u8("type tag")?;
        let (data_type, nullable) = DataType::from_type_code(tag).ok_or_else(|| {
            malformed(format!("column '{}' has unknown type tag {}", name, tag))
        })?;
        if nullable != mode.is_nullable() {
            return Err(malformed(format!(
                "column '{}' has type tag {} which disagrees with the table mode",
                name, tag
            )));
        }
        let rows = reader.varint("row count")?;
        if let Some(first) = headers.first() {
            if first.rows != rows {
                return Err(malformed(format!(
                    "column '{}' has {} rows but column '{}' has {}",
                    name, rows, first.name, first.rows
                )));
            }
        }
        headers.push(ColumnHeader {
            name,
            data_type,
            nullable,
            rows,
        });
    }

    let mut columns = Vec::with_capacity(n_cols);
    for header in headers {
        columns.push(decode_column(&mut reader, header)?);
    }
    if reader.remaining() > 0 {
        return Err(malformed(format!(
            "{} trailing bytes after the last column",
            reader.remaining()
        )));
    }
    DataFrame::from_columns(mode, columns).map_err(|e| malformed(e.to_string()))
}

/// Encodes `df` as standard base64 text.
pub fn to_base64(df: &DataFrame) -> Result<String> {
    Ok(STANDARD.encode(serialize(df)?))
}

/// Decodes a `DataFrame` from base64 text produced by `to_base64`.
pub fn from_base64(text: &str) -> Result<DataFrame> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| malformed(format!("invalid base64: {}", e)))?;
    deserialize(&bytes)
}

fn in_file(path: &Path, err: DataFrameError) -> DataFrameError {
    match err {
        DataFrameError::MalformedFile(msg) => {
            malformed(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}

/// Writes `df` to the file at `path`, replacing it if it exists.
pub fn write_file(path: impl AsRef<Path>, df: &DataFrame) -> Result<()> {
    write_file_with(path, df, &CodecOptions::default())
}

/// Writes `df` to the file at `path` using the given `options`.
pub fn write_file_with(
    path: impl AsRef<Path>,
    df: &DataFrame,
    options: &CodecOptions,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = serialize_with(df, options)?;
    fs::write(path, &bytes)?;
    info!(
        "wrote {} rows x {} columns ({} bytes) to {}",
        df.n_rows(),
        df.n_cols(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Reads a `DataFrame` from the file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let df = deserialize(&bytes).map_err(|e| in_file(path, e))?;
    info!(
        "read {} rows x {} columns from {}",
        df.n_rows(),
        df.n_cols(),
        path.display()
    );
    Ok(df)
}

/// Writes every table of `tables` to `<dir>/<name>.df`, creating `dir` if
/// needed. A name that already ends in `.df` is used as is.
pub fn write_dir(dir: impl AsRef<Path>, tables: &BTreeMap<String, DataFrame>) -> Result<()> {
    let dir = dir.as_ref();
    let suffix = format!(".{}", EXTENSION);
    let mut files: BTreeMap<String, &str> = BTreeMap::new();
    for name in tables.keys() {
        let stem = name.strip_suffix(&suffix).unwrap_or(name);
        if stem.is_empty() || name.contains(['/', '\\']) {
            return Err(DataFrameError::InvalidArgument(format!(
                "invalid table file name '{}'",
                name
            )));
        }
        let file_name = format!("{}{}", stem, suffix);
        if let Some(other) = files.insert(file_name.clone(), name) {
            return Err(DataFrameError::InvalidArgument(format!(
                "tables '{}' and '{}' would both be written to {}",
                other, name, file_name
            )));
        }
    }

    fs::create_dir_all(dir)?;
    for (file_name, name) in &files {
        write_file(dir.join(file_name), &tables[*name])?;
    }
    info!("wrote {} tables to {}", tables.len(), dir.display());
    Ok(())
}

/// Reads every `.df` file in `dir`, keyed by file stem. A file that fails
/// to decode only fails its own entry. Other files are skipped.
pub fn read_dir(dir: impl AsRef<Path>) -> Result<BTreeMap<String, Result<DataFrame>>> {
    let dir = dir.as_ref();
    let mut tables = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_table = path.is_file()
            && path.extension().map_or(false, |ext| ext == EXTENSION);
        let stem = path.file_stem().and_then(|s| s.to_str());
        match stem {
            Some(stem) if is_table => {
                let result = read_file(&path);
                if let Err(e) = &result {
                    warn!("failed to read {}: {}", path.display(), e);
                }
                tables.insert(stem.to_string(), result);
            }
            _ => debug!("skipping {}", path.display()),
        }
    }
    info!("read {} tables from {}", tables.len(), dir.display());
    Ok(tables)
}

/// Like `read_dir`, but fails on the first file that cannot be decoded.
pub fn read_dir_strict(dir: impl AsRef<Path>) -> Result<BTreeMap<String, DataFrame>> {
    read_dir(dir)?
        .into_iter()
        .map(|(name, result)| result.map(|df| (name, df)))
        .collect()
}
