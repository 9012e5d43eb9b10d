//! Reading and writing a `DataFrame` as delimited text.
//!
//! The first record holds the column names, each optionally annotated with
//! its type as `name:type`. Every following record is one row. Cells equal
//! to the configured null token are null, and binary cells are lowercase
//! hex.
use crate::dataframe::{parse_text, Column, DataFrame, DataType, Mode, Schema, Value};
use crate::error::{DataFrameError, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Options for reading and writing CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    /// The field delimiter
    pub separator: u8,
    /// Whether the first record holds the column names
    pub header: bool,
    /// The cell text that denotes a null value
    pub null_token: String,
    /// Column types to use instead of inferring them
    pub types: Option<Vec<DataType>>,
    /// Whether to write column names as `name:type`
    pub annotate_types: bool,
    /// The mode of tables read. When unset, a table is nullable exactly
    /// when the input holds a null token.
    pub mode: Option<Mode>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            separator: b',',
            header: true,
            null_token: "null".to_string(),
            types: None,
            annotate_types: false,
            mode: None,
        }
    }
}

impl CsvOptions {
    pub fn new() -> Self {
        CsvOptions::default()
    }

    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn null_token(mut self, null_token: impl Into<String>) -> Self {
        self.null_token = null_token.into();
        self
    }

    pub fn types(mut self, types: Vec<DataType>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn annotate_types(mut self, annotate_types: bool) -> Self {
        self.annotate_types = annotate_types;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Splits a header cell into a column name and an optional type
/// annotation. A suffix that is not a type name is part of the name.
fn parse_header(cell: &str) -> (String, Option<DataType>) {
    match cell.rsplit_once(':') {
        Some((name, ty)) => match ty.trim().parse() {
            Ok(ty) => (name.trim().to_string(), Some(ty)),
            Err(_) => (cell.trim().to_string(), None),
        },
        None => (cell.trim().to_string(), None),
    }
}

/// Picks the first of int, long, double and boolean that can hold every
/// non-null cell, falling back to string.
fn infer_type<'a>(cells: impl Iterator<Item = &'a str>) -> DataType {
    let candidates = [
        DataType::Int,
        DataType::Long,
        DataType::Double,
        DataType::Boolean,
    ];
    let mut fits = [true; 4];
    let mut seen = false;
    for cell in cells {
        seen = true;
        for (fit, ty) in fits.iter_mut().zip(candidates.iter()) {
            *fit = *fit && parse_text(cell, *ty).is_some() && !is_fractional(cell, *ty);
        }
        if !fits.iter().any(|f| *f) {
            return DataType::String;
        }
    }
    if !seen {
        return DataType::String;
    }
    candidates
        .iter()
        .zip(fits.iter())
        .find(|(_, fit)| **fit)
        .map_or(DataType::String, |(ty, _)| *ty)
}

// integral inference only accepts integer literals, "3.0" is a double
fn is_fractional(cell: &str, ty: DataType) -> bool {
    ty.is_integral() && cell.trim().parse::<i64>().is_err()
}

/// Whether `record` is a line holding nothing but unquoted whitespace.
/// `text` is the whole input, used to tell `"  "` from `  `.
fn is_blank(record: &StringRecord, text: &[u8]) -> bool {
    if record.len() != 1 || !record[0].trim().is_empty() {
        return false;
    }
    let start = record.position().map_or(0, |p| p.byte() as usize);
    let rest = text.get(start..).unwrap_or_default();
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    !rest[..end].contains(&b'"')
}

/// Reads a `DataFrame` from the CSV file at `path`.
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = read_csv_from(File::open(path)?, options)?;
    info!(
        "read {} rows x {} columns from {}",
        df.n_rows(),
        df.n_cols(),
        path.display()
    );
    Ok(df)
}

/// Reads a `DataFrame` from CSV text supplied by `reader`.
pub fn read_csv_from<R: Read>(mut reader: R, options: &CsvOptions) -> Result<DataFrame> {
    let mut text = Vec::new();
    reader.read_to_end(&mut text)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.separator)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_slice());
    let mut records = rdr.records();

    let first = match records.next() {
        Some(record) => record?,
        None => return Ok(DataFrame::new(options.mode.unwrap_or_default())),
    };
    let (names, annotated, mut pending): (Vec<String>, Vec<Option<DataType>>, _) =
        if options.header {
            let (names, types) = first.iter().map(parse_header).unzip();
            (names, types, None)
        } else {
            let names = (0..first.len()).map(|i| format!("column_{}", i)).collect();
            (names, vec![None; first.len()], Some(first))
        };
    let width = names.len();

    let mut rows: Vec<StringRecord> = Vec::new();
    loop {
        let record = match pending.take() {
            Some(record) => record,
            None => match records.next() {
                Some(record) => record?,
                None => break,
            },
        };
        let line = record.position().map_or(0, |p| p.line());
        if is_blank(&record, &text) {
            debug!("skipping blank line {}", line);
            continue;
        }
        if record.len() != width {
            return Err(DataFrameError::SchemaMismatch(format!(
                "line {}: expected {} fields, found {}",
                line,
                width,
                record.len()
            )));
        }
        rows.push(record);
    }

    let types: Vec<DataType> = match &options.types {
        Some(types) if types.len() != width => {
            return Err(DataFrameError::SchemaMismatch(format!(
                "{} column types declared for {} columns",
                types.len(),
                width
            )))
        }
        Some(types) => types.clone(),
        None => annotated
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                ty.unwrap_or_else(|| {
                    infer_type(
                        rows.iter()
                            .map(|r| &r[i])
                            .filter(|cell| *cell != options.null_token),
                    )
                })
            })
            .collect(),
    };

    let has_nulls = rows
        .iter()
        .any(|r| r.iter().any(|cell| cell == options.null_token));
    let mode = options.mode.unwrap_or(Mode::from_nullable(has_nulls));

    let mut schema = Schema::new(mode);
    for (name, ty) in names.iter().zip(types.iter()) {
        schema.add_column(*ty, name.as_str())?;
    }

    let mut columns = Vec::with_capacity(width);
    for (i, (name, ty)) in schema.iter().enumerate() {
        let mut col = Column::with_capacity(name, ty, mode.is_nullable(), rows.len());
        for (row, record) in rows.iter().enumerate() {
            let cell = &record[i];
            let value = if cell == options.null_token {
                Value::Null
            } else {
                parse_text(cell, ty).ok_or_else(|| {
                    DataFrameError::TypeMismatch(format!(
                        "row {}, column '{}': expected {}, found '{}'",
                        row + 1,
                        name,
                        ty,
                        cell
                    ))
                })?
            };
            col.append(value)?;
        }
        columns.push(col);
    }
    DataFrame::from_columns(mode, columns)
}

/// Writes `df` as CSV to the file at `path`, replacing it if it exists.
pub fn write_csv(path: impl AsRef<Path>, df: &DataFrame, options: &CsvOptions) -> Result<()> {
    let path = path.as_ref();
    write_csv_to(File::create(path)?, df, options)?;
    info!(
        "wrote {} rows x {} columns to {}",
        df.n_rows(),
        df.n_cols(),
        path.display()
    );
    Ok(())
}

/// Writes `df` as CSV to `writer`.
pub fn write_csv_to<W: Write>(writer: W, df: &DataFrame, options: &CsvOptions) -> Result<()> {
    // a lone whitespace cell would read back as a blank line
    let quote_style = if df.n_cols() == 1 {
        QuoteStyle::NonNumeric
    } else {
        QuoteStyle::Necessary
    };
    let mut wtr = WriterBuilder::new()
        .delimiter(options.separator)
        .quote_style(quote_style)
        .from_writer(writer);

    if options.header {
        let header: Vec<String> = df
            .columns()
            .iter()
            .map(|col| {
                if options.annotate_types {
                    format!("{}:{}", col.name(), col.data_type())
                } else {
                    col.name().to_string()
                }
            })
            .collect();
        wtr.write_record(&header)?;
    }

    let mut record = Vec::with_capacity(df.n_cols());
    for row in 0..df.n_rows() {
        record.clear();
        for col in df.columns() {
            let value = col.get(row)?;
            record.push(if value.is_null() {
                options.null_token.clone()
            } else {
                value.to_string()
            });
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders `df` as a CSV string.
pub fn to_csv_string(df: &DataFrame, options: &CsvOptions) -> Result<String> {
    let mut buf = Vec::new();
    write_csv_to(&mut buf, df, options)?;
    String::from_utf8(buf).map_err(|e| DataFrameError::InvalidArgument(e.to_string()))
}
