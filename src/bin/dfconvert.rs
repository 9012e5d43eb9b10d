use clap::Parser;
use colframe::dataframe::DataType;
use colframe::error::{DataFrameError, Result};
use colframe::io::{self, CodecOptions, CsvOptions};
use log::{info, Level};
use std::path::Path;

/// Converts tables between CSV and the binary `.df` format. The direction
/// is chosen by the file extensions of the input and output.
#[derive(Parser)]
#[command(version = "1.0")]
struct Opts {
    /// The file to read, ending in `.csv` or `.df`
    input: String,
    /// The file to write, ending in `.csv` or `.df`
    output: String,
    /// The CSV field separator
    #[arg(short = 's', long = "separator", default_value_t = ',')]
    separator: char,
    /// The CSV text of a null cell
    #[arg(short = 'n', long = "null", default_value = "null")]
    null_token: String,
    /// Comma separated column types of the CSV input, e.g. `int,string`
    #[arg(short = 't', long = "types")]
    types: Option<String>,
    /// Write `name:type` CSV headers
    #[arg(short = 'a', long = "annotate")]
    annotate: bool,
    /// Compress `.df` output with zlib
    #[arg(short = 'z', long = "compress")]
    compress: bool,
    /// Log progress, twice to log debug output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Binary,
}

fn format_of(path: &str) -> Result<Format> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(Format::Csv),
        Some(io::binary::EXTENSION) => Ok(Format::Binary),
        _ => Err(DataFrameError::InvalidArgument(format!(
            "'{}' is neither a .csv nor a .df file",
            path
        ))),
    }
}

fn csv_options(opts: &Opts) -> Result<CsvOptions> {
    if !opts.separator.is_ascii() {
        return Err(DataFrameError::InvalidArgument(format!(
            "separator {:?} is not ASCII",
            opts.separator
        )));
    }
    let mut csv = CsvOptions::new()
        .separator(opts.separator as u8)
        .null_token(opts.null_token.as_str())
        .annotate_types(opts.annotate);
    if let Some(types) = &opts.types {
        let types = types
            .split(',')
            .map(str::parse::<DataType>)
            .collect::<Result<Vec<DataType>>>()?;
        csv = csv.types(types);
    }
    Ok(csv)
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();
    let level = match opts.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        _ => Level::Debug,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let csv = csv_options(&opts)?;
    let df = match format_of(&opts.input)? {
        Format::Csv => io::read_csv(&opts.input, &csv)?,
        Format::Binary => io::read_file(&opts.input)?,
    };
    match format_of(&opts.output)? {
        Format::Csv => io::write_csv(&opts.output, &df, &csv)?,
        Format::Binary => {
            let codec = CodecOptions::new().compress(opts.compress);
            io::write_file_with(&opts.output, &df, &codec)?
        }
    }
    info!("converted {} to {}", opts.input, opts.output);
    Ok(())
}
