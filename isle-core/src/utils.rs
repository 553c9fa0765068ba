use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::errors::{GenomeTableError, ReadParseError};
use crate::models::{Read, Strand};

fn open_dynamic(path: &Path) -> io::Result<BufReader<Box<dyn io::Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn io::Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn io::Read>>> {
    open_dynamic(path).with_context(|| format!("Failed to open file: {:?}", path))
}

/// Get a reader for either a gzipped, non-gzipped file, or stdin
///
/// # Arguments
///
/// - file_path: path to the file to read, or '-' for stdin
///
/// # Returns
///
/// A `BufReader` object for a given file path or stdin.
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn io::Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(io::stdin()) as Box<dyn io::Read>))
    } else {
        let file_path = Path::new(file_path_str);
        get_dynamic_reader(file_path)
    }
}

///
/// Get a writer for a file path, gzip-compressing when it ends in `.gz`, or
/// stdout for `-`.
///
pub fn get_dynamic_writer(file_path_str: &str) -> Result<Box<dyn Write>> {
    if file_path_str == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }

    let path = Path::new(file_path_str);
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    let writer: Box<dyn Write> = match path.extension() == Some(OsStr::new("gz")) {
        true => Box::new(GzEncoder::new(BufWriter::new(file), Compression::default())),
        false => Box::new(BufWriter::new(file)),
    };

    Ok(writer)
}

///
/// Read a chrom sizes file (`name<whitespace>length` per line) keeping the
/// order of the lines. Blank lines and `#` comments are skipped.
///
pub fn read_chrom_sizes<T: AsRef<Path>>(path: T) -> Result<Vec<(String, u64)>, GenomeTableError> {
    let reader = open_dynamic(path.as_ref())?;
    let mut chrom_sizes = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let parsed = match (parts.next(), parts.next().map(str::parse::<u64>)) {
            (Some(chr), Some(Ok(length))) => Some((chr.to_string(), length)),
            _ => None,
        };

        match parsed {
            Some(entry) => chrom_sizes.push(entry),
            None => {
                return Err(GenomeTableError::ChromSizesParseError {
                    line: idx + 1,
                    content: line.clone(),
                });
            }
        }
    }

    Ok(chrom_sizes)
}

///
/// Parse one BED6 line into a [Read] anchored at its 5' end.
///
/// Forward reads start at `start`, reverse reads at `end - 1`. Returns
/// `Ok(None)` for header lines.
///
pub fn parse_read_line(line: &str, line_number: usize) -> Result<Option<Read>, ReadParseError> {
    let line = line.trim_end();
    if line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
    {
        return Ok(None);
    }

    let malformed = |reason: String| ReadParseError::MalformedLine {
        line: line_number,
        reason,
    };

    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 6 {
        return Err(malformed(format!(
            "expected at least 6 tab-separated fields, found {}",
            parts.len()
        )));
    }

    let start = parts[1]
        .parse::<i64>()
        .map_err(|_| malformed(format!("invalid start position: {}", parts[1])))?;
    let end = parts[2]
        .parse::<i64>()
        .map_err(|_| malformed(format!("invalid end position: {}", parts[2])))?;
    if end <= start {
        return Err(malformed(format!("end {} is not after start {}", end, start)));
    }

    let strand = parts[5].parse::<Strand>().map_err(|e| malformed(e.to_string()))?;
    let position = match strand {
        Strand::Forward => start,
        Strand::Reverse => end - 1,
    };

    Ok(Some(Read::new(parts[0], position, strand)))
}

///
/// Parse every read of a BED6 stream.
///
pub fn parse_bed_reads<R: BufRead>(reader: R) -> Result<Vec<Read>> {
    let mut reads = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(read) = parse_read_line(&line, idx + 1)? {
            reads.push(read);
        }
    }

    Ok(reads)
}

///
/// Read all reads of a (possibly gzipped) BED6 file, or stdin for `-`.
///
pub fn read_bed_reads(file_path_str: &str) -> Result<Vec<Read>> {
    let reader = get_dynamic_reader_w_stdin(file_path_str)?;
    parse_bed_reads(reader).with_context(|| format!("Failed to read reads from {}", file_path_str))
}
