//! Parser for taxid lists: one taxid per line, one line per sample.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::io::defs::COMMENT_PREFIX;
use crate::taxonomy::TaxId;

/// Reads a taxid list file, see [parse_taxids].
///
/// # Errors
/// Returns an [Error::Io] if the file cannot be opened, an
/// [Error::UnreadableLine] for a line that cannot be read (e.g. invalid
/// UTF-8) and an [Error::InvalidTaxid] for a line that is not a taxid.
pub fn read_taxid_file<P: AsRef<Path>>(path: P) -> Result<Vec<TaxId>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let taxids = parse_taxids(BufReader::new(file), &path.display().to_string())?;
    debug!("Read {} taxids from {}", taxids.len(), path.display());
    Ok(taxids)
}

/// Parses a taxid list, one non-negative integer per line.
///
/// Surrounding whitespace is ignored, as are blank lines and lines
/// starting with `#`.
///
/// # Arguments
/// * `reader` - Source of the list
/// * `source_name` - Name used in error messages (usually the file path)
///
/// # Example
/// ```
/// use bintax::io::parse_taxids;
///
/// let taxids = parse_taxids("# training labels\n562\n\n 1280 \n562\n".as_bytes(), "labels").unwrap();
/// assert_eq!(taxids, vec![562, 1280, 562]);
/// ```
pub fn parse_taxids<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<TaxId>> {
    let mut taxids = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::UnreadableLine {
            source_name: source_name.to_string(),
            line: i + 1,
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let taxid = trimmed.parse::<TaxId>().map_err(|_| Error::InvalidTaxid {
            source_name: source_name.to_string(),
            line: i + 1,
            content: trimmed.to_string(),
        })?;
        taxids.push(taxid);
    }

    Ok(taxids)
}
