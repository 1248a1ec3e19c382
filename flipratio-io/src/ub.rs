//! UB-matrix extraction from HB3A scan files.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Header marker preceding the nine UB-matrix values.
const UB_MARKER: &str = "# ubmatrix";

/// Reads the UB matrix printed in the header of an HB3A scan file.
///
/// The header line reads `# ubmatrix = v11 v12 ... v33`; the nine values
/// after the marker are returned as a row-major 3x3 matrix.
///
/// # Errors
/// Returns [`Error::Parse`] when no marker line exists or the line holds
/// fewer than nine numeric values.
pub fn read_ub_matrix(path: impl AsRef<Path>) -> Result<[[f64; 3]; 3]> {
    let path = path.as_ref();
    let file = File::open(path)?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.starts_with(UB_MARKER) {
            continue;
        }

        let values = line
            .split_whitespace()
            .skip(3)
            .take(9)
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| Error::parse(path, format!("invalid ubmatrix value '{tok}'")))
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() < 9 {
            return Err(Error::parse(
                path,
                format!("ubmatrix header holds {} of 9 values", values.len()),
            ));
        }

        return Ok([
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
            [values[6], values[7], values[8]],
        ]);
    }

    Err(Error::parse(path, "no ubmatrix header line"))
}
