use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::filter::{matching_band, unreachable_criteria};
use super::model::{LineRecord, LineTable};
use super::registry::Registry;
use super::rules::Rule;
use crate::error::{HitranError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the lines of one molecule/band from a HITRAN `.par` file using the
/// built-in rules.
///
/// ```no_run
/// use hitran_lines::load_hitran_file;
///
/// let lines = load_hitran_file("example_HITRAN_CS.par", "CS", "v_0").unwrap();
/// println!("{} lines", lines.len());
/// ```
pub fn load_hitran_file(path: impl AsRef<Path>, molecule: &str, band: &str) -> Result<LineTable> {
    load_with_registry(Registry::builtin(), path, molecule, band)
}

/// Same as [`load_hitran_file`] with a caller-supplied registry.
///
/// The selection is resolved before the file is opened, so an unknown
/// molecule or band is reported whatever the path.
pub fn load_with_registry(
    registry: &Registry,
    path: impl AsRef<Path>,
    molecule: &str,
    band: &str,
) -> Result<LineTable> {
    let path = path.as_ref();
    let rule = registry.get_rule(molecule, band)?;
    log::debug!("extracting {molecule}/{band} from {}", path.display());

    let file = File::open(path).map_err(|e| HitranError::io(path, e))?;
    extract(BufReader::new(file), rule)
}

// ---------------------------------------------------------------------------
// Line extractor
// ---------------------------------------------------------------------------

/// Apply `rule` to every line of `reader`.
///
/// Lines whose band tokens fail the rule's criteria are skipped. A line that
/// passes but cannot be converted aborts the whole extraction with
/// [`HitranError::MalformedLine`]; no partial table is returned.
pub fn extract<R: BufRead>(reader: R, rule: &Rule) -> Result<LineTable> {
    for value in unreachable_criteria(rule) {
        log::warn!("band criterion '{value}' can never match span {}", rule.band_span);
    }

    let mut table = LineTable::new();
    let mut lines_read = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| HitranError::Read {
            line: line_no,
            source,
        })?;
        lines_read += 1;

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(band) = matching_band(&tokens, rule) else {
            continue;
        };

        let record = build_record(&tokens, band, rule, line_no)?;
        log::trace!("line {line_no}: accepted {} at {}", record.line_name, record.wavenumber);
        table.push(record);
    }

    log::info!("{} of {lines_read} lines matched", table.len());
    Ok(table)
}

fn build_record(tokens: &[&str], band: String, rule: &Rule, line: usize) -> Result<LineRecord> {
    Ok(LineRecord {
        wavenumber: rule.wavenumber.eval(tokens, line)?,
        wavelength: rule.wavelength.eval(tokens, line)?,
        einstein_a: rule.einstein_a.eval(tokens, line)?,
        lower_energy: rule.energy.eval(tokens, line)?,
        band,
        line_name: rule.line_name.eval(tokens, line)?,
        gu: rule.gu.eval(tokens, line)?,
        gl: rule.gl.eval(tokens, line)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CS_MATCH: &str =
        " 461 1285.123456 1.234E-20 4.567E-01.1000.2000 123.4567.750-.001234 1 0 R 5 465542 5 8 2 2 11.0 9.0";
    const CS_OTHER: &str =
        " 461 1290.000000 1.000E-21 2.000E-01.1000.2000 200.0000.750-.001234 2 0 P 3 465542 5 8 2 2 7.0 9.0";

    fn cs_rule() -> Rule {
        Registry::builtin().get_rule("CS", "v_0").unwrap().clone()
    }

    #[test]
    fn extracts_matching_cs_line() {
        let input = format!("{CS_MATCH}\n{CS_OTHER}\n");
        let table = extract(input.as_bytes(), &cs_rule()).unwrap();
        assert_eq!(table.len(), 1);

        let row = &table.rows()[0];
        assert_eq!(row.wavenumber, 1285.123456);
        assert_eq!(row.wavelength, 1e4 / 1285.123456);
        assert_eq!(row.einstein_a, 4.567e-1);
        assert_eq!(row.lower_energy, 123.4567);
        assert_eq!(row.band, "1 0");
        assert_eq!(row.line_name, "R5");
        assert_eq!(row.gu, 11.0);
        assert_eq!(row.gl, 9.0);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = format!("\n   \n{CS_MATCH}\n\n");
        let table = extract(input.as_bytes(), &cs_rule()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn malformed_matched_line_aborts() {
        let bad = CS_MATCH.replace("1285.123456", "12x5.1");
        let input = format!("{CS_MATCH}\n{bad}\n{CS_MATCH}\n");
        let err = extract(input.as_bytes(), &cs_rule()).unwrap_err();
        assert!(matches!(err, HitranError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn malformed_unmatched_line_is_ignored() {
        let bad = CS_OTHER.replace("1290.000000", "garbage");
        let input = format!("{bad}\n{CS_MATCH}\n");
        let table = extract(input.as_bytes(), &cs_rule()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn short_einstein_token_is_malformed() {
        let bad = CS_MATCH.replace("4.567E-01.1000.2000", "4.5");
        let err = extract(bad.as_bytes(), &cs_rule()).unwrap_err();
        assert!(matches!(err, HitranError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn zero_wavenumber_is_malformed_not_infinite() {
        let zero = CS_MATCH.replace("1285.123456", "0.000000");
        let input = format!("{CS_MATCH}\n{zero}\n");
        let err = extract(input.as_bytes(), &cs_rule()).unwrap_err();
        assert!(matches!(err, HitranError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let mut input = CS_MATCH.as_bytes().to_vec();
        input.extend_from_slice(b"\n\xff\xfe\n");
        let err = extract(input.as_slice(), &cs_rule()).unwrap_err();
        assert!(matches!(err, HitranError::Read { line: 2, .. }));
    }
}
