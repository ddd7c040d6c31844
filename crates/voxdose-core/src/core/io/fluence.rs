use crate::core::models::beamlet::{BeamletKey, FluenceMapSpec};
use crate::core::units;
use nalgebra::{Point3, Vector2};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FluenceLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed beamlet specification on line {line}: {message}")]
    Header { line: usize, message: String },
}

/// Loads the tracked-beamlet specification, if one is present.
///
/// Format: `fx fy`, then `beamlet_size_x beamlet_size_y` (mm), then
/// `center_x center_y center_z` (mm), then one ignored line, then `bx by`
/// pairs to track. Lines among the pairs that do not parse are skipped.
///
/// A missing (or unopenable) file is the normal no-beamlet-breakdown case and
/// yields `Ok(None)`; a file that is present but has a malformed header is an
/// error.
pub fn load(path: &Path, magnification: f64) -> Result<Option<FluenceMapSpec>, FluenceLoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(
                "No tracked-beamlet spec at '{}' ({}); tallying full volume only",
                path.display(),
                e
            );
            return Ok(None);
        }
    };
    read_from(&mut BufReader::new(file), magnification).map(Some)
}

pub fn read_from(
    reader: &mut impl BufRead,
    magnification: f64,
) -> Result<FluenceMapSpec, FluenceLoadError> {
    let mut lines = reader.lines().enumerate();

    let size = {
        let (line_num, line) = header_line(&mut lines)?;
        let (fx, fy) = parse_pair::<i32>(&line, line_num)?;
        Vector2::new(fx, fy)
    };
    let beamlet_size = {
        let (line_num, line) = header_line(&mut lines)?;
        let (bsx, bsy) = parse_pair::<f64>(&line, line_num)?;
        Vector2::new(units::length_from_mm(bsx), units::length_from_mm(bsy))
    };
    let center = {
        let (line_num, line) = header_line(&mut lines)?;
        let mut tokens = line.split_whitespace();
        let mut next = |field: &str| -> Result<f64, FluenceLoadError> {
            tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| FluenceLoadError::Header {
                    line: line_num,
                    message: format!("missing or invalid {field}"),
                })
        };
        Point3::new(
            units::length_from_mm(next("center x")?),
            units::length_from_mm(next("center y")?),
            units::length_from_mm(next("center z")?),
        )
    };

    // one reserved line between the header and the pair list
    let _ = lines.next();

    let mut tracked = BTreeSet::new();
    for (_, line) in lines {
        let line = line?;
        let mut tokens = line.split_whitespace();
        if let (Some(Ok(bx)), Some(Ok(by))) = (
            tokens.next().map(str::parse::<i32>),
            tokens.next().map(str::parse::<i32>),
        ) {
            tracked.insert(BeamletKey::new(bx, by));
        }
    }

    debug!(
        "Fluence map {}x{}, {} tracked beamlet(s)",
        size.x,
        size.y,
        tracked.len()
    );

    Ok(FluenceMapSpec {
        size,
        beamlet_size,
        center,
        magnification,
        tracked,
    })
}

fn header_line(
    lines: &mut impl Iterator<Item = (usize, io::Result<String>)>,
) -> Result<(usize, String), FluenceLoadError> {
    match lines.next() {
        Some((idx, line)) => Ok((idx + 1, line?)),
        None => Err(FluenceLoadError::Header {
            line: 0,
            message: "unexpected end of file in header".into(),
        }),
    }
}

fn parse_pair<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
) -> Result<(T, T), FluenceLoadError> {
    let mut tokens = line.split_whitespace();
    let mut next = |field: &str| -> Result<T, FluenceLoadError> {
        tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| FluenceLoadError::Header {
                line: line_num,
                message: format!("missing or invalid {field}"),
            })
    };
    Ok((next("first value")?, next("second value")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::beamlet::DEFAULT_MAGNIFICATION;
    use std::io::Cursor;

    const SPEC: &str = "\
20 20
5.0 5.0
0.0 0.0 -1000.0
# bx by
3 4
10 10
not a pair
7 1
";

    #[test]
    fn parses_header_and_tracked_pairs() {
        let spec = read_from(&mut Cursor::new(SPEC), DEFAULT_MAGNIFICATION).unwrap();

        assert_eq!(spec.size, Vector2::new(20, 20));
        assert_eq!(spec.beamlet_size, Vector2::new(5.0, 5.0));
        assert_eq!(spec.center, Point3::new(0.0, 0.0, -1000.0));
        assert_eq!(spec.magnification, DEFAULT_MAGNIFICATION);
        assert_eq!(spec.tracked.len(), 3);
        assert!(spec.is_tracked(&BeamletKey::new(3, 4)));
        assert!(spec.is_tracked(&BeamletKey::new(10, 10)));
        assert!(spec.is_tracked(&BeamletKey::new(7, 1)));
        assert!(!spec.is_tracked(&BeamletKey::new(0, 0)));
    }

    #[test]
    fn missing_file_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(&dir.path().join("tracked_beamlets.txt"), DEFAULT_MAGNIFICATION);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn malformed_header_is_an_error() {
        let result = read_from(&mut Cursor::new("20\n"), DEFAULT_MAGNIFICATION);
        assert!(matches!(result, Err(FluenceLoadError::Header { line: 1, .. })));
    }

    #[test]
    fn empty_pair_list_is_allowed() {
        let text = "4 4\n2.5 2.5\n0 0 0\nskip\n";
        let spec = read_from(&mut Cursor::new(text), DEFAULT_MAGNIFICATION).unwrap();
        assert!(spec.tracked.is_empty());
    }
}
