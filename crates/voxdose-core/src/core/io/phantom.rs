use crate::core::models::grid::PhantomGrid;
use crate::core::models::voxel::{MaterialComponent, VoxelSpec};
use crate::core::units;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PhantomLoadError {
    #[error("Failed opening geometry '{path}': {source}")]
    Open { path: String, source: io::Error },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed header on line {line}: {message}")]
    Header { line: usize, message: String },
    #[error("Malformed voxel specification on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Mismatch between nxyz in header and number of lines (expected {expected}, found {found})")]
    VoxelCountMismatch { expected: usize, found: usize },
}

/// A fully parsed phantom: the grid description, the per-voxel material
/// specifications in file (= canonical flattened) order, and the parallel
/// raw-density list in internal units.
#[derive(Debug, Clone, PartialEq)]
pub struct PhantomVolume {
    pub grid: PhantomGrid,
    pub voxels: Vec<VoxelSpec>,
    pub densities: Vec<f64>,
}

/// Reads a phantom description from a file path.
///
/// Header: three lines (`nx ny nz`, `dx dy dz` in mm, `px py pz` in mm),
/// followed by exactly `nx*ny*nz` voxel lines
/// (`density matcount matid1 frac1 [matid2 frac2]`, density in g/cm³),
/// terminated by a blank line or end of file.
pub fn load(path: &Path) -> Result<PhantomVolume, PhantomLoadError> {
    let file = File::open(path).map_err(|source| PhantomLoadError::Open {
        path: path.to_string_lossy().to_string(),
        source,
    })?;
    read_from(&mut BufReader::new(file))
}

pub fn read_from(reader: &mut impl BufRead) -> Result<PhantomVolume, PhantomLoadError> {
    let mut lines = reader.lines().enumerate();

    let (nx, ny, nz) = {
        let (line_num, line) = next_header_line(&mut lines)?;
        parse_triple::<usize>(&line, line_num)?
    };
    let voxel_size = {
        let (line_num, line) = next_header_line(&mut lines)?;
        let (dx, dy, dz) = parse_triple::<f64>(&line, line_num)?;
        Vector3::new(
            units::length_from_mm(dx),
            units::length_from_mm(dy),
            units::length_from_mm(dz),
        )
    };
    let center = {
        let (line_num, line) = next_header_line(&mut lines)?;
        let (px, py, pz) = parse_triple::<f64>(&line, line_num)?;
        Point3::new(
            units::length_from_mm(px),
            units::length_from_mm(py),
            units::length_from_mm(pz),
        )
    };

    let grid = PhantomGrid::new((nx, ny, nz), voxel_size, center);
    info!(
        "Array size: {} {} {}; voxel size (mm): {} {} {}; center position (mm): {} {} {}",
        nx, ny, nz, voxel_size.x, voxel_size.y, voxel_size.z, center.x, center.y, center.z
    );

    let expected = grid.voxel_count();
    let mut voxels = Vec::with_capacity(expected);
    let mut densities = Vec::with_capacity(expected);

    for (line_idx, line) in &mut lines {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        let spec = parse_voxel_line(&line, line_idx + 1)?;
        densities.push(spec.density);
        voxels.push(spec);
    }

    if voxels.len() != expected {
        return Err(PhantomLoadError::VoxelCountMismatch {
            expected,
            found: voxels.len(),
        });
    }

    Ok(PhantomVolume {
        grid,
        voxels,
        densities,
    })
}

fn next_header_line(
    lines: &mut impl Iterator<Item = (usize, io::Result<String>)>,
) -> Result<(usize, String), PhantomLoadError> {
    match lines.next() {
        Some((idx, line)) => Ok((idx + 1, line?)),
        None => Err(PhantomLoadError::Header {
            line: 0,
            message: "unexpected end of file in header".into(),
        }),
    }
}

fn parse_triple<T: FromStr>(line: &str, line_num: usize) -> Result<(T, T, T), PhantomLoadError> {
    let mut tokens = line.split_whitespace();
    let mut next = |field: &str| -> Result<T, PhantomLoadError> {
        tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| PhantomLoadError::Header {
                line: line_num,
                message: format!("missing or invalid {field}"),
            })
    };
    Ok((next("first value")?, next("second value")?, next("third value")?))
}

fn parse_voxel_line(line: &str, line_num: usize) -> Result<VoxelSpec, PhantomLoadError> {
    let mut tokens = line.split_whitespace();

    let density: f64 = parse_field(&mut tokens, line_num, "density")?;
    let material_count: usize = parse_field(&mut tokens, line_num, "material count")?;
    let primary = MaterialComponent {
        id: parse_field(&mut tokens, line_num, "material ID")?,
        fraction: parse_field(&mut tokens, line_num, "fraction")?,
    };

    let secondary = match material_count {
        1 => None,
        2 => Some(MaterialComponent {
            id: parse_field(&mut tokens, line_num, "second material ID")?,
            fraction: parse_field(&mut tokens, line_num, "second fraction")?,
        }),
        n => {
            return Err(PhantomLoadError::Parse {
                line: line_num,
                message: format!("material count must be 1 or 2, got {n}"),
            });
        }
    };

    Ok(VoxelSpec {
        density: units::density_from_g_per_cm3(density),
        primary,
        secondary,
    })
}

fn parse_field<T: FromStr>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line_num: usize,
    name: &str,
) -> Result<T, PhantomLoadError> {
    tokens
        .next()
        .ok_or_else(|| PhantomLoadError::Parse {
            line: line_num,
            message: format!("missing {name}"),
        })?
        .parse()
        .map_err(|_| PhantomLoadError::Parse {
            line: line_num,
            message: format!("invalid {name}"),
        })
}
