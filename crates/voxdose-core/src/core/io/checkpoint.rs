use crate::core::units;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Reads a scorer checkpoint: exactly `expected` native-endian f64 values,
/// no header. A file whose size does not match is rejected as unreadable.
pub fn read_doubles(path: &Path, expected: usize) -> io::Result<Vec<f64>> {
    let file = File::open(path)?;
    let expected_bytes = expected as u64 * 8;
    let actual_bytes = file.metadata()?.len();
    if actual_bytes != expected_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("checkpoint holds {actual_bytes} bytes, expected {expected_bytes}"),
        ));
    }

    let mut reader = BufReader::new(file);
    let mut buf = [0u8; 8];
    let mut values = Vec::with_capacity(expected);
    for _ in 0..expected {
        reader.read_exact(&mut buf)?;
        values.push(f64::from_ne_bytes(buf));
    }
    Ok(values)
}

/// Overwrites a scorer checkpoint with raw native-endian f64 values.
pub fn write_doubles(path: &Path, values: &[f64]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        writer.write_all(&value.to_ne_bytes())?;
    }
    writer.flush()
}

/// Writes the as-parsed per-voxel densities, in file order, as raw f32 values
/// in g/cm³. A QA artifact for offline verification of the phantom input.
pub fn write_density_snapshot(path: &Path, densities: &[f64]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for &density in densities {
        let value = units::density_to_g_per_cm3(density) as f32;
        writer.write_all(&value.to_ne_bytes())?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dose3d.bin");
        let values = vec![0.0, 1.5, -2.25, 1e-12];

        write_doubles(&path, &values).unwrap();
        assert_eq!(read_doubles(&path, values.len()).unwrap(), values);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dose3d.bin");
        write_doubles(&path, &[1.0, 2.0]).unwrap();

        let err = read_doubles(&path, 3).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_checkpoint_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_doubles(&dir.path().join("absent.bin"), 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn density_snapshot_is_f32_per_voxel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("InputDensity.bin");
        write_density_snapshot(&path, &[1.0, 0.26, 1.85]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 3 * 4);
        let first = f32::from_ne_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(first, 1.0);
    }
}
