use crate::cli::TallyArgs;
use crate::error::{CliError, Result};
use nalgebra::{Point3, Vector3};
use voxdose::core::io::checkpoint;
use voxdose::core::models::grid::PhantomGrid;

pub fn run(args: TallyArgs) -> Result<()> {
    let [nx, ny, nz]: [usize; 3] = args
        .dims
        .clone()
        .try_into()
        .map_err(|_| CliError::Argument("expected exactly three grid dimensions".into()))?;
    let grid = PhantomGrid::new((nx, ny, nz), Vector3::new(1.0, 1.0, 1.0), Point3::origin());

    let values =
        checkpoint::read_doubles(&args.input, grid.voxel_count()).map_err(|e| {
            CliError::FileParsing {
                path: args.input.clone(),
                source: e.into(),
            }
        })?;

    let nonzero = values.iter().filter(|&&v| v != 0.0).count();
    let total: f64 = values.iter().sum();

    println!("Checkpoint: {}", args.input.display());
    println!("  voxels:   {} ({} x {} x {})", grid.voxel_count(), nx, ny, nz);
    println!("  nonzero:  {nonzero}");
    println!("  total:    {total:.6e}");

    let peak = values
        .iter()
        .enumerate()
        .max_by(|&(_, a), &(_, b)| a.total_cmp(b));
    if let Some((index, &max)) = peak {
        let (ix, iy, iz) = grid.coords_of(index);
        println!("  max:      {max:.6e} at voxel ({ix}, {iy}, {iz})");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxdose::core::io::checkpoint::write_doubles;

    #[test]
    fn summarizes_a_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dose3d.bin");
        write_doubles(&path, &[0.0, 1.0, 0.0, 7.0, 0.0, 0.0]).unwrap();

        run(TallyArgs {
            input: path,
            dims: vec![3, 2, 1],
        })
        .unwrap();
    }

    #[test]
    fn wrong_dimension_count_is_rejected() {
        let result = run(TallyArgs {
            input: "dose3d.bin".into(),
            dims: vec![3, 2],
        });
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn size_mismatch_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dose3d.bin");
        write_doubles(&path, &[1.0, 2.0]).unwrap();

        let result = run(TallyArgs {
            input: path,
            dims: vec![3, 1, 1],
        });
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
