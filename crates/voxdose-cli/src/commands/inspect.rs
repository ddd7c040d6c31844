use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::info;
use voxdose::core::io::{checkpoint, phantom};
use voxdose::core::materials::MaterialPalette;
use voxdose::core::units;
use voxdose::engine::error::EngineError;

pub fn run(args: InspectArgs) -> Result<()> {
    let spinner = ProgressBar::new_spinner().with_message("Loading phantom...");
    spinner.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(80));

    info!("Loading phantom from {:?}", &args.phantom);
    let volume = phantom::load(&args.phantom).map_err(|e| CliError::FileParsing {
        path: args.phantom.clone(),
        source: e.into(),
    })?;

    spinner.set_message("Compacting materials...");
    let palette = MaterialPalette::build(&volume.voxels).map_err(EngineError::from)?;
    spinner.finish_and_clear();

    let grid = &volume.grid;
    println!("Phantom: {}", args.phantom.display());
    println!(
        "  grid:             {} x {} x {} ({} voxels)",
        grid.nx,
        grid.ny,
        grid.nz,
        grid.voxel_count()
    );
    println!(
        "  voxel size (mm):  {} x {} x {}",
        grid.voxel_size.x, grid.voxel_size.y, grid.voxel_size.z
    );
    println!(
        "  center (mm):      ({}, {}, {})",
        grid.center.x, grid.center.y, grid.center.z
    );
    println!("  unique materials: {}", palette.material_count());

    for material in palette.materials().iter().take(args.max_materials) {
        println!(
            "    {:<8} {:>9.4} g/cm³  {}",
            material.name,
            units::density_to_g_per_cm3(material.density),
            material.base.dataset_name()
        );
    }
    if palette.material_count() > args.max_materials {
        println!(
            "    ... and {} more",
            palette.material_count() - args.max_materials
        );
    }

    if let Some(path) = args.density_out {
        checkpoint::write_density_snapshot(&path, &volume.densities)?;
        println!("✓ Density snapshot written to: {}", path.display());
    }

    Ok(())
}
