use crate::core::io::{checkpoint, fluence, phantom};
use crate::core::materials::MaterialPalette;
use crate::engine::accumulator::{EventHits, RunAccumulator};
use crate::engine::config::SimulationConfig;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::geometry::{NestedGeometry, VoxelMaterialProvider};
use crate::engine::output::CheckpointWriter;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Identity and workload of one worker stream of particle histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamContext {
    pub index: usize,
    pub histories: u64,
}

/// The external particle-transport collaborator, at its interface.
///
/// For each stream the engine tracks `stream.histories` particle histories
/// through the voxel geometry it queries via `geometry`, and hands the hit
/// collections of every completed history to `sink`. Implementations must be
/// `Sync`: streams run concurrently, one exclusive accumulator each.
pub trait TransportEngine: Sync {
    fn run_stream(
        &self,
        stream: StreamContext,
        geometry: &dyn NestedGeometry,
        sink: &mut dyn FnMut(EventHits),
    ) -> Result<(), EngineError>;
}

/// What a completed scoring run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSummary {
    pub events: u64,
    pub unique_materials: usize,
    pub tracked_beamlets: usize,
}

/// Executes one complete scoring run against an external transport engine.
#[instrument(skip_all, name = "scoring_run")]
pub fn run<E: TransportEngine>(
    engine: &E,
    config: &SimulationConfig,
    context: &mut RunContext,
    reporter: &ProgressReporter,
) -> Result<SimulationSummary, EngineError> {
    // === Phase 0: Phantom load ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Phantom",
    });
    info!("Loading phantom from '{}'", config.phantom_path.display());
    let volume = phantom::load(&config.phantom_path)?;

    if config.density_snapshot {
        let snapshot_path = config.output_dir.join("InputDensity.bin");
        if let Err(e) = checkpoint::write_density_snapshot(&snapshot_path, &volume.densities) {
            warn!(
                "Failed writing density snapshot '{}': {e}",
                snapshot_path.display()
            );
        }
    }
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Material compaction ===
    reporter.report(Progress::PhaseStart {
        name: "Compacting Materials",
    });
    let grid = volume.grid.clone();
    let palette = MaterialPalette::build(&volume.voxels)?;
    info!(
        "Phantom holds {} voxel(s) over {} unique material(s)",
        grid.voxel_count(),
        palette.material_count()
    );
    let provider = VoxelMaterialProvider::new(volume.grid, palette);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Tracked-beamlet spec (optional) ===
    let fluence_map = match fluence::load(&config.beamlet_spec_path, config.magnification) {
        Ok(spec) => spec,
        Err(e) => {
            warn!("Ignoring tracked-beamlet spec: {e}; tallying full volume only");
            None
        }
    };

    // === Phase 3: Worker fan-out, one exclusive accumulator per stream ===
    reporter.report(Progress::StreamsStart {
        total: config.streams as u64,
    });
    let run_stream = |index: usize| -> Result<RunAccumulator, EngineError> {
        let mut accumulator = RunAccumulator::new(&config.scorers, fluence_map.clone());
        let stream = StreamContext {
            index,
            histories: config.histories_per_stream,
        };
        engine.run_stream(stream, &provider, &mut |event| {
            accumulator.record_event(&event)
        })?;
        reporter.report(Progress::StreamFinished {
            stream: index,
            events: accumulator.events(),
        });
        Ok(accumulator)
    };

    #[cfg(feature = "parallel")]
    let workers: Result<Vec<_>, EngineError> =
        (0..config.streams).into_par_iter().map(run_stream).collect();
    #[cfg(not(feature = "parallel"))]
    let workers: Result<Vec<_>, EngineError> = (0..config.streams).map(run_stream).collect();
    let workers = workers?;

    // === Phase 4: Merge, single-threaded after the join ===
    let mut global = RunAccumulator::new(&config.scorers, fluence_map);
    for worker in workers {
        global.merge(worker);
    }

    // === Phase 5: Checkpoint update ===
    reporter.report(Progress::PhaseStart {
        name: "Updating Checkpoints",
    });
    let writer = CheckpointWriter::new(grid.voxel_count(), &config.output_dir);
    writer.write_all(&global)?;
    reporter.report(Progress::PhaseFinish);

    let events = global.events();
    context.record_run(events);
    info!(
        "{} events processed in this run ({} events processed so far in the simulation)",
        events,
        context.events_processed()
    );

    Ok(SimulationSummary {
        events,
        unique_materials: provider.material_count(),
        tracked_beamlets: global.beamlets().len(),
    })
}
