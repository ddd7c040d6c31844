use crate::core::io::checkpoint;
use crate::engine::accumulator::{RunAccumulator, SparseTally};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Voxel index {index} out of range for a {len}-voxel output array")]
    VoxelIndexOutOfRange { index: usize, len: usize },
}

/// Persists merged scorer tallies as cumulative checkpoint files.
///
/// One flat binary file per scorer (and per tracked beamlet, with the
/// `(bx,by)` suffix), holding the dense per-voxel values in canonical order
/// (Z slowest, Y, X fastest) as raw native-endian f64, no header. Prior file
/// content is added in, never overwritten destructively. Single writer at a
/// time is assumed; there is no file locking.
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    voxel_count: usize,
    output_dir: PathBuf,
}

impl CheckpointWriter {
    pub fn new(voxel_count: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            voxel_count,
            output_dir: output_dir.into(),
        }
    }

    pub fn checkpoint_path(&self, scorer: &str, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{scorer}{suffix}.bin"))
    }

    /// Updates every checkpoint of a merged accumulator: the full volume
    /// first, then each tracked beamlet under its suffix.
    pub fn write_all(&self, accumulator: &RunAccumulator) -> Result<(), OutputError> {
        info!("writing results for \"Full Beam\"");
        for scorer in accumulator.scorers() {
            if let Some(tally) = accumulator.full_volume(scorer) {
                self.update_checkpoint(scorer, "", tally)?;
            }
        }

        for (key, tallies) in accumulator.beamlets() {
            info!("writing results for \"Beamlet {key}\"");
            let suffix = key.to_string();
            for scorer in accumulator.scorers() {
                if let Some(tally) = tallies.get(scorer) {
                    self.update_checkpoint(scorer, &suffix, tally)?;
                }
            }
        }
        Ok(())
    }

    /// Densifies one sparse tally, adds any readable prior checkpoint, and
    /// rewrites the file.
    ///
    /// The sparse indices must already be in canonical output order; they are
    /// bounds-checked, not re-derived. An unreadable prior file counts as "no
    /// prior checkpoint"; a failed write is reported and skipped so one
    /// scorer cannot abort the remaining outputs.
    pub fn update_checkpoint(
        &self,
        scorer: &str,
        suffix: &str,
        tally: &SparseTally,
    ) -> Result<(), OutputError> {
        let mut data = vec![0.0f64; self.voxel_count];
        let mut dmax = 0.0f64;
        for (&voxel, &value) in tally {
            if voxel >= data.len() {
                return Err(OutputError::VoxelIndexOutOfRange {
                    index: voxel,
                    len: data.len(),
                });
            }
            data[voxel] += value;
            if value > dmax {
                dmax = value;
            }
        }
        info!(
            "Processed tally for scorer \"{scorer}{suffix}\" ({} voxels, max: {dmax})",
            self.voxel_count
        );

        let path = self.checkpoint_path(scorer, suffix);
        if path.exists() {
            match checkpoint::read_doubles(&path, self.voxel_count) {
                Ok(prior) => {
                    for (dst, src) in data.iter_mut().zip(prior) {
                        *dst += src;
                    }
                }
                Err(e) => warn!(
                    "Error opening dose input file \"{}\": {e}; treating as no prior checkpoint",
                    path.display()
                ),
            }
        }

        if let Err(e) = checkpoint::write_doubles(&path, &data) {
            error!("Error opening dose output file \"{}\": {e}", path.display());
        }
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
