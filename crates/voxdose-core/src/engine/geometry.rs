use crate::core::materials::{Material, MaterialPalette};
use crate::core::models::grid::PhantomGrid;
use nalgebra::Vector3;

/// Replica numbers of the two outer replicated axes, as reported by the
/// transport engine's navigation stack while it traverses the voxel box.
/// Absent during engine initialization and idle-state visualization queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaContext {
    pub iy: usize,
    pub iz: usize,
}

/// The narrow capability the transport engine consumes during geometry
/// traversal and material scanning: resolve a voxel coordinate to a material
/// and a placement transform.
pub trait NestedGeometry: Sync {
    /// Material of the voxel at innermost-axis index `ix` under the given
    /// parent replica context. Without a parent context (engine setup or
    /// idle-state queries) the first palette material is returned rather
    /// than failing.
    fn compute_material(&self, ix: i64, parent: Option<&ReplicaContext>) -> &Material;

    /// Translation placing the `ix`-th voxel slab along the X axis.
    fn compute_transformation(&self, ix: usize) -> Vector3<f64>;

    /// Half-lengths of a single voxel.
    fn compute_dimensions(&self) -> Vector3<f64>;

    /// Palette material by index, for the engine's material-scanning pass.
    fn material(&self, index: usize) -> &Material;

    /// Number of unique materials, required by the engine before physics
    /// tables can be prepared.
    fn material_count(&self) -> usize;
}

/// Maps voxel coordinates to the compacted material palette of a phantom.
///
/// The index arithmetic here must match the ordering the voxel-material map
/// was built with (file order: X fastest, then Y, then Z), which both sides
/// obtain from [`PhantomGrid::flatten_index`].
#[derive(Debug, Clone)]
pub struct VoxelMaterialProvider {
    grid: PhantomGrid,
    palette: MaterialPalette,
}

impl VoxelMaterialProvider {
    pub fn new(grid: PhantomGrid, palette: MaterialPalette) -> Self {
        Self { grid, palette }
    }

    pub fn grid(&self) -> &PhantomGrid {
        &self.grid
    }

    pub fn palette(&self) -> &MaterialPalette {
        &self.palette
    }
}

impl NestedGeometry for VoxelMaterialProvider {
    fn compute_material(&self, ix: i64, parent: Option<&ReplicaContext>) -> &Material {
        let Some(parent) = parent else {
            return &self.palette.materials()[0];
        };

        // A negative innermost copy number has been observed from the engine;
        // clamp instead of faulting.
        let ix = ix.max(0) as usize;

        let index = self.grid.flatten_index(ix, parent.iy, parent.iz);
        self.palette.material_for_voxel(index)
    }

    fn compute_transformation(&self, ix: usize) -> Vector3<f64> {
        let dx = self.grid.voxel_size.x;
        let x = ix as f64 * dx - (self.grid.nx - 1) as f64 * dx / 2.0;
        Vector3::new(x, 0.0, 0.0)
    }

    fn compute_dimensions(&self) -> Vector3<f64> {
        self.grid.voxel_half_lengths()
    }

    fn material(&self, index: usize) -> &Material {
        &self.palette.materials()[index]
    }

    fn material_count(&self) -> usize {
        self.palette.material_count()
    }
}
