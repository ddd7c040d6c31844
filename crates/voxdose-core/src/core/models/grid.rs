use nalgebra::{Point3, Vector3};

/// The regular 3D voxel grid describing the simulated phantom.
///
/// Dimensions are voxel counts, `voxel_size` is the edge length of one voxel
/// in mm, and `center` is the position of the array center in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct PhantomGrid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub voxel_size: Vector3<f64>,
    pub center: Point3<f64>,
}

impl PhantomGrid {
    pub fn new(
        (nx, ny, nz): (usize, usize, usize),
        voxel_size: Vector3<f64>,
        center: Point3<f64>,
    ) -> Self {
        Self {
            nx,
            ny,
            nz,
            voxel_size,
            center,
        }
    }

    /// Total number of voxels in the grid.
    pub fn voxel_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Flattens a 3D voxel coordinate into the canonical linear index.
    ///
    /// The ordering is X fastest-varying, then Y, then Z (Z slowest):
    /// `index = iz*ny*nx + iy*nx + ix`. Every consumer of a linear voxel
    /// index (the material map, the nested provider, the checkpoint writer)
    /// goes through this one formula.
    #[inline]
    pub fn flatten_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        iz * self.ny * self.nx + iy * self.nx + ix
    }

    /// Inverse of [`flatten_index`](Self::flatten_index).
    #[inline]
    pub fn coords_of(&self, index: usize) -> (usize, usize, usize) {
        let ix = index % self.nx;
        let iy = (index / self.nx) % self.ny;
        let iz = index / (self.nx * self.ny);
        (ix, iy, iz)
    }

    /// Half-lengths of a single voxel along each axis.
    pub fn voxel_half_lengths(&self) -> Vector3<f64> {
        self.voxel_size / 2.0
    }

    /// Full extent of the phantom box along each axis.
    pub fn extent(&self) -> Vector3<f64> {
        Vector3::new(
            self.nx as f64 * self.voxel_size.x,
            self.ny as f64 * self.voxel_size.y,
            self.nz as f64 * self.voxel_size.z,
        )
    }
}
