/// One material component of a voxel: a base-material ID and its mass fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialComponent {
    pub id: i64,
    pub fraction: f64,
}

/// The material specification of a single voxel, as read from the phantom file.
///
/// `density` is in internal units (converted on read). A voxel with a
/// `secondary` component is a two-material mixture; mixtures are recognized by
/// the loader but rejected at material-construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelSpec {
    pub density: f64,
    pub primary: MaterialComponent,
    pub secondary: Option<MaterialComponent>,
}

impl VoxelSpec {
    /// Number of material components (1 or 2).
    pub fn material_count(&self) -> usize {
        if self.secondary.is_some() { 2 } else { 1 }
    }
}
