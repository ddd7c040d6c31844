use super::base::{BaseMaterial, Material, MaterialError};
use crate::core::models::voxel::VoxelSpec;
use tracing::info;

/// The compacted material model of a phantom: a minimal set of unique
/// materials, ascending by density, plus the voxel-index → palette-index map.
///
/// Voxel ordering in `voxel_map` is the phantom-file line order, which is the
/// canonical flattened order (X fastest, then Y, then Z).
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPalette {
    materials: Vec<Material>,
    voxel_map: Vec<usize>,
}

impl MaterialPalette {
    /// Deduplicates the per-voxel density list and constructs one material per
    /// unique density.
    ///
    /// Duplicate detection is exact floating-point equality, and the per-voxel
    /// lookup is a linear scan over the unique set. Materials are constructed
    /// lazily, on the first voxel that references a given palette slot;
    /// two-component voxels and out-of-table material IDs fail construction.
    pub fn build(voxels: &[VoxelSpec]) -> Result<Self, MaterialError> {
        let mut densities: Vec<f64> = voxels.iter().map(|v| v.density).collect();
        info!("all materials prior sort/unique: {}", densities.len());
        densities.sort_by(f64::total_cmp);
        densities.dedup();
        info!("all materials after sort/unique: {}", densities.len());

        let mut materials: Vec<Option<Material>> = vec![None; densities.len()];
        let mut voxel_map = Vec::with_capacity(voxels.len());

        for (voxel_index, voxel) in voxels.iter().enumerate() {
            let palette_index = densities
                .iter()
                .position(|&d| d == voxel.density)
                .ok_or_else(|| {
                    MaterialError::Internal(format!(
                        "density of voxel {voxel_index} missing from the unique set"
                    ))
                })?;
            voxel_map.push(palette_index);

            if materials[palette_index].is_none() {
                materials[palette_index] =
                    Some(Self::construct_material(voxel_index, voxel, palette_index)?);
            }
        }

        let materials = materials
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                MaterialError::Internal("unique density with no referencing voxel".into())
            })?;

        Ok(Self {
            materials,
            voxel_map,
        })
    }

    fn construct_material(
        voxel_index: usize,
        voxel: &VoxelSpec,
        palette_index: usize,
    ) -> Result<Material, MaterialError> {
        if let Some(_secondary) = voxel.secondary {
            return Err(MaterialError::MixtureNotSupported {
                voxel: voxel_index,
                components: voxel.material_count(),
            });
        }
        let base = BaseMaterial::from_id(voxel_index, voxel.primary.id)?;
        Ok(Material::with_density(palette_index, base, voxel.density))
    }

    /// The unique materials, ascending by density.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// The voxel-index → palette-index map, in canonical flattened order.
    pub fn voxel_map(&self) -> &[usize] {
        &self.voxel_map
    }

    /// The material of a voxel given its flattened index.
    pub fn material_for_voxel(&self, voxel_index: usize) -> &Material {
        &self.materials[self.voxel_map[voxel_index]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::voxel::MaterialComponent;

    fn voxel(density: f64, id: i64) -> VoxelSpec {
        VoxelSpec {
            density,
            primary: MaterialComponent { id, fraction: 1.0 },
            secondary: None,
        }
    }

    #[test]
    fn two_voxel_phantom_compacts_to_sorted_palette() {
        let voxels = [voxel(1.0, 0), voxel(1.2, 6)];
        let palette = MaterialPalette::build(&voxels).unwrap();

        assert_eq!(palette.material_count(), 2);
        assert_eq!(palette.voxel_map(), &[0, 1]);
        assert_eq!(palette.materials()[0].density, 1.0);
        assert_eq!(palette.materials()[0].base, BaseMaterial::Water);
        assert_eq!(palette.materials()[1].density, 1.2);
        assert_eq!(palette.materials()[1].base, BaseMaterial::Air);
    }

    #[test]
    fn duplicate_densities_share_one_material() {
        let voxels = [voxel(1.0, 0), voxel(0.3, 1), voxel(1.0, 0), voxel(0.3, 1)];
        let palette = MaterialPalette::build(&voxels).unwrap();

        assert_eq!(palette.material_count(), 2);
        assert_eq!(palette.voxel_map(), &[1, 0, 1, 0]);
        assert_eq!(palette.materials()[0].name, "mat0");
        assert_eq!(palette.materials()[1].name, "mat1");
    }

    #[test]
    fn palette_is_strictly_ascending_and_map_is_valid() {
        let densities = [1.85, 0.26, 1.0, 0.0012, 1.0, 0.26, 4.5, 1.85];
        let ids = [5, 1, 0, 6, 0, 1, 2, 5];
        let voxels: Vec<VoxelSpec> = densities
            .iter()
            .zip(ids)
            .map(|(&d, id)| voxel(d, id))
            .collect();

        let palette = MaterialPalette::build(&voxels).unwrap();

        assert_eq!(palette.voxel_map().len(), voxels.len());
        assert!(palette.voxel_map().iter().all(|&m| m < palette.material_count()));
        assert!(
            palette
                .materials()
                .windows(2)
                .all(|w| w[0].density < w[1].density)
        );
        for (i, v) in voxels.iter().enumerate() {
            assert_eq!(palette.material_for_voxel(i).density, v.density);
        }
    }

    #[test]
    fn mixture_voxel_is_rejected() {
        let mut mixed = voxel(1.1, 0);
        mixed.secondary = Some(MaterialComponent {
            id: 5,
            fraction: 0.4,
        });
        let result = MaterialPalette::build(&[voxel(1.0, 0), mixed]);
        assert!(matches!(
            result,
            Err(MaterialError::MixtureNotSupported {
                voxel: 1,
                components: 2
            })
        ));
    }

    #[test]
    fn unknown_material_id_is_rejected() {
        let result = MaterialPalette::build(&[voxel(1.0, 12)]);
        assert!(matches!(
            result,
            Err(MaterialError::UnknownMaterial { voxel: 0, id: 12 })
        ));
    }
}
