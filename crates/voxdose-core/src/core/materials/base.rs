use phf::phf_map;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Undefined material ID {id} in voxel {voxel}")]
    UnknownMaterial { voxel: usize, id: i64 },
    #[error("Multi-material voxels not yet implemented (voxel {voxel} has {components} components)")]
    MixtureNotSupported { voxel: usize, components: usize },
    #[error("Internal consistency error: {0}")]
    Internal(String),
}

/// The base materials the phantom format can reference, keyed by the
/// small-integer material IDs used in the voxel lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseMaterial {
    Water,
    Lung,
    Titanium,
    Adipose,
    Muscle,
    Bone,
    Air,
    Aluminum,
}

static BASE_MATERIALS: phf::Map<u8, BaseMaterial> = phf_map! {
    0u8 => BaseMaterial::Water,
    1u8 => BaseMaterial::Lung,
    2u8 => BaseMaterial::Titanium,
    3u8 => BaseMaterial::Adipose,
    4u8 => BaseMaterial::Muscle,
    5u8 => BaseMaterial::Bone,
    6u8 => BaseMaterial::Air,
    7u8 => BaseMaterial::Aluminum,
};

impl BaseMaterial {
    /// Resolves a phantom-file material ID to a base material.
    pub fn from_id(voxel: usize, id: i64) -> Result<Self, MaterialError> {
        u8::try_from(id)
            .ok()
            .and_then(|id| BASE_MATERIALS.get(&id).copied())
            .ok_or(MaterialError::UnknownMaterial { voxel, id })
    }

    /// The transport engine's dataset name for this base composition.
    pub fn dataset_name(&self) -> &'static str {
        match self {
            BaseMaterial::Water => "G4_WATER",
            BaseMaterial::Lung => "G4_LUNG_ICRP",
            BaseMaterial::Titanium => "G4_Ti",
            BaseMaterial::Adipose => "G4_ADIPOSE_TISSUE_ICRP",
            BaseMaterial::Muscle => "G4_MUSCLE_STRIATED_ICRU",
            BaseMaterial::Bone => "G4_BONE_COMPACT_ICRU",
            BaseMaterial::Air => "G4_AIR",
            BaseMaterial::Aluminum => "G4_Al",
        }
    }
}

/// A concrete phantom material: a base composition rescaled to an exact
/// mass density (internal units).
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base: BaseMaterial,
    pub density: f64,
}

impl Material {
    /// Builds the material for a unique-density palette slot.
    pub fn with_density(palette_index: usize, base: BaseMaterial, density: f64) -> Self {
        Self {
            name: format!("mat{palette_index}"),
            base,
            density,
        }
    }
}
