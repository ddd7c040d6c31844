use nalgebra::{Point3, Vector2};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Default magnification factor of a focused source (DfF/Dsf).
pub const DEFAULT_MAGNIFICATION: f64 = 10.0;

/// Integer coordinates of one rectangular cell of the source fluence map.
///
/// Equality is component-wise. The ordering is row-major (by `by`, then `bx`)
/// so keys can live in a sorted map; it carries no other meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeamletKey {
    pub bx: i32,
    pub by: i32,
}

impl BeamletKey {
    pub fn new(bx: i32, by: i32) -> Self {
        Self { bx, by }
    }
}

impl Ord for BeamletKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.by, self.bx).cmp(&(other.by, other.bx))
    }
}

impl PartialOrd for BeamletKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BeamletKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.bx, self.by)
    }
}

/// Geometry of the source fluence map and the allow-list of beamlets whose
/// contributions are tallied individually.
///
/// `size` is the grid dimension in beamlets, `beamlet_size` the physical cell
/// size in mm, and `center` the map center position in mm. Events whose
/// originating beamlet is not in `tracked` are tallied only into the
/// full-volume totals.
#[derive(Debug, Clone, PartialEq)]
pub struct FluenceMapSpec {
    pub size: Vector2<i32>,
    pub beamlet_size: Vector2<f64>,
    pub center: Point3<f64>,
    pub magnification: f64,
    pub tracked: BTreeSet<BeamletKey>,
}

impl FluenceMapSpec {
    pub fn is_tracked(&self, key: &BeamletKey) -> bool {
        self.tracked.contains(key)
    }
}
