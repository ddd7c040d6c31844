use crate::core::models::beamlet::{BeamletKey, FluenceMapSpec};
use nalgebra::Point3;

/// Computes the fluence-map cell an event's originating vertex projects into.
///
/// Only valid for a beam traveling parallel to the z axis with the fluence
/// map orthogonal to it. The result is always produced, and may lie outside
/// the map; callers range-check against the tracked allow-list themselves.
// TODO: confirm the extra magnification factor on the center-y term against
// the treatment-planning geometry export before supporting off-center maps.
pub fn beamlet_for_vertex(spec: &FluenceMapSpec, vertex: &Point3<f64>) -> BeamletKey {
    let alpha = spec.magnification;
    let (fx, fy) = (spec.size.x, spec.size.y);

    let bx = (fx - 1)
        - (alpha * (vertex.x - spec.center.x) / spec.beamlet_size.x + fx as f64 / 2.0).floor()
            as i32;
    let by = (fy - 1)
        - (alpha * (vertex.y - alpha * spec.center.y) / spec.beamlet_size.y + fy as f64 / 2.0)
            .floor() as i32;

    BeamletKey::new(bx, by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::beamlet::DEFAULT_MAGNIFICATION;
    use nalgebra::Vector2;
    use std::collections::BTreeSet;

    fn spec(center: Point3<f64>) -> FluenceMapSpec {
        FluenceMapSpec {
            size: Vector2::new(20, 20),
            beamlet_size: Vector2::new(5.0, 5.0),
            center,
            magnification: DEFAULT_MAGNIFICATION,
            tracked: BTreeSet::new(),
        }
    }

    #[test]
    fn central_vertex_maps_to_the_central_cell() {
        let spec = spec(Point3::new(0.0, 0.0, -1000.0));
        let key = beamlet_for_vertex(&spec, &Point3::new(0.0, 0.0, -1000.0));
        assert_eq!(key, BeamletKey::new(9, 9));
    }

    #[test]
    fn offsets_move_against_the_axis_direction() {
        let spec = spec(Point3::new(0.0, 0.0, -1000.0));

        let key = beamlet_for_vertex(&spec, &Point3::new(1.0, 0.0, -1000.0));
        assert_eq!(key, BeamletKey::new(7, 9));

        let key = beamlet_for_vertex(&spec, &Point3::new(-1.2, 2.6, -1000.0));
        assert_eq!(key, BeamletKey::new(12, 4));
    }

    #[test]
    fn far_vertices_produce_out_of_range_keys_without_failing() {
        let spec = spec(Point3::new(0.0, 0.0, -1000.0));
        let key = beamlet_for_vertex(&spec, &Point3::new(100.0, -100.0, -1000.0));
        assert_eq!(key, BeamletKey::new(-191, 209));
    }

    #[test]
    fn center_offset_is_magnified_on_y_only() {
        let spec = spec(Point3::new(5.0, 5.0, -1000.0));
        let key = beamlet_for_vertex(&spec, &Point3::new(5.0, 50.0, -1000.0));
        assert_eq!(key, BeamletKey::new(9, 9));
    }

    #[test]
    fn classification_is_deterministic() {
        let spec = spec(Point3::new(0.0, 0.0, -1000.0));
        let vertex = Point3::new(-3.7, 8.1, -1000.0);
        let first = beamlet_for_vertex(&spec, &vertex);
        for _ in 0..10 {
            assert_eq!(beamlet_for_vertex(&spec, &vertex), first);
        }
    }
}
