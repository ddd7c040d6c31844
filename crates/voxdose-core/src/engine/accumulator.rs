use crate::core::models::beamlet::{BeamletKey, FluenceMapSpec};
use crate::engine::classifier;
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Sparse voxel-index → accumulated value map for one scorer.
pub type SparseTally = HashMap<usize, f64>;

/// One sparse tally per scorer name.
pub type ScorerTallies = HashMap<String, SparseTally>;

/// Hit collections of one completed particle history, as handed over by the
/// transport engine: the originating vertex plus, per scorer, a sparse
/// voxel-index → value map. A scorer with no hits this event is simply absent.
#[derive(Debug, Clone)]
pub struct EventHits {
    vertex: Point3<f64>,
    collections: ScorerTallies,
}

impl EventHits {
    pub fn new(vertex: Point3<f64>) -> Self {
        Self {
            vertex,
            collections: HashMap::new(),
        }
    }

    pub fn vertex(&self) -> &Point3<f64> {
        &self.vertex
    }

    /// Adds a single deposition to a scorer's collection.
    pub fn deposit(&mut self, scorer: &str, voxel: usize, value: f64) {
        *self
            .collections
            .entry(scorer.to_string())
            .or_default()
            .entry(voxel)
            .or_insert(0.0) += value;
    }

    pub fn insert_collection(&mut self, scorer: impl Into<String>, hits: SparseTally) {
        self.collections.insert(scorer.into(), hits);
    }

    /// The hit collection for a scorer, or `None` if the engine reported no
    /// hits for it this event.
    pub fn collection(&self, scorer: &str) -> Option<&SparseTally> {
        self.collections.get(scorer)
    }
}

/// Per-stream tally container for one run.
///
/// Each worker stream owns exactly one accumulator and is its only writer, so
/// the event hot path needs no synchronization. At end of run the workers'
/// accumulators are merged, in any order, into a single global one.
#[derive(Debug, Clone)]
pub struct RunAccumulator {
    scorers: Vec<String>,
    full_volume: ScorerTallies,
    beamlets: BTreeMap<BeamletKey, ScorerTallies>,
    fluence_map: Option<FluenceMapSpec>,
    events: u64,
}

impl RunAccumulator {
    /// Allocates one empty tally per scorer, for the full volume and for each
    /// tracked beamlet of the fluence map (when one is configured).
    pub fn new(scorers: &[String], fluence_map: Option<FluenceMapSpec>) -> Self {
        let empty_set = |scorers: &[String]| -> ScorerTallies {
            scorers
                .iter()
                .map(|s| (s.clone(), SparseTally::new()))
                .collect()
        };

        let beamlets = fluence_map
            .iter()
            .flat_map(|spec| spec.tracked.iter())
            .map(|&key| (key, empty_set(scorers)))
            .collect();

        Self {
            scorers: scorers.to_vec(),
            full_volume: empty_set(scorers),
            beamlets,
            fluence_map,
            events: 0,
        }
    }

    /// Folds one event's hit collections into the run tallies.
    ///
    /// Every present collection is added to the full-volume tally; a missing
    /// collection is a no-op for that scorer. If the event's originating
    /// beamlet is tracked, the same collections are also added to that
    /// beamlet's tallies; untracked or out-of-range beamlets contribute to
    /// the full volume only.
    pub fn record_event(&mut self, event: &EventHits) {
        self.events += 1;

        for (scorer, tally) in self.full_volume.iter_mut() {
            if let Some(hits) = event.collection(scorer) {
                add_sparse(tally, hits);
            }
        }

        if let Some(spec) = &self.fluence_map {
            let key = classifier::beamlet_for_vertex(spec, event.vertex());
            if let Some(tallies) = self.beamlets.get_mut(&key) {
                for (scorer, tally) in tallies.iter_mut() {
                    if let Some(hits) = event.collection(scorer) {
                        add_sparse(tally, hits);
                    }
                }
            }
        }
    }

    /// Combines another stream's accumulator into this one by element-wise
    /// addition, per scorer per voxel, for the full volume and every tracked
    /// beamlet. Addition makes this associative and commutative, so the
    /// merge order across workers does not affect the result.
    pub fn merge(&mut self, other: RunAccumulator) {
        for (scorer, theirs) in other.full_volume {
            debug!("Merging tally from stream (full beam): {scorer}");
            add_sparse_owned(self.full_volume.entry(scorer).or_default(), theirs);
        }

        for (key, their_tallies) in other.beamlets {
            let ours = self.beamlets.entry(key).or_default();
            for (scorer, theirs) in their_tallies {
                debug!("Merging tally from stream (beamlet {key}): {scorer}");
                add_sparse_owned(ours.entry(scorer).or_default(), theirs);
            }
        }

        self.events += other.events;
    }

    pub fn scorers(&self) -> &[String] {
        &self.scorers
    }

    pub fn full_volume(&self, scorer: &str) -> Option<&SparseTally> {
        self.full_volume.get(scorer)
    }

    pub fn beamlets(&self) -> &BTreeMap<BeamletKey, ScorerTallies> {
        &self.beamlets
    }

    pub fn fluence_map(&self) -> Option<&FluenceMapSpec> {
        self.fluence_map.as_ref()
    }

    /// Number of events recorded (including merged-in streams).
    pub fn events(&self) -> u64 {
        self.events
    }
}

fn add_sparse(target: &mut SparseTally, source: &SparseTally) {
    for (&voxel, &value) in source {
        *target.entry(voxel).or_insert(0.0) += value;
    }
}

fn add_sparse_owned(target: &mut SparseTally, source: SparseTally) {
    for (voxel, value) in source {
        *target.entry(voxel).or_insert(0.0) += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;
    use std::collections::BTreeSet;

    fn scorers() -> Vec<String> {
        vec!["dose3d".to_string(), "photonFluence".to_string()]
    }

    fn tracked_spec(keys: &[(i32, i32)]) -> FluenceMapSpec {
        FluenceMapSpec {
            size: Vector2::new(20, 20),
            beamlet_size: Vector2::new(5.0, 5.0),
            center: Point3::new(0.0, 0.0, -1000.0),
            magnification: 10.0,
            tracked: keys
                .iter()
                .map(|&(bx, by)| BeamletKey::new(bx, by))
                .collect::<BTreeSet<_>>(),
        }
    }

    fn event_at_center(deposits: &[(usize, f64)]) -> EventHits {
        // the map center projects to beamlet (9,9)
        let mut event = EventHits::new(Point3::new(0.0, 0.0, -1000.0));
        for &(voxel, value) in deposits {
            event.deposit("dose3d", voxel, value);
        }
        event
    }

    #[test]
    fn missing_collection_is_a_no_op() {
        let mut acc = RunAccumulator::new(&scorers(), None);
        let event = event_at_center(&[(4, 1.0)]);

        acc.record_event(&event);

        assert_eq!(acc.full_volume("dose3d").unwrap().get(&4), Some(&1.0));
        assert!(acc.full_volume("photonFluence").unwrap().is_empty());
        assert_eq!(acc.events(), 1);
    }

    #[test]
    fn tracked_beamlet_receives_a_copy_of_the_event() {
        let mut acc = RunAccumulator::new(&scorers(), Some(tracked_spec(&[(9, 9)])));
        acc.record_event(&event_at_center(&[(0, 2.0), (1, 0.5)]));

        let full = acc.full_volume("dose3d").unwrap();
        assert_eq!(full.get(&0), Some(&2.0));

        let beamlet = &acc.beamlets()[&BeamletKey::new(9, 9)];
        assert_eq!(beamlet["dose3d"].get(&0), Some(&2.0));
        assert_eq!(beamlet["dose3d"].get(&1), Some(&0.5));
    }

    #[test]
    fn untracked_beamlet_contributes_to_full_volume_only() {
        let mut acc = RunAccumulator::new(&scorers(), Some(tracked_spec(&[(0, 0)])));
        acc.record_event(&event_at_center(&[(0, 2.0)]));

        assert_eq!(acc.full_volume("dose3d").unwrap().get(&0), Some(&2.0));
        let beamlet = &acc.beamlets()[&BeamletKey::new(0, 0)];
        assert!(beamlet["dose3d"].is_empty());
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        // power-of-two values keep every partial sum exact
        let deposits: [&[(usize, f64)]; 3] = [
            &[(0, 1.0), (1, 2.0)],
            &[(0, 4.0), (2, 8.0)],
            &[(1, 16.0), (2, 32.0)],
        ];

        let build = |hits: &[(usize, f64)]| {
            let mut acc = RunAccumulator::new(&scorers(), Some(tracked_spec(&[(9, 9)])));
            acc.record_event(&event_at_center(hits));
            acc
        };

        let merge_order = |order: [usize; 3]| {
            let mut global = RunAccumulator::new(&scorers(), Some(tracked_spec(&[(9, 9)])));
            for i in order {
                global.merge(build(deposits[i]));
            }
            global
        };

        let abc = merge_order([0, 1, 2]);
        let cba = merge_order([2, 1, 0]);
        let bac = merge_order([1, 0, 2]);

        for acc in [&cba, &bac] {
            assert_eq!(acc.full_volume("dose3d"), abc.full_volume("dose3d"));
            assert_eq!(acc.beamlets(), abc.beamlets());
            assert_eq!(acc.events(), 3);
        }
        let full = abc.full_volume("dose3d").unwrap();
        assert_eq!(full.get(&0), Some(&5.0));
        assert_eq!(full.get(&1), Some(&18.0));
        assert_eq!(full.get(&2), Some(&40.0));
    }

    #[test]
    fn repeated_deposits_into_one_voxel_accumulate() {
        let mut acc = RunAccumulator::new(&scorers(), None);
        for _ in 0..4 {
            acc.record_event(&event_at_center(&[(7, 0.25)]));
        }
        assert_eq!(acc.full_volume("dose3d").unwrap().get(&7), Some(&1.0));
        assert_eq!(acc.events(), 4);
    }
}
