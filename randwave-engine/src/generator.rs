//! Random control-point generation.
//!
//! Interior positions come from a Fisher–Yates shuffle of every slot strictly
//! between the two anchors (`1..=size-2`); the first `n` shuffled slots are sorted
//! and each gets an independent uniform amplitude. The anchors `(0, 0.0)` and
//! `(size-1, 0.0)` put a zero crossing at the loop seam.

use core::ops::Deref;

use randwave_core::points::{check_point_set, ControlPoint};

use crate::error::{try_with_capacity, GenerateResult};
use crate::params::GenerateParams;
use crate::source::PointSource;

/// Ordered, anchored control points for one wavetable.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
}

impl ControlPointSet {
    /// Wrap `points` after checking them against a table of `size` samples.
    pub fn new(points: Vec<ControlPoint>, size: usize) -> GenerateResult<Self> {
        check_point_set(&points, size)?;
        Ok(Self { points })
    }

    #[inline]
    pub fn as_slice(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Interior points only (anchors stripped).
    #[inline]
    pub fn interior(&self) -> &[ControlPoint] {
        &self.points[1..self.points.len() - 1]
    }
}

impl Deref for ControlPointSet {
    type Target = [ControlPoint];

    #[inline]
    fn deref(&self) -> &[ControlPoint] {
        &self.points
    }
}

/// Draw a fresh point set for `params`.
pub fn generate_points<S: PointSource + ?Sized>(
    params: GenerateParams,
    source: &mut S,
) -> GenerateResult<ControlPointSet> {
    let size = params.wavetable_size();
    let interior = params.interior_points();

    let slots = size - 2;
    let mut candidates = try_with_capacity::<usize>(slots, "candidate positions")?;
    candidates.extend(1..=slots);

    for i in (1..slots).rev() {
        // Clamp so a misbehaving source can't index past the unshuffled prefix.
        let j = source.index_up_to(i).min(i);
        candidates.swap(i, j);
    }

    let chosen = &mut candidates[..interior];
    chosen.sort_unstable();

    let mut points = try_with_capacity::<ControlPoint>(interior + 2, "control points")?;
    points.push(ControlPoint::anchor(0));
    for &position in chosen.iter() {
        let amplitude = source.amplitude().clamp(-1.0, 1.0);
        points.push(ControlPoint::new(position, amplitude));
    }
    points.push(ControlPoint::anchor(size - 1));

    ControlPointSet::new(points, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RngSource;

    /// Source with scripted shuffle swaps and a queue of amplitudes.
    struct Scripted {
        swaps: Vec<(usize, usize)>,
        amplitudes: Vec<f32>,
    }

    impl PointSource for Scripted {
        fn index_up_to(&mut self, upper: usize) -> usize {
            self.swaps
                .iter()
                .find(|(step, _)| *step == upper)
                .map_or(upper, |(_, j)| *j)
        }

        fn amplitude(&mut self) -> f32 {
            self.amplitudes.remove(0)
        }
    }

    #[test]
    fn scripted_choice_builds_the_expected_set() {
        // Candidates are 1..=14. Step 9 swaps slot 1 with slot 9 (value 10), step 4
        // swaps slot 0 with slot 4 (value 5); every other step keeps its slot.
        let mut src = Scripted { swaps: vec![(9, 1), (4, 0)], amplitudes: vec![0.5, -0.3] };
        let params = GenerateParams::new(16, 2).unwrap();
        let set = generate_points(params, &mut src).unwrap();

        let expected = [
            ControlPoint::new(0, 0.0),
            ControlPoint::new(5, 0.5),
            ControlPoint::new(10, -0.3),
            ControlPoint::new(15, 0.0),
        ];
        assert_eq!(set.as_slice(), &expected);
        assert_eq!(set.interior().len(), 2);
    }

    #[test]
    fn random_sets_hold_the_invariants() {
        let mut src = RngSource::seeded(2024);
        for (size, interior) in [(3usize, 1usize), (16, 14), (64, 5), (2048, 4), (2048, 300)] {
            let params = GenerateParams::new(size, interior).unwrap();
            let set = generate_points(params, &mut src).unwrap();
            assert_eq!(set.len(), interior + 2);
            assert_eq!(set[0], ControlPoint::anchor(0));
            assert_eq!(set[set.len() - 1], ControlPoint::anchor(size - 1));
            assert!(set.windows(2).all(|w| w[0].position < w[1].position));
            assert!(set.iter().all(|p| (-1.0..=1.0).contains(&p.amplitude)));
        }
    }

    #[test]
    fn full_table_uses_every_slot() {
        let mut src = RngSource::seeded(5);
        let params = GenerateParams::new(10, 8).unwrap();
        let set = generate_points(params, &mut src).unwrap();
        let positions: Vec<usize> = set.iter().map(|p| p.position).collect();
        assert_eq!(positions, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_source_is_contained() {
        struct Wild;
        impl PointSource for Wild {
            fn index_up_to(&mut self, _upper: usize) -> usize {
                usize::MAX
            }
            fn amplitude(&mut self) -> f32 {
                7.0
            }
        }
        let params = GenerateParams::new(32, 6).unwrap();
        let set = generate_points(params, &mut Wild).unwrap();
        assert!(set.interior().iter().all(|p| p.amplitude == 1.0));
    }
}
