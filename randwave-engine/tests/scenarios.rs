//! End-to-end behaviour of generate + render through the public API.

use randwave_engine::{
    ControlPoint, FrequencyControl, GenerateParams, PointSource, Randwave, Reconstruction,
    Wavetable,
};

/// Scripted shuffle: `swaps` maps a shuffle step to the index it picks, all other
/// steps keep their slot. Amplitudes are handed out in order.
struct Scripted {
    swaps: Vec<(usize, usize)>,
    amplitudes: Vec<f32>,
}

impl PointSource for Scripted {
    fn index_up_to(&mut self, upper: usize) -> usize {
        self.swaps.iter().find(|(s, _)| *s == upper).map_or(upper, |(_, j)| *j)
    }

    fn amplitude(&mut self) -> f32 {
        self.amplitudes.remove(0)
    }
}

fn picks_5_and_10() -> Scripted {
    Scripted { swaps: vec![(9, 1), (4, 0)], amplitudes: vec![0.5, -0.3] }
}

#[test]
fn sixteen_sample_table_passes_through_its_points() {
    let params = GenerateParams::new(16, 2).unwrap();
    let table = Wavetable::generate(params, &mut picks_5_and_10(), Reconstruction::Nodal).unwrap();

    let expected = [
        ControlPoint::new(0, 0.0),
        ControlPoint::new(5, 0.5),
        ControlPoint::new(10, -0.3),
        ControlPoint::new(15, 0.0),
    ];
    assert_eq!(table.points().as_slice(), &expected);

    let s = table.samples();
    for (i, want) in [(0, 0.0f32), (5, 0.5), (10, -0.3), (15, 0.0)] {
        assert!((s[i] - want).abs() < 1e-4, "s[{i}] = {}", s[i]);
    }
    assert!(s.iter().all(|v| v.abs() <= 1.0));
    // Smooth in between: rises into the peak, falls towards the trough.
    assert!(s[1] > 0.0 && s[4] > s[1]);
    assert!(s[7] > s[9]);
}

#[test]
fn every_sample_is_clipped() {
    let mut rw = Randwave::with_seed(404);
    for (size, points) in [(64usize, 62usize), (2048, 40), (4096, 4), (3, 1)] {
        for mode in [Reconstruction::Nodal, Reconstruction::CardinalSum] {
            rw.set_reconstruction(mode);
            rw.generate(GenerateParams::new(size, points).unwrap()).unwrap();
            let t = rw.wavetable().unwrap();
            assert!(
                t.samples().iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)),
                "size={size} points={points} mode={mode:?}"
            );
        }
    }
}

#[test]
fn default_tables_are_smooth() {
    const SEEDS: u64 = 50;
    let mut clipped = 0usize;
    let mut total = 0usize;
    for seed in 0..SEEDS {
        let mut rw = Randwave::with_seed(seed);
        rw.prepare().unwrap();
        let s = rw.wavetable().unwrap().samples();

        // The loop seam (last sample back to the first) is allowed to step.
        for (i, w) in s.windows(2).enumerate() {
            assert!((w[1] - w[0]).abs() <= 1.0, "seed={seed} i={i} {} -> {}", w[0], w[1]);
        }
        clipped += s.iter().filter(|v| v.abs() >= 1.0).count();
        total += s.len();
    }
    let fraction = clipped as f64 / total as f64;
    assert!(fraction < 0.1, "{clipped}/{total} samples clipped");
}

#[test]
fn block_of_four_walks_the_table() {
    let mut rw = Randwave::with_source(picks_5_and_10());
    rw.generate(GenerateParams::new(16, 2).unwrap()).unwrap();
    let table = rw.wavetable().unwrap().samples().to_vec();

    // Block of 3: step ceil(16 / 3) = 6, reads 0, 6, 12 and leaves phase at 18 % 16.
    let mut three = [0.0; 3];
    rw.render(None, &mut three);
    assert_eq!(three, [table[0], table[6], table[12]]);
    assert_eq!(rw.phase(), 2);

    // Block of 4: step 4, one full period, back where it started.
    let mut four = [0.0; 4];
    rw.render(None, &mut four);
    assert_eq!(four, [table[2], table[6], table[10], table[14]]);
    assert_eq!(rw.phase(), 2);
}

#[test]
fn phase_survives_shrinking_regenerates() {
    let mut rw = Randwave::with_seed(8);
    rw.set_frequency_control(FrequencyControl::Multiplier);
    let freq: Vec<f32> = (0..64).map(|i| 0.25 * i as f32 - 3.0).collect();
    let mut out = vec![0.0; 64];

    for (size, block) in [(2048usize, 64usize), (5, 64), (1000, 7), (3, 1), (777, 33), (16, 64)] {
        rw.generate(GenerateParams::new(size, 1).unwrap()).unwrap();
        for _ in 0..3 {
            rw.render(Some(&freq[..block]), &mut out[..block]);
            assert!(rw.phase() < size, "size={size} block={block} phase={}", rw.phase());
        }
    }
}

#[test]
fn same_seed_same_audio() {
    let render = |seed| {
        let mut rw = Randwave::with_seed(seed);
        let mut out = vec![0.0; 256];
        rw.generate(GenerateParams::new(512, 9).unwrap()).unwrap();
        rw.render(None, &mut out);
        out
    };
    assert_eq!(render(31), render(31));
    assert_ne!(render(31), render(32));
}

#[test]
fn raw_parameters_fall_back_like_a_patcher_would() {
    let mut rw = Randwave::with_seed(1);
    let warnings = rw.generate_raw(-20.0, 0.0).unwrap();
    assert_eq!(warnings.len(), 2);
    assert_eq!(rw.wavetable_size(), 2048);
    assert_eq!(rw.wavetable().unwrap().points().interior().len(), 4);

    let warnings = rw.generate_raw(5.0, 9.0).unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(rw.wavetable().unwrap().points().interior().len(), 3);
}
