// Test intent: verifies that chunk size and queue capacity only affect
// staging, never the result, which must be bit-identical.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use streamfft::{Direction, PipelineConfig, SplitSignal, StreamingFft};

fn random_signal(seed: u64, n: usize) -> SplitSignal {
    let mut rng = StdRng::seed_from_u64(seed);
    let re = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();
    let im = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();
    SplitSignal::new(re, im).unwrap()
}

fn run(signal: &SplitSignal, config: PipelineConfig) -> SplitSignal {
    StreamingFft::new(config).unwrap().process(signal.clone()).unwrap()
}

#[test]
fn output_is_identical_for_every_chunk_size() {
    for n in [8usize, 64, 512] {
        for direction in [Direction::Forward, Direction::Backward] {
            let signal = random_signal(n as u64, n);
            let baseline = run(&signal, PipelineConfig::with_chunk_size(n, direction, n / 2));
            for chunk in [1usize, 4, 16, 3, 7, n] {
                let out = run(&signal, PipelineConfig::with_chunk_size(n, direction, chunk));
                assert_eq!(out, baseline, "N={} {} chunk={}", n, direction, chunk);
            }
        }
    }
}

#[test]
fn minimal_queue_capacity_still_completes() {
    let n = 256;
    let signal = random_signal(11, n);
    let baseline = run(&signal, PipelineConfig::new(n, Direction::Forward));
    // exactly enough slots to stage one step
    for chunk in [1usize, 8, 32, 128] {
        let cfg = PipelineConfig::with_chunk_size(n, Direction::Forward, chunk)
            .queue_capacity((n / 2).div_ceil(chunk));
        assert!(cfg.validate().is_ok());
        assert_eq!(run(&signal, cfg), baseline, "chunk={}", chunk);
    }
}

#[test]
fn oversized_capacity_is_harmless() {
    let n = 32;
    let signal = random_signal(3, n);
    let baseline = run(&signal, PipelineConfig::new(n, Direction::Forward));
    let cfg = PipelineConfig::with_chunk_size(n, Direction::Forward, 2).queue_capacity(1000);
    assert_eq!(run(&signal, cfg), baseline);
}
