//! Allocation-free render path tests.
//!
//! These tests verify that `Session::render()` does not allocate during the
//! real-time phase. They render several seconds with LFO drift, humanize and
//! a saturated voice pool to reach every branch of the scheduler and the
//! pattern-change publisher.
//!
//! Runs under a plain `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use std::sync::Arc;

use pg_engine::{PatternOracle, PatternScheduler, Session, VoiceEngine, MAX_VOICES};
use pg_ir::{Sample, SampleBank};
use pg_oracle::MapOracle;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SAMPLE_RATE: u32 = 44100;

fn bank() -> Arc<SampleBank> {
    let mut bank = SampleBank::new();
    for note in 30..50u8 {
        let data = (0..SAMPLE_RATE as usize / 4)
            .map(|i| ((i as f32) * 0.05 * note as f32).sin() * 0.3)
            .collect();
        bank.insert(Sample::new("tone", note, data));
    }
    Arc::new(bank)
}

struct Setup {
    bpm: f32,
    parts: usize,
    humanize: f32,
    lfo: bool,
    length: u8,
    density: u8,
    randomness: u8,
}

fn session(setup: &Setup) -> Session<MapOracle> {
    let bank = bank();
    let mut rng = StdRng::seed_from_u64(1);
    let mut scheduler = PatternScheduler::new(MapOracle::new(), SAMPLE_RATE, setup.bpm);
    scheduler.set_pattern_length(setup.length);
    scheduler.set_randomness(setup.randomness);
    scheduler.oracle_mut().settings_mut().density = [setup.density; 3];
    scheduler.assign_instruments(&mut rng, &bank.notes(), setup.parts, 16);
    scheduler.set_spread(0.7);
    scheduler.set_humanize(setup.humanize);
    scheduler.set_lfo_enabled(setup.lfo);

    let mut engine = VoiceEngine::new();
    engine.init(bank, SAMPLE_RATE);
    Session::new(scheduler, engine)
}

/// Render `duration_frames` in `block`-sized chunks, aborting on any heap
/// allocation.
fn assert_render_alloc_free(mut session: Session<MapOracle>, duration_frames: usize, block: usize) {
    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let stats = session.stats();

    assert_no_alloc(|| {
        let mut rendered = 0;
        while rendered < duration_frames {
            session.render(&mut left, &mut right);
            rendered += block;
        }
    });

    assert!(stats.total_triggers() > 0);
    assert!(stats.active_voices() as usize <= MAX_VOICES);
}

#[test]
fn plain_playback_alloc_free() {
    let setup = Setup {
        bpm: 120.0,
        parts: 4,
        humanize: 0.0,
        lfo: false,
        length: 32,
        density: 200,
        randomness: 0,
    };
    assert_render_alloc_free(session(&setup), SAMPLE_RATE as usize * 5, 256);
}

#[test]
fn lfo_and_humanize_alloc_free() {
    let setup = Setup {
        bpm: 174.0,
        parts: 12,
        humanize: 1.0,
        lfo: true,
        length: 12,
        density: 220,
        randomness: 200,
    };
    assert_render_alloc_free(session(&setup), SAMPLE_RATE as usize * 5, 512);
}

#[test]
fn saturated_pool_alloc_free() {
    // All 20 notes mapped at full density and top tempo: voices are
    // stolen continuously and the humanize table overflows.
    let setup = Setup {
        bpm: 300.0,
        parts: 128,
        humanize: 1.0,
        lfo: true,
        length: 32,
        density: 255,
        randomness: 255,
    };
    assert_render_alloc_free(session(&setup), SAMPLE_RATE as usize * 5, 64);
}

#[test]
fn pattern_polling_alloc_free() {
    let setup = Setup {
        bpm: 200.0,
        parts: 6,
        humanize: 0.5,
        lfo: true,
        length: 32,
        density: 180,
        randomness: 0,
    };
    let mut s = session(&setup);
    let mut changes = s.scheduler.take_pattern_changes().unwrap();
    let mut left = vec![0.0f32; 1024];
    let mut right = vec![0.0f32; 1024];
    assert_no_alloc(|| {
        for _ in 0..200 {
            s.render(&mut left, &mut right);
            let _ = changes.poll();
        }
    });
}
