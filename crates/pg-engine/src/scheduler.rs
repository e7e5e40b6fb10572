//! Pattern scheduler: pulse timing, trigger resolution, humanize and drift.

use alloc::vec::Vec;

use pg_ir::DrumPart;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::clock::PulseClock;
use crate::humanize::HumanizeQueue;
use crate::lfo::LfoRange;
use crate::mapping::{spread_pan, InstrumentMapping, MAX_MAPPINGS, MAX_VELOCITY_STEPS};
use crate::oracle::PatternOracle;
use crate::pattern_watch::{self, PatternChanges, PatternPublisher, PatternSnapshot};
use crate::trigger::{Trigger, TriggerSink};

/// Humanize jitter bound in pulses at amount 1.0 (half a step).
const JITTER_PULSES: f64 = 1.5;

/// Drives a [`PatternOracle`] from audio frames and fires the resulting hits
/// into a [`TriggerSink`].
///
/// Configuration methods run on the control thread before the scheduler is
/// handed to the audio callback; [`process`](Self::process) runs inside it.
pub struct PatternScheduler<O> {
    oracle: O,
    clock: PulseClock,
    mappings: heapless::Vec<InstrumentMapping, MAX_MAPPINGS>,
    /// Parts with at least one mapping, as a [`DrumPart::mask`] set.
    assigned_parts: u8,
    pattern_length: u8,
    lfo_enabled: bool,
    lfo_range: LfoRange,
    humanize: f32,
    max_jitter_frames: u32,
    spread: f32,
    queue: HumanizeQueue,
    publisher: PatternPublisher,
    changes: Option<PatternChanges>,
}

impl<O: PatternOracle> PatternScheduler<O> {
    pub fn new(mut oracle: O, sample_rate: u32, bpm: f32) -> Self {
        oracle.reset_clock();
        let pattern_length = oracle.native_length();
        let (publisher, changes) = pattern_watch::channel();
        Self {
            oracle,
            clock: PulseClock::new(sample_rate, bpm),
            mappings: heapless::Vec::new(),
            assigned_parts: 0,
            pattern_length,
            lfo_enabled: false,
            lfo_range: LfoRange::default(),
            humanize: 0.0,
            max_jitter_frames: 0,
            spread: 0.0,
            queue: HumanizeQueue::new(),
            publisher,
            changes: Some(changes),
        }
    }

    /// Pick `min(num_parts, candidates.len())` instruments at random and give
    /// each a random part, position, velocity pattern and LFO.
    ///
    /// Replaces any previous assignment.
    pub fn assign_instruments<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        candidates: &[u8],
        num_parts: usize,
        velocity_steps: usize,
    ) {
        self.mappings.clear();
        self.assigned_parts = 0;

        let mut pool: Vec<u8> = candidates.to_vec();
        pool.shuffle(rng);
        let count = num_parts.min(pool.len()).min(MAX_MAPPINGS);
        let velocity_steps = velocity_steps.clamp(1, MAX_VELOCITY_STEPS);
        let sample_rate = self.clock.sample_rate();

        info!(count, candidates = candidates.len(), "assigning instruments");
        for &sample_id in &pool[..count] {
            let mapping = InstrumentMapping::random(
                rng,
                sample_id,
                velocity_steps,
                self.lfo_range,
                sample_rate,
            );
            info!(
                note = mapping.sample_id,
                part = %mapping.part,
                x = mapping.x,
                y = mapping.y,
                velocity = %mapping.velocity_pattern,
                "assigned instrument"
            );
            self.assigned_parts |= mapping.part.mask();
            if self.mappings.push(mapping).is_err() {
                break;
            }
        }
        self.apply_spread();
        self.publisher.prime(self.current_pattern());
    }

    /// Replace the mappings with an explicit set (extra entries are dropped).
    pub fn set_mappings(&mut self, mappings: impl IntoIterator<Item = InstrumentMapping>) {
        self.mappings.clear();
        self.assigned_parts = 0;
        for mapping in mappings.into_iter().take(MAX_MAPPINGS) {
            self.assigned_parts |= mapping.part.mask();
            if self.mappings.push(mapping).is_err() {
                break;
            }
        }
        self.apply_spread();
        self.publisher.prime(self.current_pattern());
    }

    pub fn mappings(&self) -> &[InstrumentMapping] {
        &self.mappings
    }

    /// Parts with at least one mapping, as a [`DrumPart::mask`] set.
    pub fn assigned_parts(&self) -> u8 {
        self.assigned_parts
    }

    /// Change tempo. Keeps the pulse phase and rescales the humanize bound.
    pub fn set_tempo(&mut self, bpm: f32) {
        self.clock.set_tempo(bpm);
        self.recentre_jitter(self.jitter_frames(self.humanize));
        debug!(
            bpm = self.clock.tempo(),
            frames_per_pulse = self.clock.frames_per_pulse(),
            "tempo set"
        );
    }

    pub fn tempo(&self) -> f32 {
        self.clock.tempo()
    }

    pub fn frames_per_pulse(&self) -> u32 {
        self.clock.frames_per_pulse()
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn set_pattern_x(&mut self, x: u8) {
        self.oracle.settings_mut().x = x;
    }

    pub fn set_pattern_y(&mut self, y: u8) {
        self.oracle.settings_mut().y = y;
    }

    pub fn set_randomness(&mut self, randomness: u8) {
        self.oracle.settings_mut().randomness = randomness;
    }

    pub fn pattern_x(&self) -> u8 {
        self.oracle.settings().x
    }

    pub fn pattern_y(&self) -> u8 {
        self.oracle.settings().y
    }

    pub fn randomness(&self) -> u8 {
        self.oracle.settings().randomness
    }

    /// Active pattern length in steps, clamped to `1..=native_length`.
    pub fn set_pattern_length(&mut self, length: u8) {
        self.pattern_length = length.clamp(1, self.oracle.native_length());
    }

    pub fn pattern_length(&self) -> u8 {
        self.pattern_length
    }

    pub fn set_lfo_enabled(&mut self, enabled: bool) {
        if enabled && !self.lfo_enabled {
            self.publisher.prime(self.current_pattern());
        }
        self.lfo_enabled = enabled;
    }

    pub fn lfo_enabled(&self) -> bool {
        self.lfo_enabled
    }

    /// Period bounds for LFOs created by later assignments.
    pub fn set_lfo_range(&mut self, range: LfoRange) {
        self.lfo_range = range;
    }

    /// Timing jitter amount in [0, 1]; 1.0 allows up to half a step either
    /// side of the grid.
    pub fn set_humanize(&mut self, amount: f32) {
        let amount = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };
        let jitter = self.jitter_frames(amount);
        self.recentre_jitter(jitter);
        self.humanize = amount;
        debug!(amount, max_jitter_frames = jitter, "humanize set");
    }

    /// Replace the jitter bound, keeping the grid pulled earlier by exactly
    /// the bound so delays in [0, 2 * bound] centre on the nominal pulse.
    fn recentre_jitter(&mut self, jitter: u32) {
        self.clock.nudge(jitter as i64 - self.max_jitter_frames as i64);
        self.max_jitter_frames = jitter;
    }

    pub fn humanize(&self) -> f32 {
        self.humanize
    }

    pub fn max_jitter_frames(&self) -> u32 {
        self.max_jitter_frames
    }

    pub fn pending_triggers(&self) -> usize {
        self.queue.pending()
    }

    /// Stereo spread in [0, 1]: pans are laid out evenly over
    /// `[-amount, amount]` in assignment order.
    pub fn set_spread(&mut self, amount: f32) {
        self.spread = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };
        self.apply_spread();
    }

    pub fn spread(&self) -> f32 {
        self.spread
    }

    fn apply_spread(&mut self) {
        let count = self.mappings.len();
        for (i, mapping) in self.mappings.iter_mut().enumerate() {
            mapping.pan = spread_pan(i, count, self.spread);
        }
    }

    fn jitter_frames(&self, amount: f32) -> u32 {
        (amount as f64 * JITTER_PULSES * self.clock.frames_per_pulse() as f64) as u32
    }

    /// Reader for pattern-change notifications. Returns `None` after the
    /// first call.
    pub fn take_pattern_changes(&mut self) -> Option<PatternChanges> {
        self.changes.take()
    }

    /// Pattern for the oracle's current coordinates and the active length.
    pub fn current_pattern(&self) -> PatternSnapshot {
        let settings = self.oracle.settings();
        PatternSnapshot::compute(
            &self.oracle,
            settings.x,
            settings.y,
            self.pattern_length,
            self.assigned_parts,
        )
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Advance by `frames` audio frames, firing due hits into `sink`.
    ///
    /// Real-time safe: no allocation, locking or I/O.
    pub fn process<S: TriggerSink + ?Sized>(&mut self, frames: u32, sink: &mut S) {
        for _ in 0..frames {
            if !self.queue.is_empty() {
                self.queue.tick(sink);
            }
            if self.clock.tick() {
                self.pulse(sink);
            }
        }
    }

    fn pulse<S: TriggerSink + ?Sized>(&mut self, sink: &mut S) {
        if self.lfo_enabled && !self.mappings.is_empty() {
            self.drift();
        }

        self.oracle.advance_clock(1);
        if self.pattern_length < self.oracle.native_length()
            && self.oracle.current_step() >= self.pattern_length
        {
            self.oracle.set_step(0);
        }

        let bitmask = self.oracle.trigger_bitmask();
        if bitmask != 0 {
            self.resolve(bitmask, sink);
        }
        self.oracle.advance_gate_counter();
    }

    /// Move every mapping's LFOs on by one pulse, steer the oracle to the
    /// average position and publish the pattern if it changed.
    fn drift(&mut self) {
        let frames = self.clock.frames_per_pulse();
        let (mut sum_x, mut sum_y) = (0u32, 0u32);
        for mapping in self.mappings.iter_mut() {
            mapping.advance_lfo(frames);
            sum_x += mapping.x as u32;
            sum_y += mapping.y as u32;
        }
        let count = self.mappings.len() as u32;
        let (x, y) = ((sum_x / count) as u8, (sum_y / count) as u8);

        let settings = self.oracle.settings_mut();
        settings.x = x;
        settings.y = y;

        let snapshot =
            PatternSnapshot::compute(&self.oracle, x, y, self.pattern_length, self.assigned_parts);
        self.publisher.publish_if_changed(snapshot);
    }

    fn resolve<S: TriggerSink + ?Sized>(&mut self, bitmask: u8, sink: &mut S) {
        for part in DrumPart::ALL {
            if bitmask & part.mask() == 0 {
                continue;
            }
            for mapping in self.mappings.iter_mut().filter(|m| m.part == part) {
                let trigger = Trigger {
                    sample_id: mapping.sample_id,
                    velocity: mapping.next_velocity(),
                    pan: mapping.pan,
                };
                if self.max_jitter_frames > 0 {
                    self.queue.schedule(trigger, self.max_jitter_frames, sink);
                } else {
                    trigger.fire(sink);
                }
            }
        }
    }
}

impl<O: core::fmt::Debug> core::fmt::Debug for PatternScheduler<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatternScheduler")
            .field("oracle", &self.oracle)
            .field("clock", &self.clock)
            .field("mappings", &self.mappings.len())
            .field("pattern_length", &self.pattern_length)
            .field("lfo_enabled", &self.lfo_enabled)
            .field("humanize", &self.humanize)
            .field("spread", &self.spread)
            .finish_non_exhaustive()
    }
}
