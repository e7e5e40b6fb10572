//! Test doubles shared by the unit tests.

use alloc::vec::Vec;
use pg_ir::{DrumPart, NUM_PARTS};

use crate::oracle::{fires, OracleSettings, PatternOracle, MAX_PATTERN_LENGTH, PULSES_PER_STEP};
use crate::trigger::{Trigger, TriggerSink};

/// Sink that records every trigger it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub hits: Vec<Trigger>,
}

impl TriggerSink for RecordingSink {
    fn trigger(&mut self, sample_id: u8, velocity: f32, pan: f32) {
        self.hits.push(Trigger { sample_id, velocity, pan });
    }
}

/// Oracle whose levels are a fixed table indexed by part and step,
/// independent of (x, y) unless `xy_offset` is set.
#[derive(Debug)]
pub struct ScriptedOracle {
    pub levels: [[u8; MAX_PATTERN_LENGTH as usize]; NUM_PARTS],
    /// Added to every level when `x` is at least 128.
    pub xy_offset: u8,
    pub settings: OracleSettings,
    step: u8,
    pulse: u32,
    started: bool,
    gate_open: bool,
    pub gate_advances: u32,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self {
            levels: [[0; MAX_PATTERN_LENGTH as usize]; NUM_PARTS],
            xy_offset: 0,
            settings: OracleSettings::default(),
            step: 0,
            pulse: 0,
            started: false,
            gate_open: false,
            gate_advances: 0,
        }
    }
}

impl ScriptedOracle {
    /// Oracle where `part` fires (level 255) on each of `steps`.
    pub fn with_hits(part: DrumPart, steps: &[u8]) -> Self {
        let mut oracle = Self::default();
        for &s in steps {
            oracle.levels[part.index()][s as usize] = 255;
        }
        oracle
    }
}

impl PatternOracle for ScriptedOracle {
    fn reset_clock(&mut self) {
        self.step = 0;
        self.pulse = 0;
        self.started = false;
        self.gate_open = false;
    }

    fn advance_clock(&mut self, pulses: u8) {
        for _ in 0..pulses {
            if !self.started {
                self.started = true;
            } else {
                self.pulse += 1;
                if self.pulse == PULSES_PER_STEP {
                    self.pulse = 0;
                    self.step = (self.step + 1) % MAX_PATTERN_LENGTH;
                }
            }
            if self.pulse == 0 {
                self.gate_open = true;
            }
        }
    }

    fn current_step(&self) -> u8 {
        self.step
    }

    fn set_step(&mut self, step: u8) {
        self.step = step % MAX_PATTERN_LENGTH;
    }

    fn trigger_bitmask(&self) -> u8 {
        if !self.gate_open {
            return 0;
        }
        let (x, y) = (self.settings.x, self.settings.y);
        DrumPart::ALL
            .into_iter()
            .filter(|&p| fires(self.level(self.step, p, x, y), self.density_threshold(p)))
            .fold(0, |mask, p| mask | p.mask())
    }

    fn advance_gate_counter(&mut self) {
        self.gate_open = false;
        self.gate_advances += 1;
    }

    fn level(&self, step: u8, part: DrumPart, x: u8, _y: u8) -> u8 {
        let base = self.levels[part.index()][(step % MAX_PATTERN_LENGTH) as usize];
        if x >= 128 {
            base.saturating_add(self.xy_offset)
        } else {
            base
        }
    }

    fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut OracleSettings {
        &mut self.settings
    }
}
