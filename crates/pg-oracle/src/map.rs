//! Interpolated drum map.

use pg_engine::{fires, OracleSettings, PatternOracle, PULSES_PER_STEP};
use pg_ir::{DrumPart, NUM_PARTS};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Steps in one pattern.
pub const NATIVE_LENGTH: u8 = 32;

/// Nodes per map axis.
pub const GRID_SIZE: usize = 5;

const DEFAULT_SEED: u64 = 0x6d61_705f_6772_6964;

/// Metric weight per part for each position in an eighth-step group.
const ACCENTS: [[u8; 8]; NUM_PARTS] = [
    [255, 40, 90, 30, 170, 40, 110, 60],
    [30, 50, 60, 40, 255, 50, 90, 70],
    [150, 80, 220, 90, 150, 80, 220, 120],
];

type StepTable = [[u8; NATIVE_LENGTH as usize]; NUM_PARTS];

/// Pattern oracle reading levels from a grid of step tables.
///
/// Each pattern step spans [`PULSES_PER_STEP`] pulses. The gate opens on the
/// first pulse of a step and stays open until
/// [`advance_gate_counter`](PatternOracle::advance_gate_counter), so a step
/// fires at most once.
#[derive(Clone, Debug)]
pub struct MapOracle {
    nodes: [[StepTable; GRID_SIZE]; GRID_SIZE],
    settings: OracleSettings,
    step: u8,
    /// Pulse within the current step.
    pulse: u32,
    started: bool,
    gate_open: bool,
    /// Randomness added to every level, refreshed at each pattern start.
    perturbation: [u8; NUM_PARTS],
    rng: SmallRng,
}

impl MapOracle {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// A map whose node tables are generated from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut nodes = [[[[0u8; NATIVE_LENGTH as usize]; NUM_PARTS]; GRID_SIZE]; GRID_SIZE];
        for node in nodes.iter_mut().flatten() {
            for (part, table) in node.iter_mut().enumerate() {
                for (step, level) in table.iter_mut().enumerate() {
                    let accent = ACCENTS[part][step % 8] as u16;
                    let roll = rng.gen::<u8>() as u16;
                    *level = ((accent * roll) >> 8) as u8;
                }
            }
        }
        Self {
            nodes,
            settings: OracleSettings::default(),
            step: 0,
            pulse: 0,
            started: false,
            gate_open: false,
            perturbation: [0; NUM_PARTS],
            rng: SmallRng::seed_from_u64(seed.rotate_left(17)),
        }
    }

    /// Perturbation currently added to `part`'s levels.
    pub fn perturbation(&self, part: DrumPart) -> u8 {
        self.perturbation[part.index()]
    }

    fn refresh_perturbation(&mut self) {
        let amount = (self.settings.randomness >> 2) as u16;
        for p in &mut self.perturbation {
            *p = ((self.rng.gen::<u8>() as u16 * amount) >> 8) as u8;
        }
    }
}

impl Default for MapOracle {
    fn default() -> Self {
        Self::new()
    }
}

/// Crossfade `a` into `b` by `t / 255`.
fn mix(a: u8, b: u8, t: u8) -> u8 {
    ((a as u32 * (255 - t as u32) + b as u32 * t as u32) / 255) as u8
}

impl PatternOracle for MapOracle {
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
                if self.pulse >= PULSES_PER_STEP {
                    self.pulse = 0;
                    self.step = (self.step + 1) % NATIVE_LENGTH;
                }
            }
            if self.pulse == 0 {
                self.gate_open = true;
                if self.step == 0 {
                    self.refresh_perturbation();
                }
            }
        }
    }

    fn current_step(&self) -> u8 {
        self.step
    }

    fn set_step(&mut self, step: u8) {
        self.step = step % NATIVE_LENGTH;
        if self.step == 0 && self.pulse == 0 {
            self.refresh_perturbation();
        }
    }

    fn trigger_bitmask(&self) -> u8 {
        if !self.gate_open {
            return 0;
        }
        let (x, y) = (self.settings.x, self.settings.y);
        let mut mask = 0;
        for part in DrumPart::ALL {
            let level = self
                .level(self.step, part, x, y)
                .saturating_add(self.perturbation[part.index()]);
            if fires(level, self.density_threshold(part)) {
                mask |= part.mask();
            }
        }
        mask
    }

    fn advance_gate_counter(&mut self) {
        self.gate_open = false;
    }

    fn level(&self, step: u8, part: DrumPart, x: u8, y: u8) -> u8 {
        let (i, j) = ((x >> 6) as usize, (y >> 6) as usize);
        let (fx, fy) = ((x & 0x3f) << 2, (y & 0x3f) << 2);
        let s = (step % NATIVE_LENGTH) as usize;
        let p = part.index();
        let at = |i: usize, j: usize| self.nodes[i][j][p][s];
        let top = mix(at(i, j), at(i + 1, j), fx);
        let bottom = mix(at(i, j + 1), at(i + 1, j + 1), fx);
        mix(top, bottom, fy)
    }

    fn native_length(&self) -> u8 {
        NATIVE_LENGTH
    }

    fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut OracleSettings {
        &mut self.settings
    }
}
