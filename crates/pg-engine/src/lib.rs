//! Real-time core of the pulsegrid sequencer.
//!
//! The [`VoiceEngine`] mixes a fixed pool of sample voices; the
//! [`PatternScheduler`] turns tempo into pulses, asks a [`PatternOracle`]
//! which drum parts fire, and triggers voices. Both run inside the audio
//! callback: nothing on the `process`/`mix` path allocates, locks or blocks.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;
mod humanize;
mod lfo;
mod mapping;
mod oracle;
pub mod pattern_watch;
mod scheduler;
mod session;
mod trigger;
mod voice;
mod voice_engine;

#[cfg(test)]
mod testing;

pub use clock::{frames_per_pulse, PulseClock, DEFAULT_BPM, MAX_BPM};
pub use humanize::{HumanizeQueue, HUMANIZE_SLOTS};
pub use lfo::{Lfo, LfoRange};
pub use mapping::{
    InstrumentMapping, VelocityPattern, HIGH_VELOCITY, LOW_VELOCITY, MAX_MAPPINGS,
    MAX_VELOCITY_STEPS,
};
pub use oracle::{
    fires, OracleSettings, PatternOracle, MAX_PATTERN_LENGTH, PULSES_PER_QUARTER_NOTE,
    PULSES_PER_STEP,
};
pub use pattern_watch::{PatternChanges, PatternSnapshot};
pub use scheduler::PatternScheduler;
pub use session::{Session, SessionStats};
pub use trigger::{Trigger, TriggerSink};
pub use voice::{pan_gains, Voice};
pub use voice_engine::{VoiceEngine, MAX_VOICES};
