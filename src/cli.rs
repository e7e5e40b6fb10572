//! Command-line options.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{value_parser, Parser};
use pg_master::SessionConfig;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Generative drum-sample sequencer driven by a pulse-clocked pattern map"
)]
pub struct Cli {
    /// Directory of WAV samples named by MIDI note, e.g. `36.kick.wav`.
    #[arg(short = 'd', long = "samples", value_name = "DIR", default_value = "data")]
    pub samples: PathBuf,

    /// Tempo in BPM (0 < bpm <= 300).
    #[arg(short, long, default_value_t = 120.0, value_parser = parse_bpm)]
    pub bpm: f32,

    /// Number of samples picked at random and mapped to drum parts.
    #[arg(
        short,
        long,
        env = "PARTS",
        default_value_t = 4,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub parts: u32,

    /// Steps in each sample's velocity pattern (clamped to 32).
    #[arg(
        short,
        long,
        env = "STEPS",
        default_value_t = 32,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub steps: u32,

    /// Active pattern length in steps.
    #[arg(short = 'L', long, default_value_t = 32, value_parser = value_parser!(u8).range(1..=32))]
    pub length: u8,

    /// Global output gain.
    #[arg(short = 'o', long, default_value_t = 1.0, value_parser = parse_gain)]
    pub gain: f32,

    /// Drift the map position with slow LFOs.
    #[arg(short, long, env = "LFO", value_parser = BoolishValueParser::new())]
    pub lfo: bool,

    /// Timing jitter, 0 to 1 (1 = up to half a step either way).
    #[arg(short = 'H', long, default_value_t = 0.0, value_parser = parse_unit)]
    pub humanize: f32,

    /// Stereo spread of the selected samples, 0 to 1.
    #[arg(short = 'S', long, default_value_t = 0.0, value_parser = parse_unit)]
    pub spread: f32,

    /// Map X position.
    #[arg(short = 'x', long = "pattern-x", default_value_t = 128)]
    pub x: u8,

    /// Map Y position.
    #[arg(short = 'y', long = "pattern-y", default_value_t = 128)]
    pub y: u8,

    /// Pattern randomness.
    #[arg(short, long, default_value_t = 0)]
    pub randomness: u8,

    /// Seed for sample selection and assignment.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render to a 16-bit stereo WAV instead of playing live.
    #[arg(long, value_name = "FILE")]
    pub render: Option<PathBuf>,

    /// Duration in seconds: render length (default 30) or live play time.
    #[arg(long, value_parser = value_parser!(u32).range(1..))]
    pub seconds: Option<u32>,

    /// Sample rate for offline rendering.
    #[arg(long, default_value_t = 48000, value_parser = value_parser!(u32).range(8000..=192_000))]
    pub rate: u32,

    /// Debug-level logging.
    #[arg(short, long, env = "VERBOSE", value_parser = BoolishValueParser::new())]
    pub verbose: bool,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            samples_dir: self.samples.clone(),
            bpm: self.bpm,
            parts: self.parts as usize,
            velocity_steps: self.steps as usize,
            pattern_length: self.length,
            output_gain: self.gain,
            lfo: self.lfo,
            humanize: self.humanize,
            spread: self.spread,
            x: self.x,
            y: self.y,
            randomness: self.randomness,
            seed: self.seed,
        }
    }
}

fn parse_f32(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("`{s}` is not a finite number"))
    }
}

fn parse_bpm(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if v > 0.0 && v <= 300.0 {
        Ok(v)
    } else {
        Err("BPM must be greater than 0 and at most 300".into())
    }
}

fn parse_gain(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err("gain must be >= 0".into())
    }
}

fn parse_unit(s: &str) -> Result<f32, String> {
    let v = parse_f32(s)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err("value must be between 0 and 1".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pulsegrid"]).unwrap();
        let cfg = cli.session_config();
        assert_eq!(cfg.samples_dir, PathBuf::from("data"));
        assert_eq!(cfg.bpm, 120.0);
        assert_eq!(cfg.pattern_length, 32);
        assert_eq!(cfg.output_gain, 1.0);
        assert_eq!((cfg.x, cfg.y, cfg.randomness), (128, 128, 0));
        assert!(cli.render.is_none());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "pulsegrid", "-d", "kit", "-b", "96.5", "-p", "6", "-s", "8", "-L", "16", "-o", "0.5",
            "-l", "-H", "0.3", "-S", "1", "-x", "10", "-y", "20", "-r", "40", "-v",
        ])
        .unwrap();
        let cfg = cli.session_config();
        assert_eq!(cfg.samples_dir, PathBuf::from("kit"));
        assert_eq!(cfg.bpm, 96.5);
        assert_eq!((cfg.parts, cfg.velocity_steps, cfg.pattern_length), (6, 8, 16));
        assert_eq!(cfg.output_gain, 0.5);
        assert!(cfg.lfo);
        assert_eq!((cfg.humanize, cfg.spread), (0.3, 1.0));
        assert_eq!((cfg.x, cfg.y, cfg.randomness), (10, 20, 40));
        assert!(cli.verbose);
    }

    #[test]
    fn render_options() {
        let cli = Cli::try_parse_from([
            "pulsegrid", "--render", "out.wav", "--seconds", "5", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(cli.render, Some(PathBuf::from("out.wav")));
        assert_eq!(cli.seconds, Some(5));
        assert_eq!(cli.session_config().seed, Some(9));
    }

    #[test]
    fn environment_fallbacks() {
        std::env::set_var("LFO", "1");
        std::env::set_var("VERBOSE", "1");
        std::env::set_var("PARTS", "9");
        std::env::set_var("STEPS", "12");
        let from_env = Cli::try_parse_from(["pulsegrid"]);
        let flags_win = Cli::try_parse_from(["pulsegrid", "-p", "2", "-s", "3"]);
        std::env::set_var("LFO", "0");
        let lfo_off = Cli::try_parse_from(["pulsegrid"]);
        for key in ["LFO", "VERBOSE", "PARTS", "STEPS"] {
            std::env::remove_var(key);
        }

        let cli = from_env.unwrap();
        let cfg = cli.session_config();
        assert!(cfg.lfo);
        assert!(cli.verbose);
        assert_eq!((cfg.parts, cfg.velocity_steps), (9, 12));

        let cfg = flags_win.unwrap().session_config();
        assert_eq!((cfg.parts, cfg.velocity_steps), (2, 3));

        assert!(!lfo_off.unwrap().lfo);
    }

    #[test]
    fn out_of_range_values_rejected() {
        for args in [
            &["pulsegrid", "-b", "0"][..],
            &["pulsegrid", "-b", "301"],
            &["pulsegrid", "-b", "nan"],
            &["pulsegrid", "-p", "0"],
            &["pulsegrid", "-s", "0"],
            &["pulsegrid", "-L", "33"],
            &["pulsegrid", "-o", "-1"],
            &["pulsegrid", "-H", "1.5"],
            &["pulsegrid", "-S", "-0.1"],
            &["pulsegrid", "-x", "256"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?} accepted");
        }
    }
}
