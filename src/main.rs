//! VoV headless runner
//!
//! Plays one game with an autopilot on procedural art, no window and no
//! sound, then prints the survival time.

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use vov::audio::NullAudio;
use vov::highscores::{HighScores, format_time};
use vov::platform::{Directions, InputSource, InputState, ManualTimeSource, SystemTimeSource, TimeSource};
use vov::renderer::NullRenderer;
use vov::screens::ScreenKind;
use vov::sim::placeholder_art;
use vov::{Scene, Settings};

const SETTINGS_FILE: &str = "vov_settings.json";
const SCORES_FILE: &str = "vov_scores.json";
/// Give up after this many frames (about 30 minutes at 60 fps)
const MAX_FRAMES: u64 = 60 * 60 * 30;

#[derive(Parser, Debug)]
#[command(name = "vov", about = "Play one headless VoV game with an autopilot")]
struct Args {
    /// Seed for the game and the autopilot
    #[arg(default_value_t = 1)]
    seed: u64,
    /// Pace frames with the wall clock instead of a simulated one
    #[arg(long)]
    realtime: bool,
}

/// Starts a game, then holds random thrust patterns for random stretches
struct Autopilot {
    rng: Pcg32,
    started: bool,
    held: Directions,
    hold_frames: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            started: false,
            held: Directions::default(),
            hold_frames: 0,
        }
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self) -> InputState {
        if !self.started {
            self.started = true;
            return InputState {
                confirm: true,
                ..InputState::default()
            };
        }
        if self.hold_frames == 0 {
            self.held = Directions {
                left: self.rng.random_bool(0.1),
                right: self.rng.random_bool(0.3),
                up: self.rng.random_bool(0.35),
                down: self.rng.random_bool(0.35),
            };
            self.hold_frames = self.rng.random_range(5..40);
        }
        self.hold_frames -= 1;
        InputState {
            directions: self.held,
            ..InputState::default()
        }
    }
}

fn play<T: TimeSource>(settings: Settings, seed: u64, time: T) -> Option<u64> {
    let art = placeholder_art(&settings);
    let scores = HighScores::load_or_default(Path::new(SCORES_FILE), settings.n_scores);
    let mut scene = Scene::new(
        settings,
        art,
        seed,
        time,
        Autopilot::new(seed),
        NullRenderer::default(),
        NullAudio,
    )
    .with_scores(scores, Some(PathBuf::from(SCORES_FILE)))
    .with_player("Autopilot");

    scene.start();
    let mut frames = 0;
    while scene.is_running() && frames < MAX_FRAMES {
        scene.frame();
        frames += 1;
        if scene.stack().top_kind() == Some(ScreenKind::Scores) {
            break;
        }
    }
    log::info!(
        "Stopped after {frames} frames, {} sprites drawn",
        scene.renderer().sprites
    );
    scene.last_score()
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE));
    log::info!("VoV (headless) starting, seed {}", args.seed);

    let score = if args.realtime {
        play(settings, args.seed, SystemTimeSource::default())
    } else {
        play(settings, args.seed, ManualTimeSource::default())
    };

    match score {
        Some(ms) => println!("Survived {}", format_time(ms, true).trim()),
        None => println!("Game did not finish within {MAX_FRAMES} frames"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_seed() {
        let args = Args::try_parse_from(["vov"]).unwrap();
        assert_eq!(args.seed, 1);
        assert!(!args.realtime);
    }

    #[test]
    fn test_args_seed_and_realtime() {
        let args = Args::try_parse_from(["vov", "42", "--realtime"]).unwrap();
        assert_eq!(args.seed, 42);
        assert!(args.realtime);
    }

    #[test]
    fn test_args_reject_bad_input() {
        assert!(Args::try_parse_from(["vov", "many"]).is_err());
        assert!(Args::try_parse_from(["vov", "--fast"]).is_err());
    }

    #[test]
    fn test_autopilot_confirms_then_steers() {
        let mut pilot = Autopilot::new(7);
        assert!(pilot.poll().confirm);
        for _ in 0..100 {
            assert!(!pilot.poll().confirm);
        }
    }
}
