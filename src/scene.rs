//! Per-frame orchestrator
//!
//! A [`Scene`] owns the screen stack and every collaborator. One call to
//! [`Scene::frame`] reads the clock, polls input once, updates the active
//! screen, forwards game events to audio, draws, and sleeps off the rest of
//! the frame budget.

use std::path::PathBuf;

use crate::audio::{AudioManager, AudioSink, MusicTrack};
use crate::highscores::HighScores;
use crate::platform::{InputSource, InputState, TimeSource};
use crate::renderer::{Renderer, draw_list, render};
use crate::screens::{
    MenuItem, MenuScreen, Screen, ScreenKind, ScreenStack, ScoresScreen, Transition, menu_draw_list,
    scores_draw_list,
};
use crate::settings::Settings;
use crate::sim::{GameState, MaskAtlas, PowerMode, SimulationClock, SpriteSet, TickInput, tick};

/// Name recorded with new high scores unless one is set
pub const DEFAULT_PLAYER: &str = "Player";

/// What happened to the game on the active screen this frame
enum GameOutcome {
    Running,
    Finished(u64),
    Abandoned,
}

pub struct Scene<T: TimeSource, I: InputSource, R: Renderer, A: AudioSink> {
    settings: Settings,
    masks: MaskAtlas,
    sprites: SpriteSet,
    scores: HighScores,
    scores_path: Option<PathBuf>,
    player: String,
    next_seed: u64,
    stack: ScreenStack,
    clock: SimulationClock,
    audio: AudioManager<A>,
    renderer: R,
    input: I,
    time: T,
    last_score: Option<u64>,
}

impl<T: TimeSource, I: InputSource, R: Renderer, A: AudioSink> Scene<T, I, R, A> {
    /// Build a scene; games are seeded from `seed` upward
    pub fn new(
        settings: Settings,
        art: (MaskAtlas, SpriteSet),
        seed: u64,
        time: T,
        input: I,
        renderer: R,
        audio: A,
    ) -> Self {
        let (masks, sprites) = art;
        let scores = HighScores::with_placeholders(settings.n_scores);
        let audio = AudioManager::new(audio, &settings);
        Self {
            settings,
            masks,
            sprites,
            scores,
            scores_path: None,
            player: DEFAULT_PLAYER.to_string(),
            next_seed: seed,
            stack: ScreenStack::new(),
            clock: SimulationClock::new(),
            audio,
            renderer,
            input,
            time,
            last_score: None,
        }
    }

    /// Use a persisted score table; new entries are saved back to `path`
    pub fn with_scores(mut self, scores: HighScores, path: Option<PathBuf>) -> Self {
        self.scores = scores;
        self.scores_path = path;
        self
    }

    pub fn with_player(mut self, name: impl Into<String>) -> Self {
        self.player = name.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn stack(&self) -> &ScreenStack {
        &self.stack
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &AudioManager<A> {
        &self.audio
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Survival time of the most recently finished game
    pub fn last_score(&self) -> Option<u64> {
        self.last_score
    }

    /// The running game, if the game screen is active
    pub fn game(&self) -> Option<&GameState> {
        match self.stack.top() {
            Some(Screen::Game(state)) => Some(&**state),
            _ => None,
        }
    }

    pub fn game_mut(&mut self) -> Option<&mut GameState> {
        match self.stack.top_mut() {
            Some(Screen::Game(state)) => Some(&mut **state),
            _ => None,
        }
    }

    /// True until the last screen is popped
    pub fn is_running(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Open the main menu
    pub fn start(&mut self) {
        log::info!("Scene starting");
        let transitions = self.stack.push(Screen::Menu(MenuScreen::default()));
        self.apply(&transitions);
    }

    /// Replace the active screen with a fresh game
    pub fn start_game(&mut self) {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        let state = GameState::new(seed, &self.settings, self.masks.clone(), self.sprites.clone());
        let transitions = self.stack.change(Screen::Game(Box::new(state)));
        self.apply(&transitions);
    }

    /// Run frames until the stack empties or `max_frames` have run
    pub fn run(&mut self, max_frames: Option<u64>) -> u64 {
        let mut frames = 0;
        while self.is_running() && max_frames.is_none_or(|max| frames < max) {
            self.frame();
            frames += 1;
        }
        frames
    }

    /// One frame of the active screen; returns false once nothing is left to run
    pub fn frame(&mut self) -> bool {
        match self.stack.top_kind() {
            None => return false,
            Some(ScreenKind::Game) => self.game_frame(),
            Some(kind) => {
                let input = self.input.poll();
                match kind {
                    ScreenKind::Menu => self.menu_frame(input),
                    _ => self.scores_frame(input),
                }
                self.time.sleep_ms(self.settings.frame_ms() as u64);
            }
        }
        self.is_running()
    }

    fn menu_frame(&mut self, input: InputState) {
        let Some(Screen::Menu(menu)) = self.stack.top_mut() else {
            return;
        };
        menu.navigate(input.directions);
        let item = menu.item();
        render(&mut self.renderer, &menu_draw_list(menu, &self.settings));

        if input.back {
            let transitions = self.stack.pop();
            self.apply(&transitions);
        } else if input.confirm {
            match item {
                MenuItem::Start => self.start_game(),
                MenuItem::Scores => {
                    let transitions = self.stack.push(Screen::Scores(ScoresScreen::default()));
                    self.apply(&transitions);
                }
                MenuItem::Quit => {
                    let transitions = self.stack.pop();
                    self.apply(&transitions);
                }
            }
        }
    }

    fn scores_frame(&mut self, input: InputState) {
        let Some(Screen::Scores(screen)) = self.stack.top() else {
            return;
        };
        render(&mut self.renderer, &scores_draw_list(screen, &self.scores, &self.settings));

        if input.back || input.confirm {
            let transitions = if self.stack.len() > 1 {
                self.stack.pop()
            } else {
                self.stack.change(Screen::Menu(MenuScreen::default()))
            };
            self.apply(&transitions);
        }
    }

    fn game_frame(&mut self) {
        let Some(Screen::Game(state)) = self.stack.top_mut() else {
            return;
        };
        let now = self.time.now_ms();
        let frame = self.clock.start_frame(now, state.game_speed(&self.settings));
        let input = self.input.poll();
        let tick_input = TickInput {
            directions: input.directions,
            pause: input.pause,
        };
        tick(state, &tick_input, &frame, &self.settings);

        if state.paused && !self.clock.is_paused() {
            self.clock.pause(now);
        } else if !state.paused && self.clock.is_paused() {
            self.clock.unpause(now);
        }

        for event in state.drain_events() {
            self.audio.handle_event(&event);
        }
        self.audio
            .sustain_engine(state.ship.moving, state.ship.mode() == PowerMode::EngineBlast);

        render(&mut self.renderer, &draw_list(state, &self.settings));

        let outcome = if state.is_finished() {
            GameOutcome::Finished(state.score_ms)
        } else if input.back {
            GameOutcome::Abandoned
        } else {
            GameOutcome::Running
        };

        let sleep = self.clock.end_frame(&frame, self.time.now_ms(), self.settings.frame_ms());
        self.time.sleep_ms(sleep);

        match outcome {
            GameOutcome::Running => {}
            GameOutcome::Finished(score_ms) => self.finish_game(score_ms),
            GameOutcome::Abandoned => {
                log::info!("Game abandoned");
                let transitions = self.stack.change(Screen::Menu(MenuScreen::default()));
                self.apply(&transitions);
            }
        }
    }

    /// Record the score and show the table
    fn finish_game(&mut self, score_ms: u64) {
        self.last_score = Some(score_ms);
        let rank = self.scores.add_score(&self.player, score_ms);
        if rank.is_some()
            && let Some(path) = &self.scores_path
            && let Err(e) = self.scores.save_to(path)
        {
            log::warn!("Could not save high scores to {}: {e}", path.display());
        }
        let transitions = self.stack.change(Screen::Scores(ScoresScreen {
            score_ms: Some(score_ms),
            rank,
        }));
        self.apply(&transitions);
    }

    /// Enter/exit hooks
    fn apply(&mut self, transitions: &[Transition]) {
        for transition in transitions {
            match *transition {
                Transition::Entered(ScreenKind::Menu) | Transition::Entered(ScreenKind::Scores) => {
                    self.audio.play_music(MusicTrack::Menu);
                }
                Transition::Entered(ScreenKind::Game) => self.clock.start(self.time.now_ms()),
                Transition::Exited(ScreenKind::Game) => {
                    self.clock.stop();
                    self.audio.fade_engine();
                    self.audio.stop_music();
                }
                Transition::Exited(ScreenKind::Menu) => self.audio.stop_music(),
                Transition::Exited(ScreenKind::Scores) => {}
            }
        }
    }
}
