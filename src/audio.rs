//! Audio system
//!
//! The game core never touches a mixer. [`AudioManager`] turns
//! [`GameEvent`]s into fire-and-forget calls on an [`AudioSink`], honoring
//! the sound/music toggles and master volume from [`Settings`].

use crate::settings::Settings;
use crate::sim::{GameEvent, PowerMode};

/// Mixer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel(pub i32);

impl Channel {
    /// First free channel
    pub const ANY: Channel = Channel(-1);
    /// Ship engine loop
    pub const ENGINE: Channel = Channel(1);
    /// Ship impacts (crash, shield bounce, phasing)
    pub const IMPACT: Channel = Channel(2);
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Menu click, pause toggle
    Click,
    /// Shields bounce
    Bounce,
    /// Engine running
    Engine,
    /// Engine running in EngineBlast
    EngineBlast,
    /// Ship passing through a rock while invincible
    Phase,
    /// Power-up collected, one per flavour
    PowUp(PowerMode),
    /// Ship destroyed
    ShipExplosion,
    /// Rock destroyed
    RockExplosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicTrack {
    Menu,
    Game,
}

/// Mixer backend
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, channel: Channel, loops: i32, volume: f32);
    /// Play for at most `ms` milliseconds
    fn play_timed(&mut self, effect: SoundEffect, channel: Channel, loops: i32, ms: u32, volume: f32);
    fn fade_out(&mut self, channel: Channel, ms: u32);
    fn is_playing(&self, channel: Channel) -> bool;
    /// Start a looping track with a short fade-in
    fn play_music(&mut self, track: MusicTrack, volume: f32);
    fn halt_music(&mut self);
}

/// Sink that plays nothing (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _: SoundEffect, _: Channel, _: i32, _: f32) {}
    fn play_timed(&mut self, _: SoundEffect, _: Channel, _: i32, _: u32, _: f32) {}
    fn fade_out(&mut self, _: Channel, _: u32) {}
    fn is_playing(&self, _: Channel) -> bool {
        false
    }
    fn play_music(&mut self, _: MusicTrack, _: f32) {}
    fn halt_music(&mut self) {}
}

const ENGINE_FADE_MS: u32 = 100;
const IMPACT_FADE_MS: u32 = 10;
const PHASE_SOUND_MS: u32 = 200;

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sounds_enabled: bool,
    music_enabled: bool,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        Self {
            sink,
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sounds_enabled: settings.sounds_enabled,
            music_enabled: settings.music_enabled,
            muted: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Pick up changed toggles from the options
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.sounds_enabled = settings.sounds_enabled;
        if self.music_enabled && !settings.music_enabled {
            self.sink.halt_music();
        }
        self.music_enabled = settings.music_enabled;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect, channel: Channel) {
        let vol = self.effective_volume();
        if !self.sounds_enabled || vol <= 0.0 {
            return;
        }
        self.sink.play(effect, channel, 0, vol);
    }

    /// Restart the impact channel with a new sound
    fn play_impact(&mut self, effect: SoundEffect) {
        if self.sink.is_playing(Channel::IMPACT) {
            self.sink.fade_out(Channel::IMPACT, IMPACT_FADE_MS);
        }
        self.play(effect, Channel::IMPACT);
    }

    pub fn play_music(&mut self, track: MusicTrack) {
        if self.music_enabled {
            self.sink.play_music(track, self.effective_volume());
        }
    }

    pub fn stop_music(&mut self) {
        self.sink.halt_music();
    }

    pub fn fade_engine(&mut self) {
        if self.sink.is_playing(Channel::ENGINE) {
            self.sink.fade_out(Channel::ENGINE, ENGINE_FADE_MS);
        }
    }

    /// Keep the engine sound going while the ship thrusts
    pub fn sustain_engine(&mut self, moving: bool, blast: bool) {
        if moving && !self.sink.is_playing(Channel::ENGINE) {
            let effect = if blast { SoundEffect::EngineBlast } else { SoundEffect::Engine };
            self.play(effect, Channel::ENGINE);
        }
    }

    /// Map one gameplay event onto sound
    pub fn handle_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::GameStarted => self.play_music(MusicTrack::Game),
            GameEvent::ShipDestroyed { .. } => {
                self.fade_engine();
                self.play_impact(SoundEffect::ShipExplosion);
            }
            GameEvent::RockDestroyed => self.play(SoundEffect::RockExplosion, Channel::ANY),
            GameEvent::ShieldBounce => self.play_impact(SoundEffect::Bounce),
            GameEvent::PhaseThrough => {
                let vol = self.effective_volume();
                if self.sounds_enabled && vol > 0.0 {
                    self.sink
                        .play_timed(SoundEffect::Phase, Channel::IMPACT, 0, PHASE_SOUND_MS, vol);
                }
            }
            GameEvent::PowerUpCollected(flavour) => self.play(SoundEffect::PowUp(flavour), Channel::ANY),
            GameEvent::EngineStarted { blast } => self.sustain_engine(true, blast),
            GameEvent::EngineStopped => self.fade_engine(),
            GameEvent::PauseToggled { paused } => {
                if paused {
                    self.fade_engine();
                }
                self.play(SoundEffect::Click, Channel::ANY);
            }
            GameEvent::Quit => self.stop_music(),
            GameEvent::GameOver { .. } | GameEvent::PowerExpired(_) | GameEvent::Respawned => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(SoundEffect, Channel)>,
        faded: Vec<Channel>,
        busy: HashSet<Channel>,
        music: Option<MusicTrack>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, channel: Channel, _: i32, _: f32) {
            self.played.push((effect, channel));
            self.busy.insert(channel);
        }
        fn play_timed(&mut self, effect: SoundEffect, channel: Channel, _: i32, _: u32, _: f32) {
            self.played.push((effect, channel));
        }
        fn fade_out(&mut self, channel: Channel, _: u32) {
            self.faded.push(channel);
            self.busy.remove(&channel);
        }
        fn is_playing(&self, channel: Channel) -> bool {
            self.busy.contains(&channel)
        }
        fn play_music(&mut self, track: MusicTrack, _: f32) {
            self.music = Some(track);
        }
        fn halt_music(&mut self) {
            self.music = None;
        }
    }

    #[test]
    fn test_engine_plays_once_then_fades() {
        let mut audio = AudioManager::new(Recorder::default(), &Settings::default());
        audio.handle_event(&GameEvent::EngineStarted { blast: true });
        audio.sustain_engine(true, true);
        assert_eq!(audio.sink().played, vec![(SoundEffect::EngineBlast, Channel::ENGINE)]);
        audio.handle_event(&GameEvent::EngineStopped);
        assert_eq!(audio.sink().faded, vec![Channel::ENGINE]);
    }

    #[test]
    fn test_crash_fades_engine_and_uses_impact_channel() {
        let mut audio = AudioManager::new(Recorder::default(), &Settings::default());
        audio.handle_event(&GameEvent::EngineStarted { blast: false });
        audio.handle_event(&GameEvent::ShieldBounce);
        audio.handle_event(&GameEvent::ShipDestroyed { lives_left: 2 });
        let sink = audio.sink();
        assert_eq!(sink.faded, vec![Channel::ENGINE, Channel::IMPACT]);
        assert_eq!(sink.played.last(), Some(&(SoundEffect::ShipExplosion, Channel::IMPACT)));
    }

    #[test]
    fn test_disabled_sounds_are_silent() {
        let settings = Settings {
            sounds_enabled: false,
            music_enabled: false,
            ..Settings::default()
        };
        let mut audio = AudioManager::new(Recorder::default(), &settings);
        audio.handle_event(&GameEvent::GameStarted);
        audio.handle_event(&GameEvent::RockDestroyed);
        audio.handle_event(&GameEvent::PhaseThrough);
        assert!(audio.sink().played.is_empty());
        assert_eq!(audio.sink().music, None);
    }

    #[test]
    fn test_music_follows_game_lifecycle() {
        let mut audio = AudioManager::new(Recorder::default(), &Settings::default());
        audio.handle_event(&GameEvent::GameStarted);
        assert_eq!(audio.sink().music, Some(MusicTrack::Game));
        audio.handle_event(&GameEvent::Quit);
        assert_eq!(audio.sink().music, None);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new(Recorder::default(), &Settings::default());
        audio.set_muted(true);
        audio.handle_event(&GameEvent::PowerUpCollected(PowerMode::Shields));
        assert!(audio.sink().played.is_empty());
    }
}
