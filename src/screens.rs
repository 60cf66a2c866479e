//! Screen stack
//!
//! Screens form a closed set. The stack only reports which screens were
//! entered and left; the [`Scene`](crate::scene::Scene) reacts to those
//! transitions (music, clock start/stop).

use glam::IVec2;

use crate::highscores::{HighScores, format_time};
use crate::platform::Directions;
use crate::renderer::{DrawCommand, TextStyle};
use crate::settings::Settings;
use crate::sim::GameState;

/// Which screen, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Menu,
    Game,
    Scores,
}

/// Menu entries, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Start,
    Scores,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Start, MenuItem::Scores, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Start => "Start",
            MenuItem::Scores => "Scores",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Main menu cursor. Moves once per key press, not per held frame.
#[derive(Debug, Clone, Default)]
pub struct MenuScreen {
    pub selected: usize,
    held: Directions,
}

impl MenuScreen {
    pub fn item(&self) -> MenuItem {
        MenuItem::ALL[self.selected % MenuItem::ALL.len()]
    }

    /// Apply this frame's held directions
    pub fn navigate(&mut self, dirs: Directions) {
        let n = MenuItem::ALL.len();
        if dirs.down && !self.held.down {
            self.selected = (self.selected + 1) % n;
        }
        if dirs.up && !self.held.up {
            self.selected = (self.selected + n - 1) % n;
        }
        self.held = dirs;
    }
}

/// Score table, optionally highlighting a just-finished game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoresScreen {
    /// Survival time of the game that led here
    pub score_ms: Option<u64>,
    /// Rank that game reached in the table
    pub rank: Option<usize>,
}

pub enum Screen {
    Menu(MenuScreen),
    Game(Box<GameState>),
    Scores(ScoresScreen),
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Screen::Menu(_) => ScreenKind::Menu,
            Screen::Game(_) => ScreenKind::Game,
            Screen::Scores(_) => ScreenKind::Scores,
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.kind())
    }
}

/// Enter/exit hook notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered(ScreenKind),
    Exited(ScreenKind),
}

/// Last-in screen is the active one
#[derive(Debug, Default)]
pub struct ScreenStack {
    screens: Vec<Screen>,
}

impl ScreenStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn top(&self) -> Option<&Screen> {
        self.screens.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Screen> {
        self.screens.last_mut()
    }

    pub fn top_kind(&self) -> Option<ScreenKind> {
        self.top().map(Screen::kind)
    }

    pub fn push(&mut self, screen: Screen) -> Vec<Transition> {
        let kind = screen.kind();
        log::debug!("Screen push: {kind:?}");
        self.screens.push(screen);
        vec![Transition::Entered(kind)]
    }

    /// Leave the active screen, uncovering the one below
    pub fn pop(&mut self) -> Vec<Transition> {
        match self.screens.pop() {
            Some(screen) => {
                log::debug!("Screen pop: {:?}", screen.kind());
                vec![Transition::Exited(screen.kind())]
            }
            None => Vec::new(),
        }
    }

    /// Replace the active screen; a no-op if it is already of the same kind
    pub fn change(&mut self, screen: Screen) -> Vec<Transition> {
        if self.top_kind() == Some(screen.kind()) {
            return Vec::new();
        }
        let mut transitions = self.pop();
        transitions.extend(self.push(screen));
        transitions
    }
}

fn line(text: impl Into<String>, x: i32, y: i32, style: TextStyle) -> DrawCommand {
    DrawCommand::Text {
        text: text.into(),
        pos: IVec2::new(x, y),
        style,
    }
}

/// Title and entries, the selected one marked
pub fn menu_draw_list(menu: &MenuScreen, settings: &Settings) -> Vec<DrawCommand> {
    let cx = (settings.win_width / 2.0) as i32;
    let top = (settings.win_height / 3.0) as i32;
    let mut out = vec![line("VoV", cx, top, TextStyle::Large)];
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let label = if i == menu.selected {
            format!("> {} <", item.label())
        } else {
            item.label().to_string()
        };
        out.push(line(label, cx, top + 70 * (i as i32 + 1), TextStyle::Small));
    }
    out
}

/// Ranked survival times, the new entry marked
pub fn scores_draw_list(scores: &ScoresScreen, table: &HighScores, settings: &Settings) -> Vec<DrawCommand> {
    let cx = (settings.win_width / 2.0) as i32;
    let top = (settings.win_height / 5.0) as i32;
    let mut out = vec![line("High Scores", cx, top, TextStyle::Large)];
    for (i, entry) in table.entries.iter().enumerate() {
        let style = if scores.rank == Some(i) { TextStyle::Warning } else { TextStyle::Small };
        let text = format!("{:2}. {:<12} {}", i + 1, entry.name, format_time(entry.time_ms, true));
        out.push(line(text, cx, top + 40 * (i as i32 + 1), style));
    }
    if let Some(ms) = scores.score_ms {
        let y = top + 40 * (table.len() as i32 + 2);
        out.push(line(format!("Your time: {}", format_time(ms, true)), cx, y, TextStyle::Small));
    }
    out
}
