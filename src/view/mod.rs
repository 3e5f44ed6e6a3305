//! View controller.
//!
//! Holds the UI selection state (active tab, selected group, open modals,
//! skill book page) as an explicit object owned by the top-level caller.
//! Transitions never touch the catalog; derived data is recomputed from it
//! on every `render`.

mod derive;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::radar::RadarGeometry;

pub use derive::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),
}

/// The four mutually exclusive display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Players,
    Skills,
    Ranking,
    Assistant,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Players, Tab::Skills, Tab::Ranking, Tab::Assistant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Players => "players",
            Tab::Skills => "skills",
            Tab::Ranking => "ranking",
            Tab::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tab {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ViewError::UnknownTab(s.to_string()))
    }
}

/// Selection state. Everything else is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewState {
    pub tab: Tab,
    pub group_id: Option<String>,
    pub detail_player: Option<String>,
    pub weaknesses_player: Option<String>,
    pub skill_index: usize,
}

/// Body of the active tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "lowercase")]
pub enum ScreenBody {
    Players {
        groups: Vec<GroupSummary>,
        view: PlayersView,
    },
    Skills {
        page: Option<SkillPage>,
    },
    Ranking {
        rows: Vec<RankingRow>,
    },
    Assistant,
}

/// A fully derived frame: the active tab plus any open modal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub body: ScreenBody,
    pub detail: Option<PlayerDetail>,
    pub weaknesses: Option<WeaknessesView>,
}

pub struct ViewController {
    catalog: Arc<Catalog>,
    geometry: RadarGeometry,
    state: ViewState,
}

impl ViewController {
    pub fn new(catalog: Arc<Catalog>, geometry: RadarGeometry) -> Self {
        Self {
            catalog,
            geometry,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn select_tab(&mut self, tab: Tab) {
        debug!("Switching tab {} -> {}", self.state.tab, tab);
        self.state.tab = tab;
    }

    /// Select a group for the players tab. Unknown ids leave state unchanged.
    pub fn select_group(&mut self, group_id: &str) -> Result<(), ViewError> {
        if self.catalog.group(group_id).is_none() {
            return Err(ViewError::UnknownGroup(group_id.to_string()));
        }
        self.state.group_id = Some(group_id.to_string());
        Ok(())
    }

    pub fn open_detail(&mut self, player_id: &str) -> Result<(), ViewError> {
        self.require_player(player_id)?;
        self.state.detail_player = Some(player_id.to_string());
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.state.detail_player = None;
    }

    pub fn open_weaknesses(&mut self, player_id: &str) -> Result<(), ViewError> {
        self.require_player(player_id)?;
        self.state.weaknesses_player = Some(player_id.to_string());
        Ok(())
    }

    pub fn close_weaknesses(&mut self) {
        self.state.weaknesses_player = None;
    }

    pub fn next_skill(&mut self) {
        self.go_to_skill(self.state.skill_index.saturating_add(1));
    }

    pub fn prev_skill(&mut self) {
        self.go_to_skill(self.state.skill_index.saturating_sub(1));
    }

    /// Jump to a page, clamped into range.
    pub fn go_to_skill(&mut self, index: usize) {
        self.state.skill_index = clamp_skill_index(index, self.catalog.skills().len());
    }

    fn require_player(&self, player_id: &str) -> Result<(), ViewError> {
        match self.catalog.player(player_id) {
            Some(_) => Ok(()),
            None => Err(ViewError::UnknownPlayer(player_id.to_string())),
        }
    }

    /// Derive the current frame.
    pub fn render(&self) -> Result<Screen, ViewError> {
        let catalog = &self.catalog;

        let body = match self.state.tab {
            Tab::Players => ScreenBody::Players {
                groups: group_summaries(catalog),
                view: players_view(catalog, self.state.group_id.as_deref())?,
            },
            Tab::Skills => ScreenBody::Skills {
                page: skill_page(catalog, self.state.skill_index),
            },
            Tab::Ranking => ScreenBody::Ranking {
                rows: ranking_view(catalog),
            },
            Tab::Assistant => ScreenBody::Assistant,
        };

        let detail = self
            .state
            .detail_player
            .as_deref()
            .map(|id| detail_view(catalog, &self.geometry, id))
            .transpose()?;
        let weaknesses = self
            .state
            .weaknesses_player
            .as_deref()
            .map(|id| weaknesses_view(catalog, id))
            .transpose()?;

        Ok(Screen {
            body,
            detail,
            weaknesses,
        })
    }
}
