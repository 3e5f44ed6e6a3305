use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Skill;
use crate::radar::{Axis, AxisLabel, GridRing, RadarChart, RadarGeometry};
use crate::view::{self, GroupSummary, PlayerDetail, PlayersView, RankingRow, SkillPage, WeaknessesView};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub groups: usize,
    pub players: usize,
    pub skills: usize,
    pub ai_backend: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        groups: state.catalog.groups().len(),
        players: state.catalog.player_count(),
        skills: state.catalog.skills().len(),
        ai_backend: state.assistant.backend_name(),
    })
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<GroupSummary>,
}

pub async fn list_groups(State(state): State<AppState>) -> Json<GroupsResponse> {
    Json(GroupsResponse {
        groups: view::group_summaries(&state.catalog),
    })
}

pub async fn group_players(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayersView>, ApiError> {
    debug!("Players for group {}", id);
    Ok(Json(view::players_view(&state.catalog, Some(&id))?))
}

pub async fn player_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerDetail>, ApiError> {
    Ok(Json(view::detail_view(&state.catalog, &state.geometry, &id)?))
}

pub async fn player_weaknesses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeaknessesView>, ApiError> {
    Ok(Json(view::weaknesses_view(&state.catalog, &id)?))
}

pub async fn player_radar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RadarChart>, ApiError> {
    let (_, player) = state
        .catalog
        .player(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown player: {}", id)))?;
    Ok(Json(state.geometry.chart(&player.stats)))
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub total: usize,
    pub skills: Vec<Skill>,
}

pub async fn list_skills(State(state): State<AppState>) -> Json<SkillsResponse> {
    let skills = state.catalog.skills().to_vec();
    Json(SkillsResponse {
        total: skills.len(),
        skills,
    })
}

/// Out-of-range pages are clamped to the nearest valid one.
pub async fn skill_page(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SkillPage>, ApiError> {
    view::skill_page(&state.catalog, index)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("The catalog has no skills".to_string()))
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub rows: Vec<RankingRow>,
}

pub async fn ranking(State(state): State<AppState>) -> Json<RankingResponse> {
    Json(RankingResponse {
        rows: view::ranking_view(&state.catalog),
    })
}

#[derive(Debug, Serialize)]
pub struct RadarGridResponse {
    pub geometry: RadarGeometry,
    pub grid: Vec<GridRing>,
    pub axes: Vec<Axis>,
    pub labels: Vec<AxisLabel>,
}

pub async fn radar_grid(State(state): State<AppState>) -> Json<RadarGridResponse> {
    let g = state.geometry;
    Json(RadarGridResponse {
        geometry: g,
        grid: g.grid(),
        axes: g.axes(),
        labels: g.label_positions(),
    })
}
