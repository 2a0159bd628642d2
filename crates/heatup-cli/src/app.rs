//! Application state management for heatup.
//!
//! `App` owns everything that changes while the client runs: the resolved
//! position, the selected radius and category, and the candidates from the
//! latest scan with an id index over them. Components it drives (engine,
//! candidate source, location provider, notification dispatcher) stay
//! stateless or own only their own concerns. Input arrives as typed
//! `Command`s and produces an `AppEvent` describing what happened.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info};

use heatup_core::location::{resolve_position, LocationProvider, ResolvedPosition};
use heatup_core::notify::{DispatchOutcome, NotificationDispatcher};
use heatup_core::source::{sampling_radius_km, CandidateSource, INITIAL_SAMPLING_RADIUS_KM};
use heatup_core::utils::{alert_body, alert_title, ping_title, profile_summary};
use heatup_core::{distance_km, CandidateRecord, Category, Config, MatchQuery, ProximityEngine, RankedCandidate};

// ============================================================================
// Commands and Events
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Resolve the device position and populate an initial candidate set.
    Locate,
    SetRadius(f64),
    SetCategory(Category),
    /// Regenerate candidates, rank them, and alert on a near-field match.
    Scan,
    OpenProfile(String),
    Ping(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Located(ResolvedPosition),
    RadiusChanged(f64),
    CategoryChanged(Category),
    ScanCompleted {
        results: Vec<RankedCandidate>,
        alert: Option<(RankedCandidate, DispatchOutcome)>,
    },
    Profile(String),
    Pinged {
        id: String,
        outcome: DispatchOutcome,
    },
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub position: Option<ResolvedPosition>,
    pub radius_km: f64,
    pub category: Option<Category>,
    candidates: Vec<CandidateRecord>,
    index: HashMap<String, usize>,
    pub results: Vec<RankedCandidate>,
}

impl AppState {
    pub fn candidates(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    /// Replace the candidate set for a new scan and rebuild the id index.
    fn replace_candidates(&mut self, candidates: Vec<CandidateRecord>) {
        self.index = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        self.candidates = candidates;
        self.results.clear();
    }

    pub fn candidate(&self, id: &str) -> Option<&CandidateRecord> {
        self.index.get(id).and_then(|&i| self.candidates.get(i))
    }
}

pub struct App {
    config: Config,
    pub state: AppState,
    engine: ProximityEngine,
    source: Arc<dyn CandidateSource>,
    location: Arc<dyn LocationProvider>,
    notifier: NotificationDispatcher,
}

impl App {
    pub fn new(
        config: Config,
        source: Arc<dyn CandidateSource>,
        location: Arc<dyn LocationProvider>,
        notifier: NotificationDispatcher,
    ) -> Self {
        let state = AppState {
            radius_km: config.clamp_radius(config.default_radius_km),
            category: Some(config.default_category),
            ..Default::default()
        };

        Self {
            config,
            state,
            engine: ProximityEngine::new(),
            source,
            location,
            notifier,
        }
    }

    pub async fn handle(&mut self, command: Command) -> Result<AppEvent> {
        debug!(?command, "Handling command");
        match command {
            Command::Locate => self.locate().await,
            Command::SetRadius(km) => {
                self.state.radius_km = self.config.clamp_radius(km);
                Ok(AppEvent::RadiusChanged(self.state.radius_km))
            }
            Command::SetCategory(category) => {
                self.state.category = Some(category);
                Ok(AppEvent::CategoryChanged(category))
            }
            Command::Scan => self.scan().await,
            Command::OpenProfile(id) => {
                let ranked = self.ranked_by_id(&id)?;
                Ok(AppEvent::Profile(profile_summary(&ranked)))
            }
            Command::Ping(id) => {
                let ranked = self.ranked_by_id(&id)?;
                let outcome = self
                    .notifier
                    .dispatch(&ping_title(&ranked), &alert_body(&ranked))
                    .await;
                Ok(AppEvent::Pinged { id, outcome })
            }
        }
    }

    async fn locate(&mut self) -> Result<AppEvent> {
        let resolved = resolve_position(
            self.location.as_ref(),
            self.config.location_timeout(),
            self.config.fallback_position,
        )
        .await;
        self.state.position = Some(resolved);

        let candidates = self
            .source
            .candidates(resolved.position(), INITIAL_SAMPLING_RADIUS_KM)
            .await?;
        info!(position = %resolved.position(), fallback = resolved.is_fallback(), candidates = candidates.len(), "Located");
        self.state.replace_candidates(candidates);

        Ok(AppEvent::Located(resolved))
    }

    async fn scan(&mut self) -> Result<AppEvent> {
        let origin = self.origin()?;
        let category = self.state.category.unwrap_or(self.config.default_category);
        let query = MatchQuery::new(origin, self.state.radius_km, category)?;

        let candidates = self
            .source
            .candidates(origin, sampling_radius_km(query.radius_km))
            .await?;
        self.state.replace_candidates(candidates);

        let results = self.engine.rank(self.state.candidates(), &query)?;
        let nearest = self.engine.nearest_alert(self.state.candidates(), &query)?;
        self.state.results = results.clone();

        let alert = match nearest {
            Some(hit) => {
                let outcome = self
                    .notifier
                    .dispatch(&alert_title(&hit), &alert_body(&hit))
                    .await;
                Some((hit, outcome))
            }
            None => None,
        };

        info!(
            candidates = self.state.candidates().len(),
            matches = results.len(),
            alerted = alert.is_some(),
            "Scan completed"
        );
        Ok(AppEvent::ScanCompleted { results, alert })
    }

    fn origin(&self) -> Result<heatup_core::Position> {
        self.state
            .position
            .map(|p| p.position())
            .ok_or_else(|| anyhow!("Location not set - locate before scanning"))
    }

    /// Look up a candidate from the current set with its distance from the
    /// current position.
    fn ranked_by_id(&self, id: &str) -> Result<RankedCandidate> {
        let origin = self.origin()?;
        let Some(candidate) = self.state.candidate(id) else {
            bail!("Unknown candidate: {}", id);
        };
        Ok(RankedCandidate {
            candidate: candidate.clone(),
            distance_km: distance_km(origin, candidate.position),
        })
    }
}
