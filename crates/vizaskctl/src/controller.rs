//! Interaction controller - one request cycle per command
//!
//! Idle -> Validating -> Collecting -> Enriching -> Sending -> Succeeded | Failed -> Idle
//!
//! The controller owns the host handle, the backend and the UI surface.
//! `dispatch` takes `&mut self`, so a controller runs one cycle at a time.

use crate::gateway::{Backend, BackendResponse, GatewayError};
use crate::surface::{Pane, UiSurface};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;
use vizask_shared::{
    build, collect, validate_question, BuildError, DashboardHost, Enricher, EnrichmentReport,
    FilterSnapshot, HostError, Mode, RequestPayload, View, DEFAULT_EXCLUDED_FILTERS,
};

/// Default data view the filters are read from
pub const DEFAULT_VIEW_NAME: &str = "Line_Chart";

/// A user trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze the report as currently filtered
    Analyze,
    /// Ask the assistant a question about the filtered data
    Ask { question: String },
}

impl Command {
    pub fn ask(question: impl Into<String>) -> Self {
        Command::Ask {
            question: question.into(),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Command::Analyze => Mode::AnalyzeReport,
            Command::Ask { .. } => Mode::AiAssistant,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Command::Analyze => "",
            Command::Ask { question } => question,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Validating,
    Collecting,
    Enriching,
    Sending,
    Succeeded,
    Failed,
}

/// Why a cycle failed. Displays as the message shown to the user.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl CycleError {
    pub fn code(&self) -> &'static str {
        match self {
            CycleError::Host(e) => e.code(),
            CycleError::Build(e) => e.code(),
            CycleError::Gateway(e) => e.code(),
        }
    }
}

/// Result of one dispatched command
#[derive(Debug)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub mode: Mode,
    /// Phases visited, in order, ending in `Succeeded` or `Failed`
    pub phases: Vec<Phase>,
    pub outcome: Result<BackendResponse, CycleError>,
    /// Filters in the collected snapshot (0 if collection never ran)
    pub filter_count: usize,
    pub duration: Duration,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn answer(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(BackendResponse::answer)
    }

    pub fn error(&self) -> Option<&CycleError> {
        self.outcome.as_ref().err()
    }

    pub fn final_phase(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Idle)
    }
}

/// Everything a cycle would send, without sending it
#[derive(Debug, Clone)]
pub struct Preview {
    /// Snapshot as collected, before enrichment
    pub collected: FilterSnapshot,
    pub report: EnrichmentReport,
    pub payload: RequestPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub view_name: String,
    pub excluded_filters: Vec<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            view_name: DEFAULT_VIEW_NAME.to_string(),
            excluded_filters: DEFAULT_EXCLUDED_FILTERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct Controller<B, U> {
    host: Arc<dyn DashboardHost>,
    backend: B,
    surface: U,
    settings: ControllerSettings,
    enricher: Enricher,
}

impl<B: Backend, U: UiSurface> Controller<B, U> {
    pub fn new(
        host: Arc<dyn DashboardHost>,
        backend: B,
        surface: U,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            host,
            backend,
            surface,
            settings,
            enricher: Enricher::new(),
        }
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    /// Run one full cycle for `command` and report on it.
    ///
    /// Failures never escape: they are shown on the surface, logged, and
    /// returned in the report's `outcome`.
    pub async fn dispatch(&mut self, command: Command) -> CycleReport {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", id = %cycle_id, mode = command.mode().label());
        self.run_cycle(cycle_id, command).instrument(span).await
    }

    async fn run_cycle(&mut self, cycle_id: Uuid, command: Command) -> CycleReport {
        let started = Instant::now();
        let mode = command.mode();
        let pane = Pane::for_mode(mode);
        info!("cycle started");

        let mut phases = Vec::new();
        let mut filter_count = 0;
        let outcome = self.execute(&command, &mut phases, &mut filter_count).await;

        match &outcome {
            Ok(response) => {
                enter(&mut phases, Phase::Succeeded);
                self.surface.show_answer(pane, response.answer());
                self.surface.set_status("Completed");
                if mode == Mode::AiAssistant {
                    self.surface.reset_chat_input();
                }
            }
            Err(e) => {
                enter(&mut phases, Phase::Failed);
                error!(code = e.code(), "cycle failed: {}", e);
                self.surface.show_failure(pane, &e.to_string());
                self.surface.set_status("Failed");
            }
        }

        let duration = started.elapsed();
        info!(
            ok = outcome.is_ok(),
            duration_ms = duration.as_millis() as u64,
            "cycle finished"
        );

        CycleReport {
            cycle_id,
            mode,
            phases,
            outcome,
            filter_count,
            duration,
        }
    }

    async fn execute(
        &mut self,
        command: &Command,
        phases: &mut Vec<Phase>,
        filter_count: &mut usize,
    ) -> Result<BackendResponse, CycleError> {
        let mode = command.mode();

        enter(phases, Phase::Validating);
        validate_question(mode, command.question())?;

        enter(phases, Phase::Collecting);
        self.surface
            .set_status(&format!("Processing {}...", mode.label()));
        self.surface.show_progress(Pane::for_mode(mode));

        let host = Arc::clone(&self.host);
        let view_name = self.settings.view_name.clone();
        let view = View::open(host.as_ref(), &view_name)?;
        let snapshot = collect(&view, &self.settings.excluded_filters).await?;
        *filter_count = snapshot.len();

        enter(phases, Phase::Enriching);
        let (snapshot, report) = self.enricher.enrich(snapshot, &view).await?;
        debug!(
            resolved = report.resolved_count(),
            examined = report.outcomes.len(),
            "enrichment finished"
        );

        let payload = build(mode, command.question(), snapshot)?;

        enter(phases, Phase::Sending);
        self.surface.set_status("Sending to backend...");
        Ok(self.backend.send(&payload).await?)
    }

    /// Collect, enrich and build for `command` without sending or touching
    /// the surface.
    pub async fn preview(&self, command: &Command) -> Result<Preview, CycleError> {
        let mode = command.mode();
        validate_question(mode, command.question())?;

        let view = View::open(self.host.as_ref(), &self.settings.view_name)?;
        let collected = collect(&view, &self.settings.excluded_filters).await?;
        let (enriched, report) = self.enricher.enrich(collected.clone(), &view).await?;
        let payload = build(mode, command.question(), enriched)?;

        Ok(Preview {
            collected,
            report,
            payload,
        })
    }

}

fn enter(phases: &mut Vec<Phase>, phase: Phase) {
    debug!(?phase, "phase");
    phases.push(phase);
}
