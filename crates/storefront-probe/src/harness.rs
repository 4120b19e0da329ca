//! Scenario engine.
//!
//! Every scenario runs `Reset -> Running -> {Passed, Failed}`:
//!
//! 1. Reset loads the fixture, clears cookies and both storages, verifies
//!    nothing is left, opens the entry URL and checks the URL marker.
//! 2. Running executes the labelled steps in order. The first error ends the
//!    scenario and is reported against the step that raised it.
//!
//! A failed scenario never blocks its siblings. A configuration error does:
//! it aborts the run and the remaining scenarios are reported as skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::SuiteConfig;
use crate::driver::SessionFactory;
use crate::fixture::{FixtureBinder, FixtureRecord};
use crate::page_object::Pages;
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use crate::session::Session;

// =============================================================================
// SCENARIO
// =============================================================================

/// A named, ordered flow of steps
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable identifier, e.g. `purchase-flow`
    fn name(&self) -> &str;

    /// One-line summary
    fn description(&self) -> &str;

    /// Execute the steps after the isolation reset succeeded
    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> ProbeResult<()>;
}

/// Lifecycle phase of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Isolation reset and entry navigation
    Reset,
    /// Steps executing
    Running,
    /// All steps passed
    Passed,
    /// A step failed
    Failed,
}

/// Label of the step reported when reset fails
pub const RESET_STEP: &str = "isolation reset";

#[derive(Debug)]
struct StepTracker {
    phase: Phase,
    current: String,
    started: usize,
}

impl StepTracker {
    fn new() -> Self {
        Self {
            phase: Phase::Reset,
            current: RESET_STEP.to_string(),
            started: 0,
        }
    }
}

/// What a running scenario can reach: its session, the page objects and its
/// own fixture record
#[derive(Debug)]
pub struct ScenarioContext<'a> {
    session: &'a mut Session,
    pages: &'a Pages,
    fixture: FixtureRecord,
    steps: &'a mut StepTracker,
}

impl<'a> ScenarioContext<'a> {
    /// Start the next labelled step
    pub fn step(&mut self, label: impl Into<String>) {
        self.steps.current = label.into();
        self.steps.started += 1;
        debug!(step = %self.steps.current, n = self.steps.started, "step");
    }

    /// The scenario's browser session
    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// Page objects, shared by all scenarios
    #[must_use]
    pub const fn pages(&self) -> &'a Pages {
        self.pages
    }

    /// Fixture record loaded for this scenario
    #[must_use]
    pub const fn fixture(&self) -> &FixtureRecord {
        &self.fixture
    }

    /// Owned copy of a fixture field
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingField`] if the field is absent.
    pub fn field(&self, name: &str) -> ProbeResult<String> {
        self.fixture.get(name).map(str::to_string)
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// First failure of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// Label of the failing step
    pub step: String,
    /// Phase the failure happened in
    pub phase: Phase,
    /// Error classification
    pub kind: ErrorKind,
    /// Error message
    pub message: String,
    /// Expected value, for assertion mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Observed value, for assertion mismatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

impl StepFailure {
    fn new(step: &str, phase: Phase, err: &ProbeError) -> Self {
        let (expected, observed) = err
            .expected_observed()
            .map_or((None, None), |(e, o)| (Some(e.to_string()), Some(o.to_string())));
        Self {
            step: step.to_string(),
            phase,
            kind: err.kind(),
            message: err.to_string(),
            expected,
            observed,
        }
    }
}

/// Scenario outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every step passed
    Passed,
    /// A step failed
    Failed(StepFailure),
    /// Not run because the run was aborted
    Skipped,
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// Steps that finished without error
    pub steps_completed: usize,
    /// Wall time including reset
    pub duration_ms: u64,
}

impl ScenarioReport {
    fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            outcome: Outcome::Skipped,
            steps_completed: 0,
            duration_ms: 0,
        }
    }

    /// Whether the scenario passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }

    /// The failure, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&StepFailure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Whether the failure must abort the run
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.failure()
            .is_some_and(|f| f.kind == ErrorKind::Configuration)
    }
}

/// Result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-scenario results, in execution order
    pub scenarios: Vec<ScenarioReport>,
    /// Whether a fatal error stopped the run
    pub aborted: bool,
}

impl SuiteReport {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            scenarios: Vec::new(),
            aborted: false,
        }
    }

    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        !self.aborted && self.scenarios.iter().all(ScenarioReport::passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.failure().is_some())
            .count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.scenarios.len()
    }

    /// Look up a scenario by name
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

// =============================================================================
// HARNESS
// =============================================================================

/// Runs scenarios against sessions
#[derive(Debug, Clone)]
pub struct TestHarness {
    config: SuiteConfig,
    pages: Pages,
    fixtures: FixtureBinder,
}

impl TestHarness {
    /// Create a harness from validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] for invalid settings or locator
    /// overrides.
    pub fn new(config: SuiteConfig) -> ProbeResult<Self> {
        config.validate()?;
        let pages = Pages::from_config(&config)?;
        let fixtures = config.fixture_binder();
        Ok(Self {
            config,
            pages,
            fixtures,
        })
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Page objects handed to scenarios
    #[must_use]
    pub const fn pages(&self) -> &Pages {
        &self.pages
    }

    /// Wrap a driver in a session using the configured wait policy
    #[must_use]
    pub fn session(&self, driver: Box<dyn crate::driver::StorefrontDriver>) -> Session {
        Session::new(driver, self.config.wait_options())
    }

    /// Isolation reset; returns the scenario's fixture record
    async fn reset(&self, session: &mut Session) -> ProbeResult<FixtureRecord> {
        let fixture = self.fixtures.load(&self.config.fixture_name)?;
        let left = session.clear_storage().await?;
        if !left.is_empty() {
            return Err(ProbeError::IsolationLeak {
                cookies: left.cookies,
                local: left.local,
                session: left.session,
            });
        }
        session.navigate(&self.config.base_url).await?;
        let url = session.current_url().await?;
        if !url.contains(&self.config.url_marker) {
            return Err(ProbeError::mismatch(
                "entry URL",
                format!("URL containing {:?}", self.config.url_marker),
                url,
            ));
        }
        Ok(fixture)
    }

    async fn execute(
        &self,
        session: &mut Session,
        scenario: &dyn Scenario,
        steps: &mut StepTracker,
    ) -> ProbeResult<()> {
        let fixture = self.reset(session).await?;
        steps.phase = Phase::Running;
        let mut ctx = ScenarioContext {
            session,
            pages: &self.pages,
            fixture,
            steps,
        };
        scenario.run(&mut ctx).await
    }

    /// Run one scenario on `session`
    pub async fn run_scenario(
        &self,
        session: &mut Session,
        scenario: &dyn Scenario,
    ) -> ScenarioReport {
        let span = info_span!("scenario", name = scenario.name());
        async move {
            let started = Instant::now();
            let budget = self.config.scenario_budget();
            let mut steps = StepTracker::new();
            let result =
                match tokio::time::timeout(budget, self.execute(session, scenario, &mut steps))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProbeError::Timeout {
                        what: format!("scenario '{}' to finish", scenario.name()),
                        ms: self.config.scenario_budget_ms,
                    }),
                };
            let duration_ms = started.elapsed().as_millis() as u64;
            let (outcome, steps_completed) = match result {
                Ok(()) => {
                    info!(steps = steps.started, duration_ms, "scenario passed");
                    (Outcome::Passed, steps.started)
                }
                Err(err) => {
                    warn!(step = %steps.current, error = %err, "scenario failed");
                    let failure = StepFailure::new(&steps.current, steps.phase, &err);
                    (Outcome::Failed(failure), steps.started.saturating_sub(1))
                }
            };
            ScenarioReport {
                name: scenario.name().to_string(),
                outcome,
                steps_completed,
                duration_ms,
            }
        }
        .instrument(span)
        .await
    }

    /// Run scenarios in order on one session
    pub async fn run(&self, session: &mut Session, scenarios: &[&dyn Scenario]) -> SuiteReport {
        let mut report = SuiteReport::start();
        info!(run_id = %report.run_id, scenarios = scenarios.len(), "run started");
        for scenario in scenarios {
            if report.aborted {
                report.scenarios.push(ScenarioReport::skipped(scenario.name()));
                continue;
            }
            let result = self.run_scenario(session, *scenario).await;
            if result.is_fatal() {
                error!(scenario = scenario.name(), "configuration error, aborting run");
                report.aborted = true;
            }
            report.scenarios.push(result);
        }
        report
    }

    /// Run scenarios concurrently, each on its own session from `factory`
    pub async fn run_isolated(
        &self,
        factory: &dyn SessionFactory,
        scenarios: &[&dyn Scenario],
    ) -> SuiteReport {
        let mut report = SuiteReport::start();
        info!(run_id = %report.run_id, scenarios = scenarios.len(), "isolated run started");
        let runs = scenarios.iter().map(|scenario| async move {
            let driver = match factory.open().await {
                Ok(driver) => driver,
                Err(err) => {
                    warn!(scenario = scenario.name(), error = %err, "session failed to open");
                    return ScenarioReport {
                        name: scenario.name().to_string(),
                        outcome: Outcome::Failed(StepFailure::new(RESET_STEP, Phase::Reset, &err)),
                        steps_completed: 0,
                        duration_ms: 0,
                    };
                }
            };
            let mut session = self.session(driver);
            let result = self.run_scenario(&mut session, *scenario).await;
            if let Err(err) = session.close().await {
                warn!(scenario = scenario.name(), error = %err, "session failed to close");
            }
            result
        });
        report.scenarios = join_all(runs).await;
        report.aborted = report.scenarios.iter().any(ScenarioReport::is_fatal);
        report
    }
}
