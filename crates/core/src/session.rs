//! Session state machine for the analysis flow.
//!
//! One user-visible lifecycle: idle -> image selected -> analyzing ->
//! result or failure, with reset available from anywhere. The whole session
//! is a single immutable [`SessionState`] snapshot replaced atomically on
//! each transition, so no partially-updated state is ever observable.
//!
//! The transitions themselves are pure; [`Session`] drives them around the
//! one async analyzer call.

use crate::error::AppError;
use crate::gemini::ReportAnalyzer;
use crate::image_input::SelectedImage;
use crate::report::CarbonFootprintReport;

/// Immutable snapshot of one user's session.
///
/// At most one of {analyzing, report, error message} is active at any
/// observable point. The generation counter ties an in-flight request to the
/// selection it was started from, so a completion that arrives after a reset
/// or re-selection is discarded instead of racing with the newer state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    image: Option<SelectedImage>,
    report: Option<CarbonFootprintReport>,
    error_message: Option<String>,
    analyzing: bool,
    generation: u64,
}

/// Proof that an analysis was started from a particular snapshot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
}

impl SessionState {
    /// The currently selected image, if any.
    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// The report from the last successful analysis, if any.
    pub fn report(&self) -> Option<&CarbonFootprintReport> {
        self.report.as_ref()
    }

    /// The user-facing message from the last failed attempt, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// True strictly between analysis start and its completion.
    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    /// Replaces the held image, discarding any previous image, report, and
    /// error. Valid from any state; does not start an analysis. An analysis
    /// still in flight for the previous selection is no longer current.
    pub fn select_image(self, image: SelectedImage) -> Self {
        Self {
            image: Some(image),
            report: None,
            error_message: None,
            analyzing: false,
            generation: self.generation + 1,
        }
    }

    /// Returns the session to its initial state, releasing the held image.
    /// Idempotent.
    pub fn reset(self) -> Self {
        Self {
            image: None,
            report: None,
            error_message: None,
            analyzing: false,
            generation: self.generation + 1,
        }
    }

    /// Begins an analysis attempt.
    ///
    /// No ticket is issued while a request is already in flight (the attempt
    /// is ignored) or when no image is held (the guidance message is surfaced
    /// instead, without contacting the API). Otherwise the prior report and
    /// error are cleared before the request starts.
    pub fn start_analysis(self) -> (Self, Option<AnalysisTicket>) {
        if self.analyzing {
            return (self, None);
        }

        if self.image.is_none() {
            let next = Self {
                report: None,
                error_message: Some(AppError::NoImageSelected.user_message().to_string()),
                ..self
            };
            return (next, None);
        }

        let ticket = AnalysisTicket {
            generation: self.generation,
        };
        let next = Self {
            report: None,
            error_message: None,
            analyzing: true,
            ..self
        };
        (next, Some(ticket))
    }

    /// Applies the completion of the analysis started with `ticket`.
    ///
    /// A stale ticket (the image was replaced or the session reset while the
    /// request was in flight) leaves the snapshot untouched. Otherwise
    /// exactly one of report or error message is set.
    pub fn finish_analysis(
        self,
        ticket: AnalysisTicket,
        outcome: std::result::Result<CarbonFootprintReport, String>,
    ) -> Self {
        if ticket.generation != self.generation {
            return self;
        }

        match outcome {
            Ok(report) => Self {
                report: Some(report),
                error_message: None,
                analyzing: false,
                ..self
            },
            Err(message) => Self {
                report: None,
                error_message: Some(message),
                analyzing: false,
                ..self
            },
        }
    }
}

/// Drives the session snapshot around an analyzer.
///
/// Generic over [`ReportAnalyzer`] so the flow can be exercised with a fake
/// analyzer and no network.
pub struct Session<A> {
    analyzer: A,
    state: SessionState,
}

impl<A: ReportAnalyzer> Session<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            state: SessionState::default(),
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn select_image(&mut self, image: SelectedImage) {
        self.state = self.state.clone().select_image(image);
    }

    pub fn reset(&mut self) {
        self.state = self.state.clone().reset();
    }

    /// Runs one analysis attempt to completion.
    ///
    /// The analyzer is invoked at most once, and only when the start guards
    /// pass. Analyzer failures are collapsed to the generic user message.
    pub async fn analyze(&mut self) {
        let (next, ticket) = self.state.clone().start_analysis();
        self.state = next;

        let Some(ticket) = ticket else { return };
        // A ticket is only issued with an image held.
        let Some(image) = self.state.image().cloned() else { return };

        let outcome = self.analyzer.analyze(&image).await.map_err(|e: AppError| {
            tracing::warn!(error = %e, "analysis attempt failed");
            e.user_message().to_string()
        });

        self.state = self.state.clone().finish_analysis(ticket, outcome);
    }
}
