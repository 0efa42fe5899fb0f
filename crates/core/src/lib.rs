//! MealPrint Core Library
//!
//! This library provides the core functionality for the MealPrint meal
//! carbon footprint analyzer: image selection, Gemini AI analysis with a
//! strict output schema, and the session state machine driving one
//! analysis attempt.
//!
//! # Overview
//!
//! MealPrint lets a user pick a photo of a meal and receive an AI-generated
//! estimate of its carbon footprint, broken down by ingredient. The library
//! handles:
//!
//! - **Image Input**: File loading, format sniffing, and Base64 transport
//!   encoding via [`image_input`]
//! - **AI Integration**: One structured-output Gemini call per attempt via
//!   [`gemini`]
//! - **Report Model**: Fail-closed response parsing via [`report`]
//! - **Session Flow**: The idle / selected / analyzing / result lifecycle
//!   via [`session`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`MealPrint`] facade:
//!
//! ```ignore
//! use mealprint_core::MealPrint;
//!
//! // Initialize with environment configuration
//! let mut app = MealPrint::new()?;
//!
//! // Select a photo and analyze it
//! app.select_image_from_path("dinner.jpg")?;
//! app.analyze().await;
//!
//! if let Some(report) = app.state().report() {
//!     println!("{}: {} kg CO2e", report.dish_name, report.total_carbon_footprint);
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`gemini`]: Gemini analysis client with structured output
//! - [`image_input`]: Image loading and encoding utilities
//! - [`report`]: Report data model and response parsing
//! - [`session`]: Session state machine

pub mod config;
pub mod error;
pub mod gemini;
pub mod image_input;
pub mod report;
pub mod session;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use gemini::{GeminiClient, ReportAnalyzer};
pub use image_input::SelectedImage;
pub use report::{CarbonFootprintReport, Ingredient};
pub use session::{Session, SessionState};

use std::path::Path;

/// Main entry point for the MealPrint application.
///
/// This struct provides a facade over the analysis client and session,
/// handling initialization and orchestration. It's the recommended way to
/// use the library for most use cases.
pub struct MealPrint {
    config: Config,
    session: Session<GeminiClient>,
}

impl MealPrint {
    /// Creates a new MealPrint instance with environment configuration.
    ///
    /// Loads configuration from environment variables (including `.env`
    /// files) and builds the Gemini client with the resolved credential.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set. The client cannot be
    /// constructed without it; nothing is deferred to the first call.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(config)
    }

    /// Creates an instance with custom configuration.
    ///
    /// Use this when you need to override environment-based configuration,
    /// such as specifying a different model or API key.
    pub fn with_config(config: Config) -> Result<Self> {
        let client = GeminiClient::new(&config)?;
        Ok(Self {
            config,
            session: Session::new(client),
        })
    }

    /// Loads an image file and selects it for analysis.
    ///
    /// Replaces any previously selected image and clears any prior report or
    /// error. Does not start an analysis.
    pub fn select_image_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = SelectedImage::from_path(path)?;
        self.session.select_image(image);
        Ok(())
    }

    /// Runs one analysis attempt on the selected image.
    pub async fn analyze(&mut self) {
        self.session.analyze().await;
    }

    /// Returns the session to its initial state.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// The current session snapshot.
    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present and sets up the environment.
pub fn init() {
    let _ = dotenvy::dotenv();
}
