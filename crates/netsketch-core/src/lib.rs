//! Netsketch Core - sketch-to-diagram workflow
//!
//! The orchestration layer that:
//! - Holds the workflow state behind validated transitions
//! - Generates six styled variants of an uploaded sketch, one at a time
//! - Applies natural-language edits to a selected variant
//! - Talks to the image model and key flow only through traits
//!
//! # Example
//!
//! ```rust,ignore
//! use netsketch_core::{DiagramStudio, EnvCredentials, StudioConfig};
//! use std::sync::Arc;
//!
//! # async fn example(generator: Arc<dyn netsketch_core::ImageGenerator>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = StudioConfig::new();
//! let credentials = Arc::new(EnvCredentials::new(&config.api_key_var));
//! let studio = DiagramStudio::new(config, generator, credentials);
//!
//! studio.upload(netsketch_core::ImagePayload::new(std::fs::read("sketch.png")?, netsketch_core::MediaType::Png));
//! if let Some(report) = studio.generate_all().await? {
//!     println!("{} ready, {} failed", report.succeeded.len(), report.failed.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod generator;
pub mod plan;
pub mod prompt;
pub mod state;
pub mod studio;
pub mod types;

// Re-exports for convenience
pub use config::StudioConfig;
pub use error::{ConfigError, CredentialError, GeneratorError, StateError, StudioError};
pub use generator::{ApiKey, CredentialProvider, EnvCredentials, ImageGenerator};
pub use netsketch_imaging::{ImagePayload, MediaType, PrepareOptions};
pub use plan::{GenerationPlan, GenerationTask};
pub use state::{EditTicket, WorkflowState};
pub use studio::{DiagramStudio, SharedState};
pub use types::{
    AspectRatio, BatchId, BatchReport, DiagramVariant, EditOutcome, GenerationRequest, ImageSize,
    ParseIdError, RenderOptions, StyleCategory, VariantId, VariantStatus, BATCH_SIZE,
    VARIANTS_PER_STYLE,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Netsketch Core
    pub use crate::{
        CredentialProvider, DiagramStudio, ImageGenerator, ImagePayload, MediaType, StudioConfig,
        StudioError, StyleCategory, VariantId, VariantStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
