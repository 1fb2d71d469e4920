//! Sunfund Domain Layer
//!
//! This crate contains the record model for solar financing updates and the
//! trait interfaces that every other layer depends upon.
//!
//! ## Key Concepts
//!
//! - **ExtractedRecord**: one article turned into a fixed schema
//! - **null vs "n/a"**: `None` means a field does not apply to the record;
//!   a `NotAvailable` value means it applies but the article does not say
//! - **Financed entity**: a record finances at most one project or one
//!   organization, matching its receiver category
//! - **Collaborators**: text generation, page rendering, HTTP fetching,
//!   structured scraping and persistence are traits implemented elsewhere
//!
//! ## Architecture
//!
//! - Pure model and validation logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod figure;
pub mod record;
pub mod traits;
pub mod vocabulary;

// Re-exports for convenience
pub use figure::Figure;
pub use record::{
    generate_id, is_not_available, is_valid_date, ExtractedRecord, OrganizationFinanced,
    ProjectFinanced, SubUpdate, DATE_FORMAT,
};
pub use traits::{
    FetchResponse, FieldRequest, FieldScraper, FieldSpec, HttpFetcher, LlmProvider, PageRenderer,
    RecordStore, RenderedPage, StoreOutcome,
};
pub use vocabulary::{
    GridType, Instrument, NewsUpdateType, OrganizationRole, ProjectStatus, ReceiverCategory,
    SubUpdateRole, TechnologyAndGridSystem, TypeOfInstallation, NOT_AVAILABLE,
};
