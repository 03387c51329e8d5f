pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod encoder;
pub mod enrichment;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod session;

pub use client::IdentificationClient;
pub use encoder::EncodedImage;
pub use enrichment::EnrichmentLookup;
pub use error::{LookupError, PlantIdError, RequestCause, RequestError, Result};
pub use pipeline::{Identifier, Pipeline};
pub use session::{Outcome, Session, SessionState, Ticket};
