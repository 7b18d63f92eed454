//! Storage is organized through [project_store::JsonProjectStore].
//!  - The whole [ProjectCollection](entities::ProjectCollection) is one JSON document keyed by
//!    project name.
//!  - Every save rewrites the document in full; there is no incremental append.

pub mod entities;
pub mod project_store;
