//! Integration suite: full pipeline and HTTP API against in-memory
//! collaborators.

mod api;
mod mock_listing;
mod pipeline;
