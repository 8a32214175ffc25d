//! Natural-language collaborator.
//!
//! Defines the `Commentator` trait used to pull an address out of free
//! text and to narrate a finished analysis. The numbers always come from
//! `analysis`; the model only writes prose around them.

pub mod deepseek;
pub mod prompts;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{DealAnalysis, PropertyInfo};

/// Abstraction over chat-completion models.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Commentator: Send + Sync {
    /// Extract a "Street, City, State" address from a user message.
    /// Returns `None` when the message does not name a property.
    async fn extract_address(&self, message: &str) -> Result<Option<String>>;

    /// Investor-facing commentary on a completed analysis. `user_query` is
    /// the original request and may be empty.
    async fn commentary(
        &self,
        property: &PropertyInfo,
        analysis: &DealAnalysis,
        user_query: &str,
    ) -> Result<String>;

    /// General real-estate conversation.
    async fn chat(&self, message: &str) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}
