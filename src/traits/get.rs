//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::HubClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implement this trait for entity types that can be fetched individually.
/// The ID is usually the identifier at the end of the entity's self link.
///
/// # Example
///
/// ```ignore
/// use hubapi::{HubClient, Project, Get};
///
/// let project = Project::get(&client, "6f1c0f1e-...".to_string()).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &HubClient, id: Self::Id) -> Result<Self>;
}
