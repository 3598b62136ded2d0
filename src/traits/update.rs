//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::client::HubClient;
use crate::error::Result;

/// Update an existing entity.
///
/// The server replaces resources wholesale on `PUT`, so implementations
/// fetch the current representation, apply the parameters and send it back.
///
/// # Example
///
/// ```ignore
/// use hubapi::{HubClient, Project, ProjectUpdateParams, Update};
///
/// let updated = Project::update(
///     &client,
///     project_href,
///     ProjectUpdateParams {
///         description: Some("New description".to_string()),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this entity.
    type Id;

    /// Parameters for the update.
    type Params;

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &HubClient, id: Self::Id, params: Self::Params) -> Result<Self>;
}
