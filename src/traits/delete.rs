//! Delete trait for removing entities.

use async_trait::async_trait;

use crate::client::HubClient;
use crate::error::Result;
use crate::links::Resource;

/// Delete an entity through its self link.
#[async_trait]
pub trait Delete: Resource + Sync {
    /// Delete this entity on the server.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HubError::MissingLink`] if the entity has no self
    /// link, or an API error if the server refuses the delete.
    async fn delete(&self, client: &HubClient) -> Result<()> {
        let href = self.require_href()?;
        tracing::debug!("Deleting {href}");
        client.delete_resource(href).await
    }
}
