//! Create trait for adding entities.

use async_trait::async_trait;

use crate::client::HubClient;
use crate::error::Result;

/// Create a new entity.
///
/// The server answers a successful create with `201 Created` and the new
/// entity's URL in the `Location` header; that URL is what `create` returns.
/// Every other status, including `412 Precondition Failed` for duplicate
/// names, comes back as [`crate::HubError::ApiError`] carrying that status.
#[async_trait]
pub trait Create: Sized {
    /// Parameters describing the new entity.
    type Params: Send + Sync;

    /// Create the entity and return its self link.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer `201 Created`.
    async fn create(client: &HubClient, params: &Self::Params) -> Result<String>;
}
