//! `UsersApi` trait definition.

use async_trait::async_trait;

use crate::errors::SdkError;
use crate::models::User;

/// User management on a Casdoor server.
///
/// Every call is a single round trip; nothing is cached between calls.
/// Write operations return `Ok(true)` only when the server reports that a record
/// changed, so adding an existing user or deleting a missing one yields `Ok(false)`.
///
/// ```ignore
/// let api: Arc<dyn UsersApi> = Arc::new(CasdoorClient::new(config)?);
/// if let Some(user) = api.get_user("alice").await? {
///     println!("{}", user.display_name);
/// }
/// ```
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// All users of the configured organization.
    async fn get_users(&self) -> Result<Vec<User>, SdkError>;

    /// One user of the configured organization, `None` if the server has no such user.
    async fn get_user(&self, name: &str) -> Result<Option<User>, SdkError>;

    async fn add_user(&self, user: &User) -> Result<bool, SdkError>;

    async fn update_user(&self, user: &User) -> Result<bool, SdkError>;

    async fn delete_user(&self, user: &User) -> Result<bool, SdkError>;
}
