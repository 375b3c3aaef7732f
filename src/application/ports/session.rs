use crate::domain::value_objects::UserId;
use async_trait::async_trait;

/// Read-only view of the authentication state at sync time.
#[async_trait]
pub trait AuthSession: Send + Sync {
    async fn current_user(&self) -> Option<UserId>;
}
