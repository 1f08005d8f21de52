//! User directory lookup contract.
//!
//! The resolver is injected per decrypt call. The only requirement is
//! that it returns consistent data for the duration of one call;
//! lookups may hit the network.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::user::RemoteUser;

/// Resolves a claimed user id to its directory record.
#[async_trait]
pub trait UserResolver: Send + Sync {
    /// Look up a user by id.
    async fn resolve(&self, id: &str) -> Result<RemoteUser, ProtocolError>;
}

/// Map-backed resolver for tests and bootstrap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    users: HashMap<String, RemoteUser>,
}

impl InMemoryResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user under its id.
    pub fn insert(&mut self, user: RemoteUser) {
        self.users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserResolver for InMemoryResolver {
    async fn resolve(&self, id: &str) -> Result<RemoteUser, ProtocolError> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| ProtocolError::UnknownUser(id.to_string()))
    }
}
