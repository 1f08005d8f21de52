//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a monitor, an owner and a
//! receiver, all registered with an in-memory resolver.

use clearlog_core::AccessLog;
use clearlog_protocol::{AuthenticatedUser, InMemoryResolver};

/// A three-party bench: monitor, owner and receiver, plus a resolver
/// that knows all of them.
pub struct TestBench {
    pub monitor: AuthenticatedUser,
    pub owner: AuthenticatedUser,
    pub receiver: AuthenticatedUser,
    pub resolver: InMemoryResolver,
}

impl TestBench {
    /// Create a bench with freshly generated users.
    pub fn new() -> Self {
        let monitor = AuthenticatedUser::generate_with_id("monitor")
            .expect("user generation")
            .with_monitor(true);
        let owner = AuthenticatedUser::generate_with_id("owner").expect("user generation");
        let receiver = AuthenticatedUser::generate_with_id("receiver").expect("user generation");

        let mut resolver = InMemoryResolver::new();
        resolver.insert(monitor.as_remote().clone());
        resolver.insert(owner.as_remote().clone());
        resolver.insert(receiver.as_remote().clone());

        Self {
            monitor,
            owner,
            receiver,
            resolver,
        }
    }

    /// Register one more generated user with the resolver.
    pub fn add_user(&mut self, id: &str) -> AuthenticatedUser {
        let user = AuthenticatedUser::generate_with_id(id).expect("user generation");
        self.resolver.insert(user.as_remote().clone());
        user
    }

    /// An access log recorded by the bench monitor about the bench owner.
    pub fn sample_access_log(&self) -> AccessLog {
        AccessLog::new(
            self.monitor.id(),
            self.owner.id(),
            "crm",
            "support ticket 4711",
            1_700_000_000,
            "direct",
            vec!["email".into(), "address".into()],
        )
    }
}

impl Default for TestBench {
    fn default() -> Self {
        Self::new()
    }
}
