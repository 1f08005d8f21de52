//! # clearlog
//!
//! End-to-end encrypted sharing of signed data-access logs.
//!
//! A monitor records that a tool accessed someone's personal data,
//! signs the event and delivers it confidentially to the data owner.
//! The owner may re-share the signed event with further receivers.
//! Every recipient can decrypt the payload, verify that the event was
//! signed by a trusted monitor, and verify that the sharing party was
//! authorised and addressed exactly the recipients named in the
//! envelope.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clearlog::{AccessLog, AuthenticatedUser, InMemoryResolver};
//!
//! # async fn demo() -> Result<(), clearlog::ProtocolError> {
//! let monitor = AuthenticatedUser::generate_with_id("monitor")?.with_monitor(true);
//! let owner = AuthenticatedUser::generate_with_id("owner")?;
//!
//! let mut resolver = InMemoryResolver::new();
//! resolver.insert(monitor.as_remote().clone());
//! resolver.insert(owner.as_remote().clone());
//!
//! let log = AccessLog::new(
//!     "monitor", "owner", "crm", "support ticket 4711",
//!     1_700_000_000, "direct", vec!["email".into()],
//! );
//! let signed = monitor.sign_access_log(&log)?;
//!
//! // Monitors deliver to the data owner only.
//! let token = monitor.encrypt_log(&signed, &[owner.as_remote().clone()]).await?;
//! let received = owner.decrypt_log(&token, &resolver).await?;
//! assert_eq!(received.extract().id, log.id);
//! # Ok(())
//! # }
//! ```

pub use clearlog_core::{
    AccessLog, Certificate, CoreError, FlattenedJws, JweEnvelope, SharedHeaderClaims,
    SharedLogClaims, SignedLog,
};
pub use clearlog_protocol::{
    decrypt, encrypt, AuthenticatedUser, InMemoryResolver, ProtocolError, RemoteUser, UserResolver,
};
