//! # clearlog protocol
//!
//! The two-layer sign-then-encrypt protocol for sharing access logs.
//!
//! ## Overview
//!
//! A monitor records an access event, signs it and shares it
//! confidentially with the data owner. The owner may re-share the same
//! signed event with further receivers. Three signatures live in one
//! token:
//!
//! 1. The access log JWS, signed by the monitor.
//! 2. The shared log JWS wrapping it, signed by whoever shares.
//! 3. The shared header JWS, binding `{id, owner, recipients}` into the
//!    envelope's AEAD-protected header.
//!
//! Every recipient can decrypt the payload, verify both inner
//! signatures against the directory and check that the envelope
//! metadata matches the signed claims.
//!
//! ## Key Types
//!
//! - [`AuthenticatedUser`] - signs, shares and decrypts
//! - [`RemoteUser`] - a directory record: id, certificates, monitor flag
//! - [`UserResolver`] - the directory lookup contract
//! - [`ProtocolError`] - one variant per failure kind
//!
//! The protocol core is stateless; each call is a pure function of its
//! inputs and the injected resolver.

pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod resolver;
pub mod user;

pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use error::ProtocolError;
pub use resolver::{InMemoryResolver, UserResolver};
pub use user::{AuthenticatedUser, RemoteUser};
