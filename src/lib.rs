//! Translation core of a gateway that lets Bedrock Edition clients play on
//! Java Edition servers.
//!
//! The gateway sits between two codecs. The Bedrock codec hands it decoded
//! client packets; the Java codec hands it decoded server packets. Each
//! player gets a [`session::Session`], driven by its own task, which
//! dispatches every inbound packet to the translator registered for its
//! kind. Translators read and update session state and queue packets for
//! either side.
//!
//! # Session lifecycle
//! A session starts the Java login as soon as the Bedrock player is
//! authenticated, then follows the Java connection through configuration
//! into play. A server switch sends the session back to configuration:
//! entities, open windows and deferred work from the previous server are
//! discarded before the new configuration begins.
//!
//! # Static tables
//! Block state and item mappings are loaded once at startup, validated,
//! and shared read-only by every session. A reload publishes a complete
//! new set, which sessions adopt between packets.

pub mod config;
pub mod directory;
pub mod entity_id;
pub mod gateway;
pub mod hooks;
pub mod identity;
pub mod inventory;
pub mod mappings;
pub mod phase;
pub mod position;
pub mod protocol;
pub mod proxy;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod translator;
