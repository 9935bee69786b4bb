//! Wire protocol between the session and its viewers.
//!
//! Messages are JSON text frames. Every server message is either a full
//! [`messages::Snapshot`] of the session or a bare sound cue; there is no
//! request/response pairing.

/// Client and server message types plus the snapshot projection.
pub mod messages;
