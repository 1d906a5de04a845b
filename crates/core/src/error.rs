//! Errors surfaced by room operations.

use crate::{room::RoomIdError, store::StoreError};

/// Failures surfaced by room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The supplied room identifier cannot be used as a store key.
    #[error("invalid room id: {0}")]
    InvalidRoomId(#[from] RoomIdError),
    /// The vote is not one of the deck's cards.
    #[error("'{0}' is not a card in the deck")]
    InvalidVote(String),
    /// Reading room data failed.
    #[error("failed to read room data: {0}")]
    StoreRead(#[source] StoreError),
    /// Writing room data failed; local state was left untouched.
    #[error("failed to write room data: {0}")]
    StoreWrite(#[source] StoreError),
    /// Live updates could not be established.
    #[error("failed to subscribe to room updates: {0}")]
    StoreSubscribe(#[source] StoreError),
    /// The local identity file could not be read or written.
    #[error("client identity unavailable: {0:#}")]
    Identity(anyhow::Error),
}
