#![warn(clippy::all, missing_docs)]

//! Core logic for the planning poker client.
//!
//! This crate hosts the room models, the shared store backends, the join
//! lifecycle, live synchronisation and the controller that the terminal UI
//! and any future frontends drive.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod models;
pub mod room;
pub mod store;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use controller::{RoomController, RoomEvent, RoomView};
pub use error::RoomError;
pub use identity::{ClientId, IdentityStore};
pub use models::{Participant, Participants, RoomState};
pub use room::{generate_room_id, JoinedRoom, RoomId, RoomStatus};
pub use store::{FirebaseStore, MemoryStore, SharedStore, StoreError};
