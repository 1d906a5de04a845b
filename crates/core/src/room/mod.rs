//! Room identifiers, store layout and join lifecycle.

/// Typed reads and writes of the room layout.
pub mod directory;
mod id;
/// Fresh/active/expired decisions on join.
pub mod lifecycle;

pub use directory::{RoomDirectory, StatePatch};
pub use id::{RoomId, RoomIdError, COUNTRIES};
pub use lifecycle::{JoinedRoom, RoomLifecycle, RoomStatus, ROOM_TTL};

/// Random `COUNTRY-NNN` room identifier.
pub fn generate_room_id() -> RoomId {
    RoomId::generate()
}
