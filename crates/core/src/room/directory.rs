use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;

use super::RoomId;
use crate::{
    identity::ClientId,
    models::{EmojiRain, Participant, Participants, RoomState, RoomTimestamps},
    store::{server_timestamp, SharedStore, StoreError},
};

/// Path of the whole room subtree.
pub fn room_path(room: &RoomId) -> String {
    format!("rooms/{room}")
}

/// Path of the room-level state.
pub fn state_path(room: &RoomId) -> String {
    format!("rooms/{room}/state")
}

/// Path of one room-level state field.
pub fn state_field_path(room: &RoomId, field: &str) -> String {
    format!("rooms/{room}/state/{field}")
}

/// Path of the participant set.
pub fn participants_path(room: &RoomId) -> String {
    format!("rooms/{room}/participants")
}

/// Path of one participant record.
pub fn participant_path(room: &RoomId, client: &ClientId) -> String {
    format!("rooms/{room}/participants/{client}")
}

/// Room-level fields written together with an `updatedAt` bump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    /// New story text.
    pub story: Option<String>,
    /// New reveal flag.
    pub reveal: Option<bool>,
}

impl StatePatch {
    /// Patch setting only the story.
    pub fn story(text: impl Into<String>) -> Self {
        Self {
            story: Some(text.into()),
            reveal: None,
        }
    }

    /// Patch setting only the reveal flag.
    pub fn reveal(flag: bool) -> Self {
        Self {
            story: None,
            reveal: Some(flag),
        }
    }

    /// Patch starting a fresh round.
    pub fn cleared() -> Self {
        Self {
            story: Some(String::new()),
            reveal: Some(false),
        }
    }

    fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(story) = self.story {
            fields.insert("story".to_string(), Value::String(story));
        }
        if let Some(reveal) = self.reveal {
            fields.insert("reveal".to_string(), Value::Bool(reveal));
        }
        fields.insert("updatedAt".to_string(), server_timestamp());
        fields
    }
}

/// Typed access to the room layout in a [`SharedStore`].
pub struct RoomDirectory<S> {
    store: Arc<S>,
}

impl<S> Clone for RoomDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SharedStore> RoomDirectory<S> {
    /// Directory over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Room-level state, `None` when the room does not exist.
    pub async fn read_state(&self, room: &RoomId) -> Result<Option<RoomState>, StoreError> {
        match self.store.get(&state_path(room)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Activity stamps of the room, `None` when the room does not exist.
    /// Unlike [`read_state`](Self::read_state) this never fails on a
    /// malformed sibling field.
    pub async fn read_timestamps(
        &self,
        room: &RoomId,
    ) -> Result<Option<RoomTimestamps>, StoreError> {
        let value = self.store.get(&state_path(room)).await?;
        Ok(value.as_ref().map(RoomTimestamps::from_state))
    }

    /// Current participant set.
    pub async fn read_participants(&self, room: &RoomId) -> Result<Participants, StoreError> {
        let value = self.store.get(&participants_path(room)).await?;
        Ok(decode_participants(value))
    }

    /// Stamp activity. A fresh room also gets its `createdAt`.
    pub async fn touch_state(&self, room: &RoomId, fresh: bool) -> Result<(), StoreError> {
        let mut fields = Map::new();
        if fresh {
            fields.insert("createdAt".to_string(), server_timestamp());
        }
        fields.insert("updatedAt".to_string(), server_timestamp());
        self.store.update(&state_path(room), fields).await
    }

    /// Delete the room with all participants.
    pub async fn delete_room(&self, room: &RoomId) -> Result<(), StoreError> {
        self.store.remove(&room_path(room)).await
    }

    /// Create or overwrite a participant record.
    pub async fn put_participant(
        &self,
        room: &RoomId,
        client: &ClientId,
        participant: &Participant,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(participant)?;
        self.store.set(&participant_path(room, client), value).await
    }

    /// Write one participant's vote.
    pub async fn set_vote(
        &self,
        room: &RoomId,
        client: &ClientId,
        vote: &str,
    ) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("vote".to_string(), Value::String(vote.to_string()));
        self.store
            .update(&participant_path(room, client), fields)
            .await
    }

    /// Reset the votes of the given participants in one multi-path write.
    pub async fn clear_votes<'a, I>(&self, room: &RoomId, clients: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let fields: Map<String, Value> = clients
            .into_iter()
            .map(|client| (format!("{client}/vote"), json!("")))
            .collect();
        if fields.is_empty() {
            return Ok(());
        }
        self.store.update(&participants_path(room), fields).await
    }

    /// Write room-level fields and bump `updatedAt`.
    pub async fn update_state(&self, room: &RoomId, patch: StatePatch) -> Result<(), StoreError> {
        self.store
            .update(&state_path(room), patch.into_fields())
            .await
    }

    /// Overwrite the emoji rain broadcast and bump `updatedAt` in one update.
    pub async fn set_emoji_rain(&self, room: &RoomId, rain: &EmojiRain) -> Result<(), StoreError> {
        let mut fields = Map::new();
        fields.insert("emojiRain".to_string(), serde_json::to_value(rain)?);
        fields.insert("updatedAt".to_string(), server_timestamp());
        self.store.update(&state_path(room), fields).await
    }

    /// Delete a participant record.
    pub async fn remove_participant(
        &self,
        room: &RoomId,
        client: &ClientId,
    ) -> Result<(), StoreError> {
        self.store.remove(&participant_path(room, client)).await
    }
}

/// Decode a participant snapshot, skipping entries that do not parse.
pub fn decode_participants(value: Option<Value>) -> Participants {
    let Some(Value::Object(entries)) = value else {
        return Participants::new();
    };
    entries
        .into_iter()
        .filter_map(|(client, raw)| match serde_json::from_value::<Participant>(raw) {
            Ok(participant) => Some((client, participant)),
            Err(err) => {
                warn!(%client, error = %err, "skipping malformed participant");
                None
            }
        })
        .collect()
}
