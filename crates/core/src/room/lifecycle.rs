use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use super::{RoomDirectory, RoomId};
use crate::{
    clock::Clock,
    error::RoomError,
    identity::ClientId,
    models::{Participant, RoomTimestamps},
    store::SharedStore,
};

/// Default inactivity window after which a room is evicted on join.
pub const ROOM_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// What a join found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// No prior state.
    Fresh,
    /// Prior state within the inactivity window.
    Active,
    /// Prior state older than the inactivity window; it was deleted.
    Expired,
}

/// Classify prior room stamps against the inactivity window.
pub fn classify(state: Option<&RoomTimestamps>, now_ms: i64, ttl: Duration) -> RoomStatus {
    let Some(state) = state else {
        return RoomStatus::Fresh;
    };
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    match state.last_active() {
        Some(last_active) if now_ms.saturating_sub(last_active) > ttl_ms => RoomStatus::Expired,
        _ if state.created_at.is_none() => RoomStatus::Fresh,
        _ => RoomStatus::Active,
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    /// Normalized room identifier.
    pub room_id: RoomId,
    /// Joining client.
    pub client_id: ClientId,
    /// Display name written to the participant record.
    pub name: String,
    /// What the join found.
    pub status: RoomStatus,
    /// Emoji rain events at or before this time are not replayed.
    pub watermark: i64,
}

/// Creates, refreshes and evicts rooms on join.
pub struct RoomLifecycle<S> {
    directory: RoomDirectory<S>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<S: SharedStore> RoomLifecycle<S> {
    /// Lifecycle manager with the given inactivity window.
    pub fn new(directory: RoomDirectory<S>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            directory,
            clock,
            ttl,
        }
    }

    /// Enter `room` as `client`, creating or recreating it when needed.
    ///
    /// A failed state read is treated as "no prior state"; any failed write
    /// aborts the join. Rejoining overwrites the previous participant record.
    pub async fn join(
        &self,
        room: &RoomId,
        client: &ClientId,
        name: &str,
    ) -> Result<JoinedRoom, RoomError> {
        let existing = match self.directory.read_timestamps(room).await {
            Ok(state) => state,
            Err(err) => {
                warn!(%room, error = %err, "failed to read room state; treating room as new");
                None
            }
        };

        let now_ms = self.clock.now_ms();
        let status = classify(existing.as_ref(), now_ms, self.ttl);
        if status == RoomStatus::Expired {
            info!(
                %room,
                last_active = ?existing.as_ref().and_then(RoomTimestamps::last_active),
                "room expired; clearing"
            );
            self.directory
                .delete_room(room)
                .await
                .map_err(RoomError::StoreWrite)?;
        }

        self.directory
            .touch_state(room, status != RoomStatus::Active)
            .await
            .map_err(RoomError::StoreWrite)?;

        let participant = Participant::joining(name, self.clock.now_ms());
        self.directory
            .put_participant(room, client, &participant)
            .await
            .map_err(RoomError::StoreWrite)?;

        let watermark = self.clock.now_ms();
        info!(%room, %client, ?status, "joined room");
        Ok(JoinedRoom {
            room_id: room.clone(),
            client_id: client.clone(),
            name: participant.name,
            status,
            watermark,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{clock::ManualClock, room::directory::state_path, store::MemoryStore};

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn state(created_at: Option<i64>, updated_at: Option<i64>) -> RoomTimestamps {
        RoomTimestamps {
            created_at,
            updated_at,
        }
    }

    #[test]
    fn missing_state_is_fresh() {
        assert_eq!(classify(None, 0, ROOM_TTL), RoomStatus::Fresh);
        assert_eq!(
            classify(Some(&state(None, None)), 0, ROOM_TTL),
            RoomStatus::Fresh
        );
    }

    #[test]
    fn expiry_uses_updated_at_before_created_at() {
        let now = 100 * HOUR_MS;
        let stale_created_recent_update = state(Some(now - 48 * HOUR_MS), Some(now - HOUR_MS));
        assert_eq!(
            classify(Some(&stale_created_recent_update), now, ROOM_TTL),
            RoomStatus::Active
        );

        let stale = state(Some(now - 48 * HOUR_MS), Some(now - 25 * HOUR_MS));
        assert_eq!(classify(Some(&stale), now, ROOM_TTL), RoomStatus::Expired);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let now = 100 * HOUR_MS;
        let exactly_ttl = state(Some(now - 24 * HOUR_MS), None);
        assert_eq!(classify(Some(&exactly_ttl), now, ROOM_TTL), RoomStatus::Active);
        let just_over = state(Some(now - 24 * HOUR_MS - 1), None);
        assert_eq!(classify(Some(&just_over), now, ROOM_TTL), RoomStatus::Expired);
    }

    #[test]
    fn updated_without_created_is_expired_when_stale() {
        let now = 100 * HOUR_MS;
        let orphan = state(None, Some(now - 30 * HOUR_MS));
        assert_eq!(classify(Some(&orphan), now, ROOM_TTL), RoomStatus::Expired);
        let recent_orphan = state(None, Some(now - HOUR_MS));
        assert_eq!(classify(Some(&recent_orphan), now, ROOM_TTL), RoomStatus::Fresh);
    }

    #[tokio::test]
    async fn malformed_emoji_rain_keeps_room_active() -> anyhow::Result<()> {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let room = RoomId::parse("uk-100").expect("valid room id");
        store
            .set(
                &state_path(&room),
                json!({
                    "createdAt": 1_000,
                    "updatedAt": 1_000,
                    "story": "keep",
                    "emojiRain": { "at": 5 },
                }),
            )
            .await?;
        clock.advance(Duration::from_secs(60));

        let lifecycle = RoomLifecycle::new(RoomDirectory::new(store.clone()), clock, ROOM_TTL);
        let joined = lifecycle
            .join(&room, &ClientId::new("c_ada"), "Ada")
            .await?;
        assert_eq!(joined.status, RoomStatus::Active);

        let state = store.get(&state_path(&room)).await?.unwrap_or_default();
        assert_eq!(state["createdAt"], json!(1_000));
        assert_eq!(state["updatedAt"], json!(61_000));
        assert_eq!(state["story"], json!("keep"));
        Ok(())
    }

    #[tokio::test]
    async fn stale_room_with_malformed_emoji_rain_is_evicted() -> anyhow::Result<()> {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let room = RoomId::parse("uk-200").expect("valid room id");
        store
            .set(
                &state_path(&room),
                json!({ "createdAt": 1_000, "story": "old", "emojiRain": { "emoji": "🎉" } }),
            )
            .await?;
        clock.advance(ROOM_TTL + Duration::from_millis(1));

        let directory = RoomDirectory::new(store.clone());
        let lifecycle = RoomLifecycle::new(directory, clock.clone(), ROOM_TTL);
        let joined = lifecycle
            .join(&room, &ClientId::new("c_ada"), "Ada")
            .await?;
        assert_eq!(joined.status, RoomStatus::Expired);

        let state = store.get(&state_path(&room)).await?.unwrap_or_default();
        assert_eq!(state["createdAt"], json!(clock.now_ms()));
        assert_eq!(state.get("story"), None);
        Ok(())
    }
}
