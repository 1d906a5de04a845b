//! User-facing room operations and the local view they feed.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    clock::Clock,
    error::RoomError,
    identity::{ClientId, IdentityStore},
    models::{display_name, is_card_value, EmojiRain, Participant, Participants, VoteSummary},
    room::{JoinedRoom, RoomDirectory, RoomId, RoomLifecycle, StatePatch},
    store::{SharedStore, StoreError},
    sync::{LiveSync, Subscription, SyncEvent},
};

/// Change of the local view, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Reveal flag changed.
    RevealChanged(bool),
    /// Story text changed.
    StoryChanged(String),
    /// Participant set changed.
    ParticipantsChanged(Participants),
    /// A new emoji rain should be played.
    EmojiRain(String),
    /// Live updates were lost or restored.
    ConnectionChanged(bool),
}

/// Locally known state of the joined room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomView {
    /// Whether votes are visible.
    pub reveal: bool,
    /// Story being estimated.
    pub story: String,
    /// Everyone in the room, including this client.
    pub participants: Participants,
    /// Whether every facet is still receiving updates.
    pub connected: bool,
}

impl RoomView {
    /// Record of `client`, if the room has echoed it back yet.
    pub fn participant(&self, client: &ClientId) -> Option<&Participant> {
        self.participants.get(client.as_str())
    }

    /// Vote counts and, once revealed, numeric statistics.
    pub fn summary(&self) -> VoteSummary {
        VoteSummary::from_participants(&self.participants, self.reveal)
    }

    fn apply(&mut self, event: SyncEvent) -> RoomEvent {
        match event {
            SyncEvent::Reveal(reveal) => {
                self.reveal = reveal;
                RoomEvent::RevealChanged(reveal)
            }
            SyncEvent::Story(story) => {
                self.story = story.clone();
                RoomEvent::StoryChanged(story)
            }
            SyncEvent::Participants(participants) => {
                self.participants = participants.clone();
                RoomEvent::ParticipantsChanged(participants)
            }
            SyncEvent::EmojiRain(rain) => {
                debug!(emoji = %rain.emoji, by = ?rain.by, at = rain.at, "emoji rain");
                RoomEvent::EmojiRain(rain.emoji)
            }
            SyncEvent::Disconnected { facet, error } => {
                error!(%facet, %error, "lost live updates");
                self.connected = false;
                RoomEvent::ConnectionChanged(false)
            }
        }
    }
}

struct Session {
    joined: JoinedRoom,
    subscription: Subscription,
    view: RoomView,
    pending: Option<RoomEvent>,
    closed: bool,
}

/// Owns the current room session and performs every user action.
///
/// All actions are no-ops while no room is joined.
pub struct RoomController<S> {
    directory: RoomDirectory<S>,
    lifecycle: RoomLifecycle<S>,
    identity: IdentityStore,
    clock: Arc<dyn Clock>,
    session: Option<Session>,
}

impl<S: SharedStore> RoomController<S> {
    /// Controller over `store`, evicting rooms idle for longer than `ttl`.
    pub fn new(
        store: Arc<S>,
        identity: IdentityStore,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        let directory = RoomDirectory::new(store);
        let lifecycle = RoomLifecycle::new(directory.clone(), Arc::clone(&clock), ttl);
        Self {
            directory,
            lifecycle,
            identity,
            clock,
            session: None,
        }
    }

    /// Name used on the previous join, empty if none.
    pub fn saved_name(&self) -> String {
        self.identity.saved_name()
    }

    /// Current session summary.
    pub fn joined(&self) -> Option<&JoinedRoom> {
        self.session.as_ref().map(|session| &session.joined)
    }

    /// Local view of the joined room.
    pub fn view(&self) -> Option<&RoomView> {
        self.session.as_ref().map(|session| &session.view)
    }

    /// Whether [`next_event`](Self::next_event) can still yield events.
    pub fn is_listening(&self) -> bool {
        self.session.as_ref().is_some_and(|session| !session.closed)
    }

    /// Join `room` under `name`, leaving any previously joined room first.
    pub async fn join(&mut self, room: &str, name: &str) -> Result<JoinedRoom, RoomError> {
        let room_id = RoomId::parse(room)?;
        let name = display_name(name);
        let client_id = self.identity.client_id().map_err(RoomError::Identity)?;
        self.identity.save_name(&name).map_err(RoomError::Identity)?;

        if self.session.is_some() {
            self.leave().await;
        }

        let joined = self
            .lifecycle
            .join(&room_id, &client_id, &name)
            .await
            .inspect_err(|err| error!(room = %room_id, error = %err, "join failed"))?;

        let subscription = LiveSync::subscribe(self.directory.store(), &room_id, joined.watermark)
            .await
            .map_err(|err| {
                error!(room = %room_id, error = %err, "failed to subscribe to room");
                RoomError::StoreSubscribe(err)
            })?;

        self.session = Some(Session {
            joined: joined.clone(),
            subscription,
            view: RoomView {
                connected: true,
                ..RoomView::default()
            },
            pending: Some(RoomEvent::ConnectionChanged(true)),
            closed: false,
        });
        Ok(joined)
    }

    /// Select a card. Does not count as room activity.
    pub async fn cast_vote(&mut self, value: &str) -> Result<(), RoomError> {
        let Some(session) = self.active("cast_vote") else {
            return Ok(());
        };
        if !is_card_value(value) {
            return Err(RoomError::InvalidVote(value.to_string()));
        }
        let (room, client) = (&session.joined.room_id, &session.joined.client_id);
        self.directory
            .set_vote(room, client, value)
            .await
            .map_err(|err| write_failed("cast_vote", room, err))
    }

    /// Show or hide everyone's votes.
    pub async fn set_reveal(&mut self, reveal: bool) -> Result<(), RoomError> {
        self.update_state("set_reveal", StatePatch::reveal(reveal))
            .await
    }

    /// Flip the reveal flag as currently seen locally.
    pub async fn toggle_reveal(&mut self) -> Result<(), RoomError> {
        let Some(session) = self.active("toggle_reveal") else {
            return Ok(());
        };
        let reveal = !session.view.reveal;
        self.set_reveal(reveal).await
    }

    /// Replace the story text; empty clears it.
    pub async fn set_story(&mut self, text: &str) -> Result<(), RoomError> {
        self.update_state("set_story", StatePatch::story(text)).await
    }

    /// Start a new round: every vote empty, story empty, votes hidden.
    ///
    /// Votes are reset in one multi-path write before the room state is
    /// reset; the two writes are not atomic together.
    pub async fn clear_round(&mut self) -> Result<(), RoomError> {
        let Some(session) = self.active("clear_round") else {
            return Ok(());
        };
        let room = session.joined.room_id.clone();
        let participants = self
            .directory
            .read_participants(&room)
            .await
            .map_err(|err| {
                error!(%room, error = %err, "clear_round could not read participants");
                RoomError::StoreRead(err)
            })?;
        self.directory
            .clear_votes(&room, participants.keys())
            .await
            .map_err(|err| write_failed("clear_round", &room, err))?;
        self.directory
            .update_state(&room, StatePatch::cleared())
            .await
            .map_err(|err| write_failed("clear_round", &room, err))?;

        if let Some(session) = self.session.as_mut() {
            let view = &mut session.view;
            view.story.clear();
            view.reveal = false;
            for participant in view.participants.values_mut() {
                participant.vote.clear();
            }
        }
        info!(%room, "round cleared");
        Ok(())
    }

    /// Broadcast an emoji rain to everyone in the room, this client included.
    pub async fn trigger_emoji_rain(&mut self, emoji: &str) -> Result<(), RoomError> {
        let Some(session) = self.active("trigger_emoji_rain") else {
            return Ok(());
        };
        let room = &session.joined.room_id;
        let rain = EmojiRain {
            emoji: emoji.to_string(),
            at: self.clock.now_ms(),
            by: Some(session.joined.client_id.to_string()),
        };
        self.directory
            .set_emoji_rain(room, &rain)
            .await
            .map_err(|err| write_failed("trigger_emoji_rain", room, err))
    }

    /// Remove this client from the room and stop listening.
    ///
    /// Removal failures are logged and otherwise ignored.
    pub async fn leave(&mut self) {
        let Some(mut session) = self.session.take() else {
            debug!("leave ignored; no room joined");
            return;
        };
        session.subscription.cancel();
        let JoinedRoom {
            room_id, client_id, ..
        } = &session.joined;
        match self.directory.remove_participant(room_id, client_id).await {
            Ok(()) => info!(room = %room_id, client = %client_id, "left room"),
            Err(err) => warn!(room = %room_id, error = %err, "failed to remove participant on leave"),
        }
    }

    /// Drop the session and remove this client in the background.
    ///
    /// Used when the process is going away and cannot wait for the store.
    /// The removal is never awaited and its outcome is only logged.
    pub fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.subscription.cancel();
        let JoinedRoom {
            room_id, client_id, ..
        } = session.joined;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(room = %room_id, "no runtime available for teardown cleanup");
            return;
        };
        let directory = self.directory.clone();
        runtime.spawn(async move {
            if let Err(err) = directory.remove_participant(&room_id, &client_id).await {
                warn!(room = %room_id, error = %err, "teardown cleanup failed");
            }
        });
    }

    /// Wait for the next remote change and apply it to the local view.
    ///
    /// The first event after a join is `ConnectionChanged(true)`. Returns
    /// `None` when no room is joined or the subscription has ended.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        let session = self.session.as_mut()?;
        if let Some(event) = session.pending.take() {
            return Some(event);
        }
        if session.closed {
            return None;
        }
        match session.subscription.next().await {
            Some(event) => Some(session.view.apply(event)),
            None => {
                session.closed = true;
                if session.view.connected {
                    session.view.connected = false;
                    Some(RoomEvent::ConnectionChanged(false))
                } else {
                    None
                }
            }
        }
    }

    fn active(&self, operation: &str) -> Option<&Session> {
        let session = self.session.as_ref();
        if session.is_none() {
            debug!(operation, "ignored; no room joined");
        }
        session
    }

    async fn update_state(&mut self, operation: &str, patch: StatePatch) -> Result<(), RoomError> {
        let Some(session) = self.active(operation) else {
            return Ok(());
        };
        let room = &session.joined.room_id;
        self.directory
            .update_state(room, patch)
            .await
            .map_err(|err| write_failed(operation, room, err))
    }
}

fn write_failed(operation: &str, room: &RoomId, err: StoreError) -> RoomError {
    error!(operation, %room, error = %err, "room write failed");
    RoomError::StoreWrite(err)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        clock::ManualClock,
        models::RoomState,
        room::{RoomStatus, ROOM_TTL},
        store::MemoryStore,
    };

    const START_MS: i64 = 1_700_000_000_000;
    const WAIT: Duration = Duration::from_secs(1);

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new(START_MS));
            let store = Arc::new(MemoryStore::with_clock(clock.clone()));
            Self { store, clock }
        }

        fn controller(&self, client: &str) -> RoomController<MemoryStore> {
            RoomController::new(
                Arc::clone(&self.store),
                IdentityStore::with_client_id(ClientId::new(client)),
                self.clock.clone(),
                ROOM_TTL,
            )
        }

        async fn state(&self, room: &str) -> RoomState {
            let value = self
                .store
                .get(&format!("rooms/{room}/state"))
                .await
                .expect("state readable");
            value
                .map(|v| serde_json::from_value(v).expect("state decodes"))
                .unwrap_or_default()
        }
    }

    /// Apply events until `done` holds for the local view.
    async fn settle<S, F>(controller: &mut RoomController<S>, done: F)
    where
        S: SharedStore,
        F: Fn(&RoomView) -> bool,
    {
        timeout(WAIT, async {
            while !controller.view().is_some_and(&done) {
                if controller.next_event().await.is_none() {
                    break;
                }
            }
        })
        .await
        .expect("view did not settle");
        assert!(controller.view().is_some_and(done));
    }

    #[tokio::test]
    async fn actions_without_room_are_noops() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.cast_vote("5").await?;
        controller.toggle_reveal().await?;
        controller.set_story("Login").await?;
        controller.clear_round().await?;
        controller.trigger_emoji_rain("🎉").await?;
        controller.leave().await;
        controller.teardown();
        assert!(controller.next_event().await.is_none());
        assert_eq!(fixture.store.get("rooms").await.ok().flatten(), None);
        Ok(())
    }

    #[tokio::test]
    async fn join_normalizes_and_registers_participant() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        let joined = controller.join(" sweden-482 ", "  ").await?;

        assert_eq!(joined.room_id.as_str(), "SWEDEN-482");
        assert_eq!(joined.status, RoomStatus::Fresh);
        assert_eq!(joined.name, "Anonymous");
        assert_eq!(controller.saved_name(), "Anonymous");

        let state = fixture.state("SWEDEN-482").await;
        assert_eq!(state.created_at, Some(START_MS));
        assert_eq!(state.updated_at, Some(START_MS));

        settle(&mut controller, |view| view.participants.contains_key("c_ada")).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_room_and_vote_are_rejected() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        assert!(matches!(
            controller.join("a/b", "Ada").await,
            Err(RoomError::InvalidRoomId(_))
        ));

        controller.join("UK-100", "Ada").await?;
        assert!(matches!(
            controller.cast_vote("4").await,
            Err(RoomError::InvalidVote(v)) if v == "4"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn active_room_keeps_created_at() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut ada = fixture.controller("c_ada");
        ada.join("UK-100", "Ada").await?;

        fixture.clock.advance(Duration::from_secs(60 * 60));
        let mut lin = fixture.controller("c_lin");
        let joined = lin.join("UK-100", "Lin").await?;
        assert_eq!(joined.status, RoomStatus::Active);

        let state = fixture.state("UK-100").await;
        assert_eq!(state.created_at, Some(START_MS));
        assert_eq!(state.updated_at, Some(START_MS + 60 * 60 * 1000));
        Ok(())
    }

    #[tokio::test]
    async fn expired_room_is_recreated() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut ada = fixture.controller("c_ada");
        ada.join("UK-100", "Ada").await?;
        ada.set_story("Old story").await?;
        ada.cast_vote("8").await?;
        ada.leave().await;

        fixture.clock.advance(ROOM_TTL + Duration::from_millis(1));
        let mut lin = fixture.controller("c_lin");
        let joined = lin.join("UK-100", "Lin").await?;
        assert_eq!(joined.status, RoomStatus::Expired);

        let state = fixture.state("UK-100").await;
        assert!(state.created_at > Some(START_MS));
        assert_eq!(state.story, "");
        let participants = fixture
            .store
            .get("rooms/UK-100/participants")
            .await
            .map_err(RoomError::StoreRead)?;
        let joined_at = fixture.clock.now_ms();
        assert_eq!(
            participants,
            Some(json!({ "c_lin": { "name": "Lin", "vote": "", "joinedAt": joined_at } }))
        );
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_state_does_not_block_join() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        fixture.store.set_fail_reads(true);
        let mut controller = fixture.controller("c_ada");
        let joined = controller.join("UK-100", "Ada").await?;
        assert_eq!(joined.status, RoomStatus::Fresh);
        Ok(())
    }

    #[tokio::test]
    async fn failed_writes_abort_join() {
        let fixture = Fixture::new();
        fixture.store.set_fail_writes(true);
        let mut controller = fixture.controller("c_ada");
        assert!(matches!(
            controller.join("UK-100", "Ada").await,
            Err(RoomError::StoreWrite(_))
        ));
        assert!(controller.joined().is_none());
    }

    #[tokio::test]
    async fn failed_subscription_surfaces() {
        let fixture = Fixture::new();
        fixture.store.set_fail_watches(true);
        let mut controller = fixture.controller("c_ada");
        assert!(matches!(
            controller.join("UK-100", "Ada").await,
            Err(RoomError::StoreSubscribe(_))
        ));
    }

    #[tokio::test]
    async fn vote_is_reflected_after_echo() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        let before = fixture.state("UK-100").await.updated_at;

        fixture.clock.advance(Duration::from_secs(5));
        controller.cast_vote("8").await?;
        let me = ClientId::new("c_ada");
        settle(&mut controller, |view| {
            view.participant(&me).is_some_and(|p| p.vote == "8")
        })
        .await;
        assert_eq!(fixture.state("UK-100").await.updated_at, before);
        Ok(())
    }

    #[tokio::test]
    async fn failed_vote_write_leaves_view_alone() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        settle(&mut controller, |view| view.participants.contains_key("c_ada")).await;

        fixture.store.set_fail_writes(true);
        assert!(matches!(
            controller.cast_vote("5").await,
            Err(RoomError::StoreWrite(_))
        ));
        let view = controller.view().cloned().unwrap_or_default();
        assert_eq!(view.participants["c_ada"].vote, "");
        Ok(())
    }

    #[tokio::test]
    async fn clear_round_is_idempotent() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        controller.cast_vote("13").await?;
        controller.set_story("Checkout").await?;
        controller.set_reveal(true).await?;
        settle(&mut controller, |view| view.reveal && view.story == "Checkout").await;

        controller.clear_round().await?;
        let once = fixture
            .store
            .get("rooms/UK-100/participants")
            .await
            .map_err(RoomError::StoreRead)?;
        let view = controller.view().cloned().unwrap_or_default();
        assert!(!view.reveal);
        assert!(view.story.is_empty());
        assert!(view.participants.values().all(|p| p.vote.is_empty()));

        controller.clear_round().await?;
        let twice = fixture
            .store
            .get("rooms/UK-100/participants")
            .await
            .map_err(RoomError::StoreRead)?;
        assert_eq!(once, twice);
        let state = fixture.state("UK-100").await;
        assert_eq!((state.story.as_str(), state.reveal), ("", false));
        Ok(())
    }

    #[tokio::test]
    async fn room_level_writes_bump_updated_at() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;

        fixture.clock.advance(Duration::from_secs(1));
        controller.set_reveal(true).await?;
        let state = fixture.state("UK-100").await;
        assert_eq!(state.updated_at, Some(START_MS + 1_000));
        assert_eq!(state.created_at, Some(START_MS));

        fixture.clock.advance(Duration::from_secs(1));
        controller.set_story("Checkout").await?;
        let state = fixture.state("UK-100").await;
        assert_eq!(state.updated_at, Some(START_MS + 2_000));
        assert_eq!(state.created_at, Some(START_MS));

        fixture.clock.advance(Duration::from_secs(1));
        controller.clear_round().await?;
        let state = fixture.state("UK-100").await;
        assert_eq!(state.updated_at, Some(START_MS + 3_000));
        assert_eq!(state.created_at, Some(START_MS));
        Ok(())
    }

    #[tokio::test]
    async fn join_reports_connection_first() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        let first = timeout(WAIT, controller.next_event())
            .await
            .expect("no event after join");
        assert_eq!(first, Some(RoomEvent::ConnectionChanged(true)));
        assert!(controller.view().is_some_and(|view| view.connected));

        let second = timeout(WAIT, controller.next_event())
            .await
            .expect("no event after connection");
        assert_ne!(second, Some(RoomEvent::ConnectionChanged(true)));
        Ok(())
    }

    #[tokio::test]
    async fn toggle_reveal_flips_local_flag() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        controller.toggle_reveal().await?;
        settle(&mut controller, |view| view.reveal).await;
        controller.toggle_reveal().await?;
        settle(&mut controller, |view| !view.reveal).await;
        Ok(())
    }

    #[tokio::test]
    async fn emoji_rain_reaches_sender_once() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        let before = fixture.state("UK-100").await.updated_at;

        fixture.clock.advance(Duration::from_millis(10));
        controller.trigger_emoji_rain("🚀").await?;

        let rain = timeout(WAIT, async {
            loop {
                match controller.next_event().await {
                    Some(RoomEvent::EmojiRain(emoji)) => break Some(emoji),
                    Some(_) => continue,
                    None => break None,
                }
            }
        })
        .await
        .expect("emoji rain not delivered");
        assert_eq!(rain.as_deref(), Some("🚀"));
        let state = fixture.state("UK-100").await;
        assert!(before < state.updated_at);
        assert_eq!(state.updated_at, Some(START_MS + 10));
        assert_eq!(state.created_at, Some(START_MS));
        Ok(())
    }

    #[tokio::test]
    async fn leave_removes_participant_and_listeners() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        assert_eq!(fixture.store.watcher_count(), 4);

        controller.leave().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(controller.joined().is_none());
        assert_eq!(fixture.store.watcher_count(), 0);
        assert_eq!(
            fixture
                .store
                .get("rooms/UK-100/participants/c_ada")
                .await
                .map_err(RoomError::StoreRead)?,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn leave_swallows_store_failures() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        fixture.store.set_fail_writes(true);
        controller.leave().await;
        assert!(controller.joined().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn switching_rooms_leaves_the_previous_one() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        controller.join("UK-200", "Ada").await?;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(fixture.store.watcher_count(), 4);
        let old = fixture
            .store
            .get("rooms/UK-100/participants/c_ada")
            .await
            .map_err(RoomError::StoreRead)?;
        assert_eq!(old, None);
        assert_eq!(
            controller.joined().map(|joined| joined.room_id.as_str()),
            Some("UK-200")
        );
        Ok(())
    }

    #[tokio::test]
    async fn teardown_removes_participant_in_background() -> Result<(), RoomError> {
        let fixture = Fixture::new();
        let mut controller = fixture.controller("c_ada");
        controller.join("UK-100", "Ada").await?;
        controller.teardown();
        assert!(controller.joined().is_none());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let me = fixture
            .store
            .get("rooms/UK-100/participants/c_ada")
            .await
            .map_err(RoomError::StoreRead)?;
        assert_eq!(me, None);
        assert!(fixture.state("UK-100").await.created_at.is_some());
        Ok(())
    }
}
