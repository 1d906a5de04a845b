//! Live room synchronisation.
//!
//! A [`Subscription`] watches the four facets of a joined room (reveal flag,
//! story, emoji rain, participants) and funnels every change into one
//! channel of [`SyncEvent`]s. Ordering holds within a facet only.

mod gate;

pub use gate::EmojiRainGate;

use std::{fmt, sync::Arc};

use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    models::{EmojiRain, Participants},
    room::{directory, RoomId},
    store::{SharedStore, StoreError, Watch, WatchEvent},
};

const EVENT_BUFFER: usize = 64;

/// Independently watched part of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    /// `state/reveal`.
    Reveal,
    /// `state/story`.
    Story,
    /// `state/emojiRain`.
    EmojiRain,
    /// `participants`.
    Participants,
}

impl Facet {
    /// All facets in subscription order.
    pub const ALL: [Facet; 4] = [
        Facet::Reveal,
        Facet::Story,
        Facet::EmojiRain,
        Facet::Participants,
    ];

    /// Store path of this facet within `room`.
    pub fn path(self, room: &RoomId) -> String {
        match self {
            Facet::Reveal => directory::state_field_path(room, "reveal"),
            Facet::Story => directory::state_field_path(room, "story"),
            Facet::EmojiRain => directory::state_field_path(room, "emojiRain"),
            Facet::Participants => directory::participants_path(room),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facet::Reveal => "reveal",
            Facet::Story => "story",
            Facet::EmojiRain => "emojiRain",
            Facet::Participants => "participants",
        };
        f.write_str(name)
    }
}

/// Remote change mapped onto local room state.
#[derive(Debug)]
pub enum SyncEvent {
    /// Reveal flag; absent reads as `false`.
    Reveal(bool),
    /// Story text; absent reads as empty.
    Story(String),
    /// Full participant set.
    Participants(Participants),
    /// A new emoji rain broadcast, already deduplicated.
    EmojiRain(EmojiRain),
    /// A facet stopped receiving updates.
    Disconnected {
        /// Facet whose watch failed.
        facet: Facet,
        /// Failure reported by the store.
        error: StoreError,
    },
}

/// Entry point for watching a joined room.
pub struct LiveSync;

impl LiveSync {
    /// Attach listeners for every facet of `room`.
    ///
    /// Emoji rain broadcasts at or before `watermark` are suppressed. If any
    /// facet cannot be watched, the facets already attached are released
    /// and the error is returned.
    pub async fn subscribe<S: SharedStore>(
        store: &Arc<S>,
        room: &RoomId,
        watermark: i64,
    ) -> Result<Subscription, StoreError> {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let mut subscription = Subscription {
            room: room.clone(),
            events,
            tasks: Vec::with_capacity(Facet::ALL.len()),
        };
        for facet in Facet::ALL {
            let watch = store.watch(&facet.path(room)).await?;
            let sender = sender.clone();
            let task = match facet {
                Facet::Reveal => tokio::spawn(forward(facet, watch, sender, |value| {
                    Some(SyncEvent::Reveal(
                        value.and_then(|v| v.as_bool()).unwrap_or(false),
                    ))
                })),
                Facet::Story => tokio::spawn(forward(facet, watch, sender, |value| {
                    let story = value.as_ref().and_then(Value::as_str).unwrap_or_default();
                    Some(SyncEvent::Story(story.to_string()))
                })),
                Facet::EmojiRain => {
                    let mut gate = EmojiRainGate::new(watermark);
                    tokio::spawn(forward(facet, watch, sender, move |value| {
                        gate.admit_value(value.as_ref()).map(SyncEvent::EmojiRain)
                    }))
                }
                Facet::Participants => tokio::spawn(forward(facet, watch, sender, |value| {
                    Some(SyncEvent::Participants(directory::decode_participants(value)))
                })),
            };
            subscription.tasks.push(task);
        }
        debug!(%room, "subscribed to room updates");
        Ok(subscription)
    }
}

async fn forward<F>(facet: Facet, mut watch: Watch, sender: mpsc::Sender<SyncEvent>, mut map: F)
where
    F: FnMut(Option<Value>) -> Option<SyncEvent> + Send,
{
    while let Some(event) = watch.next().await {
        let event = match event {
            WatchEvent::Value(value) => match map(value) {
                Some(event) => event,
                None => continue,
            },
            WatchEvent::Failed(error) => {
                warn!(%facet, %error, "room watch failed");
                let _ = sender.send(SyncEvent::Disconnected { facet, error }).await;
                return;
            }
        };
        if sender.send(event).await.is_err() {
            return;
        }
    }
    debug!(%facet, "room watch closed");
}

/// Handle on a room's live updates. Dropping it detaches every listener.
pub struct Subscription {
    room: RoomId,
    events: mpsc::Receiver<SyncEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl Subscription {
    /// Wait for the next change; `None` once every listener has stopped.
    pub async fn next(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    /// Detach every listener. Pending events are discarded.
    pub fn cancel(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.events.close();
        while self.events.try_recv().is_ok() {}
        debug!(room = %self.room, "room subscription cancelled");
    }

    /// Whether [`cancel`](Self::cancel) has run.
    pub fn is_cancelled(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
