use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    event_stream::{EventStreamParser, StreamEvent},
    path_segments,
    tree::{normalize, value_at, write_at},
    SharedStore, StoreError, Watch, WatchEvent,
};

/// Firebase Realtime Database accessed through its REST and streaming API.
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl FirebaseStore {
    /// Connect to the database at `database_url`
    /// (e.g. `https://<project>.firebasedatabase.app`).
    pub fn new(database_url: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        let base_url = database_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Unavailable("database url is empty".to_string()));
        }
        let client = Client::builder()
            .user_agent(concat!("planning-poker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.filter(|token| !token.trim().is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/.json", self.base_url)
        } else {
            format!("{}/{}.json", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(path));
        match &self.auth_token {
            Some(token) => builder.query(&[("auth", token)]),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Http { status, body })
    }
}

#[async_trait]
impl SharedStore for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = Self::send(self.request(Method::GET, path)).await?;
        let value: Value = response.json().await?;
        Ok(normalize(value))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        Self::send(self.request(Method::PUT, path).json(&value)).await?;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        Self::send(self.request(Method::PATCH, path).json(&fields)).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        Self::send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    async fn watch(&self, path: &str) -> Result<Watch, StoreError> {
        let builder = self
            .request(Method::GET, path)
            .header(ACCEPT, "text/event-stream");
        let response = Self::send(builder).await?;
        info!(path, "opened change stream");
        let (sender, receiver) = mpsc::unbounded_channel();
        let path = path.to_string();
        let task = tokio::spawn(async move {
            pump_stream(response, sender, path).await;
        });
        Ok(Watch::new(receiver, Some(task)))
    }
}

async fn pump_stream(
    mut response: Response,
    sender: mpsc::UnboundedSender<WatchEvent>,
    path: String,
) {
    let mut parser = EventStreamParser::new();
    let mut mirror = StreamMirror::default();
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                warn!(%path, "change stream closed by server");
                let _ = sender.send(WatchEvent::Failed(StoreError::Stream(
                    "server closed the stream".to_string(),
                )));
                return;
            }
            Err(err) => {
                warn!(%path, error = %err, "change stream failed");
                let _ = sender.send(WatchEvent::Failed(err.into()));
                return;
            }
        };

        for event in parser.feed(&chunk) {
            match mirror.apply(&event) {
                Ok(Some(value)) => {
                    if sender.send(WatchEvent::Value(value)).is_err() {
                        debug!(%path, "change stream receiver dropped");
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%path, error = %err, "change stream aborted");
                    let _ = sender.send(WatchEvent::Failed(err));
                    return;
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    #[serde(default)]
    data: Value,
}

/// Local copy of a watched subtree rebuilt from `put`/`patch` events.
#[derive(Debug)]
struct StreamMirror {
    root: Value,
    delivered: Option<Option<Value>>,
}

impl Default for StreamMirror {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
            delivered: None,
        }
    }
}

impl StreamMirror {
    /// Apply one event; returns the new value when it changed.
    fn apply(&mut self, event: &StreamEvent) -> Result<Option<Option<Value>>, StoreError> {
        match event.event.as_str() {
            "put" => {
                let payload: StreamPayload = serde_json::from_str(&event.data)?;
                write_at(&mut self.root, &path_segments(&payload.path), normalize(payload.data));
            }
            "patch" => {
                let payload: StreamPayload = serde_json::from_str(&event.data)?;
                let base = path_segments(&payload.path);
                if let Value::Object(fields) = payload.data {
                    for (key, value) in fields {
                        let mut segments = base.clone();
                        segments.extend(path_segments(&key));
                        write_at(&mut self.root, &segments, normalize(value));
                    }
                }
            }
            "cancel" => {
                return Err(StoreError::Stream(format!(
                    "cancelled by server: {}",
                    event.data
                )))
            }
            "auth_revoked" => return Err(StoreError::Stream("auth token revoked".to_string())),
            _ => return Ok(None),
        }

        let current = value_at(&self.root, &[]).cloned();
        if self.delivered.as_ref() == Some(&current) {
            return Ok(None);
        }
        self.delivered = Some(current.clone());
        Ok(Some(current))
    }
}
