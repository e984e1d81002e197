//! Test helpers for integration tests
//!
//! Provides an in-memory `MessageStore`, a REST test server exposing it over
//! HTTP, and view/config builders.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use convo_common::{try_init_tracing_with_config, RemoteConfig, SyncConfig, TracingConfig};
use convo_core::{
    Attachment, ConversationId, ConversationKind, DeliveryStatus, DomainError, Message,
    MessageQuery, MessageReceipts, MessageStore, NewMessage, Participant, Receipt, Snowflake,
    StoreResult, UploadFile,
};
use convo_sync::{ConversationSnapshot, ConversationView, SyncContextBuilder};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::fixtures::{at, ME};

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory `MessageStore` with scriptable behaviour.
///
/// Unscripted fetches honour the query bounds: `since` queries return the
/// oldest matches first, all others the newest matches first.
pub struct FakeStore {
    messages: DashMap<ConversationId, Vec<Message>>,
    scripted: DashMap<ConversationId, VecDeque<Vec<Message>>>,
    participants: DashMap<ConversationId, Vec<Participant>>,
    held: DashMap<ConversationId, Arc<Semaphore>>,
    queries: Mutex<Vec<(ConversationId, MessageQuery)>>,
    failing_fetches: AtomicU32,
    fail_sends: AtomicBool,
    fail_mark_read: AtomicBool,
    fail_receipts: AtomicBool,
    sends: AtomicU32,
    mark_reads: AtomicU32,
    receipt_fetches: AtomicU32,
    participant_fetches: AtomicU32,
    send_clock: AtomicI64,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: DashMap::new(),
            scripted: DashMap::new(),
            participants: DashMap::new(),
            held: DashMap::new(),
            queries: Mutex::new(Vec::new()),
            failing_fetches: AtomicU32::new(0),
            fail_sends: AtomicBool::new(false),
            fail_mark_read: AtomicBool::new(false),
            fail_receipts: AtomicBool::new(false),
            sends: AtomicU32::new(0),
            mark_reads: AtomicU32::new(0),
            receipt_fetches: AtomicU32::new(0),
            participant_fetches: AtomicU32::new(0),
            send_clock: AtomicI64::new(10_000),
        })
    }

    /// Store with `messages` already present
    pub fn with_messages(messages: Vec<Message>) -> Arc<Self> {
        let store = Self::new();
        for message in messages {
            store.push(message);
        }
        store
    }

    /// Add a message as if another client had created it
    pub fn push(&self, message: Message) {
        self.messages
            .entry(message.conversation_id)
            .or_default()
            .push(message);
    }

    pub fn stored(&self, conversation: ConversationId) -> Vec<Message> {
        self.messages
            .get(&conversation)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    /// Replace the receipts of a stored message, as if recipients had
    /// acknowledged it since it was fetched
    pub fn set_receipts(
        &self,
        conversation: ConversationId,
        message_id: i64,
        receipts: &[(i64, DeliveryStatus)],
    ) {
        if let Some(mut messages) = self.messages.get_mut(&conversation) {
            for message in messages
                .iter_mut()
                .filter(|m| m.id == Snowflake::new(message_id))
            {
                message.receipts = receipts
                    .iter()
                    .map(|(user, status)| Receipt::new(Snowflake::new(*user), *status))
                    .collect();
            }
        }
    }

    /// Make the next fetch for `conversation` return exactly `batch`
    pub fn script_fetch(&self, conversation: ConversationId, batch: Vec<Message>) {
        self.scripted.entry(conversation).or_default().push_back(batch);
    }

    /// Fail the next `count` fetches of any conversation
    pub fn fail_fetches(&self, count: u32) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mark_read(&self, fail: bool) {
        self.fail_mark_read.store(fail, Ordering::SeqCst);
    }

    pub fn fail_receipts(&self, fail: bool) {
        self.fail_receipts.store(fail, Ordering::SeqCst);
    }

    /// Park fetches for `conversation` until [`release`](Self::release)
    pub fn hold(&self, conversation: ConversationId) {
        self.held.insert(conversation, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, conversation: ConversationId) {
        if let Some((_, gate)) = self.held.remove(&conversation) {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn set_participants(&self, conversation: ConversationId, participants: Vec<Participant>) {
        self.participants.insert(conversation, participants);
    }

    /// Timestamp the next confirmed send gets
    pub fn set_send_clock(&self, t: i64) {
        self.send_clock.store(t, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.queries.lock().len()
    }

    pub fn fetch_count_for(&self, conversation: ConversationId) -> usize {
        self.queries
            .lock()
            .iter()
            .filter(|(c, _)| *c == conversation)
            .count()
    }

    pub fn last_query(&self, conversation: ConversationId) -> Option<MessageQuery> {
        self.queries
            .lock()
            .iter()
            .rev()
            .find(|(c, _)| *c == conversation)
            .map(|(_, q)| *q)
    }

    pub fn send_count(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn mark_read_count(&self) -> u32 {
        self.mark_reads.load(Ordering::SeqCst)
    }

    pub fn receipt_fetch_count(&self) -> u32 {
        self.receipt_fetches.load(Ordering::SeqCst)
    }

    pub fn participant_fetch_count(&self) -> u32 {
        self.participant_fetches.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn query(&self, conversation: ConversationId, query: MessageQuery) -> Vec<Message> {
        let mut found: Vec<Message> = self
            .stored(conversation)
            .into_iter()
            .filter(|m| query.since.map_or(true, |t| m.created_at > t))
            .filter(|m| query.until.map_or(true, |t| m.created_at < t))
            .collect();
        found.sort_by_key(Message::sort_key);
        if query.since.is_none() {
            found.reverse();
        }
        found.truncate(query.limit as usize);
        found
    }
}

#[async_trait]
impl MessageStore for FakeStore {
    async fn fetch_messages(
        &self,
        conversation: ConversationId,
        query: MessageQuery,
    ) -> StoreResult<Vec<Message>> {
        self.queries.lock().push((conversation, query));

        let gate = self.held.get(&conversation).map(|g| Arc::clone(g.value()));
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }

        if self.take_failure() {
            return Err(DomainError::StoreUnavailable("scripted failure".to_string()));
        }
        let scripted = self
            .scripted
            .get_mut(&conversation)
            .and_then(|mut queue| queue.pop_front());
        match scripted {
            Some(batch) => Ok(batch),
            None => Ok(self.query(conversation, query)),
        }
    }

    async fn create_message(
        &self,
        conversation: ConversationId,
        message: NewMessage,
    ) -> StoreResult<Message> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("scripted failure".to_string()));
        }

        let t = self.send_clock.fetch_add(1, Ordering::SeqCst);
        let attachments = message
            .files
            .iter()
            .enumerate()
            .map(|(i, file)| uploaded(conversation, t * 100 + i as i64, file))
            .collect();
        let created = Message {
            id: Snowflake::new(t),
            conversation_id: conversation,
            author_id: message.author_id,
            body: message.body,
            attachments,
            created_at: at(t),
            receipts: Vec::new(),
        };
        self.push(created.clone());
        Ok(created)
    }

    async fn fetch_receipts(
        &self,
        conversation: ConversationId,
        message_ids: &[Snowflake],
    ) -> StoreResult<Vec<MessageReceipts>> {
        self.receipt_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_receipts.load(Ordering::SeqCst) {
            return Err(DomainError::StoreTimeout);
        }
        Ok(self
            .stored(conversation)
            .into_iter()
            .filter(|m| message_ids.contains(&m.id))
            .map(|m| MessageReceipts::new(m.id, m.receipts))
            .collect())
    }

    async fn mark_read(&self, _conversation: ConversationId, _user_id: Snowflake) -> StoreResult<()> {
        self.mark_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(DomainError::StoreTimeout);
        }
        Ok(())
    }

    async fn fetch_participants(
        &self,
        conversation: ConversationId,
    ) -> StoreResult<Vec<Participant>> {
        self.participant_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .participants
            .get(&conversation)
            .map(|p| p.value().clone())
            .unwrap_or_default())
    }
}

fn uploaded(conversation: ConversationId, id: i64, file: &UploadFile) -> Attachment {
    Attachment::new(
        Snowflake::new(id),
        file.filename.clone(),
        file.content_type.clone(),
        file.size(),
        format!("uploads/{conversation}/{}", file.filename),
    )
}

// ============================================================================
// Views and configuration
// ============================================================================

/// Defaults: 5 s poll interval, pages of 20
pub fn test_config() -> SyncConfig {
    SyncConfig::default()
}

/// Configuration with explicit initial and backward page sizes
pub fn config_with_pages(initial: u32, page: u32) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.pagination.initial_page_size = initial;
    config.pagination.page_size = page;
    config
}

/// A view for the signed-in user over `store`
pub fn view_over(store: &Arc<FakeStore>, config: SyncConfig) -> ConversationView {
    let store: Arc<dyn MessageStore> = store.clone();
    let ctx = SyncContextBuilder::new()
        .store(store)
        .config(config)
        .current_user(Snowflake::new(ME))
        .build()
        .expect("complete sync context");
    ConversationView::new(ctx)
}

/// Let detached tasks run
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Enable log output for a test run; repeated calls are fine
pub fn init_test_tracing() {
    let _ = try_init_tracing_with_config(TracingConfig::development());
}

/// Message timestamps of a snapshot, in display order
pub fn times(snapshot: &ConversationSnapshot) -> Vec<i64> {
    snapshot
        .messages
        .iter()
        .map(|m| m.message.created_at.timestamp())
        .collect()
}

// ============================================================================
// REST test server
// ============================================================================

/// REST backend serving a [`FakeStore`] the way the remote API does
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<FakeStore>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral port
    pub async fn start(store: Arc<FakeStore>) -> Result<Self> {
        let app = Router::new()
            .route(
                "/:kind/:owner/messages",
                get(list_messages).post(create_message),
            )
            .route("/:kind/:owner/read", post(mark_read))
            .route("/:kind/:owner/receipts", get(list_receipts))
            .route("/:kind/:owner/participants", get(list_participants))
            .with_state(Arc::clone(&store));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            store,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url(),
            timeout_ms: 5_000,
            api_token: None,
        }
    }
}

type Shared = State<Arc<FakeStore>>;

fn conversation_of(kind: &str, owner: i64) -> Result<ConversationId, StatusCode> {
    ConversationKind::from_path_segment(kind)
        .map(|kind| ConversationId::new(kind, Snowflake::new(owner)))
        .ok_or(StatusCode::NOT_FOUND)
}

fn parse_time(raw: Option<&String>) -> Result<Option<DateTime<Utc>>, StatusCode> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| StatusCode::BAD_REQUEST)
    })
    .transpose()
}

async fn list_messages(
    State(store): Shared,
    Path((kind, owner)): Path<(String, i64)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let conversation = conversation_of(&kind, owner)?;
    let query = MessageQuery {
        since: parse_time(params.get("since"))?,
        until: parse_time(params.get("until"))?,
        limit: params
            .get("limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(20),
    };

    let messages = store
        .fetch_messages(conversation, query)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(json!({ "data": messages.iter().map(wire_message).collect::<Vec<_>>() })))
}

async fn create_message(
    State(store): Shared,
    Path((kind, owner)): Path<(String, i64)>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    let conversation = conversation_of(&kind, owner)?;
    let mut author_id = None;
    let mut body = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

        match name.as_str() {
            "author_id" => {
                let raw = String::from_utf8_lossy(&data);
                author_id = Some(Snowflake::parse(&raw).map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            "body" => body = Some(String::from_utf8_lossy(&data).into_owned()),
            "files[]" => files.push(UploadFile {
                filename,
                content_type,
                data: data.to_vec(),
            }),
            _ => {}
        }
    }

    let message = NewMessage {
        author_id: author_id.ok_or(StatusCode::BAD_REQUEST)?,
        body,
        files,
    };
    let created = store
        .create_message(conversation, message)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(json!({ "data": wire_message(&created) })))
}

async fn mark_read(
    State(store): Shared,
    Path((kind, owner)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> StatusCode {
    let Ok(conversation) = conversation_of(&kind, owner) else {
        return StatusCode::NOT_FOUND;
    };
    let user = body
        .get("user_id")
        .and_then(Value::as_str)
        .and_then(|raw| Snowflake::parse(raw).ok());
    let Some(user) = user else {
        return StatusCode::BAD_REQUEST;
    };

    match store.mark_read(conversation, user).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn list_receipts(
    State(store): Shared,
    Path((kind, owner)): Path<(String, i64)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let conversation = conversation_of(&kind, owner)?;
    let ids = params
        .get("ids")
        .map(String::as_str)
        .unwrap_or_default()
        .split(',')
        .filter(|raw| !raw.is_empty())
        .map(Snowflake::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let refreshed = store
        .fetch_receipts(conversation, &ids)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    let acknowledged_at = Utc::now().to_rfc3339();
    let data: Vec<Value> = refreshed
        .iter()
        .map(|entry| {
            json!({
                "message_id": entry.message_id.to_string(),
                "receipts": wire_receipts(&entry.receipts, &acknowledged_at),
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn list_participants(
    State(store): Shared,
    Path((kind, owner)): Path<(String, i64)>,
) -> Result<Json<Value>, StatusCode> {
    let conversation = conversation_of(&kind, owner)?;
    let participants = store
        .fetch_participants(conversation)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    let data: Vec<Value> = participants
        .iter()
        .map(|p| {
            json!({
                "user_id": p.user_id.to_string(),
                "display_name": p.display_name,
                "online": p.online,
                "last_seen_at": p.last_seen.map(|t| t.to_rfc3339()),
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

/// Receipts as acknowledgement timestamps
fn wire_receipts(receipts: &[Receipt], acknowledged_at: &str) -> Vec<Value> {
    receipts
        .iter()
        .map(|r| {
            let delivered = r.status >= DeliveryStatus::Delivered;
            let read = r.status >= DeliveryStatus::Read;
            json!({
                "user_id": r.user_id.to_string(),
                "delivered_at": delivered.then_some(acknowledged_at),
                "read_at": read.then_some(acknowledged_at),
            })
        })
        .collect()
}

/// Message in the remote API's JSON shape
fn wire_message(message: &Message) -> Value {
    let receipts = wire_receipts(&message.receipts, &message.created_at.to_rfc3339());
    let attachments: Vec<Value> = message
        .attachments
        .iter()
        .map(|a| {
            json!({
                "id": a.id.to_string(),
                "filename": a.filename,
                "content_type": a.content_type,
                "size": a.size,
                "path": format!("/{}", a.path),
            })
        })
        .collect();

    json!({
        "id": message.id.to_string(),
        "author_id": message.author_id.to_string(),
        "body": message.body,
        "created_at": message.created_at.to_rfc3339(),
        "attachments": attachments,
        "receipts": receipts,
    })
}
