use corpo_core::chat::{
    ChatSession, ChatState, FILE_FIELD, FILE_NOTE_FIELD, FILE_UPLOAD_PREFIX, FileAttachment,
    Message, MessageStatus, MessageUpdate, SendContentBody, SendFileMessageRequest,
    SendMessageRequest, SendMessageResponse,
};
use corpo_core::endpoints::chat as endpoints;
use corpo_core::error::{CorpoError, Result};
use corpo_core::storage::{CHAT_STORAGE_KEY, KeyValueStore, PersistedBlob};
use corpo_core::transport::{
    ApiRequest, ApiResponse, FilePart, HttpTransport, MultipartForm, TransportError,
};
use corpo_core::validation;
use corpo_interaction::mime::content_type_for;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const LOAD_SESSIONS_FAILED: &str = "Failed to load chat sessions";
const CREATE_SESSION_FAILED: &str = "Failed to create chat session";
const LOAD_MESSAGES_FAILED: &str = "Failed to load messages";
const SEND_MESSAGE_FAILED: &str = "Failed to send message";
const SEND_FILE_FAILED: &str = "Failed to send file message";
const CLEAR_SESSION_FAILED: &str = "Failed to clear chat session";

/// What was sent for a user message, kept until the backend confirms it so a
/// failed send can be repeated.
#[derive(Debug, Clone)]
enum PendingPayload {
    Text(String),
    File {
        file: FileAttachment,
        note: Option<String>,
    },
}

impl PendingPayload {
    fn to_request(&self) -> std::result::Result<ApiRequest, TransportError> {
        match self {
            PendingPayload::Text(content) => {
                ApiRequest::post(endpoints::SEND).json(&SendContentBody { content })
            }
            PendingPayload::File { file, note } => {
                let mut form = MultipartForm::new().file(
                    FILE_FIELD,
                    FilePart {
                        file_name: file.file_name.clone(),
                        content_type: content_type_for(&file.file_name),
                        bytes: file.bytes.clone(),
                    },
                );
                if let Some(note) = note {
                    form = form.text(FILE_NOTE_FIELD, note.clone());
                }
                Ok(ApiRequest::post(endpoints::SEND_FILE).multipart(form))
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            PendingPayload::Text(_) => SEND_MESSAGE_FAILED,
            PendingPayload::File { .. } => SEND_FILE_FAILED,
        }
    }
}

/// Owns the current conversation and keeps it persisted.
///
/// User messages are shown optimistically with a client-generated id and
/// reconciled by that id once the backend answers, so concurrent sends stay
/// individually trackable. The whole state is written to storage after
/// every mutation.
pub struct ChatSessionStore {
    state: RwLock<ChatState>,
    blob: PersistedBlob<ChatState>,
    transport: Arc<dyn HttpTransport>,
    pending: Mutex<HashMap<String, PendingPayload>>,
}

impl ChatSessionStore {
    /// Creates the store, restoring the persisted conversation.
    ///
    /// An unreadable stored state is logged and replaced by an empty one.
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        let blob: PersistedBlob<ChatState> = PersistedBlob::new(store, CHAT_STORAGE_KEY);
        let state = blob
            .load_or_else(|err| {
                tracing::warn!(key = CHAT_STORAGE_KEY, error = %err, "discarding stored chat state");
            })
            .into_restored();
        Self {
            state: RwLock::new(state),
            blob,
            transport,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }

    pub async fn current_session(&self) -> Option<ChatSession> {
        self.state.read().await.current_session.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.to_vec()
    }

    fn persist(&self, state: &ChatState) {
        if let Err(err) = self.blob.save(state) {
            tracing::warn!(key = CHAT_STORAGE_KEY, error = %err, "failed to persist chat state");
        }
    }

    async fn mutate<R>(&self, apply: impl FnOnce(&mut ChatState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = apply(&mut *state);
        self.persist(&state);
        result
    }

    async fn begin_loading(&self) {
        self.mutate(|state| {
            state.is_loading = true;
            state.error = None;
        })
        .await;
    }

    async fn fail_loading(&self, message: &str, err: &TransportError) {
        tracing::warn!(error = %err, "{}", message);
        self.mutate(|state| {
            state.is_loading = false;
            state.error = Some(message.to_string());
        })
        .await;
    }

    /// Fetches the backend's active session, which may be none.
    pub async fn get_chat_sessions(&self) -> Result<Option<ChatSession>> {
        self.begin_loading().await;
        let result = self
            .transport
            .execute(ApiRequest::get(endpoints::SESSIONS))
            .await
            .and_then(|response| response.json::<Option<ChatSession>>());

        match result {
            Ok(session) => {
                self.mutate(|state| {
                    state.current_session = session.clone();
                    state.is_loading = false;
                })
                .await;
                Ok(session)
            }
            Err(err) => {
                self.fail_loading(LOAD_SESSIONS_FAILED, &err).await;
                Err(err.into())
            }
        }
    }

    /// Starts a new session on the backend, replacing the current one and
    /// emptying the message list.
    pub async fn create_chat_session(&self) -> Result<ChatSession> {
        self.begin_loading().await;
        let result = self
            .transport
            .execute(ApiRequest::post(endpoints::SESSIONS))
            .await
            .and_then(|response| response.json::<ChatSession>());

        match result {
            Ok(session) => {
                self.pending.lock().await.clear();
                self.mutate(|state| {
                    state.current_session = Some(session.clone());
                    state.messages.replace(Vec::new());
                    state.is_loading = false;
                })
                .await;
                tracing::info!(session_id = %session.id, "created chat session");
                Ok(session)
            }
            Err(err) => {
                self.fail_loading(CREATE_SESSION_FAILED, &err).await;
                Err(err.into())
            }
        }
    }

    /// Resumes the active session with its history, or creates one.
    pub async fn ensure_session(&self) -> Result<ChatSession> {
        match self.get_chat_sessions().await? {
            Some(session) => {
                self.get_chat_messages(&session.id).await?;
                Ok(session)
            }
            None => self.create_chat_session().await,
        }
    }

    /// Replaces the message list with the session's history.
    pub async fn get_chat_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        self.begin_loading().await;
        let result = self
            .transport
            .execute(ApiRequest::get(endpoints::MESSAGES).query("sessionId", session_id))
            .await
            .and_then(|response| response.json::<Vec<Message>>());

        match result {
            Ok(messages) => {
                self.pending
                    .lock()
                    .await
                    .retain(|id, _| messages.iter().any(|message| &message.id == id));
                self.mutate(|state| {
                    state.messages.replace(messages.clone());
                    state.is_loading = false;
                })
                .await;
                Ok(messages)
            }
            Err(err) => {
                self.fail_loading(LOAD_MESSAGES_FAILED, &err).await;
                Err(err.into())
            }
        }
    }

    /// Sends a text message.
    ///
    /// # Returns
    ///
    /// The assistant's reply, which has been appended to the log.
    ///
    /// # Errors
    ///
    /// A blank message is a validation error and nothing is added. A failed
    /// send leaves the user message in the log marked `failed`.
    pub async fn send_message(&self, request: SendMessageRequest) -> Result<Message> {
        validation::require("message", &request.message)?;
        let message = Message::pending_user(&request.session_id, &request.message);
        self.submit(message, PendingPayload::Text(request.message))
            .await
    }

    /// Sends a file, with an optional note, as a user message.
    pub async fn send_file_message(&self, request: SendFileMessageRequest) -> Result<Message> {
        validation::require("file", &request.file.file_name)?;
        let message = Message::pending_user(&request.session_id, request.display_content());
        let note = request.note().map(str::to_string);
        self.submit(
            message,
            PendingPayload::File {
                file: request.file,
                note,
            },
        )
        .await
    }

    async fn submit(&self, message: Message, payload: PendingPayload) -> Result<Message> {
        let id = message.id.clone();
        self.pending.lock().await.insert(id.clone(), payload.clone());
        self.mutate(|state| {
            state.messages.push(message);
            state.is_typing = true;
            state.error = None;
        })
        .await;
        self.deliver(&id, &payload).await
    }

    /// Sends the payload of the user message `id` and reconciles the log
    /// with the outcome.
    async fn deliver(&self, id: &str, payload: &PendingPayload) -> Result<Message> {
        let result = match payload.to_request() {
            Ok(request) => self.transport.execute(request).await,
            Err(err) => Err(err),
        }
        .and_then(|response: ApiResponse| response.json::<SendMessageResponse>());

        match result {
            Ok(response) => {
                let reply = response.message.into_assistant_message();
                self.pending.lock().await.remove(id);
                self.mutate(|state| {
                    state.messages.set_status(id, MessageStatus::Sent);
                    state.messages.push(reply.clone());
                    state.is_typing = false;
                })
                .await;
                tracing::debug!(message_id = id, reply_id = %reply.id, "message delivered");
                Ok(reply)
            }
            Err(err) => {
                let failure = payload.failure_message();
                tracing::warn!(message_id = id, error = %err, "{}", failure);
                self.mutate(|state| {
                    state.messages.set_status(id, MessageStatus::Failed);
                    state.is_typing = false;
                    state.error = Some(failure.to_string());
                })
                .await;
                Err(err.into())
            }
        }
    }

    /// Appends (or replaces by id) a message locally.
    pub async fn add_message(&self, message: Message) {
        self.mutate(|state| {
            state.messages.push(message);
        })
        .await;
    }

    pub async fn update_message(&self, id: &str, update: MessageUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.messages.update(id, update) {
            return Err(CorpoError::MessageNotFound(id.to_string()));
        }
        self.persist(&state);
        Ok(())
    }

    pub async fn delete_message(&self, id: &str) -> Result<Message> {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state
                .messages
                .remove(id)
                .ok_or_else(|| CorpoError::MessageNotFound(id.to_string()))?;
            self.persist(&state);
            removed
        };
        self.pending.lock().await.remove(id);
        Ok(removed)
    }

    /// Deletes the backend session and resets the local conversation. No new
    /// session is created.
    pub async fn clear_session(&self) -> Result<()> {
        match self
            .transport
            .execute(ApiRequest::delete(endpoints::SESSIONS))
            .await
        {
            Ok(_) => {
                self.pending.lock().await.clear();
                self.mutate(|state| *state = ChatState::default()).await;
                tracing::info!("cleared chat session");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "{}", CLEAR_SESSION_FAILED);
                self.mutate(|state| state.error = Some(CLEAR_SESSION_FAILED.to_string()))
                    .await;
                Err(err.into())
            }
        }
    }

    /// Re-sends a failed user message.
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: the message is not a failed user message; nothing happens
    /// - `Ok(Some(reply))`: the re-send succeeded
    ///
    /// # Errors
    ///
    /// `CorpoError::RetryUnavailable` for a file message whose attachment is
    /// no longer held (the message stays `failed`), or the send error.
    pub async fn retry_message(&self, id: &str) -> Result<Option<Message>> {
        let stored = self.pending.lock().await.get(id).cloned();

        let payload = {
            let mut state = self.state.write().await;
            let content = match state.messages.get(id) {
                Some(message) if message.is_user() && message.is_failed() => {
                    message.content.clone()
                }
                _ => return Ok(None),
            };
            let payload = match stored {
                Some(payload) => payload,
                None if content.starts_with(FILE_UPLOAD_PREFIX) => {
                    return Err(CorpoError::RetryUnavailable(id.to_string()));
                }
                None => PendingPayload::Text(content),
            };
            state.messages.set_status(id, MessageStatus::Sending);
            state.is_typing = true;
            state.error = None;
            self.persist(&state);
            payload
        };

        self.pending
            .lock()
            .await
            .insert(id.to_string(), payload.clone());
        self.deliver(id, &payload).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GatedTransport, MockTransport};
    use corpo_core::chat::MessageRole;
    use corpo_core::storage::MemoryKeyValueStore;
    use corpo_core::transport::{Method, RequestBody};
    use serde_json::{Value, json};

    struct Fixture {
        transport: Arc<MockTransport>,
        store: Arc<MemoryKeyValueStore>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transport: Arc::new(MockTransport::new()),
                store: Arc::new(MemoryKeyValueStore::new()),
            }
        }

        fn chat(&self) -> ChatSessionStore {
            ChatSessionStore::new(self.transport.clone(), self.store.clone())
        }

        fn stored_state(&self) -> ChatState {
            let raw = self.store.get(CHAT_STORAGE_KEY).unwrap().unwrap();
            serde_json::from_str(&raw).unwrap()
        }
    }

    fn reply(id: &str, content: Value) -> Value {
        json!({
            "message": {
                "id": id,
                "sessionId": "s1",
                "content": content,
                "timestamp": "2025-01-01T00:00:01Z"
            },
            "response": "ok"
        })
    }

    fn text(message: &str) -> SendMessageRequest {
        SendMessageRequest::new("s1", message)
    }

    fn csv_upload(note: Option<&str>) -> SendFileMessageRequest {
        SendFileMessageRequest {
            session_id: "s1".to_string(),
            file: FileAttachment::new("sales.csv", b"region,total\nwest,10\n".to_vec()),
            message: note.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_user_message_is_shown_and_persisted_before_reply() {
        let fixture = Fixture::new();
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a1", json!("Hi there")));
        let gate = Arc::new(GatedTransport::new(
            fixture.transport.clone(),
            Method::Post,
            endpoints::SEND,
        ));
        let chat = ChatSessionStore::new(gate.clone(), fixture.store.clone());

        let (sent, ()) = tokio::join!(chat.send_message(text("hello")), async {
            gate.arrived().await;

            let state = chat.snapshot().await;
            assert_eq!(state.messages.len(), 1);
            let message = state.messages.last().unwrap();
            assert_eq!(message.role, MessageRole::User);
            assert_eq!(message.content, "hello");
            assert_eq!(message.status, Some(MessageStatus::Sending));
            assert!(state.is_typing);
            assert_eq!(state.error, None);
            assert_eq!(fixture.stored_state(), state);

            gate.release();
        });

        sent.unwrap();
        let state = chat.snapshot().await;
        assert_eq!(state.messages.len(), 2);
        assert!(!state.is_typing);
    }

    #[tokio::test]
    async fn test_history_load_drops_payloads_of_replaced_messages() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND_FILE, 500, json!({}));
        fixture.transport.ok(
            Method::Get,
            endpoints::MESSAGES,
            json!([{
                "id": "m1",
                "sessionId": "s1",
                "content": "earlier",
                "role": "user",
                "timestamp": "2025-01-01T00:00:00Z"
            }]),
        );
        let chat = fixture.chat();

        assert!(chat.send_file_message(csv_upload(None)).await.is_err());
        assert_eq!(chat.pending.lock().await.len(), 1);

        chat.get_chat_messages("s1").await.unwrap();

        assert!(chat.pending.lock().await.is_empty());
        let ids: Vec<String> = chat.messages().await.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["m1".to_string()]);
    }

    #[tokio::test]
    async fn test_send_success_appends_user_then_assistant() {
        let fixture = Fixture::new();
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a1", json!("Hi there")));
        let chat = fixture.chat();

        let assistant = chat.send_message(text("hello")).await.unwrap();

        let messages = chat.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[0].status, Some(MessageStatus::Sent));
        assert_eq!(messages[1], assistant);
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert_eq!(assistant.status, None);

        let state = chat.snapshot().await;
        assert!(!state.is_typing);
        assert_eq!(state.error, None);
        assert_eq!(fixture.stored_state(), state);

        let sent = &fixture.transport.requests()[0];
        assert_eq!(sent.body, RequestBody::Json(json!({"content": "hello"})));
    }

    #[tokio::test]
    async fn test_send_failure_marks_message_failed() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND, 502, json!({}));
        let chat = fixture.chat();

        assert!(chat.send_message(text("hello")).await.is_err());

        let state = chat.snapshot().await;
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages.last().unwrap().is_failed());
        assert!(!state.is_typing);
        assert_eq!(state.error.as_deref(), Some("Failed to send message"));
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_a_failed_send() {
        let fixture = Fixture::new();
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, json!({"unexpected": true}));
        let chat = fixture.chat();

        assert!(chat.send_message(text("hello")).await.is_err());
        assert!(chat.messages().await[0].is_failed());
    }

    #[tokio::test]
    async fn test_blank_message_is_never_sent() {
        let fixture = Fixture::new();
        let chat = fixture.chat();

        let err = chat.send_message(text("   ")).await.unwrap_err();

        assert!(err.is_validation());
        assert!(chat.messages().await.is_empty());
        assert!(fixture.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_file_with_note() {
        let fixture = Fixture::new();
        fixture.transport.ok(
            Method::Post,
            endpoints::SEND_FILE,
            reply("a1", json!({"summary": "Sales are up"})),
        );
        let chat = fixture.chat();

        let assistant = chat
            .send_file_message(csv_upload(Some("summarize")))
            .await
            .unwrap();

        let messages = chat.messages().await;
        assert_eq!(messages[0].content, "File uploaded: sales.csv - summarize");
        assert_eq!(assistant.content, r#"{"summary":"Sales are up"}"#);

        let RequestBody::Multipart(form) = &fixture.transport.requests()[0].body else {
            panic!("expected a multipart body");
        };
        assert_eq!(form.text_field("request"), Some("summarize"));
        let (field, part) = &form.file_fields[0];
        assert_eq!(field, "file");
        assert_eq!(part.file_name, "sales.csv");
        assert_eq!(part.content_type, "text/csv");
    }

    #[tokio::test]
    async fn test_send_file_without_note() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND_FILE, 413, json!({}));
        let chat = fixture.chat();

        assert!(chat.send_file_message(csv_upload(None)).await.is_err());

        let state = chat.snapshot().await;
        assert_eq!(
            state.messages.last().unwrap().content,
            "File uploaded: sales.csv"
        );
        assert_eq!(state.error.as_deref(), Some("Failed to send file message"));
        let RequestBody::Multipart(form) = &fixture.transport.requests()[0].body else {
            panic!("expected a multipart body");
        };
        assert!(form.text_fields.is_empty());
    }

    #[tokio::test]
    async fn test_retry_is_noop_unless_failed_user_message() {
        let fixture = Fixture::new();
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a1", json!("Hi")));
        let chat = fixture.chat();
        let assistant = chat.send_message(text("hello")).await.unwrap();
        let user_id = chat.messages().await[0].id.clone();

        assert_eq!(chat.retry_message(&user_id).await.unwrap(), None);
        assert_eq!(chat.retry_message(&assistant.id).await.unwrap(), None);
        assert_eq!(chat.retry_message("missing").await.unwrap(), None);
        assert_eq!(fixture.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_resends_original_text() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND, 503, json!({}));
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a1", json!("Hi")));
        let chat = fixture.chat();
        assert!(chat.send_message(text("hello")).await.is_err());
        let id = chat.messages().await[0].id.clone();

        let assistant = chat.retry_message(&id).await.unwrap().unwrap();

        let messages = chat.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].status, Some(MessageStatus::Sent));
        assert_eq!(messages[1], assistant);
        let requests = fixture.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(chat.snapshot().await.error, None);
    }

    #[tokio::test]
    async fn test_retry_resends_file_while_attachment_is_held() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND_FILE, 500, json!({}));
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND_FILE, reply("a1", json!("Parsed")));
        let chat = fixture.chat();
        assert!(chat.send_file_message(csv_upload(Some("clean it"))).await.is_err());
        let id = chat.messages().await[0].id.clone();

        chat.retry_message(&id).await.unwrap().unwrap();

        let requests = fixture.transport.requests_to(endpoints::SEND_FILE);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
    }

    #[tokio::test]
    async fn test_retry_after_restart() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND, 500, json!({}));
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND_FILE, 500, json!({}));
        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a1", json!("Hi")));
        let chat = fixture.chat();
        assert!(chat.send_message(text("hello")).await.is_err());
        assert!(chat.send_file_message(csv_upload(None)).await.is_err());

        let restarted = fixture.chat();
        let messages = restarted.messages().await;
        let (text_id, file_id) = (messages[0].id.clone(), messages[1].id.clone());

        let err = restarted.retry_message(&file_id).await.unwrap_err();
        assert!(matches!(err, CorpoError::RetryUnavailable(_)));
        assert!(restarted.messages().await[1].is_failed());

        restarted.retry_message(&text_id).await.unwrap().unwrap();
        assert_eq!(
            fixture.transport.requests().last().unwrap().body,
            RequestBody::Json(json!({"content": "hello"}))
        );
    }

    #[tokio::test]
    async fn test_restore_marks_in_flight_messages_failed() {
        let fixture = Fixture::new();
        let mut state = ChatState {
            is_typing: true,
            ..ChatState::default()
        };
        state.messages.push(Message::pending_user("s1", "lost in flight"));
        fixture
            .store
            .set(CHAT_STORAGE_KEY, &serde_json::to_string(&state).unwrap())
            .unwrap();

        let restored = fixture.chat().snapshot().await;
        assert!(!restored.is_typing);
        assert!(restored.messages.last().unwrap().is_failed());
    }

    #[tokio::test]
    async fn test_corrupted_state_starts_empty() {
        let fixture = Fixture::new();
        fixture.store.set(CHAT_STORAGE_KEY, "[1, 2").unwrap();

        assert_eq!(fixture.chat().snapshot().await, ChatState::default());
    }

    #[tokio::test]
    async fn test_ensure_session_loads_existing_history() {
        let fixture = Fixture::new();
        fixture.transport.ok(
            Method::Get,
            endpoints::SESSIONS,
            json!({"id": "s1", "title": "Q3", "messageCount": 1}),
        );
        fixture.transport.ok(
            Method::Get,
            endpoints::MESSAGES,
            json!([{"id": "m1", "sessionId": "s1", "content": "hello", "role": "user",
                    "timestamp": "2025-01-01T00:00:00Z", "status": "sent"}]),
        );
        let chat = fixture.chat();

        let session = chat.ensure_session().await.unwrap();

        assert_eq!(session.id, "s1");
        assert_eq!(chat.messages().await.len(), 1);
        let history = &fixture.transport.requests_to(endpoints::MESSAGES)[0];
        assert_eq!(history.query, vec![("sessionId".to_string(), "s1".to_string())]);
        assert!(!chat.snapshot().await.is_loading);
    }

    #[tokio::test]
    async fn test_ensure_session_creates_when_none() {
        let fixture = Fixture::new();
        fixture
            .transport
            .ok(Method::Get, endpoints::SESSIONS, Value::Null);
        fixture
            .transport
            .ok(Method::Post, endpoints::SESSIONS, json!({"id": "s2"}));
        let chat = fixture.chat();
        chat.add_message(Message::pending_user("old", "stale")).await;

        let session = chat.ensure_session().await.unwrap();

        assert_eq!(session.id, "s2");
        assert_eq!(chat.current_session().await, Some(session));
        assert!(chat.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_failures_set_error() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Get, endpoints::SESSIONS, 500, json!({}));
        fixture
            .transport
            .fail(Method::Post, endpoints::SESSIONS, 500, json!({}));
        fixture
            .transport
            .fail(Method::Get, endpoints::MESSAGES, 500, json!({}));
        let chat = fixture.chat();

        assert!(chat.get_chat_sessions().await.is_err());
        assert_eq!(
            chat.snapshot().await.error.as_deref(),
            Some("Failed to load chat sessions")
        );
        assert!(chat.create_chat_session().await.is_err());
        assert_eq!(
            chat.snapshot().await.error.as_deref(),
            Some("Failed to create chat session")
        );
        assert!(chat.get_chat_messages("s1").await.is_err());
        let state = chat.snapshot().await;
        assert_eq!(state.error.as_deref(), Some("Failed to load messages"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_local_mutations_persist() {
        let fixture = Fixture::new();
        let chat = fixture.chat();
        let message = Message::pending_user("s1", "draft");
        let id = message.id.clone();

        chat.add_message(message).await;
        chat.update_message(&id, MessageUpdate::content("final"))
            .await
            .unwrap();
        assert_eq!(fixture.stored_state().messages.get(&id).unwrap().content, "final");

        chat.delete_message(&id).await.unwrap();
        assert!(fixture.stored_state().messages.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_message_is_not_found() {
        let fixture = Fixture::new();
        let chat = fixture.chat();

        let err = chat
            .update_message("missing", MessageUpdate::status(MessageStatus::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpoError::MessageNotFound(_)));
        assert!(chat.delete_message("missing").await.is_err());
        assert_eq!(fixture.store.get(CHAT_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_session() {
        let fixture = Fixture::new();
        fixture
            .transport
            .fail(Method::Delete, endpoints::SESSIONS, 500, json!({}));
        fixture
            .transport
            .ok(Method::Delete, endpoints::SESSIONS, json!({"success": true}));
        let chat = fixture.chat();
        chat.add_message(Message::pending_user("s1", "keep me")).await;

        assert!(chat.clear_session().await.is_err());
        let state = chat.snapshot().await;
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Failed to clear chat session"));

        chat.clear_session().await.unwrap();
        assert_eq!(chat.snapshot().await, ChatState::default());
        assert_eq!(fixture.stored_state(), ChatState::default());
        assert_eq!(fixture.transport.requests_to(endpoints::SESSIONS).len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_order_replies_reconcile_by_id() {
        let fixture = Fixture::new();
        let chat = fixture.chat();
        let first = Message::pending_user("s1", "first");
        let second = Message::pending_user("s1", "second");
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        chat.add_message(first).await;
        chat.add_message(second).await;

        fixture
            .transport
            .ok(Method::Post, endpoints::SEND, reply("a2", json!("to second")));
        chat.deliver(&second_id, &PendingPayload::Text("second".into()))
            .await
            .unwrap();
        fixture
            .transport
            .fail(Method::Post, endpoints::SEND, 500, json!({}));
        assert!(
            chat.deliver(&first_id, &PendingPayload::Text("first".into()))
                .await
                .is_err()
        );

        let state = chat.snapshot().await;
        assert!(state.messages.get(&first_id).unwrap().is_failed());
        assert_eq!(
            state.messages.get(&second_id).unwrap().status,
            Some(MessageStatus::Sent)
        );
        let order: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "to second"]);
    }
}
