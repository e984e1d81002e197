//! REST implementation of MessageStore

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

use convo_common::{AppError, AppResult, RemoteConfig, SyncConfig};
use convo_core::{
    ConversationId, Message, MessageQuery, MessageReceipts, MessageStore, NewMessage,
    Participant, Snowflake, StoreResult,
};

use crate::models::{
    DataEnvelope, MarkReadBody, MessageModel, MessageReceiptsModel, ParticipantModel,
};

use super::error::{check_status, decode, map_transport_error};

/// REST implementation of MessageStore
///
/// Conversations map to `{base}/{kind}/{owner_id}`, for example
/// `{base}/tasks/12/messages`.
#[derive(Clone)]
pub struct HttpMessageStore {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpMessageStore {
    /// Create a new HttpMessageStore
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AppError::transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Create from the full configuration; fails when no remote is configured
    pub fn from_config(config: &SyncConfig) -> AppResult<Self> {
        Self::new(config.require_remote()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a resource under a conversation
    pub fn conversation_url(&self, conversation: ConversationId, resource: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url, conversation.kind, conversation.owner_id, resource
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Query string pairs for a message fetch
pub(crate) fn query_params(query: &MessageQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit", query.limit.to_string())];
    if let Some(since) = query.since {
        params.push(("since", timestamp(since)));
    }
    if let Some(until) = query.until {
        params.push(("until", timestamp(until)));
    }
    params
}

/// Comma-separated `ids` value of a receipt refresh
pub(crate) fn id_list(ids: &[Snowflake]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    #[instrument(skip(self), fields(conversation_id = %conversation))]
    async fn fetch_messages(
        &self,
        conversation: ConversationId,
        query: MessageQuery,
    ) -> StoreResult<Vec<Message>> {
        let request = self
            .http
            .get(self.conversation_url(conversation, "messages"))
            .query(&query_params(&query));

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let envelope: DataEnvelope<Vec<MessageModel>> = decode(check_status(response).await?).await?;

        debug!(count = envelope.data.len(), "Fetched messages");
        Ok(envelope
            .data
            .into_iter()
            .map(|m| m.into_entity(conversation))
            .collect())
    }

    #[instrument(skip(self, message), fields(conversation_id = %conversation, files = message.files.len()))]
    async fn create_message(
        &self,
        conversation: ConversationId,
        message: NewMessage,
    ) -> StoreResult<Message> {
        let mut form = Form::new().text("author_id", message.author_id.to_string());
        if let Some(body) = message.body {
            form = form.text("body", body);
        }
        for file in message.files {
            let part = Part::bytes(file.data)
                .file_name(file.filename)
                .mime_str(&file.content_type)
                .map_err(|e| AppError::validation(format!("invalid content type: {e}")))?;
            form = form.part("files[]", part);
        }

        let request = self
            .http
            .post(self.conversation_url(conversation, "messages"))
            .multipart(form);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let envelope: DataEnvelope<MessageModel> = decode(check_status(response).await?).await?;

        Ok(envelope.data.into_entity(conversation))
    }

    #[instrument(skip(self, message_ids), fields(conversation_id = %conversation, count = message_ids.len()))]
    async fn fetch_receipts(
        &self,
        conversation: ConversationId,
        message_ids: &[Snowflake],
    ) -> StoreResult<Vec<MessageReceipts>> {
        let request = self
            .http
            .get(self.conversation_url(conversation, "receipts"))
            .query(&[("ids", id_list(message_ids))]);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let envelope: DataEnvelope<Vec<MessageReceiptsModel>> =
            decode(check_status(response).await?).await?;

        debug!(count = envelope.data.len(), "Fetched receipts");
        Ok(envelope.data.into_iter().map(MessageReceipts::from).collect())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation))]
    async fn mark_read(&self, conversation: ConversationId, user_id: Snowflake) -> StoreResult<()> {
        let request = self
            .http
            .post(self.conversation_url(conversation, "read"))
            .json(&MarkReadBody { user_id });

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(conversation_id = %conversation))]
    async fn fetch_participants(
        &self,
        conversation: ConversationId,
    ) -> StoreResult<Vec<Participant>> {
        let request = self
            .http
            .get(self.conversation_url(conversation, "participants"));

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let envelope: DataEnvelope<Vec<ParticipantModel>> =
            decode(check_status(response).await?).await?;

        Ok(envelope.data.into_iter().map(Participant::from).collect())
    }
}
