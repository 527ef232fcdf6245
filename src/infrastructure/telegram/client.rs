//! # Telegram Service Adapter
//!
//! Implements the `ChatProvider` trait over the Telegram Bot API (`sendMessage`,
//! `editMessageText`, `deleteMessage`). Option rows become inline keyboard rows whose
//! buttons carry the follow-up command as callback data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::config::TelegramConfig;
use crate::domain::error::RenderError;
use crate::domain::response::ReplyOptions;
use crate::domain::traits::ChatProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// Bot API limit for `callback_data`, in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

impl TryFrom<&ReplyOptions> for InlineKeyboardMarkup {
    type Error = RenderError;

    fn try_from(options: &ReplyOptions) -> Result<Self, Self::Error> {
        let inline_keyboard = options
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|option| {
                        if option.command.len() > MAX_CALLBACK_DATA {
                            return Err(RenderError::CallbackDataTooLong(option.command.clone()));
                        }
                        Ok(InlineKeyboardButton {
                            text: option.label.clone(),
                            callback_data: option.command.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { inline_keyboard })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Clone)]
pub struct TelegramService {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> Result<Self, RenderError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url, config.token),
        })
    }

    async fn call(&self, method: &str, body: Value) -> Result<Value, RenderError> {
        let url = format!("{}/{}", self.base_url, method);
        let response: ApiResponse = self.http.post(&url).json(&body).send().await?.json().await?;

        if !response.ok {
            return Err(RenderError::Api {
                method: method.to_string(),
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}

fn parse_chat_id(chat_id: &str) -> Result<i64, RenderError> {
    chat_id
        .parse()
        .map_err(|_| RenderError::InvalidChatId(chat_id.to_string()))
}

fn parse_message_id(message_id: &str) -> Result<i64, RenderError> {
    message_id
        .parse()
        .map_err(|_| RenderError::InvalidMessageId(message_id.to_string()))
}

/// Request body for `sendMessage`. Without options any custom keyboard is removed.
pub fn send_body(chat_id: i64, text: &str, options: &ReplyOptions) -> Result<Value, RenderError> {
    let reply_markup = if options.is_empty() {
        json!({ "remove_keyboard": true })
    } else {
        json!(InlineKeyboardMarkup::try_from(options)?)
    };
    Ok(json!({
        "chat_id": chat_id,
        "text": text,
        "reply_markup": reply_markup,
    }))
}

/// Request body for `editMessageText`. Omitting the markup clears the inline keyboard.
pub fn edit_body(
    chat_id: i64,
    message_id: i64,
    text: &str,
    options: &ReplyOptions,
) -> Result<Value, RenderError> {
    let mut body = json!({
        "chat_id": chat_id,
        "message_id": message_id,
        "text": text,
    });
    if !options.is_empty() {
        body["reply_markup"] = json!(InlineKeyboardMarkup::try_from(options)?);
    }
    Ok(body)
}

#[async_trait]
impl ChatProvider for TelegramService {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<String, RenderError> {
        let chat = parse_chat_id(chat_id)?;
        tracing::info!("Bot sending message to {}: {}", chat_id, text);

        let result = self.call("sendMessage", send_body(chat, text, options)?).await?;
        let sent: SentMessage = serde_json::from_value(result).map_err(|e| RenderError::Api {
            method: "sendMessage".to_string(),
            description: format!("unexpected result: {e}"),
        })?;
        Ok(sent.message_id.to_string())
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<(), RenderError> {
        let chat = parse_chat_id(chat_id)?;
        let message = parse_message_id(message_id)?;
        tracing::info!("Bot updating message {} in {}", message_id, chat_id);

        self.call("editMessageText", edit_body(chat, message, text, options)?)
            .await
            .map(|_| ())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), RenderError> {
        let chat = parse_chat_id(chat_id)?;
        let message = parse_message_id(message_id)?;

        self.call(
            "deleteMessage",
            json!({ "chat_id": chat, "message_id": message }),
        )
        .await
        .map(|_| ())
    }
}
