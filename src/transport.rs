//! The simulated WhatsApp transport. Nothing here delivers anything: `send`
//! renders the message, waits out an artificial latency and yields the
//! transcript entry; `lead_reply` asks an optional backend for a generated
//! response and otherwise falls back to canned lines.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::app::BackendSettings;
use crate::model::{ChatEntry, LeadContext, Message, MessageKind, Sender};
use crate::template;
use crate::utils;

/// Emulated network latency for one outgoing message.
pub const SEND_DELAY: Duration = Duration::from_millis(800);
/// Pause before the simulated lead starts "typing" a reply.
pub const REPLY_DELAY: Duration = Duration::from_millis(2000);

const CANNED_REPLIES: [&str; 4] = [
    "Entendi! Pode me mandar mais detalhes?",
    "Interessante… e como funciona o pagamento?",
    "Vou pensar e te respondo ainda hoje, pode ser?",
    "Adorei! Como faço para começar?",
];

#[derive(Debug, Error)]
pub enum TransportError {
    /// Rejected synchronously, before any delay: the caller should route the
    /// user to the connect flow instead.
    #[error("WhatsApp não está conectado")]
    NotConnected,
}

/// What the lead would actually read for a given message: interpolated text
/// content, or the interpolated caption for media (empty when absent).
pub fn outgoing_text(message: &Message, ctx: &LeadContext) -> String {
    match message.kind {
        MessageKind::Text => template::render(&message.content, ctx),
        _ => message
            .caption
            .as_deref()
            .map(|c| template::render(c, ctx))
            .unwrap_or_default(),
    }
}

fn canned_reply(sent_text: &str) -> &'static str {
    CANNED_REPLIES[sent_text.len() % CANNED_REPLIES.len()]
}

#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// Simulate sending one canned message to the active chat. Resolves to
    /// the transcript entry after the latency delay; there is no retry and
    /// no partial failure.
    pub async fn send(
        &self,
        message: &Message,
        ctx: &LeadContext,
        connected: bool,
    ) -> Result<ChatEntry, TransportError> {
        if !connected {
            return Err(TransportError::NotConnected);
        }

        let text = outgoing_text(message, ctx);
        log::debug!("simulated send of {:?} message {}", message.kind, message.id);

        tokio::time::sleep(SEND_DELAY).await;

        Ok(ChatEntry {
            id: utils::entry_id("m"),
            text,
            kind: message.kind,
            sender: Sender::Me,
            timestamp: utils::clock_time(),
            media: if message.kind == MessageKind::Text {
                None
            } else {
                Some(message.content.clone())
            },
        })
    }

    /// Produce the simulated lead's reply to `sent_text`. When a backend is
    /// configured the generator endpoint is asked first; any failure falls
    /// back to a canned line. Never errors and never blocks the UI beyond
    /// the request timeout.
    pub async fn lead_reply(
        &self,
        settings: &BackendSettings,
        sent_text: &str,
        ctx: &LeadContext,
    ) -> ChatEntry {
        let text = match self.generated_reply(settings, sent_text, ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                if !settings.server_url.is_empty() {
                    log::debug!("reply generator unavailable, using canned reply: {e}");
                }
                canned_reply(sent_text).to_string()
            }
        };
        ChatEntry::client_text(text)
    }

    async fn generated_reply(
        &self,
        settings: &BackendSettings,
        sent_text: &str,
        ctx: &LeadContext,
    ) -> Result<String, String> {
        if settings.server_url.is_empty() {
            return Err("no backend configured".into());
        }
        let endpoint = format!(
            "{}/api/v1/reply",
            settings.server_url.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "instance": settings.instance_name,
            "message": sent_text,
            "lead": {
                "name": ctx.name,
                "product": ctx.product,
                "value": ctx.value,
                "agent": ctx.agent,
            },
        });

        let resp = self
            .http
            .post(&endpoint)
            .header("apikey", &settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let json: Value = resp.json().await.map_err(|e| e.to_string())?;
        json.get("reply")
            .or_else(|| json.get("text"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| "no reply in response".into())
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewMessage;

    fn ctx() -> LeadContext {
        LeadContext {
            name: "Ana".into(),
            product: "Plano X".into(),
            value: "R$10".into(),
            agent: "Maria".into(),
        }
    }

    fn message(kind: MessageKind, content: &str, caption: Option<&str>) -> Message {
        let draft = NewMessage {
            kind,
            title: "t".into(),
            content: content.into(),
            caption: caption.map(|c| c.to_string()),
        };
        Message {
            id: "m1".into(),
            kind: draft.kind,
            title: draft.title,
            content: draft.content,
            caption: draft.caption,
            is_favorite: false,
            order: 0,
        }
    }

    #[test]
    fn text_messages_render_their_content() {
        let m = message(MessageKind::Text, "Oi {{nome}}", None);
        assert_eq!(outgoing_text(&m, &ctx()), "Oi Ana");
    }

    #[test]
    fn media_messages_render_caption_or_nothing() {
        let m = message(MessageKind::Image, "https://x/img.png", Some("{{produto}}"));
        assert_eq!(outgoing_text(&m, &ctx()), "Plano X");

        let m = message(MessageKind::Audio, "https://x/a.mp3", None);
        assert_eq!(outgoing_text(&m, &ctx()), "");
    }

    #[test]
    fn disconnected_send_is_rejected_before_any_delay() {
        let transport = Transport::new();
        let m = message(MessageKind::Text, "Oi", None);
        let ctx = ctx();
        let fut = transport.send(&m, &ctx, false);
        // resolves immediately on a current-thread runtime: no timer involved
        let res = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut);
        assert!(matches!(res, Err(TransportError::NotConnected)));
    }

    #[test]
    fn sent_entry_carries_media_reference_for_non_text() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let transport = Transport::new();

        let m = message(MessageKind::Video, "https://x/v.mp4", Some("veja"));
        let entry = rt.block_on(transport.send(&m, &ctx(), true)).unwrap();
        assert_eq!(entry.sender, Sender::Me);
        assert_eq!(entry.media.as_deref(), Some("https://x/v.mp4"));
        assert_eq!(entry.text, "veja");

        let m = message(MessageKind::Text, "Oi {{nome}}", None);
        let entry = rt.block_on(transport.send(&m, &ctx(), true)).unwrap();
        assert_eq!(entry.media, None);
        assert_eq!(entry.text, "Oi Ana");
    }

    #[test]
    fn canned_fallback_is_deterministic() {
        assert_eq!(canned_reply("abc"), canned_reply("abc"));
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let transport = Transport::new();
        // no backend configured: straight to the canned rotation
        let entry = rt.block_on(transport.lead_reply(
            &BackendSettings::default(),
            "abc",
            &ctx(),
        ));
        assert_eq!(entry.sender, Sender::Client);
        assert_eq!(entry.text, canned_reply("abc"));
    }
}
