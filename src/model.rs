use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils;

/// The four media formats a canned message can take. `content` carries the
/// literal text for `Text` and a URL/reference for the media kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Text,
    Audio,
    Image,
    Video,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::Text => "Texto",
            MessageKind::Audio => "Áudio",
            MessageKind::Image => "Imagem",
            MessageKind::Video => "Vídeo",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MessageKind::Text => "📄",
            MessageKind::Audio => "🎧",
            MessageKind::Image => "🖼️",
            MessageKind::Video => "🎥",
        }
    }

    /// Captions only make sense under visual media.
    pub fn supports_caption(&self) -> bool {
        matches!(self, MessageKind::Image | MessageKind::Video)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funnel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub stages: Vec<Stage>,
}

/// The lead variables substituted into message templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadContext {
    pub name: String,
    pub product: String,
    pub value: String,
    pub agent: String,
}

impl Default for LeadContext {
    fn default() -> Self {
        Self {
            name: "João Silva".into(),
            product: "Techview Premium+".into(),
            value: "R$ 49,90".into(),
            agent: "TechBot".into(),
        }
    }
}

/// Which side of the simulated conversation a transcript entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Client,
}

/// One line of the simulated transcript. Never persisted; the chat resets
/// with the process.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub id: String,
    pub text: String,
    pub kind: MessageKind,
    pub sender: Sender,
    pub timestamp: String,
    pub media: Option<String>,
}

impl ChatEntry {
    pub fn client_text(text: impl Into<String>) -> Self {
        Self {
            id: utils::entry_id("c"),
            text: text.into(),
            kind: MessageKind::Text,
            sender: Sender::Client,
            timestamp: utils::clock_time(),
            media: None,
        }
    }
}

/// A message draft as entered in the new-message dialog, before it is given
/// an id and an order slot.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub kind: MessageKind,
    pub title: String,
    pub content: String,
    pub caption: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("o título é obrigatório")]
    EmptyTitle,
    #[error("o conteúdo é obrigatório")]
    EmptyContent,
}

impl NewMessage {
    /// Required-field check, enforced at the edit boundary only.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(DraftError::EmptyContent);
        }
        Ok(())
    }
}

/// Append a validated draft to one stage, copy-on-write: the returned list
/// shares nothing structural with the input, so the caller always persists a
/// complete, consistent snapshot. Unresolved funnel/stage ids return the
/// tree unchanged.
pub fn add_message(
    funnels: &[Funnel],
    funnel_id: &str,
    stage_id: &str,
    draft: &NewMessage,
) -> Vec<Funnel> {
    funnels
        .iter()
        .map(|f| {
            if f.id != funnel_id {
                return f.clone();
            }
            let stages = f
                .stages
                .iter()
                .map(|s| {
                    if s.id != stage_id {
                        return s.clone();
                    }
                    let mut messages = s.messages.clone();
                    messages.push(Message {
                        id: utils::entry_id("m"),
                        kind: draft.kind,
                        title: draft.title.clone(),
                        content: draft.content.clone(),
                        caption: if draft.kind.supports_caption() {
                            draft.caption.clone().filter(|c| !c.trim().is_empty())
                        } else {
                            None
                        },
                        is_favorite: false,
                        order: s.messages.len() as u32,
                    });
                    Stage {
                        id: s.id.clone(),
                        name: s.name.clone(),
                        order: s.order,
                        messages,
                    }
                })
                .collect();
            Funnel {
                id: f.id.clone(),
                name: f.name.clone(),
                description: f.description.clone(),
                created_at: f.created_at,
                stages,
            }
        })
        .collect()
}

/// The built-in funnel set used whenever no stored snapshot is readable.
pub fn seed_funnels() -> Vec<Funnel> {
    vec![Funnel {
        id: "f1".into(),
        name: "Vendas - Curso de Marketing".into(),
        description: "Funil focado em conversão de leads frios vindos do Instagram.".into(),
        created_at: utils::now_millis(),
        stages: vec![
            Stage {
                id: "s1".into(),
                name: "Boas-vindas".into(),
                order: 0,
                messages: vec![
                    Message {
                        id: "m1".into(),
                        kind: MessageKind::Text,
                        title: "Primeiro Contato".into(),
                        content: "Olá {{nome}}! Tudo bem? Vi que você se interessou pelo nosso \
                                  curso de {{produto}}. Sou o {{atendente}} e vou te ajudar."
                            .into(),
                        caption: None,
                        is_favorite: true,
                        order: 0,
                    },
                    Message {
                        id: "m2".into(),
                        kind: MessageKind::Audio,
                        title: "Áudio de Apresentação".into(),
                        content: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3"
                            .into(),
                        caption: None,
                        is_favorite: false,
                        order: 1,
                    },
                ],
            },
            Stage {
                id: "s2".into(),
                name: "Qualificação".into(),
                order: 1,
                messages: vec![Message {
                    id: "m3".into(),
                    kind: MessageKind::Text,
                    title: "Pergunta de Nível".into(),
                    content: "Você já trabalha com tráfego pago ou está começando do zero agora?"
                        .into(),
                    caption: None,
                    is_favorite: false,
                    order: 0,
                }],
            },
        ],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: MessageKind) -> NewMessage {
        NewMessage {
            kind,
            title: "Oferta".into(),
            content: "Aproveite {{produto}} por {{valor}}".into(),
            caption: Some("Condição válida hoje".into()),
        }
    }

    #[test]
    fn empty_title_and_content_are_rejected() {
        let mut d = draft(MessageKind::Text);
        d.title = "   ".into();
        assert_eq!(d.validate(), Err(DraftError::EmptyTitle));

        let mut d = draft(MessageKind::Text);
        d.content = String::new();
        assert_eq!(d.validate(), Err(DraftError::EmptyContent));

        assert!(draft(MessageKind::Text).validate().is_ok());
    }

    #[test]
    fn add_message_appends_with_next_order_slot() {
        let funnels = seed_funnels();
        let updated = add_message(&funnels, "f1", "s1", &draft(MessageKind::Text));

        let stage = &updated[0].stages[0];
        assert_eq!(stage.messages.len(), 3);
        let added = stage.messages.last().unwrap();
        assert_eq!(added.order, 2);
        assert!(!added.is_favorite);
        assert!(added.id.starts_with("m-"));
        // text messages never carry a caption
        assert_eq!(added.caption, None);
    }

    #[test]
    fn add_message_keeps_caption_for_visual_media_only() {
        let funnels = seed_funnels();
        let updated = add_message(&funnels, "f1", "s2", &draft(MessageKind::Image));
        let added = updated[0].stages[1].messages.last().unwrap();
        assert_eq!(added.caption.as_deref(), Some("Condição válida hoje"));
    }

    #[test]
    fn add_message_leaves_siblings_untouched() {
        let funnels = seed_funnels();
        let updated = add_message(&funnels, "f1", "s1", &draft(MessageKind::Text));
        // the untargeted stage is deep-equal to the original
        assert_eq!(
            serde_json::to_value(&updated[0].stages[1]).unwrap(),
            serde_json::to_value(&funnels[0].stages[1]).unwrap()
        );
        // and the input tree itself was not mutated
        assert_eq!(funnels[0].stages[0].messages.len(), 2);
    }

    #[test]
    fn add_message_with_unknown_ids_is_a_no_op() {
        let funnels = seed_funnels();
        let updated = add_message(&funnels, "f1", "nope", &draft(MessageKind::Text));
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            serde_json::to_value(&funnels).unwrap()
        );
    }

    #[test]
    fn snapshot_json_uses_the_legacy_field_names() {
        let json = serde_json::to_value(seed_funnels()).unwrap();
        let first = &json[0];
        assert!(first.get("createdAt").is_some());
        let msg = &first["stages"][0]["messages"][0];
        assert_eq!(msg["type"], "TEXT");
        assert_eq!(msg["isFavorite"], true);
        // absent caption is omitted, not null
        assert!(msg.get("caption").is_none());
    }
}
