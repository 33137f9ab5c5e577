//! Per-session application state. Everything the original UI read ad hoc
//! from ambient storage lives here instead: the funnel tree, the pairing
//! flag, the lead variables, the backend settings and the transient
//! transcript. Loaded once at startup and passed by reference into the
//! views; mutations go through the methods below so every change persists a
//! complete snapshot.

use crate::app::BackendSettings;
use crate::model::{self, ChatEntry, DraftError, Funnel, LeadContext, NewMessage};
use crate::storage;

pub struct Session {
    funnels: Vec<Funnel>,
    active_funnel: Option<String>,
    /// `None` shows the whole flow, `Some(id)` filters to one stage.
    active_stage: Option<String>,
    lead: LeadContext,
    connected: bool,
    settings: BackendSettings,
    /// Message id of the one in-flight send, if any.
    sending: Option<String>,
    transcript: Vec<ChatEntry>,
}

impl Session {
    pub fn load() -> Self {
        Self::from_parts(
            storage::load_funnels(),
            storage::load_connected(),
            BackendSettings::load(),
        )
    }

    pub fn from_parts(
        funnels: Vec<Funnel>,
        connected: bool,
        settings: BackendSettings,
    ) -> Self {
        let active_funnel = funnels.first().map(|f| f.id.clone());
        Self {
            funnels,
            active_funnel,
            active_stage: None,
            lead: LeadContext::default(),
            connected,
            settings,
            sending: None,
            transcript: vec![ChatEntry::client_text(
                "Olá! Como faço para assinar a Techview?",
            )],
        }
    }

    pub fn funnels(&self) -> &[Funnel] {
        &self.funnels
    }

    pub fn active_funnel(&self) -> Option<&Funnel> {
        let id = self.active_funnel.as_deref()?;
        self.funnels.iter().find(|f| f.id == id)
    }

    pub fn active_funnel_id(&self) -> Option<&str> {
        self.active_funnel.as_deref()
    }

    pub fn active_stage_id(&self) -> Option<&str> {
        self.active_stage.as_deref()
    }

    pub fn select_funnel(&mut self, id: &str) {
        if self.funnels.iter().any(|f| f.id == id) {
            self.active_funnel = Some(id.to_string());
            self.active_stage = None;
        }
    }

    pub fn select_stage(&mut self, id: Option<String>) {
        self.active_stage = id;
    }

    pub fn lead(&self) -> &LeadContext {
        &self.lead
    }

    pub fn set_lead(&mut self, lead: LeadContext) {
        self.lead = lead;
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// Persists to the TOML config and keeps the in-memory copy current.
    pub fn set_settings(&mut self, settings: BackendSettings) -> std::io::Result<()> {
        let res = settings.save();
        self.settings = settings;
        res
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if let Err(e) = storage::save_connected(connected) {
            log::warn!("could not persist connection flag: {e}");
        }
    }

    /// Where a quick-add lands: the selected stage, else the first stage of
    /// the active funnel.
    pub fn quick_add_target(&self) -> Option<(String, String)> {
        let funnel = self.active_funnel()?;
        let stage_id = match &self.active_stage {
            Some(id) => id.clone(),
            None => funnel.stages.first()?.id.clone(),
        };
        Some((funnel.id.clone(), stage_id))
    }

    /// Validate the draft, rebuild the funnel tree copy-on-write and persist
    /// the new snapshot. The tree is untouched when validation fails.
    pub fn add_message(
        &mut self,
        funnel_id: &str,
        stage_id: &str,
        draft: &NewMessage,
    ) -> Result<(), DraftError> {
        draft.validate()?;
        self.funnels = model::add_message(&self.funnels, funnel_id, stage_id, draft);
        if let Err(e) = storage::save_funnels(&self.funnels) {
            log::warn!("could not persist funnel snapshot: {e}");
        }
        Ok(())
    }

    pub fn sending(&self) -> Option<&str> {
        self.sending.as_deref()
    }

    pub fn begin_send(&mut self, message_id: &str) {
        self.sending = Some(message_id.to_string());
    }

    pub fn end_send(&mut self) {
        self.sending = None;
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    pub fn push_entry(&mut self, entry: ChatEntry) {
        self.transcript.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{seed_funnels, MessageKind};

    fn session() -> Session {
        Session::from_parts(seed_funnels(), false, BackendSettings::default())
    }

    #[test]
    fn first_funnel_is_active_after_load() {
        let s = session();
        assert_eq!(s.active_funnel_id(), Some("f1"));
        assert_eq!(s.active_stage_id(), None);
    }

    #[test]
    fn selecting_a_funnel_resets_the_stage_filter() {
        let mut s = session();
        s.select_stage(Some("s2".into()));
        s.select_funnel("f1");
        assert_eq!(s.active_stage_id(), None);

        s.select_funnel("missing");
        assert_eq!(s.active_funnel_id(), Some("f1"));
    }

    #[test]
    fn quick_add_prefers_the_selected_stage() {
        let mut s = session();
        assert_eq!(s.quick_add_target(), Some(("f1".into(), "s1".into())));
        s.select_stage(Some("s2".into()));
        assert_eq!(s.quick_add_target(), Some(("f1".into(), "s2".into())));
    }

    #[test]
    fn invalid_drafts_never_touch_the_tree() {
        let mut s = session();
        let bad = NewMessage {
            kind: MessageKind::Text,
            title: String::new(),
            content: "x".into(),
            caption: None,
        };
        assert!(s.add_message("f1", "s1", &bad).is_err());
        assert_eq!(s.funnels()[0].stages[0].messages.len(), 2);
    }

    #[test]
    fn transcript_starts_with_the_seed_client_line() {
        let s = session();
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.transcript()[0].sender, crate::model::Sender::Client);
    }
}
