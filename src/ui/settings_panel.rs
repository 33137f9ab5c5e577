use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::app::BackendSettings;
use crate::session::Session;
use crate::utils;

const SAVE_LABEL: &str = "Salvar Configuração";

/// Backend settings form: generator server URL, API key, instance id and
/// the auto-reply toggle. Saving writes the TOML config through the session.
pub struct SettingsPanel {
    root: gtk::Box,
}

impl SettingsPanel {
    pub fn new(session: Rc<RefCell<Session>>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 10);
        root.set_margin_top(12);
        root.set_margin_bottom(12);
        root.set_margin_start(4);
        root.set_margin_end(4);

        let heading = gtk::Label::new(Some("Configurações do Motor"));
        heading.add_css_class("heading");
        heading.set_halign(gtk::Align::Start);
        root.append(&heading);

        let sub = gtk::Label::new(Some("Integração com servidor de respostas"));
        sub.add_css_class("dim-label");
        sub.add_css_class("caption");
        sub.set_halign(gtk::Align::Start);
        root.append(&sub);

        let settings = session.borrow().settings().clone();

        let url_entry = gtk::Entry::new();
        url_entry.set_placeholder_text(Some("https://sua-instancia.techview.com"));
        url_entry.set_text(&settings.server_url);
        root.append(&url_entry);

        let key_entry = gtk::PasswordEntry::new();
        key_entry.set_placeholder_text(Some("Chave de API"));
        key_entry.set_text(&settings.api_key);
        root.append(&key_entry);

        let instance_entry = gtk::Entry::new();
        instance_entry.set_placeholder_text(Some("ID da instância (ex: canal_01)"));
        instance_entry.set_text(&settings.instance_name);
        root.append(&instance_entry);

        let autoreply = gtk::CheckButton::with_label("Simulador de respostas do lead");
        autoreply.set_active(settings.auto_reply);
        root.append(&autoreply);

        let status = gtk::Label::new(None);
        status.add_css_class("dim-label");
        status.add_css_class("caption");
        status.set_halign(gtk::Align::Start);
        root.append(&status);

        let save_btn = gtk::Button::with_label(SAVE_LABEL);
        save_btn.add_css_class("suggested-action");
        root.append(&save_btn);

        {
            let session = session.clone();
            let status = status.clone();
            save_btn.connect_clicked(move |btn| {
                let server_url = utils::normalize_url(&url_entry.text());
                if !server_url.is_empty() {
                    if let Err(e) = url::Url::parse(&server_url) {
                        status.set_label(&format!("URL inválida: {e}"));
                        return;
                    }
                }
                status.set_label("");

                let next = BackendSettings {
                    server_url,
                    api_key: key_entry.text().to_string(),
                    instance_name: instance_entry.text().to_string(),
                    auto_reply: autoreply.is_active(),
                };
                if let Err(e) = session.borrow_mut().set_settings(next) {
                    status.set_label(&format!("Falha ao salvar: {e}"));
                    return;
                }

                btn.set_label("Alterações salvas ✓");
                let btn = btn.clone();
                glib::timeout_add_local_once(Duration::from_secs(3), move || {
                    btn.set_label(SAVE_LABEL);
                });
            });
        }

        Self { root }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }
}
