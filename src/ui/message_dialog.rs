use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::{MessageKind, NewMessage};
use crate::session::Session;

const KINDS: [MessageKind; 4] = [
    MessageKind::Text,
    MessageKind::Audio,
    MessageKind::Image,
    MessageKind::Video,
];

/// New-message form. Validation failures keep the dialog open with an
/// inline alert; nothing is written until the draft passes.
pub fn show(
    parent: &adw::ApplicationWindow,
    session: Rc<RefCell<Session>>,
    preselected: Option<MessageKind>,
    funnel_id: String,
    stage_id: String,
    on_saved: Rc<dyn Fn()>,
) {
    let dialog = gtk::Dialog::builder()
        .title("Nova Mensagem Pronta")
        .transient_for(parent)
        .modal(true)
        .default_width(420)
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);

    let info = gtk::Label::new(Some("Personalize seu conteúdo para envio rápido."));
    info.add_css_class("dim-label");
    info.set_halign(gtk::Align::Start);
    content.append(&info);

    let kind_labels: Vec<String> = KINDS
        .iter()
        .map(|k| format!("{} {}", k.icon(), k.label()))
        .collect();
    let kind_refs: Vec<&str> = kind_labels.iter().map(|s| s.as_str()).collect();
    let kind_dropdown = gtk::DropDown::from_strings(&kind_refs);
    if let Some(kind) = preselected {
        if let Some(pos) = KINDS.iter().position(|k| *k == kind) {
            kind_dropdown.set_selected(pos as u32);
        }
    }
    content.append(&kind_dropdown);

    let title_entry = gtk::Entry::new();
    title_entry.set_placeholder_text(Some("Título (ex: Primeiro Contato)"));
    content.append(&title_entry);

    let content_entry = gtk::Entry::new();
    content_entry.set_placeholder_text(Some(
        "Texto com {{nome}}, {{produto}}, {{valor}}, {{atendente}} — ou URL da mídia",
    ));
    content.append(&content_entry);

    let caption_entry = gtk::Entry::new();
    caption_entry.set_placeholder_text(Some("Legenda (opcional, para imagem/vídeo)"));
    content.append(&caption_entry);

    let alert = gtk::Label::new(None);
    alert.add_css_class("error");
    alert.set_halign(gtk::Align::Start);
    alert.set_visible(false);
    content.append(&alert);

    // caption only applies to visual media
    let sync_caption = {
        let caption_entry = caption_entry.clone();
        let kind_dropdown = kind_dropdown.clone();
        move || {
            let kind = KINDS[kind_dropdown.selected() as usize];
            caption_entry.set_visible(kind.supports_caption());
        }
    };
    sync_caption();
    kind_dropdown.connect_selected_notify(move |_| sync_caption());

    dialog.set_child(Some(&content));
    let _ = dialog.add_button("Cancelar", gtk::ResponseType::Cancel);
    let save_btn = dialog.add_button("Salvar", gtk::ResponseType::Ok);
    save_btn.add_css_class("suggested-action");
    dialog.set_default_response(gtk::ResponseType::Ok);

    dialog.connect_response(move |dlg, resp| {
        if resp != gtk::ResponseType::Ok {
            dlg.close();
            return;
        }

        let kind = KINDS[kind_dropdown.selected() as usize];
        let caption = caption_entry.text().to_string();
        let draft = NewMessage {
            kind,
            title: title_entry.text().to_string(),
            content: content_entry.text().to_string(),
            caption: if caption.trim().is_empty() {
                None
            } else {
                Some(caption)
            },
        };

        let saved = session
            .borrow_mut()
            .add_message(&funnel_id, &stage_id, &draft);
        match saved {
            Ok(()) => {
                on_saved();
                dlg.close();
            }
            Err(e) => {
                alert.set_label(&format!("Preencha os campos obrigatórios: {e}."));
                alert.set_visible(true);
            }
        }
    });

    dialog.present();
}
