use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::{ChatEntry, MessageKind, Sender};
use crate::session::Session;

/// The simulated WhatsApp transcript pane. Purely a projection of the
/// session transcript; nothing here is persisted.
pub struct ChatView {
    root: gtk::Box,
    list: gtk::Box,
    scroller: gtk::ScrolledWindow,
    typing_row: gtk::Box,
    title: gtk::Label,
    status: gtk::Label,
    session: Rc<RefCell<Session>>,
}

impl ChatView {
    pub fn new(session: Rc<RefCell<Session>>) -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
        root.set_size_request(380, -1);

        // Contact header
        let header = gtk::Box::new(gtk::Orientation::Horizontal, 10);
        header.set_margin_top(10);
        header.set_margin_bottom(10);
        header.set_margin_start(12);
        header.set_margin_end(12);

        let avatar = gtk::Label::new(Some("👨‍🚀"));
        avatar.add_css_class("title-2");
        header.append(&avatar);

        let who = gtk::Box::new(gtk::Orientation::Vertical, 2);
        let title = gtk::Label::new(None);
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        who.append(&title);
        let status = gtk::Label::new(Some("terminal ativo"));
        status.add_css_class("dim-label");
        status.add_css_class("caption");
        status.set_halign(gtk::Align::Start);
        who.append(&status);
        header.append(&who);
        root.append(&header);
        root.append(&gtk::Separator::new(gtk::Orientation::Horizontal));

        // Transcript
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(false)
            .build();
        let list = gtk::Box::new(gtk::Orientation::Vertical, 8);
        list.set_margin_top(10);
        list.set_margin_bottom(10);
        list.set_margin_start(10);
        list.set_margin_end(10);
        scroller.set_child(Some(&list));
        root.append(&scroller);

        // Typing indicator, hidden until a reply is pending
        let typing_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        typing_row.set_margin_start(12);
        typing_row.set_margin_bottom(6);
        let typing = gtk::Label::new(Some("digitando…"));
        typing.add_css_class("dim-label");
        typing.add_css_class("caption");
        typing_row.append(&typing);
        typing_row.set_visible(false);
        root.append(&typing_row);

        root.append(&gtk::Separator::new(gtk::Orientation::Horizontal));
        let hint = gtk::Label::new(Some("Monitorando frequência de vendas…"));
        hint.add_css_class("dim-label");
        hint.set_margin_top(10);
        hint.set_margin_bottom(10);
        root.append(&hint);

        Self {
            root,
            list,
            scroller,
            typing_row,
            title,
            status,
            session,
        }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_typing(&self, typing: bool) {
        self.typing_row.set_visible(typing);
        self.status
            .set_label(if typing { "conectando…" } else { "terminal ativo" });
        if typing {
            self.scroll_to_bottom();
        }
    }

    pub fn refresh(&self) {
        let session = self.session.borrow();
        self.title.set_label(&session.lead().name);

        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        for entry in session.transcript() {
            self.list.append(&bubble(entry));
        }
        drop(session);
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&self) {
        let adj = self.scroller.vadjustment();
        adj.set_value(adj.upper());
    }
}

fn media_hint(entry: &ChatEntry) -> Option<String> {
    let media = entry.media.as_deref()?;
    let label = match entry.kind {
        MessageKind::Audio => "áudio",
        MessageKind::Image => "imagem",
        MessageKind::Video => "vídeo",
        MessageKind::Text => return None,
    };
    let mut short: String = media.chars().take(32).collect();
    if short.len() < media.len() {
        short.push('…');
    }
    Some(format!("{} {} · {}", entry.kind.icon(), label, short))
}

fn bubble(entry: &ChatEntry) -> gtk::Widget {
    let row = gtk::Box::new(gtk::Orientation::Horizontal, 0);
    let card = gtk::Box::new(gtk::Orientation::Vertical, 4);
    card.add_css_class("card");
    card.set_margin_top(2);
    card.set_margin_bottom(2);

    match entry.sender {
        Sender::Me => {
            row.set_halign(gtk::Align::End);
            card.set_margin_start(48);
        }
        Sender::Client => {
            row.set_halign(gtk::Align::Start);
            card.set_margin_end(48);
        }
    }

    if let Some(hint) = media_hint(entry) {
        let media = gtk::Label::new(Some(&hint));
        media.add_css_class("caption");
        media.add_css_class("dim-label");
        media.set_halign(gtk::Align::Start);
        media.set_margin_top(8);
        media.set_margin_start(10);
        media.set_margin_end(10);
        card.append(&media);
    }

    if !entry.text.is_empty() {
        let text = gtk::Label::new(Some(&entry.text));
        text.set_wrap(true);
        text.set_xalign(0.0);
        text.set_max_width_chars(34);
        text.set_margin_top(8);
        text.set_margin_start(10);
        text.set_margin_end(10);
        card.append(&text);
    }

    let meta = match entry.sender {
        Sender::Me => format!("{} ✓✓", entry.timestamp),
        Sender::Client => entry.timestamp.clone(),
    };
    let stamp = gtk::Label::new(Some(&meta));
    stamp.add_css_class("caption");
    stamp.add_css_class("dim-label");
    stamp.set_halign(gtk::Align::End);
    stamp.set_margin_bottom(6);
    stamp.set_margin_start(10);
    stamp.set_margin_end(10);
    card.append(&stamp);

    row.append(&card);
    row.upcast()
}
