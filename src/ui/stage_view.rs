use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::{LeadContext, Message, MessageKind, Stage};
use crate::session::Session;
use crate::template;

pub type SendCallback = Rc<dyn Fn(Message)>;

/// Center pane: lead variable editor, stage filter row and the message
/// cards with their send buttons.
pub struct StageView {
    root: gtk::Box,
    stage_tabs: gtk::Box,
    sections: gtk::Box,
    session: Rc<RefCell<Session>>,
    on_send: RefCell<Option<SendCallback>>,
    on_changed: RefCell<Option<Rc<dyn Fn()>>>,
}

impl StageView {
    pub fn new(session: Rc<RefCell<Session>>) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 10);
        root.set_margin_top(12);
        root.set_margin_bottom(12);
        root.set_margin_start(12);
        root.set_margin_end(12);
        root.set_hexpand(true);

        // Lead variables editor, built once so typing keeps focus
        let lead_card = gtk::Box::new(gtk::Orientation::Vertical, 8);
        lead_card.add_css_class("card");
        let lead_heading = gtk::Label::new(Some("Dados do Lead (variáveis)"));
        lead_heading.add_css_class("heading");
        lead_heading.set_halign(gtk::Align::Start);
        lead_heading.set_margin_top(10);
        lead_heading.set_margin_start(10);
        lead_card.append(&lead_heading);

        let grid = gtk::Grid::new();
        grid.set_row_spacing(6);
        grid.set_column_spacing(8);
        grid.set_column_homogeneous(true);
        grid.set_margin_bottom(10);
        grid.set_margin_start(10);
        grid.set_margin_end(10);
        lead_card.append(&grid);
        root.append(&lead_card);

        let stage_tabs = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        root.append(&stage_tabs);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let sections = gtk::Box::new(gtk::Orientation::Vertical, 16);
        scroller.set_child(Some(&sections));
        root.append(&scroller);

        let view = Rc::new(Self {
            root,
            stage_tabs,
            sections,
            session,
            on_send: RefCell::new(None),
            on_changed: RefCell::new(None),
        });

        // One labelled entry per lead variable
        let lead = view.session.borrow().lead().clone();
        let fields: [(&str, &str, String); 4] = [
            ("Nome", "{{nome}}", lead.name),
            ("Produto", "{{produto}}", lead.product),
            ("Valor", "{{valor}}", lead.value),
            ("Atendente", "{{atendente}}", lead.agent),
        ];
        let mut entries = Vec::new();
        for (i, (label, token, value)) in fields.into_iter().enumerate() {
            let cell = gtk::Box::new(gtk::Orientation::Vertical, 2);
            let caption = gtk::Label::new(Some(&format!("{} {}", label, token)));
            caption.add_css_class("caption");
            caption.add_css_class("dim-label");
            caption.set_halign(gtk::Align::Start);
            cell.append(&caption);
            let entry = gtk::Entry::new();
            entry.set_text(&value);
            cell.append(&entry);
            grid.attach(&cell, (i % 2) as i32, (i / 2) as i32, 1, 1);
            entries.push(entry);
        }
        for entry in &entries {
            let view_for_change = view.clone();
            let entries = entries.clone();
            entry.connect_changed(move |_| {
                let lead = LeadContext {
                    name: entries[0].text().to_string(),
                    product: entries[1].text().to_string(),
                    value: entries[2].text().to_string(),
                    agent: entries[3].text().to_string(),
                };
                view_for_change.session.borrow_mut().set_lead(lead);
                view_for_change.refresh();
                let cb = view_for_change.on_changed.borrow().clone();
                if let Some(cb) = cb {
                    cb();
                }
            });
        }

        view
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_on_send(&self, cb: SendCallback) {
        *self.on_send.borrow_mut() = Some(cb);
    }

    /// Invoked after any lead variable edit (the chat header mirrors the
    /// lead name).
    pub fn set_on_lead_changed(&self, cb: Rc<dyn Fn()>) {
        *self.on_changed.borrow_mut() = Some(cb);
    }

    /// Rebuild the stage filter row and the message card sections from the
    /// session. Cheap enough to run after every mutation.
    pub fn refresh(self: &Rc<Self>) {
        while let Some(child) = self.stage_tabs.first_child() {
            self.stage_tabs.remove(&child);
        }
        while let Some(child) = self.sections.first_child() {
            self.sections.remove(&child);
        }

        let session = self.session.borrow();
        let Some(funnel) = session.active_funnel() else {
            let empty = gtk::Label::new(Some(
                "Astronauta em espera — selecione um funil para decolar nas conversões.",
            ));
            empty.add_css_class("dim-label");
            empty.set_vexpand(true);
            self.sections.append(&empty);
            return;
        };

        let active_stage = session.active_stage_id().map(|s| s.to_string());

        // "Whole flow" tab plus one tab per stage
        {
            let all = gtk::Button::with_label("Fluxo Completo");
            if active_stage.is_none() {
                all.add_css_class("suggested-action");
            }
            let view_for_click = self.clone();
            all.connect_clicked(move |_| {
                view_for_click.session.borrow_mut().select_stage(None);
                view_for_click.refresh();
            });
            self.stage_tabs.append(&all);
        }
        for stage in &funnel.stages {
            let tab = gtk::Button::with_label(&stage.name);
            if active_stage.as_deref() == Some(stage.id.as_str()) {
                tab.add_css_class("suggested-action");
            }
            let id = stage.id.clone();
            let view_for_click = self.clone();
            tab.connect_clicked(move |_| {
                view_for_click
                    .session
                    .borrow_mut()
                    .select_stage(Some(id.clone()));
                view_for_click.refresh();
            });
            self.stage_tabs.append(&tab);
        }

        let lead = session.lead().clone();
        let sending = session.sending().map(|s| s.to_string());
        for stage in &funnel.stages {
            if let Some(active) = &active_stage {
                if active != &stage.id {
                    continue;
                }
            }
            self.sections
                .append(&self.stage_section(stage, &lead, sending.as_deref()));
        }
    }

    fn stage_section(
        self: &Rc<Self>,
        stage: &Stage,
        lead: &LeadContext,
        sending: Option<&str>,
    ) -> gtk::Widget {
        let section = gtk::Box::new(gtk::Orientation::Vertical, 8);

        let header = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        let name = gtk::Label::new(Some(&stage.name));
        name.add_css_class("heading");
        header.append(&name);
        let rule = gtk::Separator::new(gtk::Orientation::Horizontal);
        rule.set_hexpand(true);
        rule.set_valign(gtk::Align::Center);
        header.append(&rule);
        section.append(&header);

        for message in &stage.messages {
            section.append(&self.message_card(message, lead, sending));
        }
        section.upcast()
    }

    fn message_card(
        self: &Rc<Self>,
        message: &Message,
        lead: &LeadContext,
        sending: Option<&str>,
    ) -> gtk::Widget {
        let card = gtk::Box::new(gtk::Orientation::Vertical, 6);
        card.add_css_class("card");

        let head = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        head.set_margin_top(10);
        head.set_margin_start(10);
        head.set_margin_end(10);
        let kind = gtk::Label::new(Some(&format!(
            "{} {}",
            message.kind.icon(),
            message.kind.label()
        )));
        kind.add_css_class("caption");
        kind.add_css_class("dim-label");
        kind.set_hexpand(true);
        kind.set_halign(gtk::Align::Start);
        head.append(&kind);
        if message.is_favorite {
            let star = gtk::Label::new(Some("★"));
            star.add_css_class("caption");
            head.append(&star);
        }
        card.append(&head);

        let title = gtk::Label::new(Some(&message.title));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        title.set_margin_start(10);
        title.set_margin_end(10);
        card.append(&title);

        // Interpolated preview: what the lead would read right now
        let preview_text = match message.kind {
            MessageKind::Text => template::render(&message.content, lead),
            _ => {
                let mut short: String = message.content.chars().take(40).collect();
                if short.len() < message.content.len() {
                    short.push('…');
                }
                format!("Arquivo: {}", short)
            }
        };
        let preview = gtk::Label::new(Some(&preview_text));
        preview.set_wrap(true);
        preview.set_xalign(0.0);
        preview.add_css_class("dim-label");
        preview.set_margin_start(10);
        preview.set_margin_end(10);
        card.append(&preview);

        if let Some(caption) = &message.caption {
            let caption_label =
                gtk::Label::new(Some(&format!("Legenda: {}", template::render(caption, lead))));
            caption_label.set_wrap(true);
            caption_label.set_xalign(0.0);
            caption_label.add_css_class("caption");
            caption_label.add_css_class("dim-label");
            caption_label.set_margin_start(10);
            caption_label.set_margin_end(10);
            card.append(&caption_label);
        }

        let send = if sending == Some(message.id.as_str()) {
            gtk::Button::with_label("Enviando…")
        } else {
            gtk::Button::with_label("Enviar via Techview")
        };
        send.add_css_class("suggested-action");
        send.set_margin_bottom(10);
        send.set_margin_start(10);
        send.set_margin_end(10);
        // one in-flight send at a time: every button goes insensitive
        send.set_sensitive(sending.is_none());
        let msg = message.clone();
        let view_for_click = self.clone();
        send.connect_clicked(move |_| {
            let cb = view_for_click.on_send.borrow().clone();
            if let Some(cb) = cb {
                cb(msg.clone());
            }
        });
        card.append(&send);

        card.upcast()
    }
}
