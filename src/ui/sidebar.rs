use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::MessageKind;
use crate::session::Session;
use crate::ui::settings_panel::SettingsPanel;

pub type FunnelCallback = Rc<dyn Fn(String)>;
pub type QuickAddCallback = Rc<dyn Fn(MessageKind)>;
pub type ActionCallback = Rc<dyn Fn()>;

/// Left pane: brand header, connection status row, quick-add grid, funnel
/// list and the settings tab.
pub struct Sidebar {
    root: gtk::Box,
    status_label: gtk::Label,
    connect_btn: gtk::Button,
    funnel_list: gtk::Box,
    session: Rc<RefCell<Session>>,
    on_select_funnel: RefCell<Option<FunnelCallback>>,
    on_quick_add: RefCell<Option<QuickAddCallback>>,
    on_connect: RefCell<Option<ActionCallback>>,
    on_disconnect: RefCell<Option<ActionCallback>>,
}

impl Sidebar {
    pub fn new(session: Rc<RefCell<Session>>) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 10);
        root.set_margin_top(12);
        root.set_margin_bottom(12);
        root.set_margin_start(12);
        root.set_margin_end(12);
        root.set_size_request(280, -1);

        // Brand
        let brand = gtk::Label::new(Some("TECHLEADS"));
        brand.add_css_class("title-2");
        root.append(&brand);
        let tagline = gtk::Label::new(Some("BY TECHVIEW"));
        tagline.add_css_class("dim-label");
        tagline.add_css_class("caption");
        root.append(&tagline);

        // Connection status row
        let status_row = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        status_row.add_css_class("card");
        let status_label = gtk::Label::new(Some("● Desconectado"));
        status_label.set_halign(gtk::Align::Start);
        status_label.set_hexpand(true);
        status_label.set_margin_top(8);
        status_label.set_margin_bottom(8);
        status_label.set_margin_start(10);
        status_row.append(&status_label);
        let connect_btn = gtk::Button::with_label("Conectar");
        connect_btn.add_css_class("flat");
        connect_btn.set_margin_end(4);
        connect_btn.set_margin_top(4);
        connect_btn.set_margin_bottom(4);
        status_row.append(&connect_btn);
        root.append(&status_row);

        // Funnels / settings tabs
        let stack = gtk::Stack::new();
        stack.set_vexpand(true);

        let funnels_page = gtk::Box::new(gtk::Orientation::Vertical, 10);

        let quick_heading = gtk::Label::new(Some("Disparo Manual"));
        quick_heading.add_css_class("heading");
        quick_heading.set_halign(gtk::Align::Start);
        funnels_page.append(&quick_heading);

        let quick_grid = gtk::Grid::new();
        quick_grid.set_row_spacing(6);
        quick_grid.set_column_spacing(6);
        quick_grid.set_column_homogeneous(true);
        funnels_page.append(&quick_grid);

        let funnels_heading = gtk::Label::new(Some("Estratégias"));
        funnels_heading.add_css_class("heading");
        funnels_heading.set_halign(gtk::Align::Start);
        funnels_page.append(&funnels_heading);

        let funnel_scroller = gtk::ScrolledWindow::builder().vexpand(true).build();
        let funnel_list = gtk::Box::new(gtk::Orientation::Vertical, 4);
        funnel_scroller.set_child(Some(&funnel_list));
        funnels_page.append(&funnel_scroller);

        stack.add_titled(&funnels_page, Some("funnels"), "Meus Funis");

        let settings = SettingsPanel::new(session.clone());
        stack.add_titled(&settings.widget(), Some("settings"), "Painel");

        let switcher = gtk::StackSwitcher::new();
        switcher.set_stack(Some(&stack));
        switcher.set_halign(gtk::Align::Center);
        root.append(&switcher);
        root.append(&stack);

        let footer = gtk::Label::new(Some("TECHVIEW PREMIUM+"));
        footer.add_css_class("dim-label");
        footer.add_css_class("caption");
        root.append(&footer);

        let sidebar = Rc::new(Self {
            root,
            status_label,
            connect_btn,
            funnel_list,
            session,
            on_select_funnel: RefCell::new(None),
            on_quick_add: RefCell::new(None),
            on_connect: RefCell::new(None),
            on_disconnect: RefCell::new(None),
        });

        // Quick-add grid, one button per media format
        let kinds = [
            MessageKind::Text,
            MessageKind::Audio,
            MessageKind::Image,
            MessageKind::Video,
        ];
        for (i, kind) in kinds.into_iter().enumerate() {
            let btn = gtk::Button::with_label(&format!("{} {}", kind.icon(), kind.label()));
            let sidebar_for_click = sidebar.clone();
            btn.connect_clicked(move |_| {
                let cb = sidebar_for_click.on_quick_add.borrow().clone();
                if let Some(cb) = cb {
                    cb(kind);
                }
            });
            quick_grid.attach(&btn, (i % 2) as i32, (i / 2) as i32, 1, 1);
        }

        {
            let sidebar_for_click = sidebar.clone();
            sidebar.connect_btn.connect_clicked(move |_| {
                let connected = sidebar_for_click.session.borrow().is_connected();
                let cb = if connected {
                    sidebar_for_click.on_disconnect.borrow().clone()
                } else {
                    sidebar_for_click.on_connect.borrow().clone()
                };
                if let Some(cb) = cb {
                    cb();
                }
            });
        }

        sidebar
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn set_on_select_funnel(&self, cb: FunnelCallback) {
        *self.on_select_funnel.borrow_mut() = Some(cb);
    }

    pub fn set_on_quick_add(&self, cb: QuickAddCallback) {
        *self.on_quick_add.borrow_mut() = Some(cb);
    }

    pub fn set_on_connect(&self, cb: ActionCallback) {
        *self.on_connect.borrow_mut() = Some(cb);
    }

    pub fn set_on_disconnect(&self, cb: ActionCallback) {
        *self.on_disconnect.borrow_mut() = Some(cb);
    }

    pub fn refresh_status(&self) {
        if self.session.borrow().is_connected() {
            self.status_label.set_label("● Sistema online");
            self.connect_btn.set_label("Sair");
        } else {
            self.status_label.set_label("● Desconectado");
            self.connect_btn.set_label("Conectar");
        }
    }

    pub fn refresh_funnels(self: &Rc<Self>) {
        while let Some(child) = self.funnel_list.first_child() {
            self.funnel_list.remove(&child);
        }

        let session = self.session.borrow();
        let active = session.active_funnel_id().map(|s| s.to_string());
        for funnel in session.funnels() {
            let btn = gtk::Button::with_label(&funnel.name);
            btn.set_halign(gtk::Align::Fill);
            if let Some(label) = btn.child().and_then(|c| c.downcast::<gtk::Label>().ok()) {
                label.set_halign(gtk::Align::Start);
            }
            if active.as_deref() == Some(funnel.id.as_str()) {
                btn.add_css_class("suggested-action");
            } else {
                btn.add_css_class("flat");
            }
            btn.set_tooltip_text(Some(&funnel.description));

            let id = funnel.id.clone();
            let sidebar_for_click = self.clone();
            btn.connect_clicked(move |_| {
                let cb = sidebar_for_click.on_select_funnel.borrow().clone();
                if let Some(cb) = cb {
                    cb(id.clone());
                }
            });
            self.funnel_list.append(&btn);
        }
    }
}
