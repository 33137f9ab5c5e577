use gtk4::prelude::*;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::connect::{ConnectFlow, ConnectState};

/// Delay between the fake scan and the "authenticated" page.
const LOADING_DELAY: Duration = Duration::from_millis(1500);
/// How long the success page stays up before the dialog closes.
const SUCCESS_DELAY: Duration = Duration::from_millis(1000);

/// QR pairing dialog. The page sequence is owned by [`ConnectFlow`]; the two
/// timers here only feed it triggers. Timers run to completion even if the
/// dialog is dismissed early, matching the no-cancellation model.
pub fn show(parent: &adw::ApplicationWindow, on_connected: Rc<dyn Fn()>) {
    let dialog = gtk::Dialog::builder()
        .title("Conectar WhatsApp")
        .transient_for(parent)
        .modal(true)
        .default_width(560)
        .build();

    let content = gtk::Box::new(gtk::Orientation::Horizontal, 16);
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    content.set_margin_start(16);
    content.set_margin_end(16);

    // Left column: pitch and pairing steps
    let left = gtk::Box::new(gtk::Orientation::Vertical, 8);
    let brand = gtk::Label::new(Some("TECHLEADS"));
    brand.add_css_class("title-2");
    brand.set_halign(gtk::Align::Start);
    left.append(&brand);
    let pitch = gtk::Label::new(Some(
        "Conecte o motor Techview ao seu WhatsApp para automação de alta performance.",
    ));
    pitch.set_wrap(true);
    pitch.set_xalign(0.0);
    pitch.add_css_class("dim-label");
    left.append(&pitch);
    for (num, step) in [
        "Abra o WhatsApp Web no seu celular",
        "Acesse as configurações de dispositivos",
        "Escaneie o QR Code ao lado",
    ]
    .iter()
    .enumerate()
    {
        let line = gtk::Label::new(Some(&format!("{}. {}", num + 1, step)));
        line.set_halign(gtk::Align::Start);
        line.add_css_class("caption");
        left.append(&line);
    }
    content.append(&left);
    content.append(&gtk::Separator::new(gtk::Orientation::Vertical));

    // Right column: one stack page per flow state
    let stack = gtk::Stack::new();
    stack.set_size_request(220, 220);

    let qr_page = gtk::Box::new(gtk::Orientation::Vertical, 8);
    qr_page.set_valign(gtk::Align::Center);
    let qr_btn = gtk::Button::new();
    let qr_face = gtk::Box::new(gtk::Orientation::Vertical, 4);
    let qr_glyph = gtk::Label::new(Some("▦"));
    qr_glyph.add_css_class("title-1");
    qr_face.append(&qr_glyph);
    let qr_hint = gtk::Label::new(Some("Sincronizar"));
    qr_hint.add_css_class("caption");
    qr_face.append(&qr_hint);
    qr_btn.set_child(Some(&qr_face));
    qr_page.append(&qr_btn);
    let waiting = gtk::Label::new(Some("Aguardando conexão"));
    waiting.add_css_class("dim-label");
    waiting.add_css_class("caption");
    qr_page.append(&waiting);
    stack.add_named(&qr_page, Some(ConnectState::Qrcode.page()));

    let loading_page = gtk::Box::new(gtk::Orientation::Vertical, 10);
    loading_page.set_valign(gtk::Align::Center);
    let spinner = gtk::Spinner::new();
    spinner.set_size_request(48, 48);
    spinner.start();
    loading_page.append(&spinner);
    let auth = gtk::Label::new(Some("Autenticando"));
    auth.add_css_class("heading");
    loading_page.append(&auth);
    let crypto = gtk::Label::new(Some("Criptografia de ponta a ponta…"));
    crypto.add_css_class("dim-label");
    crypto.add_css_class("caption");
    loading_page.append(&crypto);
    stack.add_named(&loading_page, Some(ConnectState::Loading.page()));

    let success_page = gtk::Box::new(gtk::Orientation::Vertical, 8);
    success_page.set_valign(gtk::Align::Center);
    let check = gtk::Label::new(Some("✓"));
    check.add_css_class("title-1");
    success_page.append(&check);
    let connected = gtk::Label::new(Some("Conectado!"));
    connected.add_css_class("heading");
    success_page.append(&connected);
    let authorized = gtk::Label::new(Some("Acesso autorizado"));
    authorized.add_css_class("dim-label");
    authorized.add_css_class("caption");
    success_page.append(&authorized);
    stack.add_named(&success_page, Some(ConnectState::Success.page()));

    content.append(&stack);
    dialog.set_child(Some(&content));
    let _ = dialog.add_button("Cancelar", gtk::ResponseType::Cancel);
    dialog.connect_response(|dlg, _| dlg.close());

    let flow = Rc::new(RefCell::new(ConnectFlow::new()));

    {
        let flow = flow.clone();
        let stack = stack.clone();
        let dialog = dialog.clone();
        qr_btn.connect_clicked(move |_| {
            if !flow.borrow_mut().scan() {
                return;
            }
            stack.set_visible_child_name(flow.borrow().state().page());

            let flow = flow.clone();
            let stack = stack.clone();
            let dialog = dialog.clone();
            let on_connected = on_connected.clone();
            glib::timeout_add_local_once(LOADING_DELAY, move || {
                if !flow.borrow_mut().authenticated() {
                    return;
                }
                stack.set_visible_child_name(flow.borrow().state().page());

                let flow = flow.clone();
                let stack = stack.clone();
                let dialog = dialog.clone();
                let on_connected = on_connected.clone();
                glib::timeout_add_local_once(SUCCESS_DELAY, move || {
                    if !flow.borrow_mut().finish() {
                        return;
                    }
                    // machine reset itself to the QR page for the next open
                    stack.set_visible_child_name(flow.borrow().state().page());
                    on_connected();
                    dialog.close();
                });
            });
        });
    }

    dialog.present();
}
