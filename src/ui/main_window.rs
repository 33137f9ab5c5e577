use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;

use std::cell::RefCell;
use std::rc::Rc;

use crate::model::Message;
use crate::session::Session;
use crate::transport::{Transport, REPLY_DELAY};
use crate::ui::chat_view::ChatView;
use crate::ui::sidebar::Sidebar;
use crate::ui::stage_view::StageView;
use crate::ui::{connect_dialog, message_dialog};
use crate::utils;

pub fn show_main_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("TechLeads")
        .default_width(1200)
        .default_height(760)
        .build();

    let session = Rc::new(RefCell::new(Session::load()));
    let transport = Transport::new();

    let overlay = adw::ToastOverlay::new();

    let sidebar = Sidebar::new(session.clone());
    let stage_view = StageView::new(session.clone());
    let chat = Rc::new(ChatView::new(session.clone()));

    let split = adw::Flap::builder()
        .reveal_flap(true)
        .locked(true)
        .modal(false)
        .build();
    split.set_flap(Some(&sidebar.widget()));

    let center = gtk::Box::new(gtk::Orientation::Horizontal, 0);
    center.append(&stage_view.widget());
    center.append(&gtk::Separator::new(gtk::Orientation::Vertical));
    center.append(&chat.widget());
    split.set_content(Some(&center));

    overlay.set_child(Some(&split));

    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    let title = gtk::Label::new(Some("TechLeads"));
    header.set_title_widget(Some(&title));
    container.append(&header);
    container.append(&overlay);
    window.set_content(Some(&container));

    // Selecting a funnel clears the stage filter and redraws the cards
    {
        let session = session.clone();
        let sidebar_for_cb = sidebar.clone();
        let stage_view = stage_view.clone();
        sidebar.set_on_select_funnel(Rc::new(move |id: String| {
            session.borrow_mut().select_funnel(&id);
            sidebar_for_cb.refresh_funnels();
            stage_view.refresh();
        }));
    }

    // Lead name is mirrored in the chat header
    {
        let chat = chat.clone();
        stage_view.set_on_lead_changed(Rc::new(move || {
            chat.refresh();
        }));
    }

    // The connect choreography; shared by the sidebar button and by sends
    // attempted while disconnected.
    let open_connect: Rc<dyn Fn()> = {
        let window = window.clone();
        let session = session.clone();
        let sidebar = sidebar.clone();
        let overlay = overlay.clone();
        Rc::new(move || {
            let session = session.clone();
            let sidebar = sidebar.clone();
            let overlay = overlay.clone();
            connect_dialog::show(
                &window,
                Rc::new(move || {
                    session.borrow_mut().set_connected(true);
                    sidebar.refresh_status();
                    overlay.add_toast(adw::Toast::new("WhatsApp conectado."));
                }),
            );
        })
    };
    sidebar.set_on_connect(open_connect.clone());

    {
        let window = window.clone();
        let session = session.clone();
        let sidebar_for_cb = sidebar.clone();
        let overlay = overlay.clone();
        sidebar.set_on_disconnect(Rc::new(move || {
            let confirm = gtk::Dialog::builder()
                .title("Desconectar")
                .transient_for(&window)
                .modal(true)
                .build();
            let content = gtk::Box::new(gtk::Orientation::Vertical, 0);
            content.set_margin_top(16);
            content.set_margin_bottom(16);
            content.set_margin_start(16);
            content.set_margin_end(16);
            let question = gtk::Label::new(Some("Deseja desconectar sua conta TechLeads?"));
            content.append(&question);
            confirm.set_child(Some(&content));

            let _ = confirm.add_button("Cancelar", gtk::ResponseType::Cancel);
            let out_btn = confirm.add_button("Desconectar", gtk::ResponseType::Ok);
            out_btn.add_css_class("destructive-action");
            confirm.set_default_response(gtk::ResponseType::Cancel);

            let session = session.clone();
            let sidebar = sidebar_for_cb.clone();
            let overlay = overlay.clone();
            confirm.connect_response(move |dlg, resp| {
                if resp == gtk::ResponseType::Ok {
                    session.borrow_mut().set_connected(false);
                    sidebar.refresh_status();
                    overlay.add_toast(adw::Toast::new("Conta desconectada."));
                }
                dlg.close();
            });
            confirm.present();
        }));
    }

    // Quick-add targets the selected stage, or the first one of the funnel
    {
        let window = window.clone();
        let session = session.clone();
        let stage_view = stage_view.clone();
        let overlay = overlay.clone();
        sidebar.set_on_quick_add(Rc::new(move |kind| {
            let target = session.borrow().quick_add_target();
            let Some((funnel_id, stage_id)) = target else {
                overlay.add_toast(adw::Toast::new("Selecione um funil primeiro na barra lateral."));
                return;
            };
            let stage_view = stage_view.clone();
            message_dialog::show(
                &window,
                session.clone(),
                Some(kind),
                funnel_id,
                stage_id,
                Rc::new(move || stage_view.refresh()),
            );
        }));
    }

    // The send flow: reject-while-disconnected before any delay, then the
    // simulated latency, then the optional generated reply.
    {
        let session = session.clone();
        let stage_view_for_cb = stage_view.clone();
        let chat = chat.clone();
        let overlay = overlay.clone();
        let open_connect = open_connect.clone();
        let transport = transport.clone();
        stage_view.set_on_send(Rc::new(move |message: Message| {
            if session.borrow().sending().is_some() {
                return;
            }
            if !session.borrow().is_connected() {
                open_connect();
                return;
            }

            session.borrow_mut().begin_send(&message.id);
            stage_view_for_cb.refresh();

            let ctx = session.borrow().lead().clone();
            let transport_for_send = transport.clone();
            let msg = message.clone();
            let rx = utils::run_async_to_main(async move {
                transport_for_send.send(&msg, &ctx, true).await
            });

            let session = session.clone();
            let stage_view = stage_view_for_cb.clone();
            let chat = chat.clone();
            let overlay = overlay.clone();
            let transport = transport.clone();
            rx.attach(None, move |res| {
                match res {
                    Ok(entry) => {
                        let sent_text = entry.text.clone();
                        {
                            let mut s = session.borrow_mut();
                            s.end_send();
                            s.push_entry(entry);
                        }
                        stage_view.refresh();
                        chat.refresh();

                        if session.borrow().settings().auto_reply {
                            schedule_lead_reply(
                                session.clone(),
                                chat.clone(),
                                transport.clone(),
                                sent_text,
                            );
                        }
                    }
                    Err(err) => {
                        session.borrow_mut().end_send();
                        stage_view.refresh();
                        overlay.add_toast(adw::Toast::new(&format!("Falha no envio: {err}")));
                    }
                }
                glib::ControlFlow::Continue
            });
        }));
    }

    sidebar.refresh_status();
    sidebar.refresh_funnels();
    stage_view.refresh();
    chat.refresh();

    window.present();
}

/// Two seconds after a send the lead "types", then the generated (or
/// canned) reply lands in the transcript. Failure never surfaces here.
fn schedule_lead_reply(
    session: Rc<RefCell<Session>>,
    chat: Rc<ChatView>,
    transport: Transport,
    sent_text: String,
) {
    glib::timeout_add_local_once(REPLY_DELAY, move || {
        chat.set_typing(true);

        let settings = session.borrow().settings().clone();
        let ctx = session.borrow().lead().clone();
        let rx = utils::run_async_to_main(async move {
            transport.lead_reply(&settings, &sent_text, &ctx).await
        });

        let session = session.clone();
        let chat = chat.clone();
        rx.attach(None, move |entry| {
            chat.set_typing(false);
            session.borrow_mut().push_entry(entry);
            chat.refresh();
            glib::ControlFlow::Continue
        });
    });
}
