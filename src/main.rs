mod app;
mod connect;
mod model;
mod session;
mod storage;
mod template;
mod transport;
mod ui;
mod utils;

use adw::prelude::*;
use adw::Application;

fn main() {
    env_logger::init();
    let app = Application::builder()
        .application_id("com.techview.TechLeads")
        .build();
    app.connect_activate(|app| {
        if let Err(e) = crate::storage::init() {
            log::warn!("storage init failed, running with in-memory defaults: {e}");
        }
        crate::app::build_ui(app);
    });
    app.run();
}
