pub mod chat_view;
pub mod connect_dialog;
pub mod main_window;
pub mod message_dialog;
pub mod settings_panel;
pub mod sidebar;
pub mod stage_view;
