pub mod panel_handler;
