pub mod api_info_dialog;
pub mod confirm_dialog;
pub mod status_bar;
