pub mod analyses_list;
pub mod card_view;
pub mod config_form;
pub mod menu;
