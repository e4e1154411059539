// src/services/mod.rs
pub mod ask_client;
pub mod page_manager;
pub mod widget;
