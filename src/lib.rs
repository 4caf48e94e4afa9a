#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod config;
pub mod dialog;
pub mod event_loop;
pub mod location_tracker;
pub mod logs;
pub mod main_screen;
pub mod map_view;
pub mod preference_db;
pub mod route;
pub mod route_store;
mod utils;
