pub mod config;
pub mod logging;

pub mod assets;
pub mod bootstrap;
pub mod control;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod html;
pub mod mapping;
pub mod mirror;
pub mod naming;
pub mod pages;
pub mod render;
pub mod retry;
pub mod route;
pub mod session;
pub mod storage;

pub use mirror::{run_mirror, MirrorSummary};
