#![allow(dead_code)]

pub mod fixture;
pub mod static_server;
