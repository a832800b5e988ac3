#![allow(dead_code)]

pub mod env;
pub mod host;
pub mod images;
