#![cfg(test)]
#![allow(dead_code)]

pub mod pac_server;

pub use pac_server::TestPacServer;
