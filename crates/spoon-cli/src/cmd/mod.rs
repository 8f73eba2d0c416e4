pub mod api;
pub mod ask;
pub mod awaken;
pub mod classify;
pub mod config;
pub mod go;
pub mod history;
pub mod login;
pub mod logout;
pub mod python;
pub mod reset;
pub mod shell;
pub mod status;
pub mod sync;
pub mod tokens;
