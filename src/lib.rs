//! Rotating backups for a project directory: upload today's archive to a
//! Drive folder, then apply a grandfather-father-son retention policy to
//! the local and remote backup catalogs independently.

pub mod catalog;
pub mod config;
pub mod drive;
pub mod error;
pub mod notify;
pub mod retention;
pub mod rotation;
pub mod run;
