//! Command implementations

pub mod apply;
pub mod clean;
pub mod common;
pub mod history;
pub mod init;
pub mod mark;
pub mod new;
pub mod remove;
pub mod rollback;
pub mod squash;
pub mod unmark;
pub mod validate;
