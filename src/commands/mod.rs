pub mod init;
pub mod inspect;
pub mod list;
pub mod transfer;
pub mod view;
