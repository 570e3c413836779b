pub mod application;
pub mod completion;
pub mod notification;
pub mod project;
pub mod user;
