pub mod carrier;
pub mod event;
pub mod family;
pub mod member;
pub mod reminder;
pub mod task;
