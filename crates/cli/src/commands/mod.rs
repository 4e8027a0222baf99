pub mod chat;
pub mod doctor;
pub mod gateway;
pub mod onboard;
pub mod topics;
