pub mod api;
pub mod client;
pub mod dispatch;
pub mod invitations;
pub mod notifications;
pub mod panel;
pub mod polling;
pub mod session;
