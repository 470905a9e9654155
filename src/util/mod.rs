pub mod jwt;
pub mod password;
pub mod email;
pub mod notifier;
pub mod payment;
pub mod session;
pub mod logger;
pub mod error;
