//! Account recovery: token carrier, form validation, auth gateway client,
//! session holder and the per-screen flow controllers.

pub mod flows;
pub mod gateway;
pub mod session;
pub mod token;
pub mod validate;
