//! Domain layer: payment results, input validation, checkout requests,
//! return parameters, and the ports the application depends on.

pub mod checkout;
pub mod input;
pub mod payment;
pub mod ports;
pub mod redirect;
