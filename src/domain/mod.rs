// Domain layer: phone number rules, result models and ports. No network or file access here.

pub mod model;
pub mod phone;
pub mod ports;
