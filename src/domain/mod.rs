// Domain layer: request/result models, the normalization contract, and ports (interfaces).

pub mod contract;
pub mod model;
pub mod ports;
