// Domain layer: price-schedule models and ports (interfaces).

pub mod model;
pub mod ports;
