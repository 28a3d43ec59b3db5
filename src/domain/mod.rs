// Domain layer: the assessment model and the ports the builder talks through.

pub mod model;
pub mod ports;
