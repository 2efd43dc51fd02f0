// Domain layer: models, jobs, encoding profiles and ports (interfaces).

pub mod job;
pub mod model;
pub mod ports;
pub mod profile;
