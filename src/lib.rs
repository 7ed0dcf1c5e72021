pub mod constants;
pub mod gnomon_errors;
pub mod integrator;
pub mod linalg;
pub mod models;
pub mod results;
pub mod scenario;
pub mod time;

pub use gnomon_errors::GnomonError;
pub use integrator::{DormandPrince, IntegratorParams};
pub use linalg::{matrix::Matrix, quaternion::RotationQuaternion, vector::Vector};
pub use models::OdeModel;
