pub mod camera;
pub mod sensor;

pub use camera::Camera;
pub use sensor::GeoWatch;
