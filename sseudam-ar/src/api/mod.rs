//! HTTP API handlers for sseudam-ar

pub mod analysis;
pub mod camera;
pub mod health;
pub mod sse;

pub use analysis::analysis_routes;
pub use camera::camera_routes;
pub use health::health_routes;
pub use sse::event_routes;
