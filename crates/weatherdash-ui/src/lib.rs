//! Weather form: state model, async service wiring and text presentation.

pub mod bridge;
pub mod models;
pub mod render;
pub mod services;

pub use models::{FormState, WeatherFormModel};
pub use render::{render, WeatherCard};
