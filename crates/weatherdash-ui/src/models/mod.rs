pub mod form_model;

pub use form_model::{FormState, WeatherFormModel};
