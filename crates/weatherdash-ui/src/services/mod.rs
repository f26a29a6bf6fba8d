pub mod form_service;

pub use form_service::{
    request_probe, request_submit, FormServiceMessage, FormServices, LookupOrigin,
};
