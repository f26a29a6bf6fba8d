pub mod relay;

pub use relay::{SubmissionClient, SubmissionRequest, SubmissionResponse, SubmitError};
