pub mod request;
pub mod response;

pub use request::GenerationRequest;
pub use response::{Choice, GenerationResponse, Usage, count_tokens};
