// Career-insights pipeline: normalize -> compose -> (generate -> sanitize -> validate) x N.
// Model calls go through the GenerationClient trait; nothing here touches the network directly.

pub mod composer;
pub mod errors;
pub mod handlers;
pub mod normalizer;
pub mod persist;
pub mod pipeline;
pub mod prompts;
pub mod sanitize;
pub mod validator;
