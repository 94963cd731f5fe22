mod data;
mod error;
mod http_client;
mod interaction_manager;
pub mod markdown;
mod mutations;
mod servirtium_configuration;
mod servirtium_server;
mod util;

pub use data::{Headers, InteractionData, RequestData, ResponseData};
pub use error::Error;
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use interaction_manager::{InteractionManager, MarkdownInteractionManager};
pub use mutations::{
    BodyMutation, HeadersMutation, MutationsBuilder, RequestMutation, ResponseMutation,
};
pub use servirtium_codegen::servirtium_playback_test;
pub use servirtium_codegen::servirtium_record_test;
pub use servirtium_configuration::ServirtiumConfiguration;
pub use servirtium_server::{ServirtiumMode, ServirtiumServer};
