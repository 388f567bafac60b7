pub mod config;
pub mod gateway;
pub mod openai_api_agent;
pub mod scripted;

pub use gateway::{ChatCompletion, CompletionGateway, GatewayError};
pub use openai_api_agent::OpenAIChatClient;
pub use scripted::ScriptedCompletion;
