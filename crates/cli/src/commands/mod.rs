//! Command handlers for the Floorwise CLI.

pub mod ask;
pub mod chat;
pub mod filters;
pub mod prompts;
pub mod serve;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use filters::FiltersCommand;
pub use prompts::PromptsCommand;
pub use serve::ServeCommand;
