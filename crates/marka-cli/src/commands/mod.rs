mod api_key;
mod serve;

pub use api_key::ApiKeyCommand;
pub use serve::ServeCommand;
