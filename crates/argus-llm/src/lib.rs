pub mod mock;
pub mod parse;
pub mod prompt;
pub mod schema;

pub use mock::{MockBackend, MockReply};
pub use parse::parse_response;
pub use prompt::{build_request, ContractError};
