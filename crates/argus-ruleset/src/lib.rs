pub mod frontmatter;
pub mod parser;

pub use parser::{parse_ruleset, RulesetError};
