pub mod anchor;
pub mod entities;
pub mod error;
pub mod mutate;
pub mod page;
pub mod pattern;
pub mod resources;
pub mod rules;
pub mod selector;
pub mod text;

pub use anchor::AnchorCounter;
pub use error::{PageError, SelectorError};
pub use page::{PageProcessor, PageRules, ProcessedPage, is_htmlish};
pub use rules::{MatchRule, PageContext, Reference, RuleSet};
pub use selector::{CssSelector, Selector};
