//! Agent and skill documents: discovery, front matter parsing and indexing.
//!
//! Agents are `*.agent.md` files. Skills are `SKILL.md` files, one per folder,
//! somewhere below a `skills/` directory.

pub mod discover;
pub mod index;
pub mod parser;

pub use discover::{discover, Candidate};
pub use index::CatalogIndex;
pub use parser::{parse_document, parse_front_matter, FrontMatter, ParsedDocument};
