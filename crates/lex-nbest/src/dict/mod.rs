//! Dictionary, connection-matrix and POS role storage.
//!
//! These are the collaborators the converter consumes: `Dictionary` supplies
//! lattice nodes per key offset, `ConnectionMatrix` supplies POS bigram
//! transition costs, and `PosTable` maps class ids to coarse roles for
//! segment boundary decisions.

pub mod connection;
mod connection_io;
mod entry;
mod pos;
mod trie_dict;
#[cfg(test)]
mod tests;

pub use connection::ConnectionMatrix;
pub use connection_io::parse_role_table;
pub use entry::DictEntry;
pub use pos::{PosRole, PosTable};
pub use trie_dict::TrieDictionary;

/// Error type for parsing dictionaries, connection matrices and role tables.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
}

pub struct SearchResult {
    pub reading: String,
    pub entries: Vec<DictEntry>,
}

pub trait Dictionary: Send + Sync {
    fn lookup(&self, reading: &str) -> Vec<DictEntry>;

    /// All readings that are prefixes of `query`, shortest first.
    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult>;
}
