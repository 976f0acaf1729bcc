mod index;
mod shared;

pub use index::SnippetIndex;
pub use shared::SharedIndex;
