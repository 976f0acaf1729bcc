mod render;
mod tree;

pub use render::{RenderedLine, render, render_visible};
pub use tree::{DIRECTORY_TYPE, FileTree, NodeId, TreeNode};
