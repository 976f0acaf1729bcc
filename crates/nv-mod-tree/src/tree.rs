use std::path::{Path, PathBuf};

/// Index of a node inside its `FileTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

pub const DIRECTORY_TYPE: &str = "directory";

#[derive(Debug, Clone)]
pub struct TreeNode {
    name: String,
    path: PathBuf,
    file_type: String,
    is_dir: bool,
    open: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Language tag for files, "directory" for directories.
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Always false on files.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Always empty on files.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Lazily expandable view of the data directory.
///
/// Nodes live in an arena and refer to each other by `NodeId`; snippets are
/// linked to nodes only through their path. The two node lists are caches:
/// `toggle`/`open` refresh the open list themselves, bulk
/// construction through `add_dir`/`add_file` must be followed by `recompute`.
#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<TreeNode>,
    all_nodes: Vec<NodeId>,
    open_nodes: Vec<NodeId>,
}

impl FileTree {
    /// Tree with a single closed root directory.
    pub fn new(root_name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        let root = TreeNode {
            name: root_name.into(),
            path: root_path.into(),
            file_type: DIRECTORY_TYPE.to_string(),
            is_dir: true,
            open: false,
            parent: None,
            children: Vec::new(),
        };
        let mut tree = Self { nodes: vec![root], all_nodes: Vec::new(), open_nodes: Vec::new() };
        tree.recompute();
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_dir(&mut self, parent: NodeId, name: impl Into<String>, path: impl Into<PathBuf>) -> Option<NodeId> {
        self.push_child(parent, name.into(), path.into(), DIRECTORY_TYPE.to_string(), true)
    }

    pub fn add_file(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        file_type: impl Into<String>,
    ) -> Option<NodeId> {
        self.push_child(parent, name.into(), path.into(), file_type.into(), false)
    }

    fn push_child(&mut self, parent: NodeId, name: String, path: PathBuf, file_type: String, is_dir: bool) -> Option<NodeId> {
        if !self.nodes[parent.0].is_dir {
            tracing::debug!(parent = %self.nodes[parent.0].path.display(), "refusing to add a child to a file node");
            return None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode { name, path, file_type, is_dir, open: false, parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    /// Flip a directory's open flag. No-op on files.
    pub fn toggle(&mut self, id: NodeId) {
        let open = self.nodes[id.0].open;
        self.set_open(id, !open);
    }

    pub fn open(&mut self, id: NodeId) {
        self.set_open(id, true);
    }

    fn set_open(&mut self, id: NodeId, open: bool) {
        let node = &mut self.nodes[id.0];
        if !node.is_dir || node.open == open {
            return;
        }
        node.open = open;
        self.recompute_open_list();
    }

    /// Open or close every directory at once.
    pub fn set_all_open(&mut self, open: bool) {
        for node in self.nodes.iter_mut().filter(|n| n.is_dir) {
            node.open = open;
        }
        self.recompute_open_list();
    }

    /// Preorder walk that only descends into open directories.
    pub fn recompute_open_list(&mut self) {
        let mut list = Vec::with_capacity(self.open_nodes.len());
        self.walk(self.root(), false, &mut list);
        self.open_nodes = list;
    }

    /// Preorder walk over every node regardless of open state.
    pub fn recompute_full_list(&mut self) {
        let mut list = Vec::with_capacity(self.nodes.len());
        self.walk(self.root(), true, &mut list);
        self.all_nodes = list;
    }

    pub fn recompute(&mut self) {
        self.recompute_full_list();
        self.recompute_open_list();
    }

    fn walk(&self, id: NodeId, all: bool, out: &mut Vec<NodeId>) {
        out.push(id);
        let node = &self.nodes[id.0];
        if node.is_dir && (node.open || all) {
            for &child in &node.children {
                self.walk(child, all, out);
            }
        }
    }

    /// Nodes whose whole ancestor chain is open, in display order.
    pub fn open_nodes(&self) -> &[NodeId] {
        &self.open_nodes
    }

    /// Every node in preorder.
    pub fn all_nodes(&self) -> &[NodeId] {
        &self.all_nodes
    }

    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.path == path).map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root/
    ///   src/
    ///     a.rs
    ///     deep/
    ///       b.rs
    ///   c.py
    fn sample() -> (FileTree, NodeId, NodeId) {
        let mut tree = FileTree::new("root", "/r");
        let root = tree.root();
        let src = tree.add_dir(root, "src", "/r/src").unwrap();
        tree.add_file(src, "a.rs", "/r/src/a.rs", "rust").unwrap();
        let deep = tree.add_dir(src, "deep", "/r/src/deep").unwrap();
        tree.add_file(deep, "b.rs", "/r/src/deep/b.rs", "rust").unwrap();
        tree.add_file(root, "c.py", "/r/c.py", "python").unwrap();
        tree.recompute();
        (tree, src, deep)
    }

    fn names(tree: &FileTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.node(id).name().to_string()).collect()
    }

    #[test]
    fn test_full_list_ignores_open_state() {
        let (tree, _, _) = sample();
        assert_eq!(names(&tree, tree.all_nodes()), vec!["root", "src", "a.rs", "deep", "b.rs", "c.py"]);
        assert_eq!(names(&tree, tree.open_nodes()), vec!["root"]);
    }

    #[test]
    fn test_open_list_requires_full_ancestor_chain() {
        let (mut tree, _, deep) = sample();
        tree.open(deep);
        assert_eq!(names(&tree, tree.open_nodes()), vec!["root"]);

        let root = tree.root();
        tree.open(root);
        assert_eq!(names(&tree, tree.open_nodes()), vec!["root", "src", "c.py"]);
    }

    #[test]
    fn test_toggle_closed_then_open_restores_sequence() {
        let (mut tree, src, deep) = sample();
        let root = tree.root();
        tree.open(root);
        tree.open(src);
        tree.open(deep);
        let before = tree.open_nodes().to_vec();
        assert_eq!(names(&tree, &before), vec!["root", "src", "a.rs", "deep", "b.rs", "c.py"]);

        tree.toggle(src);
        assert_eq!(names(&tree, tree.open_nodes()), vec!["root", "src", "c.py"]);

        tree.toggle(src);
        assert_eq!(tree.open_nodes(), before.as_slice());
    }

    #[test]
    fn test_toggle_file_is_noop() {
        let (mut tree, _, _) = sample();
        let file = tree.find(Path::new("/r/c.py")).unwrap();
        tree.toggle(file);
        assert!(!tree.node(file).is_open());
    }

    #[test]
    fn test_file_nodes_never_get_children() {
        let (mut tree, _, _) = sample();
        let file = tree.find(Path::new("/r/c.py")).unwrap();
        assert!(tree.add_file(file, "x.rs", "/r/c.py/x.rs", "rust").is_none());
        assert!(tree.node(file).children().is_empty());
    }

    #[test]
    fn test_parent_links() {
        let (tree, src, deep) = sample();
        assert_eq!(tree.node(deep).parent(), Some(src));
        assert_eq!(tree.node(tree.root()).parent(), None);
        assert_eq!(tree.node(src).file_type(), DIRECTORY_TYPE);
    }

    #[test]
    fn test_set_all_open() {
        let (mut tree, _, _) = sample();
        tree.set_all_open(true);
        assert_eq!(tree.open_nodes(), tree.all_nodes());
        tree.set_all_open(false);
        assert_eq!(tree.open_nodes().len(), 1);
    }
}
