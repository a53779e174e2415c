//! Pseudocode listings shown next to each animation
//!
//! Line 0 of every listing is a `// title` header; steppers highlight lines
//! by index and never point past the end of their listing.

/// Every animated operation with its own listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum OperationKind {
    /// Breadth-first graph traversal
    Bfs,
    /// Depth-first graph traversal (explicit stack)
    Dfs,
    /// Binary search tree lookup
    BstSearch,
    /// Binary search tree insertion
    BstInsert,
    /// Binary search tree deletion
    BstDelete,
    /// In-order tree walk
    InOrder,
    /// Pre-order tree walk
    PreOrder,
    /// Post-order tree walk
    PostOrder,
    /// Linked list value search
    ListSearch,
    /// Linked list positional insert
    ListInsert,
    /// Linked list removal by value
    ListRemove,
}

/// Ordered pseudocode lines for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Listing {
    kind: OperationKind,
    lines: Vec<String>,
}

impl Listing {
    /// Build a listing from a title and body lines
    pub fn new(kind: OperationKind, title: &str, body: &[&str]) -> Self {
        let mut lines = Vec::with_capacity(body.len() + 1);
        lines.push(format!("// {title}"));
        lines.extend(body.iter().map(|line| line.to_string()));
        Self { kind, lines }
    }

    /// Built-in listing for an operation
    pub fn for_operation(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Bfs => Self::new(
                kind,
                "Breadth-First Search (BFS)",
                &[
                    "put START in the queue and mark it visited",
                    "while the queue is not empty:",
                    "    take the front node out (call it u)",
                    "    for each neighbor v of u (ascending):",
                    "        if v is new: mark visited, parent[v] = u, enqueue v",
                    "the queue is empty: done",
                ],
            ),
            OperationKind::Dfs => Self::new(
                kind,
                "Depth-First Search (DFS), stack version",
                &[
                    "push START on the stack and mark it visited",
                    "while the stack is not empty:",
                    "    pop the top node (call it u)",
                    "    for each neighbor v of u (ascending):",
                    "        if v is new: mark visited, parent[v] = u, push v",
                    "the stack is empty: done",
                ],
            ),
            OperationKind::BstSearch => Self::new(
                kind,
                "Search(x)",
                &[
                    "if node == null",
                    "    return not found",
                    "if node.key == x",
                    "    return node",
                    "if node.key < x",
                    "    search right subtree",
                    "else search left subtree",
                ],
            ),
            OperationKind::BstInsert => Self::new(
                kind,
                "Insert(x)",
                &[
                    "if root == null: root = new Node(x)",
                    "cur = root",
                    "if x < cur.key: go left",
                    "if x > cur.key: go right",
                    "repeat until null, then attach new Node(x)",
                    "if x == cur.key: already present",
                ],
            ),
            OperationKind::BstDelete => Self::new(
                kind,
                "Delete(x)",
                &[
                    "if node == null: return (not found)",
                    "if x < node.key: delete in left subtree",
                    "if x > node.key: delete in right subtree",
                    "found: node.key == x",
                    "    if node has at most one child: replace node by that child",
                    "    succ = min(node.right)",
                    "    node.key = succ.key; delete succ from right subtree",
                ],
            ),
            OperationKind::InOrder => Self::new(
                kind,
                "Inorder(node)",
                &[
                    "if node == null: return",
                    "inorder(node.left)",
                    "visit(node)",
                    "inorder(node.right)",
                ],
            ),
            OperationKind::PreOrder => Self::new(
                kind,
                "Preorder(node)",
                &[
                    "if node == null: return",
                    "visit(node)",
                    "preorder(node.left)",
                    "preorder(node.right)",
                ],
            ),
            OperationKind::PostOrder => Self::new(
                kind,
                "Postorder(node)",
                &[
                    "if node == null: return",
                    "postorder(node.left)",
                    "postorder(node.right)",
                    "visit(node)",
                ],
            ),
            OperationKind::ListSearch => Self::new(
                kind,
                "Search(x)",
                &[
                    "i = 0; cur = head",
                    "while cur != null:",
                    "    if cur.val == x: return i",
                    "    i++, cur = cur.next",
                    "return -1",
                ],
            ),
            OperationKind::ListInsert => Self::new(
                kind,
                "Insert(idx, x)",
                &[
                    "if idx == 0: head = new Node(x, next = head)",
                    "else: prev = nodeAt(idx - 1)",
                    "n = new Node(x); n.next = prev.next; prev.next = n",
                    "rebuild back-links if doubly linked; relayout",
                ],
            ),
            OperationKind::ListRemove => Self::new(
                kind,
                "Remove(x)",
                &[
                    "prev = dummy -> head; cur = head",
                    "while cur != null and cur.val != x: prev = cur; cur = cur.next",
                    "if cur != null: prev.next = cur.next",
                    "rebuild back-links if doubly linked; relayout",
                ],
            ),
        }
    }

    /// Operation this listing belongs to
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Number of lines, header included
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false: every listing carries its header line
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text of a line, `None` past the end
    pub fn select_line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// All lines in order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Append an annotation line (e.g. an outcome note) and return its index
    pub fn annotate(&mut self, note: &str) -> usize {
        self.lines.push(format!("// {note}"));
        self.lines.len() - 1
    }
}
