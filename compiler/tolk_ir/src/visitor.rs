//! Pre-order traversal over a syntax subtree.

use crate::SyntaxNode;

/// What to do after visiting a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
    Stop,
}

/// Visit `root` and its descendants in source order.
///
/// Returns `true` if the callback stopped the walk early. Iterative, so
/// arbitrarily deep trees cannot overflow the stack.
pub fn walk(root: &SyntaxNode, mut visit: impl FnMut(&SyntaxNode) -> Walk) -> bool {
    let tree = root.tree();
    let mut stack = vec![root.id()];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        match visit(&node) {
            Walk::Stop => return true,
            Walk::SkipChildren => {}
            Walk::Continue => {
                stack.extend(tree.child_slots(id).iter().rev().map(|child| child.node));
            }
        }
    }
    false
}
