use crate::twothree::node::NodeRef;
use crate::twothree::stack::BacktrackStack;
use crate::twothree::TraversalOrder;
use std::iter::FusedIterator;

#[derive(Debug, Clone)]
struct Frame<K> {
    node: NodeRef<K>,
    cursor: usize,
}

enum Visit {
    Emit(usize),
    Descend(usize),
    Finished,
}

enum Next<K> {
    Key(K),
    Child(NodeRef<K>),
    Pop,
}

/// Lazy walk over the keys of a tree in one of the three depth-first orders.
///
/// Each frame remembers how far through its node the walk has got, so the
/// iterator can pause between any two keys. Cloning it gives an independent
/// walk from the same point.
#[derive(Debug, Clone)]
pub struct Traversal<K> {
    order: TraversalOrder,
    frames: BacktrackStack<Frame<K>>,
}

impl<K: Clone> Traversal<K> {
    pub(super) fn new(root: Option<NodeRef<K>>, order: TraversalOrder) -> Self {
        let mut frames = BacktrackStack::new();
        if let Some(node) = root {
            frames.push(Frame { node, cursor: 0 });
        }
        Traversal { order, frames }
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }
}

// what to do at `cursor` within a node holding `keys` keys and `children` children
fn visit(order: TraversalOrder, cursor: usize, keys: usize, children: usize) -> Visit {
    match order {
        TraversalOrder::Preorder => {
            if cursor < keys {
                Visit::Emit(cursor)
            } else if cursor < keys + children {
                Visit::Descend(cursor - keys)
            } else {
                Visit::Finished
            }
        }
        TraversalOrder::Postorder => {
            if cursor < children {
                Visit::Descend(cursor)
            } else if cursor < children + keys {
                Visit::Emit(cursor - children)
            } else {
                Visit::Finished
            }
        }
        TraversalOrder::Inorder if children == 0 => {
            if cursor < keys {
                Visit::Emit(cursor)
            } else {
                Visit::Finished
            }
        }
        // child, key, child, key, child
        TraversalOrder::Inorder => {
            if cursor > 2 * keys {
                Visit::Finished
            } else if cursor % 2 == 0 {
                Visit::Descend(cursor / 2)
            } else {
                Visit::Emit(cursor / 2)
            }
        }
    }
}

impl<K: Clone> Iterator for Traversal<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        loop {
            let next = {
                let frame = self.frames.peek_mut()?;
                let cursor = frame.cursor;
                frame.cursor += 1;

                let node = frame.node.borrow();
                let next = match visit(self.order, cursor, node.keys.len(), node.children.len()) {
                    Visit::Emit(i) => Next::Key(node.keys[i].clone()),
                    Visit::Descend(i) => Next::Child(node.children[i].clone()),
                    Visit::Finished => Next::Pop,
                };
                next
            };

            match next {
                Next::Key(key) => return Some(key),
                Next::Child(node) => self.frames.push(Frame { node, cursor: 0 }),
                Next::Pop => {
                    self.frames.pop();
                }
            }
        }
    }
}

impl<K: Clone> FusedIterator for Traversal<K> {}
