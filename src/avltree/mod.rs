mod iter;
mod union;

pub use iter::Iter;

use crate::set::PersistentSet;
use std::{
    cmp::{max, Ordering},
    fmt::Debug,
    hint,
    sync::Arc,
};

/// Persistent AVL tree used as an ordered set.
///
/// Every update returns a new tree and leaves the old one valid. The new version
/// shares all subtrees off the updated path with the old version.
pub struct AVLTree<K> {
    root: Link<K>,
    len: usize,
}

/// `None` is the empty tree, shared by every leaf.
type Link<K> = Option<Arc<Node<K>>>;

#[derive(Debug)]
struct Node<K> {
    key: K,
    height: usize,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Clone for AVLTree<K> {
    fn clone(&self) -> Self {
        AVLTree {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K: Debug> Debug for AVLTree<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AVLTree")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

impl<K> Default for AVLTree<K> {
    fn default() -> Self {
        AVLTree { root: None, len: 0 }
    }
}

fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K> Node<K> {
    fn new(key: K, left: Link<K>, right: Link<K>) -> Node<K> {
        let height = max(height(&left), height(&right)) + 1;

        Node {
            key,
            height,
            left,
            right,
        }
    }

    fn leaf(key: K) -> Node<K> {
        Node {
            key,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// get difference of the heights from the childs
fn get_factor<K>(left: &Link<K>, right: &Link<K>) -> isize {
    let (left_height, right_height) = (height(left), height(right));

    if left_height > right_height {
        (left_height - right_height) as isize
    } else {
        -((right_height - left_height) as isize)
    }
}

fn node_factor<K>(node: &Node<K>) -> isize {
    get_factor(&node.left, &node.right)
}

impl<K: Clone> Node<K> {
    /// rotate left around the parent made of (key, left, right)
    ///
    /// Change Parent-Right Child to Left Child-Parent, then return new parent(copy of old right child).
    fn rotate_left(key: K, left: Link<K>, right: &Node<K>) -> Arc<Node<K>> {
        let new_left = Arc::new(Node::new(key, left, right.left.clone()));

        Arc::new(Node::new(
            right.key.clone(),
            Some(new_left),
            right.right.clone(),
        ))
    }

    /// rotate right around the parent made of (key, left, right)
    ///
    /// Change Left Child-Parent to Parent-Right Child, then return new parent(copy of old left child).
    fn rotate_right(key: K, left: &Node<K>, right: Link<K>) -> Arc<Node<K>> {
        let new_right = Arc::new(Node::new(key, left.right.clone(), right));

        Arc::new(Node::new(
            left.key.clone(),
            left.left.clone(),
            Some(new_right),
        ))
    }

    /// build the parent made of (key, left, right), rotating if the heights of left and
    /// right differ by two
    ///
    /// Only the parent and the rotated nodes are allocated. Grandchildren are shared.
    fn balance(key: K, left: Link<K>, right: Link<K>) -> Arc<Node<K>> {
        match get_factor(&left, &right) {
            -2 => {
                let right = match right {
                    Some(right) => right,
                    None => unreachable!(),
                };

                if node_factor(&right) > 0 {
                    // right-left case: rotate the right child right first
                    let right_left = match &right.left {
                        Some(node) => node,
                        None => unreachable!(),
                    };
                    let new_right = Node::rotate_right(
                        right.key.clone(),
                        right_left,
                        right.right.clone(),
                    );
                    Node::rotate_left(key, left, &new_right)
                } else {
                    Node::rotate_left(key, left, &right)
                }
            }
            2 => {
                let left = match left {
                    Some(left) => left,
                    None => unreachable!(),
                };

                if node_factor(&left) < 0 {
                    // left-right case: rotate the left child left first
                    let left_right = match &left.right {
                        Some(node) => node,
                        None => unreachable!(),
                    };
                    let new_left =
                        Node::rotate_left(left.key.clone(), left.left.clone(), left_right);
                    Node::rotate_right(key, &new_left, right)
                } else {
                    Node::rotate_right(key, &left, right)
                }
            }
            -1..=1 => Arc::new(Node::new(key, left, right)),
            _ => unreachable!(),
        }
    }
}

/// rebuild the path from `link` down to the position of `key`
///
/// Return the new subtree and whether the key was not there before.
fn insert_node<K: Ord + Clone>(link: &Link<K>, key: K) -> (Arc<Node<K>>, bool) {
    let node = match link {
        Some(node) => node,
        None => return (Arc::new(Node::leaf(key)), true),
    };

    match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, inserted) = insert_node(&node.left, key);
            (
                Node::balance(node.key.clone(), Some(left), node.right.clone()),
                inserted,
            )
        }
        Ordering::Greater => {
            let (right, inserted) = insert_node(&node.right, key);
            (
                Node::balance(node.key.clone(), node.left.clone(), Some(right)),
                inserted,
            )
        }
        // push semantics: the new key takes the old one's place
        Ordering::Equal => (
            Arc::new(Node {
                key,
                height: node.height,
                left: node.left.clone(),
                right: node.right.clone(),
            }),
            false,
        ),
    }
}

impl<K> AVLTree<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// get the height of the tree
    pub fn get_height(&self) -> usize {
        height(&self.root)
    }

    /// in-order iterator over the keys
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Traverse the whole tree and return the number of nodes visited.
    pub fn force(&self) -> usize {
        self.iter().fold(0, |visited, key| {
            hint::black_box(key);
            visited + 1
        })
    }

    /// Return true if both trees have the same root node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Check the AVL invariant and the cached heights of every node.
    pub fn is_balanced(&self) -> bool {
        fn check<K>(link: &Link<K>) -> Option<usize> {
            match link {
                None => Some(0),
                Some(node) => {
                    let left = check(&node.left)?;
                    let right = check(&node.right)?;
                    let h = max(left, right) + 1;

                    if left.abs_diff(right) <= 1 && node.height == h {
                        Some(h)
                    } else {
                        None
                    }
                }
            }
        }

        check(&self.root).is_some()
    }
}

impl<K: Ord> AVLTree<K> {
    /// Lookup the stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.key),
            };
        }

        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Check that the in-order traversal is strictly increasing.
    pub fn is_ordered(&self) -> bool {
        let mut iter = self.iter();
        let mut prev = match iter.next() {
            Some(key) => key,
            None => return true,
        };

        for key in iter {
            if *prev >= *key {
                return false;
            }
            prev = key;
        }

        true
    }
}

impl<K: Ord + Clone> AVLTree<K> {
    /// Return a new tree with `key` inserted.
    ///
    /// If an equal key is present, the new key replaces it at the same position.
    pub fn insert(&self, key: K) -> Self {
        let (root, inserted) = insert_node(&self.root, key);

        AVLTree {
            root: Some(root),
            len: if inserted { self.len + 1 } else { self.len },
        }
    }
}

impl<K: Ord + Clone> FromIterator<K> for AVLTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        iter.into_iter()
            .fold(AVLTree::new(), |tree, key| tree.insert(key))
    }
}

impl<'a, K> IntoIterator for &'a AVLTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + Clone> PersistentSet<K> for AVLTree<K> {
    fn empty() -> Self {
        AVLTree::new()
    }

    fn insert(&self, key: K) -> Self {
        AVLTree::insert(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        AVLTree::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn union(&self, other: &Self) -> Self {
        AVLTree::union(self, other)
    }

    fn force(&self) -> usize {
        AVLTree::force(self)
    }
}
