//! Persistent ordered set.
//!
//! An immutable red-black tree whose nodes are shared between versions through `Arc`
//! handles. `insert` and `remove` rebuild only the path from the root to the modified
//! position and return a new set, every other subtree is reused. Previously returned sets
//! stay valid, so any number of threads can read any versions without locking.
//!
//! Rebalancing after insertion resolves the four red-red rotation cases. Removal fuses the
//! children of the removed node and repairs the black height with `balance_left` and
//! `balance_right`.

use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
  Red,
  Black,
}

use Color::{Black, Red};

type Link<T> = Option<Arc<Node<T>>>;

struct Node<T> {
  color: Color,
  key: T,
  left: Link<T>,
  right: Link<T>,
}

fn new_node<T>(color: Color, key: T, left: Link<T>, right: Link<T>) -> Arc<Node<T>> {
  Arc::new(Node {
    color,
    key,
    left,
    right,
  })
}

fn is_red<T>(link: &Link<T>) -> bool {
  matches!(link, Some(node) if node.color == Red)
}

// Leaves are black as well, but the repair cases need a non-empty black node.
fn is_black_node<T>(link: &Link<T>) -> bool {
  matches!(link, Some(node) if node.color == Black)
}

impl<T: Clone> Node<T> {
  fn with_color(&self, color: Color) -> Arc<Node<T>> {
    new_node(color, self.key.clone(), self.left.clone(), self.right.clone())
  }
}

fn blacken<T: Clone>(node: Arc<Node<T>>) -> Arc<Node<T>> {
  match node.color {
    Black => node,
    Red => node.with_color(Black),
  }
}

// ====== Insertion =====

/// Rotates a black node with a red child that has a red child of its own.
fn balance<T: Clone>(color: Color, key: T, left: Link<T>, right: Link<T>) -> Arc<Node<T>> {
  if color == Black {
    if let Some(l) = &left {
      if l.color == Red {
        if let Some(ll) = &l.left {
          if ll.color == Red {
            return new_node(
              Red,
              l.key.clone(),
              Some(ll.with_color(Black)),
              Some(new_node(Black, key, l.right.clone(), right)),
            );
          }
        }
        if let Some(lr) = &l.right {
          if lr.color == Red {
            return new_node(
              Red,
              lr.key.clone(),
              Some(new_node(Black, l.key.clone(), l.left.clone(), lr.left.clone())),
              Some(new_node(Black, key, lr.right.clone(), right)),
            );
          }
        }
      }
    }

    if let Some(r) = &right {
      if r.color == Red {
        if let Some(rl) = &r.left {
          if rl.color == Red {
            return new_node(
              Red,
              rl.key.clone(),
              Some(new_node(Black, key, left, rl.left.clone())),
              Some(new_node(Black, r.key.clone(), rl.right.clone(), r.right.clone())),
            );
          }
        }
        if let Some(rr) = &r.right {
          if rr.color == Red {
            return new_node(
              Red,
              r.key.clone(),
              Some(new_node(Black, key, left, r.left.clone())),
              Some(rr.with_color(Black)),
            );
          }
        }
      }
    }
  }

  new_node(color, key, left, right)
}

/// Returns the new subtree and whether the key was not present before.
fn insert<T: Ord + Clone>(link: &Link<T>, key: T) -> (Arc<Node<T>>, bool) {
  let node = match link {
    None => return (new_node(Red, key, None, None), true),
    Some(node) => node,
  };

  match key.cmp(&node.key) {
    Ordering::Less => {
      let (left, added) = insert(&node.left, key);
      if !added {
        return (node.clone(), false);
      }
      let balanced = balance(node.color, node.key.clone(), Some(left), node.right.clone());
      (balanced, true)
    }
    Ordering::Greater => {
      let (right, added) = insert(&node.right, key);
      if !added {
        return (node.clone(), false);
      }
      let balanced = balance(node.color, node.key.clone(), node.left.clone(), Some(right));
      (balanced, true)
    }
    Ordering::Equal => (node.clone(), false),
  }
}

// ====== Removal =====

/// `balance` extended with the case of two red children, used while repairing removals.
fn balance_removal<T: Clone>(key: T, left: Link<T>, right: Link<T>) -> Arc<Node<T>> {
  match (&left, &right) {
    (Some(l), Some(r)) if l.color == Red && r.color == Red => new_node(
      Red,
      key,
      Some(l.with_color(Black)),
      Some(r.with_color(Black)),
    ),
    _ => balance(Black, key, left, right),
  }
}

/// Repairs a node whose left subtree lost one unit of black height.
fn balance_left<T: Clone>(node: Arc<Node<T>>) -> Result<Arc<Node<T>>> {
  if let Some(l) = &node.left {
    if l.color == Red {
      return Ok(new_node(
        Red,
        node.key.clone(),
        Some(l.with_color(Black)),
        node.right.clone(),
      ));
    }
  }

  if let Some(r) = &node.right {
    if r.color == Black {
      return Ok(balance_removal(
        node.key.clone(),
        node.left.clone(),
        Some(r.with_color(Red)),
      ));
    }
    if let Some(rl) = &r.left {
      if rl.color == Black {
        let rr = r
          .right
          .as_ref()
          .ok_or(Error::StructuralInvariantBroken("balance_left"))?;
        let new_right = balance_removal(r.key.clone(), rl.right.clone(), Some(rr.with_color(Red)));
        return Ok(new_node(
          Red,
          rl.key.clone(),
          Some(new_node(Black, node.key.clone(), node.left.clone(), rl.left.clone())),
          Some(new_right),
        ));
      }
    }
  }

  Err(Error::StructuralInvariantBroken("balance_left"))
}

/// Repairs a node whose right subtree lost one unit of black height.
fn balance_right<T: Clone>(node: Arc<Node<T>>) -> Result<Arc<Node<T>>> {
  if let Some(r) = &node.right {
    if r.color == Red {
      return Ok(new_node(
        Red,
        node.key.clone(),
        node.left.clone(),
        Some(r.with_color(Black)),
      ));
    }
  }

  if let Some(l) = &node.left {
    if l.color == Black {
      return Ok(balance_removal(
        node.key.clone(),
        Some(l.with_color(Red)),
        node.right.clone(),
      ));
    }
    if let Some(lr) = &l.right {
      if lr.color == Black {
        let ll = l
          .left
          .as_ref()
          .ok_or(Error::StructuralInvariantBroken("balance_right"))?;
        let new_left = balance_removal(l.key.clone(), Some(ll.with_color(Red)), lr.left.clone());
        return Ok(new_node(
          Red,
          lr.key.clone(),
          Some(new_left),
          Some(new_node(Black, node.key.clone(), lr.right.clone(), node.right.clone())),
        ));
      }
    }
  }

  Err(Error::StructuralInvariantBroken("balance_right"))
}

/// Joins the two subtrees of a removed node.
fn fuse<T: Clone>(left: &Link<T>, right: &Link<T>) -> Result<Link<T>> {
  let (l, r) = match (left, right) {
    (None, _) => return Ok(right.clone()),
    (_, None) => return Ok(left.clone()),
    (Some(l), Some(r)) => (l, r),
  };

  let fused = match (l.color, r.color) {
    (Black, Red) => new_node(Red, r.key.clone(), fuse(left, &r.left)?, r.right.clone()),
    (Red, Black) => new_node(Red, l.key.clone(), l.left.clone(), fuse(&l.right, right)?),
    (Red, Red) => match fuse(&l.right, &r.left)? {
      Some(ref s) if s.color == Red => new_node(
        Red,
        s.key.clone(),
        Some(new_node(Red, l.key.clone(), l.left.clone(), s.left.clone())),
        Some(new_node(Red, r.key.clone(), s.right.clone(), r.right.clone())),
      ),
      inner => new_node(
        Red,
        l.key.clone(),
        l.left.clone(),
        Some(new_node(Red, r.key.clone(), inner, r.right.clone())),
      ),
    },
    (Black, Black) => match fuse(&l.right, &r.left)? {
      Some(ref s) if s.color == Red => new_node(
        Red,
        s.key.clone(),
        Some(new_node(Black, l.key.clone(), l.left.clone(), s.left.clone())),
        Some(new_node(Black, r.key.clone(), s.right.clone(), r.right.clone())),
      ),
      inner => balance_left(new_node(
        Red,
        l.key.clone(),
        l.left.clone(),
        Some(new_node(Black, r.key.clone(), inner, r.right.clone())),
      ))?,
    },
  };
  Ok(Some(fused))
}

/// Returns the new subtree, or `None` if the key is not in the tree.
fn remove<T, Q>(link: &Link<T>, key: &Q) -> Result<Option<Link<T>>>
where
  T: Borrow<Q> + Clone,
  Q: Ord + ?Sized,
{
  let node = match link {
    None => return Ok(None),
    Some(node) => node,
  };

  match key.cmp(node.key.borrow()) {
    Ordering::Less => {
      let left = match remove(&node.left, key)? {
        None => return Ok(None),
        Some(left) => left,
      };
      // The color is decided by the repair when the left side was black
      let rebuilt = new_node(Red, node.key.clone(), left, node.right.clone());
      if is_black_node(&node.left) {
        Ok(Some(Some(balance_left(rebuilt)?)))
      } else {
        Ok(Some(Some(rebuilt)))
      }
    }
    Ordering::Greater => {
      let right = match remove(&node.right, key)? {
        None => return Ok(None),
        Some(right) => right,
      };
      let rebuilt = new_node(Red, node.key.clone(), node.left.clone(), right);
      if is_black_node(&node.right) {
        Ok(Some(Some(balance_right(rebuilt)?)))
      } else {
        Ok(Some(Some(rebuilt)))
      }
    }
    Ordering::Equal => fuse(&node.left, &node.right).map(Some),
  }
}

// ====== Validation =====

/// Black height of the subtree, `None` if a red node has a red child or the black heights
/// of two siblings differ.
fn black_height<T>(link: &Link<T>) -> Option<usize> {
  let node = match link {
    None => return Some(1),
    Some(node) => node,
  };
  if node.color == Red && (is_red(&node.left) || is_red(&node.right)) {
    return None;
  }
  let left = black_height(&node.left)?;
  let right = black_height(&node.right)?;
  if left != right {
    return None;
  }
  Some(if node.color == Black { left + 1 } else { left })
}

// ====== Public API =====

/// Immutable ordered set with structural sharing between versions.
pub struct PersistentSet<T> {
  root: Link<T>,
  size: usize,
}

impl<T> PersistentSet<T> {
  pub fn new() -> Self {
    Self {
      root: None,
      size: 0,
    }
  }

  /// Number of distinct keys.
  pub fn len(&self) -> usize {
    self.size
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// Drops this handle's reference to the tree. Other versions are unaffected.
  pub fn clear(&mut self) {
    self.root = None;
    self.size = 0;
  }

  /// Keys in ascending order.
  pub fn iter(&self) -> Iter<'_, T> {
    Iter::new(&self.root, self.size)
  }

  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
  {
    let mut current = &self.root;
    while let Some(node) = current {
      current = match key.cmp(node.key.borrow()) {
        Ordering::Less => &node.left,
        Ordering::Greater => &node.right,
        Ordering::Equal => return true,
      };
    }
    false
  }

  /// Smallest key not less than `value`.
  pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
  where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
  {
    let mut result = None;
    let mut current = &self.root;
    while let Some(node) = current {
      if value.cmp(node.key.borrow()) == Ordering::Greater {
        current = &node.right;
      } else {
        result = Some(&node.key);
        current = &node.left;
      }
    }
    result
  }
}

impl<T: Ord> PersistentSet<T> {
  /// Checks key order, the red-red rule and equal black heights.
  pub fn consistent(&self) -> bool {
    let ordered = self.iter().zip(self.iter().skip(1)).all(|(a, b)| a < b);
    ordered && !is_red(&self.root) && black_height(&self.root).is_some()
  }
}

impl<T: Ord + Clone> PersistentSet<T> {
  /// New version containing `key`. Returns a handle to the same tree if it is present.
  pub fn insert(&self, key: T) -> Self {
    let (root, added) = insert(&self.root, key);
    if !added {
      return self.clone();
    }
    Self {
      root: Some(blacken(root)),
      size: self.size + 1,
    }
  }

  /// New version without `key`. Returns a handle to the same tree if it is absent.
  pub fn remove<Q>(&self, key: &Q) -> Result<Self>
  where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
  {
    match remove(&self.root, key)? {
      None => Ok(self.clone()),
      Some(root) => Ok(Self {
        root: root.map(blacken),
        size: self.size - 1,
      }),
    }
  }

  /// Sorted copy of the keys.
  pub fn items(&self) -> Vec<T> {
    self.iter().cloned().collect()
  }
}

impl<T> Clone for PersistentSet<T> {
  fn clone(&self) -> Self {
    Self {
      root: self.root.clone(),
      size: self.size,
    }
  }
}

impl<T> Default for PersistentSet<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Ord + Clone> FromIterator<T> for PersistentSet<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    iter
      .into_iter()
      .fold(PersistentSet::new(), |set, key| set.insert(key))
  }
}

impl<T: PartialEq> PartialEq for PersistentSet<T> {
  fn eq(&self, other: &Self) -> bool {
    self.size == other.size && self.iter().eq(other.iter())
  }
}

impl<T: fmt::Debug> fmt::Debug for PersistentSet<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

impl<'a, T> IntoIterator for &'a PersistentSet<T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// In-order iterator over a [`PersistentSet`].
pub struct Iter<'a, T> {
  stack: Vec<&'a Node<T>>,
  remaining: usize,
}

impl<'a, T> Iter<'a, T> {
  fn new(root: &'a Link<T>, size: usize) -> Self {
    let mut iter = Iter {
      stack: Vec::new(),
      remaining: size,
    };
    iter.push_left(root);
    iter
  }

  fn push_left(&mut self, mut link: &'a Link<T>) {
    while let Some(node) = link {
      self.stack.push(node);
      link = &node.left;
    }
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.stack.pop()?;
    self.push_left(&node.right);
    self.remaining = self.remaining.saturating_sub(1);
    Some(&node.key)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
