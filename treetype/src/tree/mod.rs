pub mod literal;

use std::fmt;
use std::mem;
use std::str::FromStr;

use crate::parser::error::ParseError;

/// A plain binary tree: every value is either `nil` or a pair of trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BinaryTree {
    #[default]
    Nil,
    Node(Box<BinaryTree>, Box<BinaryTree>),
}

impl BinaryTree {
    pub fn node(left: BinaryTree, right: BinaryTree) -> Self {
        BinaryTree::Node(Box::new(left), Box::new(right))
    }

    /// The number `n`: a right spine of `n` nodes with nil on every left.
    pub fn from_number(n: u64) -> Self {
        let mut tree = BinaryTree::Nil;
        for _ in 0..n {
            tree = BinaryTree::node(BinaryTree::Nil, tree);
        }
        tree
    }

    /// A nil-terminated list: `[a, b]` is `<a.<b.nil>>`.
    pub fn from_list(items: impl IntoIterator<Item = BinaryTree>) -> Self {
        let items: Vec<BinaryTree> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(BinaryTree::Nil, |rest, item| BinaryTree::node(item, rest))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, BinaryTree::Nil)
    }

    pub fn children(&self) -> Option<(&BinaryTree, &BinaryTree)> {
        match self {
            BinaryTree::Nil => None,
            BinaryTree::Node(left, right) => Some((left, right)),
        }
    }

    /// Read this tree as a number, if it is one.
    pub fn as_number(&self) -> Option<u64> {
        let mut count = 0u64;
        let mut current = self;
        while let BinaryTree::Node(left, right) = current {
            if !left.is_nil() {
                return None;
            }
            count = count.checked_add(1)?;
            current = &**right;
        }
        Some(count)
    }
}

impl From<bool> for BinaryTree {
    fn from(value: bool) -> Self {
        if value {
            BinaryTree::node(BinaryTree::Nil, BinaryTree::Nil)
        } else {
            BinaryTree::Nil
        }
    }
}

// Unlinks children onto a heap stack so long spines don't recurse.
impl Drop for BinaryTree {
    fn drop(&mut self) {
        let BinaryTree::Node(left, right) = self else {
            return;
        };
        if left.is_nil() && right.is_nil() {
            return;
        }
        let mut stack = vec![mem::take(&mut **left), mem::take(&mut **right)];
        while let Some(mut tree) = stack.pop() {
            if let BinaryTree::Node(left, right) = &mut tree {
                if !left.is_nil() {
                    stack.push(mem::take(&mut **left));
                }
                if !right.is_nil() {
                    stack.push(mem::take(&mut **right));
                }
            }
        }
    }
}

impl fmt::Display for BinaryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'a> {
            Tree(&'a BinaryTree),
            Text(&'static str),
        }

        let mut steps = vec![Step::Tree(self)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Text(text) => f.write_str(text)?,
                Step::Tree(BinaryTree::Nil) => f.write_str("nil")?,
                Step::Tree(BinaryTree::Node(left, right)) => {
                    f.write_str("<")?;
                    steps.push(Step::Text(">"));
                    steps.push(Step::Tree(right));
                    steps.push(Step::Text("."));
                    steps.push(Step::Tree(left));
                }
            }
        }
        Ok(())
    }
}

impl FromStr for BinaryTree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        literal::parse_tree(s)
    }
}
