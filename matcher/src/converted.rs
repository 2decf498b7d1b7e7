use std::fmt;

use treetype::BinaryTree;

/// A leaf value produced by an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Nil,
    Number(u64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedNode {
    Value(Value),
    Pair {
        left: Box<ConvertedTree>,
        right: Box<ConvertedTree>,
    },
    /// The decoded elements of a list schema.
    List(Vec<ConvertedTree>),
}

/// The annotated result of matching a tree against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedTree {
    pub node: ConvertedNode,
    /// Why this node did not match, if it did not.
    pub error: Option<String>,
    /// Aliases that produced this node, outermost first.
    pub aliases: Vec<String>,
}

/// One error found in a converted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    /// `$` followed by `.left`, `.right` and `[i]` steps.
    pub path: String,
    pub message: String,
}

impl ConvertedTree {
    pub fn new(node: ConvertedNode) -> Self {
        ConvertedTree {
            node,
            error: None,
            aliases: Vec::new(),
        }
    }

    pub fn nil() -> Self {
        ConvertedTree::new(ConvertedNode::Value(Value::Nil))
    }

    pub fn number(n: u64) -> Self {
        ConvertedTree::new(ConvertedNode::Value(Value::Number(n)))
    }

    pub fn boolean(b: bool) -> Self {
        ConvertedTree::new(ConvertedNode::Value(Value::Boolean(b)))
    }

    pub fn pair(left: ConvertedTree, right: ConvertedTree) -> Self {
        ConvertedTree::new(ConvertedNode::Pair {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn list(items: Vec<ConvertedTree>) -> Self {
        ConvertedTree::new(ConvertedNode::List(items))
    }

    /// Echo `tree` unchanged: nil stays nil, nodes become pairs.
    pub fn mirror(tree: &BinaryTree) -> Self {
        match tree.children() {
            None => ConvertedTree::nil(),
            Some((left, right)) => {
                ConvertedTree::pair(ConvertedTree::mirror(left), ConvertedTree::mirror(right))
            }
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Record that this node was produced through alias `name`.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.insert(0, name.into());
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(self.node, ConvertedNode::List(_))
    }

    /// The outermost alias, if any.
    pub fn label(&self) -> Option<&str> {
        self.aliases.first().map(String::as_str)
    }

    /// Every error in the tree, in pre-order with left before right.
    pub fn errors(&self) -> Vec<NodeError> {
        let mut found = Vec::new();
        let mut pending = vec![("$".to_string(), self)];

        while let Some((path, tree)) = pending.pop() {
            if let Some(message) = &tree.error {
                found.push(NodeError {
                    path: path.clone(),
                    message: message.clone(),
                });
            }
            match &tree.node {
                ConvertedNode::Value(_) => {}
                ConvertedNode::Pair { left, right } => {
                    pending.push((format!("{}.right", path), &**right));
                    pending.push((format!("{}.left", path), &**left));
                }
                ConvertedNode::List(items) => {
                    for (i, item) in items.iter().enumerate().rev() {
                        pending.push((format!("{}[{}]", path, i), item));
                    }
                }
            }
        }

        found
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for ConvertedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'a> {
            Tree(&'a ConvertedTree),
            Text(&'static str),
        }

        let mut steps = vec![Step::Tree(self)];
        while let Some(step) = steps.pop() {
            let tree = match step {
                Step::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Step::Tree(tree) => tree,
            };
            match &tree.node {
                ConvertedNode::Value(value) => write!(f, "{}", value)?,
                ConvertedNode::Pair { left, right } => {
                    f.write_str("<")?;
                    steps.push(Step::Text(">"));
                    steps.push(Step::Tree(right));
                    steps.push(Step::Text("."));
                    steps.push(Step::Tree(left));
                }
                ConvertedNode::List(items) => {
                    f.write_str("[")?;
                    steps.push(Step::Text("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        steps.push(Step::Tree(item));
                        if i > 0 {
                            steps.push(Step::Text(","));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lists_pairs_and_values() {
        let tree = ConvertedTree::pair(
            ConvertedTree::list(vec![ConvertedTree::number(2), ConvertedTree::boolean(true)]),
            ConvertedTree::list(vec![]),
        );
        assert_eq!(tree.to_string(), "<[2,true].[]>");
    }

    #[test]
    fn rendering_ignores_errors_and_aliases() {
        let tree = ConvertedTree::nil().with_error("Expected a tree, got nil").alias("b");
        assert_eq!(tree.to_string(), "nil");
    }

    #[test]
    fn aliases_are_outermost_first() {
        let tree = ConvertedTree::nil().alias("inner").alias("outer");
        assert_eq!(tree.aliases, vec!["outer", "inner"]);
        assert_eq!(tree.label(), Some("outer"));
    }

    #[test]
    fn error_paths() {
        let tree = ConvertedTree::pair(
            ConvertedTree::list(vec![
                ConvertedTree::number(1),
                ConvertedTree::nil().with_error("Not a valid number"),
            ]),
            ConvertedTree::nil().with_error("Expected a tree, got nil"),
        );
        let errors: Vec<_> = tree
            .errors()
            .into_iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        assert_eq!(
            errors,
            vec![
                "$.left[1]: Not a valid number",
                "$.right: Expected a tree, got nil",
            ]
        );
    }
}
