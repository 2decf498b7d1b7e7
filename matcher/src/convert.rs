use treetype::{Alternative, Atom, BinaryTree, ConversionTree};

use crate::atoms::AtomTable;
use crate::converted::ConvertedTree;

/// Names resolved before the atom table is consulted. Keep in step with
/// `match_atom`.
pub const BUILTIN_ATOMS: &[&str] = &["nil", "any", "int", "true", "false", "bool", "boolean"];

/// The converted tree and whether any node in it failed to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub tree: ConvertedTree,
    pub has_error: bool,
}

impl ConversionResult {
    pub fn ok(tree: ConvertedTree) -> Self {
        ConversionResult {
            tree,
            has_error: false,
        }
    }

    pub fn failed(tree: ConvertedTree) -> Self {
        ConversionResult {
            tree,
            has_error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Match `tree` against `schema`, resolving custom atoms through `atoms`.
///
/// Mismatches never abort the conversion: they are recorded on the node
/// where they were found and reflected in `has_error`. Right spines (numbers,
/// booleans, lists) are walked iteratively; everything else recurses to the
/// depth of `tree`, so very left-deep inputs are the caller's concern.
pub fn convert<'a>(
    tree: &BinaryTree,
    schema: &'a ConversionTree,
    atoms: &'a AtomTable,
) -> ConversionResult {
    Converter { atoms }.convert(tree, schema, &[])
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

struct Converter<'a> {
    atoms: &'a AtomTable,
}

impl<'a> Converter<'a> {
    /// `expanding` holds the aliases entered at this input node without
    /// consuming any of it. It is cleared whenever we step into a child.
    fn convert(
        &self,
        tree: &BinaryTree,
        schema: &'a ConversionTree,
        expanding: &[&'a str],
    ) -> ConversionResult {
        match schema {
            ConversionTree::Choice(alternatives) => self.match_choice(tree, alternatives, expanding),
            ConversionTree::List(element) => self.match_list(tree, element),
            ConversionTree::Tree { left, right } => self.match_tree(tree, left, right),
        }
    }

    fn match_choice(
        &self,
        tree: &BinaryTree,
        alternatives: &'a [Alternative],
        expanding: &[&'a str],
    ) -> ConversionResult {
        let mut first_failure = None;

        for alternative in alternatives {
            let result = match alternative {
                Alternative::Atom(atom) => self.match_atom(tree, atom, expanding),
                Alternative::Type(schema) => self.convert(tree, schema, expanding),
            };
            if !result.has_error {
                return result;
            }
            first_failure.get_or_insert(result);
        }

        match (alternatives.len(), first_failure) {
            (1, Some(only)) => only,
            _ => {
                let names: Vec<String> = alternatives.iter().map(|a| format!("'{}'", a)).collect();
                ConversionResult::failed(ConvertedTree::mirror(tree).with_error(format!(
                    "Node does not match any type of {}",
                    names.join(", ")
                )))
            }
        }
    }

    fn match_atom(
        &self,
        tree: &BinaryTree,
        atom: &'a Atom,
        expanding: &[&'a str],
    ) -> ConversionResult {
        let name = match atom {
            Atom::Number(n) => return match_number(tree, Some(*n)),
            Atom::Named(name) => name.as_str(),
        };

        match name {
            "nil" if tree.is_nil() => ConversionResult::ok(ConvertedTree::nil()),
            "nil" => mismatch(tree, "Expected nil"),
            "any" => ConversionResult::ok(ConvertedTree::mirror(tree)),
            "int" => match_number(tree, None),
            "true" => match_boolean(tree, Some(true)),
            "false" => match_boolean(tree, Some(false)),
            "bool" | "boolean" => match_boolean(tree, None),
            alias => self.match_alias(tree, alias, expanding),
        }
    }

    fn match_alias(
        &self,
        tree: &BinaryTree,
        name: &'a str,
        expanding: &[&'a str],
    ) -> ConversionResult {
        let Some(schema) = self.atoms.get(name) else {
            return mismatch(tree, format!("Unknown type '{}'", name));
        };
        if expanding.contains(&name) {
            return mismatch(tree, format!("Recursive type '{}'", name));
        }

        let mut inner = expanding.to_vec();
        inner.push(name);
        let result = self.convert(tree, schema, &inner);
        ConversionResult {
            tree: result.tree.alias(name),
            has_error: result.has_error,
        }
    }

    fn match_tree(
        &self,
        tree: &BinaryTree,
        left: &'a ConversionTree,
        right: &'a ConversionTree,
    ) -> ConversionResult {
        let Some((tree_left, tree_right)) = tree.children() else {
            return ConversionResult::failed(
                ConvertedTree::nil().with_error("Expected a tree, got nil"),
            );
        };

        let left = self.convert(tree_left, left, &[]);
        let right = self.convert(tree_right, right, &[]);
        ConversionResult {
            has_error: left.has_error || right.has_error,
            tree: ConvertedTree::pair(left.tree, right.tree),
        }
    }

    fn match_list(&self, tree: &BinaryTree, element: &'a ConversionTree) -> ConversionResult {
        let mut items = Vec::new();
        let mut has_error = false;
        let mut current = tree;

        while let Some((head, rest)) = current.children() {
            let item = self.convert(head, element, &[]);
            has_error |= item.has_error;
            items.push(item.tree);
            current = rest;
        }

        ConversionResult {
            tree: ConvertedTree::list(items),
            has_error,
        }
    }
}

fn mismatch(tree: &BinaryTree, message: impl Into<String>) -> ConversionResult {
    ConversionResult::failed(ConvertedTree::mirror(tree).with_error(message))
}

fn match_number(tree: &BinaryTree, expected: Option<u64>) -> ConversionResult {
    match (tree.as_number(), expected) {
        (None, _) => mismatch(tree, "Not a valid number"),
        (Some(n), Some(want)) if n != want => ConversionResult::failed(
            ConvertedTree::number(n).with_error(format!("Expected {}", want)),
        ),
        (Some(n), _) => ConversionResult::ok(ConvertedTree::number(n)),
    }
}

fn match_boolean(tree: &BinaryTree, expected: Option<bool>) -> ConversionResult {
    let value = match tree.children() {
        None => Some(false),
        Some((left, right)) if left.is_nil() && right.is_nil() => Some(true),
        Some(_) => None,
    };

    match (value, expected) {
        (Some(b), None) => ConversionResult::ok(ConvertedTree::boolean(b)),
        (Some(b), Some(want)) if b == want => ConversionResult::ok(ConvertedTree::boolean(b)),
        (_, Some(want)) => mismatch(tree, format!("Expected {}", want)),
        (None, None) => mismatch(tree, "Expected a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_walk_handles_long_spines() {
        let tree = BinaryTree::from_number(500_000);
        let result = match_number(&tree, Some(500_000));
        assert!(!result.has_error);
        assert_eq!(result.tree, ConvertedTree::number(500_000));
    }

    #[test]
    fn wrong_number_keeps_its_value() {
        let result = match_number(&BinaryTree::from_number(2), Some(3));
        assert!(result.has_error);
        assert_eq!(result.tree, ConvertedTree::number(2).with_error("Expected 3"));
    }

    #[test]
    fn booleans() {
        let t = BinaryTree::from(true);
        assert_eq!(match_boolean(&t, None).tree, ConvertedTree::boolean(true));
        assert_eq!(match_boolean(&BinaryTree::Nil, None).tree, ConvertedTree::boolean(false));
        assert_eq!(
            match_boolean(&BinaryTree::Nil, Some(true)).tree,
            ConvertedTree::nil().with_error("Expected true")
        );
        let two = BinaryTree::from_number(2);
        assert_eq!(
            match_boolean(&two, None).tree.error.as_deref(),
            Some("Expected a boolean")
        );
    }

    #[test]
    fn builtins_never_reach_the_table() {
        let atoms: AtomTable = BUILTIN_ATOMS
            .iter()
            .map(|&name| (name, ConversionTree::any()))
            .collect();
        for &name in BUILTIN_ATOMS {
            let schema = ConversionTree::atom(name);
            let result = convert(&BinaryTree::Nil, &schema, &atoms);
            assert_eq!(result.tree.label(), None, "{} went through the table", name);
        }

        let schema = ConversionTree::atom("custom");
        let atoms: AtomTable = [("custom", ConversionTree::any())].into_iter().collect();
        assert_eq!(convert(&BinaryTree::Nil, &schema, &atoms).tree.label(), Some("custom"));
    }
}
