use std::fmt;

/// A leaf-level matcher named in a description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// `nil`, `any`, `int`, ... or a user-defined alias.
    Named(String),
    /// An integer literal: matches exactly that number.
    Number(u64),
}

/// One entry of a [`ConversionTree::Choice`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Alternative {
    Atom(Atom),
    /// Never a `Choice`: nested choices are flattened into their parent.
    Type(ConversionTree),
}

/// A compiled type description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversionTree {
    /// `R|S|...`: ordered alternatives, the first one that matches wins.
    /// Duplicates are kept.
    Choice(Vec<Alternative>),
    /// `T[]`: zero or more `T`, right-nested and nil-terminated.
    List(Box<ConversionTree>),
    /// `<R.S>`: a node whose children match `left` and `right`.
    Tree {
        left: Box<ConversionTree>,
        right: Box<ConversionTree>,
    },
}

impl ConversionTree {
    /// A choice holding the single named atom.
    pub fn atom(name: impl Into<String>) -> Self {
        ConversionTree::Choice(vec![Alternative::Atom(Atom::Named(name.into()))])
    }

    /// The schema an empty description compiles to.
    pub fn any() -> Self {
        ConversionTree::atom("any")
    }

    pub fn list(element: ConversionTree) -> Self {
        ConversionTree::List(Box::new(element))
    }

    pub fn tree(left: ConversionTree, right: ConversionTree) -> Self {
        ConversionTree::Tree {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a choice, unwrapping it when its only member is itself a type.
    /// Nested choices are flattened one level as they are added.
    pub fn choice(alternatives: impl IntoIterator<Item = Alternative>) -> Self {
        let mut flat = Vec::new();
        for alternative in alternatives {
            push_alternative(&mut flat, alternative);
        }
        if flat.len() == 1 && matches!(flat[0], Alternative::Type(_)) {
            if let Some(Alternative::Type(only)) = flat.pop() {
                return only;
            }
        }
        ConversionTree::Choice(flat)
    }

    /// Turn this tree into a choice member. A choice of one entry gives up
    /// that entry, so single atoms stay bare.
    pub fn into_alternative(self) -> Alternative {
        match self {
            ConversionTree::Choice(mut alternatives) if alternatives.len() == 1 => {
                alternatives.remove(0)
            }
            other => Alternative::Type(other),
        }
    }
}

fn push_alternative(alternatives: &mut Vec<Alternative>, alternative: Alternative) {
    match alternative {
        Alternative::Type(ConversionTree::Choice(inner)) => alternatives.extend(inner),
        other => alternatives.push(other),
    }
}

// ---------------------------------------------------------------------------
// Rendering back to description syntax
// ---------------------------------------------------------------------------

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Named(name) => f.write_str(name),
            Atom::Number(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alternative::Atom(atom) => write!(f, "{}", atom),
            Alternative::Type(tree) => write!(f, "{}", tree),
        }
    }
}

impl fmt::Display for ConversionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionTree::Choice(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", alternative)?;
                }
                Ok(())
            }
            ConversionTree::List(element) => match element.as_ref() {
                ConversionTree::Choice(alternatives) if alternatives.len() > 1 => {
                    write!(f, "({})[]", element)
                }
                _ => write!(f, "{}[]", element),
            },
            ConversionTree::Tree { left, right } => write!(f, "<{}.{}>", left, right),
        }
    }
}
