pub mod atoms;
pub mod convert;
pub mod converted;
pub mod error;

pub use atoms::AtomTable;
pub use convert::{BUILTIN_ATOMS, ConversionResult, convert};
pub use converted::{ConvertedNode, ConvertedTree, NodeError, Value};
pub use error::DefinitionError;

use treetype::BinaryTree;

/// Compile `description` and every `(name, description)` atom definition,
/// then convert `tree`. The description is compiled first.
pub fn run_convert(
    tree: &BinaryTree,
    description: &str,
    atoms: &[(&str, &str)],
) -> Result<ConversionResult, DefinitionError> {
    let schema = treetype::compile(description)?;
    let atoms = AtomTable::compile(atoms.iter().copied())?;
    Ok(convert(tree, &schema, &atoms))
}
