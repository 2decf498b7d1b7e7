use std::collections::BTreeMap;
use std::path::Path;

use codespan_reporting::files::SimpleFiles;

use matcher::{AtomTable, BUILTIN_ATOMS};
use treetype::parser::Parser;
use treetype::{ConversionTree, SyntaxError};

/// Read an atoms file: a TOML table of `name = "description"` entries.
pub fn load_atoms(path: &Path) -> Result<BTreeMap<String, String>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

/// Parse a `--atom NAME=TYPE` argument.
pub fn parse_inline_atom(arg: &str) -> Result<(String, String), String> {
    let (name, description) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid atom name '{}'", name));
    }
    Ok((name.to_string(), description.trim().to_string()))
}

/// Atom names a built-in type hides. Their definitions compile but are
/// never used.
pub fn shadowed_atoms(atoms: &BTreeMap<String, String>) -> Vec<&str> {
    atoms
        .keys()
        .map(String::as_str)
        .filter(|name| BUILTIN_ATOMS.contains(name))
        .collect()
}

pub struct Compiled {
    pub schema: ConversionTree,
    pub atoms: AtomTable,
}

/// Compile the type and every atom definition. Each source is added to
/// `files` so failures can be rendered against it; all failures are
/// collected rather than stopping at the first.
pub fn compile_all(
    files: &mut SimpleFiles<String, String>,
    description: &str,
    atoms: &BTreeMap<String, String>,
) -> Result<Compiled, Vec<SyntaxError>> {
    let mut errors = Vec::new();

    let file_id = files.add("<type>".to_string(), description.to_string());
    let schema = match Parser::new(description, file_id).parse() {
        Ok(schema) => Some(schema),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let mut table = AtomTable::new();
    for (name, source) in atoms {
        let file_id = files.add(format!("<atom {}>", name), source.clone());
        match Parser::new(source.as_str(), file_id).parse() {
            Ok(schema) => table.insert(name.as_str(), schema),
            Err(e) => errors.push(e),
        }
    }

    match schema {
        Some(schema) if errors.is_empty() => Ok(Compiled {
            schema,
            atoms: table,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_atom() {
        assert_eq!(
            parse_inline_atom("b = <nil.nil>|nil"),
            Ok(("b".to_string(), "<nil.nil>|nil".to_string()))
        );
        assert!(parse_inline_atom("no_equals").is_err());
        assert!(parse_inline_atom("bad name=int").is_err());
    }

    #[test]
    fn atoms_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atoms.toml");
        std::fs::write(&path, "b = \"<nil.nil>|nil\"\nmylist = \"int[]\"\n").unwrap();
        let atoms = load_atoms(&path).unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms["mylist"], "int[]");

        std::fs::write(&path, "b = 3\n").unwrap();
        assert!(load_atoms(&path).is_err());
    }

    #[test]
    fn builtin_names_are_shadowed() {
        let atoms = BTreeMap::from([
            ("int".to_string(), "nil".to_string()),
            ("b".to_string(), "<nil.nil>|nil".to_string()),
            ("boolean".to_string(), "any".to_string()),
        ]);
        assert_eq!(shadowed_atoms(&atoms), vec!["boolean", "int"]);
    }

    #[test]
    fn every_failure_is_collected() {
        let mut files = SimpleFiles::new();
        let atoms = BTreeMap::from([
            ("a".to_string(), "int[".to_string()),
            ("b".to_string(), "nil".to_string()),
            ("c".to_string(), "$".to_string()),
        ]);
        let Err(errors) = compile_all(&mut files, "<a.", &atoms) else {
            panic!("expected compile errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[2], SyntaxError::Lex(_)));
    }
}
