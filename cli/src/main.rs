mod definitions;
mod test_runner;

use std::collections::BTreeMap;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use treetype::tree::literal::parse_tree;

const SUBCOMMANDS: &[&str] = &["check", "test", "help"];

#[derive(Parser)]
#[command(name = "treetype", version, about = "Check binary trees against type descriptions")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match a tree literal against a type description
    Check(CheckArgs),

    /// Run .test.toml case files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Tree literal, e.g. "<nil.<nil.nil>>"
    tree: String,

    /// Type description (empty matches anything)
    #[arg(value_name = "TYPE", default_value = "")]
    description: String,

    /// TOML file of `name = "type"` atom definitions. Repeatable.
    #[arg(long = "atoms", value_name = "FILE")]
    atom_files: Vec<String>,

    /// Inline atom definition. Repeatable; overrides atoms files.
    #[arg(long = "atom", value_name = "NAME=TYPE", value_parser = definitions::parse_inline_atom)]
    atoms: Vec<(String, String)>,

    /// Print the compiled type and exit
    #[arg(long)]
    schema: bool,

    /// Don't print the converted tree (just report errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only cases in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let mut args: Vec<String> = std::env::args().collect();
    inject_default_subcommand(&mut args);

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Check(check_args) => do_check(check_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// `treetype <TREE> ...` means `treetype check <TREE> ...`.
fn inject_default_subcommand(args: &mut Vec<String>) {
    let first_positional = args.iter().skip(1).find(|a| !a.starts_with('-'));
    if let Some(first) = first_positional {
        if !SUBCOMMANDS.contains(&first.as_str()) {
            let at = 1.min(args.len());
            args.insert(at, "check".to_string());
        }
    }
}

fn do_check(args: CheckArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let mut files = SimpleFiles::new();

    let emit = |files: &SimpleFiles<String, String>, diagnostic: &Diagnostic<usize>| {
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
    };

    // Atom files first, so inline definitions win.
    let mut atoms = BTreeMap::new();
    for file in &args.atom_files {
        match definitions::load_atoms(Path::new(file)) {
            Ok(loaded) => atoms.extend(loaded),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
    atoms.extend(args.atoms.iter().cloned());
    for name in definitions::shadowed_atoms(&atoms) {
        eprintln!("warning: atom '{}' is shadowed by the built-in type and is never used", name);
    }

    let compiled = match definitions::compile_all(&mut files, &args.description, &atoms) {
        Ok(compiled) => compiled,
        Err(errors) => {
            for error in &errors {
                emit(&files, &error.to_diagnostic());
            }
            process::exit(1);
        }
    };

    if args.schema {
        println!("{:#?}", compiled.schema);
        return;
    }

    let tree_id = files.add("<tree>".to_string(), args.tree.clone());
    let tree = match parse_tree(&args.tree) {
        Ok(tree) => tree,
        Err(e) => {
            emit(&files, &e.in_file(tree_id).to_diagnostic());
            process::exit(1);
        }
    };

    let result = matcher::convert(&tree, &compiled.schema, &compiled.atoms);

    if !args.quiet {
        println!("{}", result.tree);
    }
    for error in result.tree.errors() {
        eprintln!("error at {}: {}", error.path, error.message);
    }
    if result.has_error {
        process::exit(1);
    }
}
