use clap::Parser;
use prettytable::{Table, row};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;

use classic_btree::{BTree, BTreeError, Key, NodeShape};

#[derive(Debug, Error)]
enum ShellError {
    #[error("B-tree error: {0}")]
    BTree(#[from] BTreeError),

    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),
}

/// Interactive shell over a B-tree of integer keys
#[derive(Parser, Debug)]
#[command(name = "btree-shell")]
struct Args {
    /// Minimum degree of the tree
    #[arg(short = 't', long, default_value_t = 2)]
    degree: usize,

    /// Keys to insert before the prompt opens (comma separated)
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    keys: Vec<Key>,
}

enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
commands:
  insert <key>...    insert keys (alias: i)
  remove <key>...    remove keys (aliases: r, delete)
  contains <key>     test membership (alias: c)
  show               print the tree as JSON
  levels             print the keys on each level
  check              audit the tree structure
  help               show this message
  quit               leave the shell (alias: exit)";

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ShellError> {
    let mut tree = BTree::new(args.degree)?;
    for key in args.keys {
        tree.insert(key)?;
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("btree> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;

                match execute(&mut tree, line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn execute(tree: &mut BTree, line: &str) -> Result<Flow, ShellError> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match command {
        "insert" | "i" => {
            for key in parse_keys(&args)? {
                if !tree.insert(key)? {
                    println!("{} already present", key);
                }
            }
        }
        "remove" | "r" | "delete" => {
            for key in parse_keys(&args)? {
                if !tree.remove(key)? {
                    println!("{} not found", key);
                }
            }
        }
        "contains" | "c" => {
            for key in parse_keys(&args)? {
                println!("{}: {}", key, tree.contains(key));
            }
        }
        "show" => match tree.shape()? {
            Some(shape) => println!("{}", serde_json::to_string_pretty(&shape)?),
            None => println!("(empty)"),
        },
        "levels" => match tree.shape()? {
            Some(shape) => levels_table(&shape).printstd(),
            None => println!("(empty)"),
        },
        "check" => {
            tree.check_invariants()?;
            println!(
                "ok: {} keys, height {}, {} nodes",
                tree.len(),
                tree.height(),
                tree.live_node_count()
            );
        }
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    }

    Ok(Flow::Continue)
}

fn parse_keys(args: &[&str]) -> Result<Vec<Key>, ShellError> {
    args.iter()
        .map(|arg| {
            arg.parse::<Key>()
                .map_err(|_| ShellError::InvalidKey(arg.to_string()))
        })
        .collect()
}

/// One row per tree level, listing each node's keys left to right
fn levels_table(root: &NodeShape) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Level", "Nodes", "Keys"]);

    let mut level = vec![root];
    let mut depth = 0;
    while !level.is_empty() {
        let nodes = level
            .iter()
            .map(|node| format!("{:?}", node.keys))
            .collect::<Vec<_>>()
            .join(" ");
        let keys: usize = level.iter().map(|node| node.keys.len()).sum();
        table.add_row(row![depth, nodes, keys]);

        level = level
            .into_iter()
            .flat_map(|node| node.children.iter())
            .collect();
        depth += 1;
    }

    table
}
