//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use stashbox_entity::node::{FileNode, FileTreeNode};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Node display row
#[derive(Debug, Serialize, Tabled)]
pub struct NodeRow {
    /// Node ID
    id: String,
    /// Name
    name: String,
    /// Kind
    #[tabled(rename = "type")]
    node_type: String,
    /// Size
    size: i64,
    /// Flags
    flags: String,
    /// Created at
    created_at: String,
}

impl From<&FileNode> for NodeRow {
    fn from(node: &FileNode) -> Self {
        let mut flags = String::new();
        if node.is_starred {
            flags.push('*');
        }
        if node.is_trash {
            flags.push('T');
        }
        Self {
            id: node.id.to_string(),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            size: node.size,
            flags,
            created_at: node.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print nodes as rows
pub fn print_nodes(nodes: &[FileNode], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<NodeRow> = nodes.iter().map(NodeRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(nodes).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a nested tree
pub fn print_tree(forest: &[FileTreeNode], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if forest.is_empty() {
                println!("No results found.");
            }
            for root in forest {
                print_branch(root, 0);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(forest).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

fn print_branch(branch: &FileTreeNode, indent: usize) {
    let node = &branch.node;
    let marker = if node.is_folder { "/" } else { "" };
    println!(
        "{:indent$}{}{}  ({})",
        "",
        node.name,
        marker,
        node.id,
        indent = indent * 2
    );
    for child in &branch.children {
        print_branch(child, indent + 1);
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
