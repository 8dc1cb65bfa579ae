use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use twothree::config::{DriverConfig, RandomKeys};
use twothree::twothree::{Insertion, Removal, TraversalOrder, TwoThreeTree};

#[derive(Parser, Debug)]
#[command(
    name = "tree",
    about = "Builds a 2-3 tree from a key list, prints its traversals, then searches for and deletes a key"
)]
struct Args {
    /// TOML file with driver settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma separated keys to insert, in order
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    keys: Option<Vec<i64>>,

    #[arg(long, allow_hyphen_values = true)]
    search: Option<i64>,

    #[arg(long, allow_hyphen_values = true)]
    delete: Option<i64>,

    /// Traversal orders to print, repeatable
    #[arg(long, value_enum)]
    order: Vec<TraversalOrder>,

    /// Insert this many random keys instead of a key list
    #[arg(long)]
    random_count: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the tree structure after each step
    #[arg(long)]
    show_tree: bool,

    /// Skip the stdin prompts for keys not given as flags
    #[arg(long)]
    no_prompt: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn resolve(&self) -> Result<DriverConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };

        if let Some(keys) = &self.keys {
            config.keys = keys.clone();
            config.random = None;
        }
        if let Some(count) = self.random_count {
            config.random = Some(RandomKeys::new(count, self.seed));
        }
        if self.search.is_some() {
            config.search = self.search;
        }
        if self.delete.is_some() {
            config.delete = self.delete;
        }
        if !self.order.is_empty() {
            config.orders = self.order.clone();
        }
        config.show_tree |= self.show_tree;

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.resolve()?;
    let mut tree = TwoThreeTree::new();

    for key in config.insertion_keys() {
        match tree.insert(key) {
            Ok(Insertion::Inserted) => {}
            Ok(Insertion::Duplicate) => println!("Key {} is already present in the tree!", key),
            Err(e) => println!("Key {} was not inserted: {}", key, e),
        }
    }

    print_traversals(&tree, &config);

    let search = match config.search {
        Some(key) => Some(key),
        None if !args.no_prompt => prompt("Input the key to search: ")?,
        None => None,
    };
    if let Some(key) = search {
        if tree.search(&key).is_some() {
            println!("Key {} is found!", key);
        } else {
            println!("Key {} is not present on the tree!", key);
        }
    }

    let delete = match config.delete {
        Some(key) => Some(key),
        None if !args.no_prompt => prompt("Input the key to delete: ")?,
        None => None,
    };
    if let Some(key) = delete {
        match tree.delete(&key) {
            Ok(Removal::Removed) => {
                println!("Key {} deleted.", key);
                print_traversals(&tree, &config);
            }
            Ok(Removal::Absent) => println!("Key {} is not in the tree!", key),
            Err(e) => println!("Key {} was not deleted: {}", key, e),
        }
    }

    Ok(())
}

fn print_traversals(tree: &TwoThreeTree<i64>, config: &DriverConfig) {
    if config.show_tree {
        print!("{}", tree);
    }

    for order in &config.orders {
        let keys: Vec<String> = tree.iter(*order).map(|k| k.to_string()).collect();
        println!("{:<10}\t{}", format!("{}:", order), keys.join(" "));
    }
    println!();
}

// reads one key from stdin, an empty or unreadable line skips the step
fn prompt(message: &str) -> io::Result<Option<i64>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse() {
        Ok(key) => Ok(Some(key)),
        Err(e) => {
            warn!("ignoring {:?}: {}", trimmed, e);
            Ok(None)
        }
    }
}
