//! Store commands.
//!
//! Paths are resolved component by component with `lookup`, starting at
//! the store's root. Output goes to any `io::Write` so commands can be
//! exercised without a terminal.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::debug;

use linufs_kernel::{Ino, Node, NodeKind, NodeStore};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the whole tree under the root
    Tree,
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a file's content
    Cat { path: String },
    /// Write text into a file, creating it if missing
    Write {
        path: String,
        /// Byte offset to write at
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Create an empty file
    Touch { path: String },
    /// Create a directory
    Mkdir { path: String },
    /// Remove a file or empty directory
    Rm { path: String },
    /// Run commands from a script, one per line
    Run { script: PathBuf },
}

/// One line of a script.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: Command,
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty() && *c != ".")
}

/// Resolve `path` to a directory identifier.
pub async fn resolve_dir(store: &dyn NodeStore, path: &str) -> Result<Ino> {
    let mut current = store.root_number();
    for name in components(path) {
        let node = store
            .lookup(current, name)
            .await?
            .ok_or_else(|| anyhow!("{path}: no such file or directory"))?;
        if !node.is_dir() {
            bail!("{path}: not a directory");
        }
        current = node.number;
    }
    Ok(current)
}

/// Resolve `path` to its parent directory and final name.
pub async fn resolve_parent<'p>(store: &dyn NodeStore, path: &'p str) -> Result<(Ino, &'p str)> {
    let trimmed = path.trim_end_matches('/');
    let (dir, name) = match trimmed.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", trimmed),
    };
    if name.is_empty() || name == "." {
        bail!("{path}: refers to the root");
    }
    Ok((resolve_dir(store, dir).await?, name))
}

async fn resolve_file(store: &dyn NodeStore, path: &str) -> Result<Ino> {
    let (parent, name) = resolve_parent(store, path).await?;
    let node = store
        .lookup(parent, name)
        .await?
        .ok_or_else(|| anyhow!("{path}: no such file or directory"))?;
    if node.is_dir() {
        bail!("{path}: is a directory");
    }
    Ok(node.number)
}

/// Execute one command.
pub async fn execute(store: &dyn NodeStore, command: &Command, out: &mut dyn Write) -> Result<()> {
    debug!(?command, "executing");
    match command {
        Command::Tree => tree(store, out).await,
        Command::Ls { path } => {
            let dir = resolve_dir(store, path).await?;
            let batch = store.list(dir).await?;
            let mut nodes: Vec<_> = batch.iter().collect();
            nodes.sort_by(|a, b| a.name.cmp(&b.name));
            for node in nodes {
                writeln!(out, "{:>6}  {:<9}  {}", node.number, node.kind, node.name)?;
            }
            batch.release();
            Ok(())
        }
        Command::Cat { path } => {
            let ino = resolve_file(store, path).await?;
            out.write_all(&store.read_all(ino).await?)?;
            Ok(())
        }
        Command::Write { path, offset, text } => {
            let (parent, name) = resolve_parent(store, path).await?;
            let ino = match store.lookup(parent, name).await? {
                Some(node) if node.is_dir() => bail!("{path}: is a directory"),
                Some(node) => node.number,
                None => store.create(parent, name, NodeKind::File).await?,
            };
            let data = text.join(" ");
            let written = store.write(ino, *offset, data.as_bytes()).await?;
            if written < data.len() {
                writeln!(out, "{path}: wrote {written} of {} bytes", data.len())?;
            }
            Ok(())
        }
        Command::Touch { path } => create(store, path, NodeKind::File).await,
        Command::Mkdir { path } => create(store, path, NodeKind::Directory).await,
        Command::Rm { path } => {
            let (parent, name) = resolve_parent(store, path).await?;
            store
                .remove(parent, name)
                .await
                .with_context(|| format!("rm {path}"))
        }
        Command::Run { script } => run_script(store, script, out).await,
    }
}

async fn create(store: &dyn NodeStore, path: &str, kind: NodeKind) -> Result<()> {
    let (parent, name) = resolve_parent(store, path).await?;
    store
        .create(parent, name, kind)
        .await
        .with_context(|| format!("create {path}"))?;
    Ok(())
}

async fn tree(store: &dyn NodeStore, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "/")?;
    let mut stack = Vec::new();
    push_children(store, store.root_number(), 1, &mut stack).await?;
    while let Some((node, depth)) = stack.pop() {
        let suffix = if node.is_dir() { "/" } else { "" };
        writeln!(out, "{}{}{}", "  ".repeat(depth), node.name, suffix)?;
        if node.is_dir() {
            push_children(store, node.number, depth + 1, &mut stack).await?;
        }
    }
    Ok(())
}

async fn push_children(
    store: &dyn NodeStore,
    dir: Ino,
    depth: usize,
    stack: &mut Vec<(Node, usize)>,
) -> Result<()> {
    let mut nodes: Vec<Node> = store.list(dir).await?.into_iter().collect();
    // Descending, so the stack pops names in ascending order.
    nodes.sort_by(|a, b| b.name.cmp(&a.name));
    stack.extend(nodes.into_iter().map(|n| (n, depth)));
    Ok(())
}

async fn run_script(store: &dyn NodeStore, script: &Path, out: &mut dyn Write) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("reading {}", script.display()))?;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = ScriptLine::try_parse_from(line.split_whitespace())
            .with_context(|| format!("{}:{}: cannot parse", script.display(), index + 1))?;
        if matches!(parsed.command, Command::Run { .. }) {
            bail!("{}:{}: nested run is not supported", script.display(), index + 1);
        }
        Box::pin(execute(store, &parsed.command, out))
            .await
            .with_context(|| format!("{}:{}", script.display(), index + 1))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linufs_kernel::{LocalConfig, LocalStore};

    fn store() -> LocalStore {
        LocalStore::with_config(&LocalConfig {
            seed_demo: false,
            ..LocalConfig::default()
        })
        .unwrap()
    }

    async fn run(store: &dyn NodeStore, command: Command) -> String {
        let mut out = Vec::new();
        execute(store, &command, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_cat() {
        let fs = store();
        run(&fs, Command::Mkdir { path: "/docs".into() }).await;
        run(
            &fs,
            Command::Write {
                path: "/docs/a.txt".into(),
                offset: 0,
                text: vec!["hello".into(), "there".into()],
            },
        )
        .await;
        let text = run(&fs, Command::Cat { path: "docs/a.txt".into() }).await;
        assert_eq!(text, "hello there");
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let fs = store();
        run(&fs, Command::Touch { path: "/f".into() }).await;

        assert!(resolve_dir(&fs, "/f").await.is_err());
        assert!(resolve_dir(&fs, "/missing").await.is_err());
        assert!(resolve_parent(&fs, "/").await.is_err());
        assert_eq!(resolve_dir(&fs, "/").await.unwrap(), fs.root_number());
    }

    #[tokio::test]
    async fn test_tree_output() {
        let fs = store();
        run(&fs, Command::Mkdir { path: "/b".into() }).await;
        run(&fs, Command::Touch { path: "/b/c".into() }).await;
        run(&fs, Command::Touch { path: "/a".into() }).await;
        run(&fs, Command::Mkdir { path: "/b/d".into() }).await;
        run(&fs, Command::Touch { path: "/b/d/e".into() }).await;
        run(&fs, Command::Touch { path: "/z".into() }).await;

        let text = run(&fs, Command::Tree).await;
        assert_eq!(text, "/\n  a\n  b/\n    c\n    d/\n      e\n  z\n");
    }

    #[tokio::test]
    async fn test_rm_non_empty_fails() {
        let fs = store();
        run(&fs, Command::Mkdir { path: "/d".into() }).await;
        run(&fs, Command::Touch { path: "/d/x".into() }).await;

        let mut out = Vec::new();
        let rm = Command::Rm { path: "/d".into() };
        assert!(execute(&fs, &rm, &mut out).await.is_err());
    }

    #[tokio::test]
    async fn test_run_script() {
        let fs = store();
        let mut script = tempfile::NamedTempFile::new().unwrap();
        writeln!(script, "# setup").unwrap();
        writeln!(script, "mkdir /etc").unwrap();
        writeln!(script, "write /etc/motd hi all").unwrap();
        writeln!(script).unwrap();
        writeln!(script, "ls /etc").unwrap();

        let text = run(
            &fs,
            Command::Run {
                script: script.path().to_path_buf(),
            },
        )
        .await;
        assert!(text.contains("motd"));
        let motd = run(&fs, Command::Cat { path: "/etc/motd".into() }).await;
        assert_eq!(motd, "hi all");
    }
}
