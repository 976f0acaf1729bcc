mod highlight;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::style::Stylize;

use nv_base::{Config, NavaniError, Result, Snippet, store};
use nv_mod_index::{SharedIndex, SnippetIndex};
use nv_mod_tree::{FileTree, render_visible};

const USAGE: &str = "Usage: navani [--config <file>] [--data-dir <dir>] [tree | list [--lang L] [--tag T] | show <file> | watch]";

/// How often `watch` checks the index for a changed snippet count.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tree,
    List { language: Option<String>, tag: Option<String> },
    Show(PathBuf),
    Watch,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    command: Command,
}

fn flag_value(args: &[String], i: usize) -> std::result::Result<String, String> {
    args.get(i + 1).cloned().ok_or_else(|| format!("{} needs a value", args[i]))
}

fn parse_args(args: &[String]) -> std::result::Result<Args, String> {
    let mut config = None;
    let mut data_dir = None;
    let mut command: Option<Command> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config = Some(PathBuf::from(flag_value(args, i)?));
                i += 2;
            }
            "--data-dir" => {
                data_dir = Some(PathBuf::from(flag_value(args, i)?));
                i += 2;
            }
            "--lang" | "--tag" => {
                let Some(Command::List { language, tag }) = command.as_mut() else {
                    return Err(format!("{} only applies to list", args[i]));
                };
                let value = flag_value(args, i)?;
                if args[i] == "--lang" {
                    *language = Some(value);
                } else {
                    *tag = Some(value);
                }
                i += 2;
            }
            word if command.is_none() => {
                command = Some(match word {
                    "tree" => Command::Tree,
                    "list" => Command::List { language: None, tag: None },
                    "watch" => Command::Watch,
                    "show" => Command::Show(PathBuf::from(flag_value(args, i)?)),
                    other => return Err(format!("Unknown command: {}", other)),
                });
                i += if word == "show" { 2 } else { 1 };
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Args { config, data_dir, command: command.unwrap_or(Command::Watch) })
}

fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return;
    }
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        tracing::error!(error = %e, "fatal");
        eprintln!("navani: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    logging::init(&config.logs_dir)?;
    fs::create_dir_all(&config.data_dir).map_err(|e| NavaniError::io(&config.data_dir, e))?;

    let mut index = SnippetIndex::new();
    let crawl = nv_mod_sync::crawl(&config, &mut index)?;
    let index = SharedIndex::from_index(index);

    match args.command {
        Command::Tree => {
            let mut tree = crawl.tree;
            tree.set_all_open(true);
            print_tree(&tree, &config);
        }
        Command::List { language, tag } => print_list(&index, language.as_deref(), tag.as_deref()),
        Command::Show(file) => show(&config, &index, &file)?,
        Command::Watch => watch_forever(config, index, &crawl.tree)?,
    }
    Ok(())
}

fn print_tree(tree: &FileTree, config: &Config) {
    for line in render_visible(tree, config) {
        if tree.node(line.node).is_dir() {
            println!("{}", line.text.as_str().bold().blue());
        } else {
            println!("{}", line.text);
        }
    }
}

fn select(index: &SharedIndex, language: Option<&str>, tag: Option<&str>) -> Vec<Snippet> {
    let mut snippets = match (language, tag) {
        (Some(language), Some(tag)) => {
            index.by_language(language).into_iter().filter(|s| s.metadata().tags.iter().any(|t| t == tag)).collect()
        }
        (Some(language), None) => index.by_language(language),
        (None, Some(tag)) => index.by_tag(tag),
        (None, None) => index.list(),
    };
    snippets.sort_by(|a, b| a.file_path().cmp(b.file_path()));
    snippets
}

/// Header for `list`: count plus every language and tag in use.
fn summary_line(index: &SnippetIndex) -> String {
    format!("{} snippets | languages: {} | tags: {}", index.len(), index.languages().join(", "), index.tags().join(", "))
}

fn print_list(index: &SharedIndex, language: Option<&str>, tag: Option<&str>) {
    println!("{}", summary_line(&index.read()).bold());
    for snippet in select(index, language, tag) {
        let meta = snippet.metadata();
        println!("{}  {}  {}", snippet.file_path().display(), meta.language.as_str().dark_grey(), meta.tags.join(","));
    }
}

/// Accepts an indexed path or one relative to the data directory.
fn resolve(config: &Config, index: &SharedIndex, file: &Path) -> Option<Snippet> {
    index.get(file).or_else(|| index.get(&config.data_dir.join(file)))
}

fn show(config: &Config, index: &SharedIndex, file: &Path) -> Result<()> {
    let snippet = resolve(config, index, file).ok_or_else(|| NavaniError::NotFound(file.to_path_buf()))?;
    for line in snippet.metadata().summary_lines() {
        println!("{}", line);
    }
    println!();
    let content = store::read_snippet_content(&snippet)?;
    print!("{}", highlight::highlight(snippet.file_name(), &snippet.metadata().language, &content));
    Ok(())
}

fn watch_forever(config: Config, index: SharedIndex, tree: &FileTree) -> Result<()> {
    print_tree(tree, &config);
    let config = Arc::new(config);
    let _handle = nv_mod_sync::watch(config.clone(), index.clone())?;

    let mut last = index.len();
    println!("watching {} ({} snippets)", config.data_dir.display(), last);
    loop {
        thread::sleep(POLL_INTERVAL);
        let count = index.len();
        if count != last {
            println!("[{}] {} snippets", chrono::Local::now().format("%H:%M:%S"), count);
            last = count;
        }
    }
}
