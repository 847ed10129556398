use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use collection_editor::config::ConfigError;
use collection_editor::field;
use collection_editor::panel::DELETE_PROMPT;
use collection_editor::{
    ApiError, CollectionEditor, Confirm, DeleteOutcome, EditorConfig, EditorError, Record,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("invalid assignment `{0}`; expected FIELD=VALUE")]
    InvalidAssignment(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "admin-cli", about = "Browse and edit admin API collections")]
struct Cli {
    /// Overrides ADMIN_API_BASE_URL from the environment or `.env`.
    #[arg(long, env = "ADMIN_API_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List collections with their item counts.
    Collections,
    /// List the records of a collection.
    List {
        collection: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show one record.
    Show {
        collection: String,
        record_id: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Change fields of a record and save it.
    Edit {
        collection: String,
        record_id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Create a record from the collection's template.
    Create {
        collection: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Delete a record after confirmation.
    Delete {
        collection: String,
        record_id: String,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

/// Asks on stderr and reads the answer from stdin.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm_delete(&self, collection: &str, record: &Record) -> bool {
        let id = record.id().unwrap_or_default();
        eprint!("{DELETE_PROMPT} ({collection}/{id}) [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = EditorConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!(base_url = %config.base_url, page_limit = config.page_limit, "admin cli starting");
    let editor = CollectionEditor::from_config(&config)?;

    match cli.command {
        Command::Collections => run_collections(&editor).await,
        Command::List { collection, search, json } => run_list(&editor, &collection, search, json).await,
        Command::Show { collection, record_id, json } => run_show(&editor, &collection, &record_id, json).await,
        Command::Edit { collection, record_id, assignments } => {
            run_edit(&editor, &collection, &record_id, &assignments).await
        }
        Command::Create { collection, assignments } => run_create(&editor, &collection, &assignments).await,
        Command::Delete { collection, record_id, yes } => run_delete(&editor, &collection, &record_id, yes).await,
    }
}

async fn run_collections(editor: &CollectionEditor) -> Result<(), CliError> {
    for collection in editor.load_directory().await? {
        println!("{:<24} {}", collection.name, collection.label());
    }
    Ok(())
}

async fn run_list(
    editor: &CollectionEditor,
    collection: &str,
    search: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    editor.select_collection(collection).await?;
    if let Some(term) = search {
        editor.set_search(term);
    }
    let records = editor.filtered_records();
    if json {
        return print_json(&Value::Array(records.iter().map(Record::to_json).collect()));
    }
    for record in &records {
        print!("{}", render_record(record));
        println!();
    }
    eprintln!("{} of {} records", records.len(), editor.records().len());
    Ok(())
}

async fn run_show(editor: &CollectionEditor, collection: &str, record_id: &str, json: bool) -> Result<(), CliError> {
    let record = editor.fetch_record(collection, record_id).await?;
    if json {
        print_json(&record.to_json())
    } else {
        print!("{}", render_record(&record));
        Ok(())
    }
}

async fn run_edit(
    editor: &CollectionEditor,
    collection: &str,
    record_id: &str,
    assignments: &[String],
) -> Result<(), CliError> {
    let assignments = parse_assignments(assignments)?;
    editor.select_collection(collection).await?;
    editor.begin_edit(record_id)?;
    for (key, value) in assignments {
        editor.update_field(&key, value)?;
    }
    editor.save().await?;
    report_banner(editor);
    Ok(())
}

async fn run_create(editor: &CollectionEditor, collection: &str, assignments: &[String]) -> Result<(), CliError> {
    let assignments = parse_assignments(assignments)?;
    editor.select_collection(collection).await?;
    let fields = editor.open_create()?;
    if fields == 0 {
        eprintln!("`{collection}` has no records to derive a template from; creating an empty record");
    }
    for (key, value) in assignments {
        editor.update_create_field(&key, value)?;
    }
    editor.create().await?;
    report_banner(editor);
    Ok(())
}

async fn run_delete(editor: &CollectionEditor, collection: &str, record_id: &str, yes: bool) -> Result<(), CliError> {
    editor.select_collection(collection).await?;
    let confirm: &dyn Confirm = if yes { &true } else { &PromptConfirm };
    match editor.delete(record_id, confirm).await? {
        DeleteOutcome::Deleted => report_banner(editor),
        DeleteOutcome::Declined => eprintln!("delete cancelled"),
    }
    Ok(())
}

fn report_banner(editor: &CollectionEditor) {
    if let Some(banner) = editor.banner() {
        println!("{}", banner.text);
    }
}

/// Render a record as aligned `field  value` lines using display formatting.
fn render_record(record: &Record) -> String {
    let width = record.field_names().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in record.iter() {
        let shown = field::display(name, value);
        out.push_str(&format!("{name:<width$}  {}\n", shown.text));
    }
    out
}

fn parse_assignment(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_owned(), value.to_owned())),
        _ => Err(CliError::InvalidAssignment(raw.to_owned())),
    }
}

fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    raw.iter().map(|item| parse_assignment(item)).collect()
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;
