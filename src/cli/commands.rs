//! CLI command implementations
//!
//! Each command writes its result to `out` and logs lifecycle events to
//! stderr. `run_command` binds them to the process stdin/stdout.

use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::index::IndexSpec;
use crate::init::{InitError, SchemaInitializer, SUCCESS_MESSAGE};
use crate::observability::{log_event_at, log_event_with_fields, Event, Severity};
use crate::store::{DocumentStore, FileStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_error, write_pretty, write_response};

/// Dispatch a parsed command against the process stdin/stdout
pub fn run_command(cmd: Command) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_command_with(cmd, stdin.lock(), &mut stdout.lock())
}

/// Dispatch a parsed command against the given streams
pub fn run_command_with<R: Read, W: Write>(cmd: Command, input: R, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config, out),
        Command::Export { collection } => export(collection.as_deref(), out),
        Command::Insert { config, collection } => insert(&config, &collection, input, out),
        Command::Status { config } => status(&config, out),
    }
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", path.display().to_string().as_str()),
            ("database", config.database.as_str()),
        ],
    );
    Ok(config)
}

/// Opening the store stands in for connecting to the database
fn open_store(config: &Config) -> CliResult<FileStore> {
    let store = FileStore::open(config.data_path()).map_err(InitError::Connection)?;
    log_event_with_fields(
        Event::StoreOpened,
        &[
            ("data_file", config.data_file.as_str()),
            ("collections", store.collection_names().len().to_string().as_str()),
        ],
    );
    Ok(store)
}

/// Create every collection and index of the transport catalog
pub fn init<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = load_config(config_path)?;
    let mut store = open_store(&config)?;

    SchemaInitializer::transport()
        .with_database(config.database.clone())
        .run(&mut store)?;

    writeln!(out, "{}", SUCCESS_MESSAGE)?;
    out.flush()?;
    Ok(())
}

/// Print the MongoDB commands `init` is equivalent to
pub fn export<W: Write>(collection: Option<&str>, out: &mut W) -> CliResult<()> {
    let initializer = SchemaInitializer::transport();

    if let Some(name) = collection {
        if !initializer.catalog().iter().any(|c| c.name() == name) {
            return Err(CliError::UnknownCollection(name.to_string()));
        }
    }

    let commands: Vec<Value> = initializer
        .plan()
        .iter()
        .filter(|step| collection.map_or(true, |name| step.collection() == name))
        .map(|step| step.to_command())
        .collect();

    write_pretty(
        out,
        &json!({
            "database": initializer.database(),
            "commands": commands,
        }),
    )
}

/// Insert one document read from `input` into a collection
pub fn insert<R: Read, W: Write>(
    config_path: &Path,
    collection: &str,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let result = load_config(config_path)
        .and_then(|config| open_store(&config))
        .and_then(|mut store| {
            let document = read_document(input)?;
            Ok(store.insert(collection, document)?)
        });

    match result {
        Ok(id) => {
            log_event_with_fields(
                Event::DocumentInserted,
                &[("collection", collection), ("_id", id.to_string().as_str())],
            );
            write_response(out, json!({ "_id": id }))
        }
        Err(err) => {
            log_event_at(
                rejection_severity(&err),
                Event::DocumentRejected,
                &[("collection", collection), ("code", err.code())],
            );
            write_error(out, err.code(), &err.to_string())?;
            Err(err)
        }
    }
}

/// WARN when the document itself was refused, ERROR when the store failed
fn rejection_severity(err: &CliError) -> Severity {
    match err {
        CliError::Store(e) if e.is_rejection() => Severity::Warn,
        CliError::InvalidInput(_) => Severity::Warn,
        _ => Severity::Error,
    }
}

/// Print collections, document counts and index declarations
pub fn status<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let mut collections = Vec::new();
    for name in store.collection_names() {
        let indexes = store.indexes(&name).unwrap_or_default();
        collections.push(json!({
            "name": name,
            "documents": store.count(&name)?,
            "indexes": indexes.iter().map(IndexSpec::to_mongo_index).collect::<Vec<_>>(),
        }));
    }

    write_pretty(
        out,
        &json!({
            "database": config.database,
            "data_file": config.data_file,
            "collections": collections,
        }),
    )
}
