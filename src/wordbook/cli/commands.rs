use super::dialog::{AssumeYes, TerminalDialog};
use super::render::{
    print_messages, render_entry, render_entry_list, render_text_list, ListedEntry, Message,
};
use super::setup::{Cli, Commands, FieldArgs};
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};
use wordbook::app::App;
use wordbook::error::{Result, WordbookError};
use wordbook::logging::init_logging;
use wordbook::model::{FieldKind, FieldValue, LIST_SEPARATOR};
use wordbook::schema::{Schema, DEFINITION, SYNONYMS, TAGS};
use wordbook::session::Transition;
use wordbook::settings::{
    AppDirs, Settings, KNOWN_KEYS, LAST_SEARCH_TEXT, LAST_SELECTED_WORD, STORAGE_PATH,
};
use wordbook::store::fs::FsBackend;

/// Value of `list`'s query that clears the remembered search.
const CLEAR_QUERY: &str = "-";

struct AppContext {
    app: App<FsBackend>,
    settings: Settings,
}

impl AppContext {
    /// Remembers selection and search, then writes the settings file.
    fn shutdown(mut self) -> Result<()> {
        self.app.shutdown(&mut self.settings);
        self.settings.save()
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let mut ctx = init_context(&cli)?;

    let result = match cli.command {
        Some(Commands::List { query }) => handle_list(&mut ctx, query),
        Some(Commands::Show { word }) => handle_show(&mut ctx, word),
        Some(Commands::New { word, fields }) => handle_new(&mut ctx, word, fields),
        Some(Commands::Edit {
            word,
            rename,
            fields,
        }) => handle_edit(&mut ctx, word, rename, fields),
        Some(Commands::Delete { word, yes }) => handle_delete(&mut ctx, word, yes),
        Some(Commands::Tag { tag }) => handle_tag(&mut ctx, tag),
        Some(Commands::Fields) => handle_fields(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&mut ctx, Vec::new()),
    };

    // Settings are written even when the command failed, like closing the window.
    let saved = ctx.shutdown();
    result.and(saved)
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let dirs = AppDirs::discover()?;
    let mut settings = Settings::load(&dirs.settings)?;

    let storage = choose_storage(cli.store.as_deref(), &mut settings, &dirs);
    debug!("event=open storage=\"{}\"", storage.display());

    let app = App::open(Schema::builtin(), FsBackend::new(storage), &settings);

    let failures = app.store().load_failures().len();
    if failures > 0 {
        print_messages(&[Message::warning(format!(
            "{} record(s) could not be read and were skipped (run with -v for details)",
            failures
        ))]);
    }

    Ok(AppContext { app, settings })
}

/// Storage for this run: `--store`, then the configured path, then the
/// default. The first path used is recorded when none is configured.
fn choose_storage(flag: Option<&Path>, settings: &mut Settings, dirs: &AppDirs) -> PathBuf {
    let configured = settings.storage_path();
    let storage = match (flag, configured.clone()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(path)) => path,
        (None, None) => dirs.default_storage(),
    };
    if configured.is_none() {
        info!("event=storage_path status=recorded path=\"{}\"", storage.display());
        settings.set(STORAGE_PATH, storage.display().to_string());
    }
    storage
}

fn handle_list(ctx: &mut AppContext, query: Vec<String>) -> Result<()> {
    if !query.is_empty() {
        let query = query.join(" ");
        if query == CLEAR_QUERY {
            ctx.app.set_search_text("");
        } else {
            ctx.app.set_search_text(query);
        }
    }
    print_list(ctx);
    Ok(())
}

fn handle_tag(ctx: &mut AppContext, tag: String) -> Result<()> {
    ctx.app.select_tag(&tag);
    print_list(ctx);
    Ok(())
}

fn print_list(ctx: &AppContext) {
    let store = ctx.app.store();
    let listed: Vec<ListedEntry> = ctx
        .app
        .filtered_entries()
        .into_iter()
        .map(|entry| ListedEntry {
            entry,
            modified: store.modified_at(&entry.word),
        })
        .collect();

    print!("{}", render_entry_list(&listed));

    let search = ctx.app.search_text();
    if !search.is_empty() {
        print_messages(&[Message::info(format!(
            "Filter \"{}\": {} of {} entries (`wordbook list -` to clear)",
            search,
            listed.len(),
            store.len()
        ))]);
    }
}

fn handle_show(ctx: &mut AppContext, word: Option<String>) -> Result<()> {
    if let Some(word) = word {
        ctx.app.select_word(&word, &mut TerminalDialog::new())?;
    }

    let store = ctx.app.store();
    let entry = ctx.app.current_entry();
    if !store.contains(entry) {
        print_messages(&[Message::info("No entry selected. Use `wordbook show WORD`.")]);
        return Ok(());
    }

    print!(
        "{}",
        render_entry(entry, ctx.app.schema(), |word| store
            .find_by_word(word)
            .is_some())
    );
    Ok(())
}

fn handle_new(ctx: &mut AppContext, word: String, fields: FieldArgs) -> Result<()> {
    let updates = field_updates(ctx.app.schema(), &fields)?;

    ctx.app.new_entry()?;
    let working = ctx.app.working_mut()?;
    working.word = word;
    for (name, value) in updates {
        working.set(&name, value);
    }

    let saved = ctx.app.save_entry()?;
    print_messages(&[Message::success(format!("Entry created: {}", saved.word))]);
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    word: String,
    rename: Option<String>,
    fields: FieldArgs,
) -> Result<()> {
    if rename.is_none() && fields.is_empty() {
        return Err(WordbookError::InvalidArgument(
            "nothing to change: pass --word, --def, --tags, --synonyms or --set".to_string(),
        ));
    }
    let updates = field_updates(ctx.app.schema(), &fields)?;

    ctx.app.select_word(&word, &mut TerminalDialog::new())?;
    ctx.app.edit_entry()?;
    let working = ctx.app.working_mut()?;
    for (name, value) in updates {
        working.set(&name, value);
    }
    if let Some(new_word) = rename {
        working.word = new_word;
    }

    let saved = ctx.app.save_entry()?;
    let message = if saved.word == word {
        format!("Entry updated: {}", saved.word)
    } else {
        format!("Entry renamed: {} -> {}", word, saved.word)
    };
    print_messages(&[Message::success(message)]);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, word: String, yes: bool) -> Result<()> {
    ctx.app.select_word(&word, &mut TerminalDialog::new())?;

    let transition = if yes {
        ctx.app.delete_entry(&mut AssumeYes)?
    } else {
        ctx.app.delete_entry(&mut TerminalDialog::new())?
    };

    let message = match transition {
        Transition::Applied => Message::success(format!("Entry deleted: {}", word)),
        _ => Message::info("Nothing deleted."),
    };
    print_messages(&[message]);
    Ok(())
}

fn handle_fields(ctx: &AppContext) -> Result<()> {
    let schema = ctx.app.schema();
    let lines: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| {
            let title = schema.module_title(&field.module).unwrap_or(&field.name);
            let kind = match field.kind {
                FieldKind::Text => "text",
                FieldKind::List => "list",
                FieldKind::Other => "any",
            };
            let default = serde_json::to_string(&field.default).unwrap_or_default();
            format!(
                "{:<12} {:<12} {:<5} {:<18} {}",
                field.name, title, kind, field.module, default
            )
        })
        .collect();

    print!("{}", render_text_list(&lines, "No fields declared."));
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            let lines: Vec<String> = ctx
                .settings
                .iter()
                .map(|(k, v)| format!("{} = {}", k, v))
                .collect();
            print!("{}", render_text_list(&lines, "No configuration values."));
            return Ok(());
        }
    };

    if !KNOWN_KEYS.contains(&key.as_str()) {
        return Err(WordbookError::InvalidArgument(format!(
            "unknown setting \"{}\" (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        )));
    }

    let value = match value {
        Some(value) => value,
        None => {
            match ctx.settings.get(&key) {
                Some(value) => println!("{} = {}", key, value),
                None => print_messages(&[Message::info(format!("{} is not set", key))]),
            }
            return Ok(());
        }
    };

    // Selection and search are written back from the app on shutdown, so
    // those two go through the app.
    match key.as_str() {
        LAST_SEARCH_TEXT => ctx.app.set_search_text(value.clone()),
        LAST_SELECTED_WORD => {
            ctx.app.select_word(&value, &mut TerminalDialog::new())?;
        }
        _ => {}
    }
    ctx.settings.set(&key, value.as_str());

    let mut messages = vec![Message::success(format!("{} = {}", key, value))];
    if key == STORAGE_PATH {
        messages.push(Message::info("The new storage is used from the next run."));
    }
    print_messages(&messages);
    Ok(())
}

/// Field values to apply to the working copy, typed after the schema.
///
/// Fields the schema does not declare are stored as text.
fn field_updates(schema: &Schema, fields: &FieldArgs) -> Result<Vec<(String, FieldValue)>> {
    let mut updates = Vec::new();

    if let Some(definition) = &fields.definition {
        updates.push((DEFINITION.to_string(), FieldValue::text(definition.as_str())));
    }
    if let Some(tags) = &fields.tags {
        updates.push((TAGS.to_string(), FieldValue::list(split_list(tags))));
    }
    if let Some(synonyms) = &fields.synonyms {
        updates.push((SYNONYMS.to_string(), FieldValue::list(split_list(synonyms))));
    }

    for assignment in &fields.assignments {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            WordbookError::InvalidArgument(format!(
                "expected FIELD=VALUE, got \"{}\"",
                assignment
            ))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WordbookError::InvalidArgument(format!(
                "missing field name in \"{}\"",
                assignment
            )));
        }

        let value = match schema.field(name).map(|field| field.kind) {
            Some(FieldKind::List) => FieldValue::list(split_list(raw)),
            _ => FieldValue::text(raw),
        };
        updates.push((name.to_string(), value));
    }

    Ok(updates)
}

/// Splits a comma separated list, dropping blank items.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FieldArgs {
        FieldArgs::default()
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(split_list("animal, pet,,  "), vec!["animal", "pet"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn updates_from_flags() {
        let fields = FieldArgs {
            definition: Some("a small feline".to_string()),
            tags: Some("animal,pet".to_string()),
            ..args()
        };
        let updates = field_updates(&Schema::builtin(), &fields).unwrap();
        assert_eq!(
            updates,
            vec![
                (DEFINITION.to_string(), FieldValue::text("a small feline")),
                (TAGS.to_string(), FieldValue::list(["animal", "pet"])),
            ]
        );
    }

    #[test]
    fn assignments_follow_schema_kind() {
        let fields = FieldArgs {
            assignments: vec![
                "synonyms=kitty, puss".to_string(),
                "origin=latin, maybe".to_string(),
            ],
            ..args()
        };
        let updates = field_updates(&Schema::builtin(), &fields).unwrap();
        assert_eq!(updates[0].1, FieldValue::list(["kitty", "puss"]));
        assert_eq!(updates[1].1, FieldValue::text("latin, maybe"));
    }

    #[test]
    fn malformed_assignments() {
        for bad in ["origin", "=latin"] {
            let fields = FieldArgs {
                assignments: vec![bad.to_string()],
                ..args()
            };
            assert!(matches!(
                field_updates(&Schema::builtin(), &fields),
                Err(WordbookError::InvalidArgument(_))
            ));
        }
    }

    fn dirs() -> AppDirs {
        AppDirs {
            settings: PathBuf::from("/home/me/.config/wordbook"),
            data: PathBuf::from("/home/me/.local/share/wordbook"),
        }
    }

    #[test]
    fn first_store_flag_is_recorded() {
        let mut settings = Settings::empty("/unused");
        let chosen = choose_storage(Some(Path::new("/tmp/words")), &mut settings, &dirs());
        assert_eq!(chosen, PathBuf::from("/tmp/words"));
        assert_eq!(settings.get(STORAGE_PATH), Some("/tmp/words"));
    }

    #[test]
    fn store_flag_does_not_replace_configured_path() {
        let mut settings = Settings::empty("/unused");
        settings.set(STORAGE_PATH, "/srv/words");
        let chosen = choose_storage(Some(Path::new("/tmp/words")), &mut settings, &dirs());
        assert_eq!(chosen, PathBuf::from("/tmp/words"));
        assert_eq!(settings.get(STORAGE_PATH), Some("/srv/words"));

        let chosen = choose_storage(None, &mut settings, &dirs());
        assert_eq!(chosen, PathBuf::from("/srv/words"));
    }

    #[test]
    fn default_storage_is_recorded() {
        let mut settings = Settings::empty("/unused");
        let chosen = choose_storage(None, &mut settings, &dirs());
        assert_eq!(chosen, dirs().default_storage());
        assert_eq!(
            settings.storage_path(),
            Some(PathBuf::from("/home/me/.local/share/wordbook/entries"))
        );
    }
}
