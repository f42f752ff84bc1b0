use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wordbook", bin_name = "wordbook", version)]
#[command(about = "A personal dictionary for the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the entries, instead of the configured one
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

/// Field values given on the command line. Lists are comma separated.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Definition text
    #[arg(short, long = "def", value_name = "TEXT")]
    pub definition: Option<String>,

    /// Tags, replacing the current ones (e.g. --tags animal,pet)
    #[arg(short, long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Synonyms, replacing the current ones
    #[arg(short, long, value_name = "WORDS")]
    pub synonyms: Option<String>,

    /// Any other field, as FIELD=VALUE (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,
}

impl FieldArgs {
    pub fn is_empty(&self) -> bool {
        self.definition.is_none()
            && self.tags.is_none()
            && self.synonyms.is_none()
            && self.assignments.is_empty()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entries, optionally filtered (e.g. "tag:pet", "def:feline", "cat")
    #[command(alias = "ls")]
    List {
        /// Search query; "-" clears the remembered one
        query: Vec<String>,
    },

    /// Show an entry (defaults to the last selected one)
    #[command(alias = "v")]
    Show { word: Option<String> },

    /// Add a new entry
    #[command(alias = "n")]
    New {
        word: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change an existing entry
    #[command(alias = "e")]
    Edit {
        word: String,

        /// Rename the entry
        #[arg(short, long = "word", value_name = "NEW")]
        rename: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        word: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List the entries carrying a tag
    Tag { tag: String },

    /// List the fields entries are made of
    Fields,

    /// Get or set configuration values
    Config {
        /// Setting to read or write
        key: Option<String>,

        /// New value
        value: Option<String>,
    },
}
