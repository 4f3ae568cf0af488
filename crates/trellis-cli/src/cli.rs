use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "trl")]
#[command(about = "trl - contacts organised by a hierarchy of tags")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/trellis/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Address book file (overrides config file)
    #[arg(short = 'd', long, global = true, env = "TRELLIS_DATA_FILE")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage contacts
    #[command(subcommand)]
    Contact(ContactCommands),

    /// Manage tags and the tag hierarchy
    #[command(subcommand)]
    Tag(TagCommands),
}

/// Optional contact fields shared by `add` and `edit`
#[derive(Debug, Clone, Default, Args)]
pub struct ContactFields {
    /// Phone number
    #[arg(short, long)]
    pub phone: Option<String>,

    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// Postal address
    #[arg(short, long)]
    pub address: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ContactCommands {
    /// Add a new contact
    Add {
        /// Full name
        name: String,

        #[command(flatten)]
        fields: ContactFields,

        /// Tag to attach (can be repeated)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Edit an existing contact
    Edit {
        /// Contact id
        id: u64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ContactFields,

        /// Replace all tags (can be repeated)
        #[arg(short, long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
    },

    /// Delete a contact
    Delete {
        /// Contact id
        id: u64,
    },

    /// List contacts, optionally only those under a tag
    List {
        /// Only contacts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Include contacts tagged with any descendant of --tag
        #[arg(short, long, requires = "tag")]
        recursive: bool,
    },

    /// Attach tags to a contact
    Tag {
        /// Contact id
        id: u64,

        /// Tags to attach
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Detach tags from a contact
    Untag {
        /// Contact id
        id: u64,

        /// Tags to detach
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TagCommands {
    /// Make CHILD a sub-tag of PARENT
    Link {
        parent: String,
        child: String,
    },

    /// Remove the edge PARENT -> CHILD ('*' removes every child)
    Unlink {
        parent: String,
        child: String,
    },

    /// Direct sub-tags of a tag
    Children { tag: String },

    /// Direct super-tags of a tag
    Parents { tag: String },

    /// Every tag below a tag
    Descendants { tag: String },

    /// Contacts carrying a tag
    Members {
        tag: String,

        /// Include members of every descendant tag
        #[arg(short, long)]
        recursive: bool,
    },

    /// Tags that have at least one sub-tag
    Supertags,

    /// Every known tag
    List,

    /// Delete a tag
    ///
    /// By default the tag's parents are linked to its children and the tag is
    /// removed from its contacts.
    Delete {
        tag: String,

        /// Delete every descendant tag as well
        #[arg(short, long)]
        recursive: bool,

        /// Delete the directly tagged contacts instead of untagging them
        #[arg(long)]
        with_contacts: bool,
    },
}
