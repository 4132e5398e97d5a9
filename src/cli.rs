use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{
    component::{Component, DrawerSize},
    status::DEFAULT_STATUS_LIMIT,
};

#[derive(Debug, Parser)]
#[command(
    name = "stuffstore",
    about = "Keep track of the components in your drawers"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a single component
    Show(ShowArgs),
    /// Create or update a component
    Edit(EditArgs),
    /// Search all components
    Search(SearchArgs),
    /// Put a component into the equivalence set of another
    Join(JoinArgs),
    /// Take a component out of its equivalence set
    Leave(LeaveArgs),
    /// List components equivalent to the given one
    Related(RelatedArgs),
    /// List all components
    List(ListArgs),
    /// Show how completely each drawer is described
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Show --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Component id
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Edit --

#[derive(Debug, Parser)]
pub struct EditArgs {
    /// Component id; created if it does not exist yet
    pub id: u64,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub value: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub footprint: Option<String>,

    #[arg(long)]
    pub quantity: Option<String>,

    #[arg(long)]
    pub datasheet_url: Option<String>,

    /// Drawer size: 0 small, 1 medium, 2 large
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub drawer_size: Option<u8>,

    /// Store the values exactly as given
    #[arg(long)]
    pub no_cleanup: bool,
}

impl EditArgs {
    /// Apply the given flags to `component`. Returns whether any flag was
    /// set at all.
    pub fn apply(&self, component: &mut Component) -> bool {
        let fields = [
            (&self.category, &mut component.category),
            (&self.value, &mut component.value),
            (&self.description, &mut component.description),
            (&self.notes, &mut component.notes),
            (&self.footprint, &mut component.footprint),
            (&self.quantity, &mut component.quantity),
            (&self.datasheet_url, &mut component.datasheet_url),
        ];

        let mut touched = false;
        for (flag, field) in fields {
            if let Some(value) = flag {
                field.clone_from(value);
                touched = true;
            }
        }
        if let Some(size) = self
            .drawer_size
            .and_then(|size| DrawerSize::try_from(size).ok())
        {
            component.drawer_size = size;
            touched = true;
        }
        touched
    }
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query, e.g. "10k ohm", "lm358 | ne5532", "like:42"
    pub query: String,

    /// Number of results to return (at most 100)
    #[arg(short = 'n', long, default_value = "20")]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Return all matching results
    #[arg(long)]
    pub all: bool,
}

// -- Equivalence sets --

#[derive(Debug, Parser)]
pub struct JoinArgs {
    /// Component to move
    pub id: u64,

    /// Set to join, named by its canonical id
    pub set: u64,
}

#[derive(Debug, Parser)]
pub struct LeaveArgs {
    /// Component to take out of its set
    pub id: u64,
}

#[derive(Debug, Parser)]
pub struct RelatedArgs {
    /// Component id
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- List --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// First id to report
    #[arg(long, default_value = "0")]
    pub offset: u64,

    /// Number of ids to report
    #[arg(long, default_value_t = DEFAULT_STATUS_LIMIT)]
    pub limit: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "stuffstore",
            &mut std::io::stdout(),
        );
    }
}
