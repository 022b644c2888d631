use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "citypulse")]
#[command(about = "Community events feed aggregator merging local listings with Ticketmaster")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a local event
    Add {
        /// Event title
        title: String,

        /// Venue and city, e.g. "The Globe, Leeds"
        location: String,

        /// Start time (RFC 3339, e.g. 2025-11-05T19:00:00Z)
        #[arg(short, long)]
        start: Option<String>,

        /// Ticket price (0 = free)
        #[arg(short, long, default_value_t = 0.0)]
        price: f64,

        /// Category label, e.g. Music
        #[arg(short, long)]
        category: Option<String>,

        /// Seats available
        #[arg(long)]
        seats: Option<i64>,
    },

    /// List local events
    List,

    /// Populate the local store with sample events
    Seed,

    /// Browse the combined local + Ticketmaster feed
    Browse {
        /// Keyword to search titles for
        #[arg(short, long)]
        keyword: Option<String>,

        /// City or venue filter
        #[arg(short, long)]
        location: Option<String>,

        /// Category label filter, e.g. Music
        #[arg(short, long)]
        category: Option<String>,

        /// Number of pages to load (first page plus load-more cycles)
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Seed for the feed shuffle (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
}
