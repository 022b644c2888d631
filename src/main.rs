use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use citypulse::cli::{Cli, Commands};
use citypulse::config::Config;
use citypulse::domain::{Event, FilterSet, NewLocalEvent};
use citypulse::errors::{EventsError, EventsResult};
use citypulse::services::{FeedCompositor, FetchOutcome};
use citypulse::sources::TicketmasterSource;
use citypulse::storage::{EventStore, LocalQuery, SqliteEventStore, SqliteStorage};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> EventsResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;
    let store = SqliteEventStore::new(storage);

    match cli.command {
        Commands::Add {
            title,
            location,
            start,
            price,
            category,
            seats,
        } => cmd_add(store, title, location, start, price, category, seats),
        Commands::List => cmd_list(store),
        Commands::Seed => cmd_seed(store),
        Commands::Browse {
            keyword,
            location,
            category,
            pages,
            seed,
        } => {
            let source = TicketmasterSource::new(&config.base_url, &config.api_key);
            cmd_browse(store, source, keyword, location, category, pages, seed)
        }
    }
}

fn cmd_add(
    store: SqliteEventStore,
    title: String,
    location: String,
    start: Option<String>,
    price: f64,
    category: Option<String>,
    seats: Option<i64>,
) -> EventsResult<()> {
    let start_time = start
        .map(|raw| {
            chrono::DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| EventsError::InvalidInput(format!("start time: {}", e)))
        })
        .transpose()?;

    let event = NewLocalEvent::new(title, location)
        .with_start_time(start_time)
        .with_price(price)
        .with_category(category)
        .with_seats(seats);

    let id = store.insert(&event)?;
    println!("Event added with id {}", id);

    Ok(())
}

fn cmd_list(store: SqliteEventStore) -> EventsResult<()> {
    let rows = store.search(&LocalQuery::default(), 0, 200)?;

    if rows.is_empty() {
        println!("No local events.");
        return Ok(());
    }

    println!("Local events:\n");
    for row in rows {
        let when = row
            .start_time
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "TBA".to_string());
        let category = row.category_name.as_deref().unwrap_or("-");
        println!("  #{} {} [{}]", row.id, row.title, category);
        println!("    When: {}", when);
        println!("    Where: {}", row.location);
        println!();
    }

    Ok(())
}

fn cmd_seed(store: SqliteEventStore) -> EventsResult<()> {
    let samples = sample_events();
    let count = samples.len();

    for event in &samples {
        store.insert(event)?;
    }

    println!("Seeded {} local events.", count);
    Ok(())
}

fn sample_events() -> Vec<NewLocalEvent> {
    let at = |iso: &str| {
        chrono::DateTime::parse_from_rfc3339(iso)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Utc))
    };

    vec![
        NewLocalEvent::new("Pottery Taster".to_string(), "Studio 9, York".to_string())
            .with_start_time(at("2025-11-08T18:00:00Z"))
            .with_price(25.0)
            .with_category(Some("Workshops".to_string()))
            .with_seats(Some(12)),
        NewLocalEvent::new("Open Mic Night".to_string(), "The Cellar, York".to_string())
            .with_start_time(at("2025-11-12T19:30:00Z"))
            .with_category(Some("Music".to_string()))
            .with_seats(Some(60)),
        NewLocalEvent::new("Sunday Food Market".to_string(), "Riverside, York".to_string())
            .with_start_time(at("2025-11-16T10:00:00Z"))
            .with_category(Some("Family".to_string())),
        NewLocalEvent::new("Five-a-side Tournament".to_string(), "Hamilton Park, York".to_string())
            .with_start_time(at("2025-11-22T09:00:00Z"))
            .with_price(5.0)
            .with_category(Some("Sports".to_string()))
            .with_seats(Some(40)),
    ]
}

fn cmd_browse(
    store: SqliteEventStore,
    source: TicketmasterSource,
    keyword: Option<String>,
    location: Option<String>,
    category: Option<String>,
    pages: u32,
    seed: Option<u64>,
) -> EventsResult<()> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let compositor = FeedCompositor::new(store, source, rng);
    let filter = FilterSet {
        keyword,
        location,
        category,
    };

    let mut shown = 0;

    for page_index in 0..pages.max(1) {
        let outcome = compositor.fetch_page(&filter, page_index == 0)?;

        let page = match outcome {
            FetchOutcome::Page(page) => page,
            FetchOutcome::InFlight | FetchOutcome::Stale => continue,
        };

        for event in &page.events[shown..] {
            print_event(event);
        }
        shown = page.events.len();

        if !page.can_load_more {
            println!("No more events.");
            break;
        }
    }

    println!("{} events shown.", shown);
    Ok(())
}

fn print_event(event: &Event) {
    let when = event
        .start_time
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "TBA".to_string());

    println!("  {} [{}]", event.title, event.origin);
    println!("    When: {}", when);
    if event.extra_count > 0 {
        println!("    +{} more dates", event.extra_count);
    }
    if !event.location.is_empty() {
        println!("    Where: {}", event.location);
    }
    println!("    Price: {}", event.price);
    if let Some(organizer) = &event.external_organizer {
        println!("    Organizer: {}", organizer);
    }
    println!();
}
