use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use memtl::config::{Settings, SettingsStore};
use memtl::debounce::debounce;
use memtl::ingest;
use memtl::models::ContentItem;
use memtl::output::{json as json_out, table};
use memtl::search::{filters::Filters, search_items};
use memtl::timeline::time::{minutes, parse_timestamp};
use memtl::timeline::{
    build_chunks, build_segments, filter_to_range, filter_to_window, group_runs, sort_and_fill_frames, GroupNavigator,
};

#[derive(Parser)]
#[command(name = "memtl", version, about = "Memory timeline — segment bars, 30-minute chunks and content groups over captured frames and transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Timeline JSON files, directories or glob patterns (default: stdin)
    #[arg(short, long = "input", global = true)]
    inputs: Vec<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to settings file (default: ~/.memtl/config.toml)
    #[arg(long, global = true, env = "MEMTL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a range into fixed segments (timeline bar)
    Segments {
        /// Range start (RFC 3339, YYYY-MM-DD[ HH:MM[:SS]] or epoch ms)
        #[arg(long)]
        start: String,

        /// Range end, inclusive (default: start + timeline.range_hours)
        #[arg(long)]
        end: Option<String>,

        /// Segment length in minutes (default: timeline.segment_minutes)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        segment_minutes: Option<u32>,
    },

    /// Bucket content into calendar-aligned chunks
    Chunks {
        /// Window start
        #[arg(long)]
        start: String,

        /// Window end, inclusive (default: start + timeline.window_minutes)
        #[arg(long)]
        end: Option<String>,

        /// Chunk length in minutes (default: timeline.chunk_minutes)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        chunk_minutes: Option<u32>,

        /// List the items inside each chunk
        #[arg(long)]
        expand: bool,
    },

    /// Collapse runs of identical frames and transcripts
    Groups {
        /// Window start
        #[arg(long)]
        start: String,

        /// Window end, inclusive (default: start + timeline.window_minutes)
        #[arg(long)]
        end: Option<String>,

        /// Show only this group (1-based, clamped)
        #[arg(long)]
        index: Option<usize>,
    },

    /// Page through content groups; reads n/p/q commands from stdin
    Browse {
        /// Window start
        #[arg(long)]
        start: String,

        /// Window end, inclusive (default: start + timeline.window_minutes)
        #[arg(long)]
        end: Option<String>,
    },

    /// Search transcripts and annotations
    Search {
        /// Case-insensitive text to look for (empty matches everything)
        query: Option<String>,

        /// Filter by speaker name (partial match)
        #[arg(long)]
        speaker: Option<String>,

        /// Filter by source id
        #[arg(long)]
        source_id: Option<i64>,

        /// Filter by annotation type (e.g. user_note, ai_summary)
        #[arg(long)]
        annotation_type: Option<String>,

        /// Read queries line by line from stdin, debounced
        #[arg(long)]
        interactive: bool,
    },

    /// Show or edit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current settings
    Show,
    /// Print the settings file path
    Path,
    /// Write default settings if none exist
    Init,
    /// Set a value, e.g. `timeline.segment_minutes 30`
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.json;

    let store = match cli.config {
        Some(ref path) => SettingsStore::new(path),
        None => SettingsStore::at_default_path()?,
    };
    let settings = store.load()?;
    debug!("Settings from {}: {:?}", store.path().display(), settings);

    match cli.command {
        Commands::Segments {
            start,
            end,
            segment_minutes,
        } => {
            let start = parse_timestamp(&start)?;
            let end = match end {
                Some(end) => parse_timestamp(&end)?,
                None => match start.checked_add_signed(settings.range()) {
                    Some(end) => end,
                    None => bail!("Range end is out of bounds; pass --end explicitly"),
                },
            };
            let segment_duration = segment_minutes
                .map(minutes)
                .unwrap_or_else(|| settings.segment_duration());

            let items = load_items(&cli.inputs)?;
            let in_range = filter_to_range(&items, start, Some(end));
            let segments = build_segments(&in_range, start, end, segment_duration);

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "start": start,
                    "end": end,
                    "segment_minutes": segment_duration.num_minutes(),
                    "bar": table::segment_bar(&segments),
                    "segments": segments,
                }))?;
            } else {
                table::print_segments(&segments, segment_duration);
            }
        }

        Commands::Chunks {
            start,
            end,
            chunk_minutes,
            expand,
        } => {
            let (start, end) = parse_window(&start, end.as_deref())?;
            let chunk_duration = chunk_minutes
                .map(minutes)
                .unwrap_or_else(|| settings.chunk_duration());

            let items = load_items(&cli.inputs)?;
            let in_window = filter_to_window(&items, start, end, settings.window());
            let chunks = build_chunks(&in_window, chunk_duration);

            if json_output {
                json_out::print_json(&serde_json::json!({
                    "total": chunks.len(),
                    "chunks": chunks,
                }))?;
            } else {
                table::print_chunks(&chunks, expand);
            }
        }

        Commands::Groups { start, end, index } => {
            let (start, end) = parse_window(&start, end.as_deref())?;
            let items = load_items(&cli.inputs)?;
            let sorted = sort_and_fill_frames(&filter_to_window(&items, start, end, settings.window()));
            let groups = group_runs(&sorted);

            match index {
                Some(index) => {
                    let mut nav = GroupNavigator::new(groups);
                    nav.select(index.saturating_sub(1));
                    if json_output {
                        json_out::print_json(&serde_json::json!({
                            "index": nav.selected_index() + 1,
                            "total": nav.len(),
                            "group": nav.current(),
                        }))?;
                    } else {
                        table::print_group_page(&nav, &sorted);
                    }
                }
                None => {
                    if json_output {
                        json_out::print_json(&serde_json::json!({
                            "total": groups.len(),
                            "groups": groups,
                        }))?;
                    } else {
                        table::print_groups(&groups);
                    }
                }
            }
        }

        Commands::Browse { start, end } => {
            if cli.inputs.is_empty() {
                bail!("browse reads commands from stdin; pass the timeline with --input");
            }
            let (start, end) = parse_window(&start, end.as_deref())?;
            let items = load_items(&cli.inputs)?;
            let sorted = sort_and_fill_frames(&filter_to_window(&items, start, end, settings.window()));
            browse(GroupNavigator::from_items(&sorted), &sorted).await?;
        }

        Commands::Search {
            query,
            speaker,
            source_id,
            annotation_type,
            interactive,
        } => {
            let filters = Filters {
                speaker,
                source_id,
                annotation_type,
            };

            if interactive {
                if cli.inputs.is_empty() {
                    bail!("interactive search reads queries from stdin; pass the timeline with --input");
                }
                let items = load_items(&cli.inputs)?;
                interactive_search(items, filters, &settings, json_output).await?;
            } else {
                let items = load_items(&cli.inputs)?;
                let query = query.unwrap_or_default();
                let results = search_items(&items, &query, &filters);
                if json_output {
                    json_out::print_json(&serde_json::json!({
                        "query": query,
                        "total": results.len(),
                        "results": results,
                    }))?;
                } else {
                    table::print_search_results(&results, &query);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("# {}", store.path().display());
                print!("{}", settings.to_toml()?);
            }
            ConfigAction::Path => {
                println!("{}", store.path().display());
            }
            ConfigAction::Init => {
                if store.init()? {
                    println!("Created {}", store.path().display());
                } else {
                    println!("Already exists: {}", store.path().display());
                }
            }
            ConfigAction::Set { key, value } => {
                let mut updated = settings;
                updated.set(&key, &value)?;
                store.save(&updated)?;
                println!("{key} = {value}");
            }
        },
    }

    Ok(())
}

fn load_items(inputs: &[String]) -> Result<Vec<ContentItem>> {
    let (items, stats) = ingest::load(inputs)?;
    debug!("{stats:?}");
    Ok(items)
}

fn parse_window(start: &str, end: Option<&str>) -> Result<(DateTime<Utc>, Option<DateTime<Utc>>)> {
    let start = parse_timestamp(start)?;
    let end = end.map(parse_timestamp).transpose()?;
    if let Some(end) = end {
        if end < start {
            warn!("End {end} is before start {start}; the window is empty");
        }
    }
    Ok((start, end))
}

async fn browse(mut nav: GroupNavigator, items: &[ContentItem]) -> Result<()> {
    table::print_group_page(&nav, items);
    if nav.is_empty() {
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let moved = match line.trim() {
            "n" | "next" => nav.step_forward(),
            "p" | "prev" => nav.step_back(),
            "q" | "quit" => break,
            "" => continue,
            other => {
                eprintln!("Unknown command {other:?} (n = next, p = prev, q = quit)");
                continue;
            }
        };
        if moved {
            println!();
            table::print_group_page(&nav, items);
        }
    }

    Ok(())
}

async fn interactive_search(
    items: Vec<ContentItem>,
    filters: Filters,
    settings: &Settings,
    json_output: bool,
) -> Result<()> {
    let items = Arc::new(items);
    let run_query = debounce(
        move |query: String| {
            let results = search_items(&items, &query, &filters);
            if json_output {
                let line = serde_json::json!({
                    "query": query,
                    "total": results.len(),
                    "results": results,
                });
                if let Err(e) = json_out::print_json_line(&line) {
                    warn!("Failed to print results: {e}");
                }
            } else {
                table::print_search_results(&results, &query);
            }
        },
        settings.debounce_delay(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        run_query.call(line);
    }

    // Let the last query of the final burst fire before exiting.
    while run_query.is_pending() {
        tokio::time::sleep(run_query.delay()).await;
    }

    Ok(())
}
