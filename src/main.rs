//! Media Inventory CLI
//!
//! Scans directories as a device media index and prints the resulting
//! inventory, flat or grouped by folder.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use media_inventory::{
    CompletionQueue, FsMediaIndex, IndexConfig, JsonProgressReporter, MediaKind, MediaLibrary,
    ScanController,
};

const ABOUT: &str = r#"
Media Inventory - device media inventory engine

Examples:
  media_inventory scan -r ~/Music --kind audio            scan one directory
  media_inventory scan -r /a -r /b --kind video           scan several roots
  media_inventory scan -r ~/Music --kind audio --album-art  resolve cover art
  media_inventory scan -r ~/Pictures --kind images --json  JSON output
"#;

/// Device media inventory engine
#[derive(Parser)]
#[command(name = "media_inventory")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for media of one kind
    Scan {
        /// Root directories to index (repeatable)
        #[arg(short = 'r', long, required = true)]
        roots: Vec<PathBuf>,

        /// Media kind to scan: audio, video or images
        #[arg(short = 'k', long)]
        kind: MediaKind,

        /// Resolve album art for audio records
        #[arg(long)]
        album_art: bool,

        /// Output the inventory as JSON
        #[arg(long)]
        json: bool,

        /// Suppress per-row progress messages on stderr
        #[arg(short = 'q', long)]
        quiet: bool,

        /// Do not descend into subdirectories
        #[arg(long)]
        no_recursive: bool,

        /// Maximum traversal depth
        #[arg(long, default_value = "8")]
        max_depth: usize,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan {
            roots,
            kind,
            album_art,
            json,
            quiet,
            no_recursive,
            max_depth,
        }) => {
            info!("Starting {kind} scan of {} root(s)", roots.len());

            let config = IndexConfig::builder()
                .roots(roots)
                .recursive(!no_recursive)
                .max_depth(max_depth)
                .build();
            let index = Arc::new(FsMediaIndex::new(config));

            let library = MediaLibrary::new();
            let (queue, receiver) = CompletionQueue::channel();
            let controller = ScanController::new(library.clone())
                .with_index(index)
                .kind(kind)
                .with_album_art(album_art)
                .deliver_on(queue);

            let reporter = Arc::new(JsonProgressReporter::new(!quiet));
            if let Err(e) = controller.start_scan(Some(reporter)) {
                eprintln!("scan failed to start: {e}");
                std::process::exit(1);
            }

            // Completion lands back on this thread.
            while !receiver.run_one(Duration::from_millis(200)) {}

            let items = library.items(kind);
            if json {
                match serde_json::to_string_pretty(&items) {
                    Ok(out) => println!("{out}"),
                    Err(e) => eprintln!("failed to encode inventory: {e}"),
                }
            } else {
                println!("Scan completed: {} {kind} item(s)", items.len());
                library.with_store(kind, |store| {
                    let mut folders = store.folder_names();
                    folders.sort_unstable();
                    for folder in folders {
                        let records = store.folder(folder).unwrap_or(&[]);
                        println!("  {folder} ({})", records.len());
                        for record in records {
                            println!("    {}", record.name);
                        }
                    }
                });
            }
        }
        None => {
            println!("{ABOUT}");
            println!("Use 'media_inventory scan -h' for scan options");
        }
    }
}
