use std::path::PathBuf;

use clap::Parser;
use log::info;

use voxel_dungeon::{DungeonConfig, DungeonGenerator};

/// Generate a voxel dungeon and report what was built.
#[derive(Parser, Debug)]
#[command(name = "voxel-dungeon", version)]
struct Args {
    /// JSON config file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rooms, overriding the config
    #[arg(long)]
    rooms: Option<usize>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// Record profiling scopes and serve them to puffin_viewer
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DungeonConfig::from_json_file(path)?,
        None => DungeonConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(rooms) = args.rooms {
        config.room_count = rooms;
    }

    let _server = if args.profile {
        let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        let server = puffin_http::Server::new(&addr)?;
        puffin::set_scopes_on(true);
        info!("serving profile data on {addr}");
        Some(server)
    } else {
        None
    };

    let result = DungeonGenerator::generate(&config)?;
    puffin::GlobalProfiler::lock().new_frame();

    let summary = result.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} rooms ({} reachable), {} hallway cells, {} stairways, {} doors",
            summary.rooms, summary.reachable_rooms, summary.hallways, summary.stairways, summary.doors
        );
        for (a, b) in &summary.failed_connections {
            println!("  no path between {a} and {b}");
        }
    }

    if args.profile {
        info!("press Enter to exit");
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
    }

    Ok(())
}
