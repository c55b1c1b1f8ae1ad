// CLI module for offline-cache
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;

/// offline-cache - precache a page's assets and serve them when the origin is down
#[derive(Parser, Debug)]
#[command(name = "offline-cache", version, about, long_about = None)]
pub struct Args {
    /// Upstream origin to cache (overrides upstream.origin)
    #[arg(long, env = "OFFLINE_CACHE_ORIGIN")]
    pub origin: Option<String>,

    /// Path to a TOML config file
    #[arg(long, short)]
    pub config: Option<String>,

    /// Keep the cache in memory instead of on disk
    #[arg(long)]
    pub memory: bool,

    /// Run the install signal, print what was cached and exit
    #[arg(long)]
    pub install_only: bool,
}
