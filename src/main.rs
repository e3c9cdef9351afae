//importer 入口：把 json 文件导入 consul KV
use clap::{CommandFactory, Parser};
use discovery_rs::config::{CachedLoader, KeyLayout, Loader};
use discovery_rs::consul::ConsulConfig;
use std::path::PathBuf;
use std::process;

/// Imports a json file into a consul KV store.
#[derive(Parser, Debug)]
#[command(name = "importer")]
#[command(after_help = "Example: importer --file /path/to/json/file --namespace dev/config")]
struct Args {
    /// Path to a json file to import
    #[arg(long)]
    file: Option<PathBuf>,

    /// Prefix to use in consul
    #[arg(long, default_value = "")]
    namespace: String,

    /// Write keys in the old importer layout
    #[arg(long)]
    legacy_keys: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let Some(file) = args.file else {
        print_help();
    };
    if !file.exists() {
        log::error!("Given file does not exist: {}", file.display());
        process::exit(1);
    }

    let data = match tokio::fs::read(&file).await {
        Ok(data) => data,
        Err(e) => {
            log::error!("Error reading file {} : {}", file.display(), e);
            process::exit(1);
        }
    };

    let layout = if args.legacy_keys {
        KeyLayout::Legacy
    } else {
        KeyLayout::Qualified
    };
    let loader = match ConsulConfig::from_env().and_then(|c| CachedLoader::consul(args.namespace, c)) {
        Ok(loader) => loader.with_layout(layout),
        Err(e) => {
            log::error!("Could not create consul client: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = loader.import(&data).await {
        log::error!("Error importing data: {}", e);
        process::exit(1);
    }
    log::info!("Json from {} successfully loaded", file.display());
}

fn print_help() -> ! {
    let mut cmd = Args::command();
    if let Err(e) = cmd.print_help() {
        log::error!("Could not print usage: {}", e);
    }
    process::exit(1);
}
