use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use versemap_core::{
    pipeline::{
        run_stages, DataDir, NeighborStage, PassageStage, SearchExportStage, SiteStage,
        SphereStage, Stage,
    },
    BookCatalog, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "versemap", about = "Embedding geometry artifacts for the scripture map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Common {
    /// Directory holding verses.json, embeddings.npy and the other artifacts
    #[arg(long)]
    data_dir: PathBuf,
    /// Path to config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quantised verse store for client-side search.
    Search {
        #[command(flatten)]
        common: Common,
    },
    /// Top-K neighbor table and book heatmap.
    Neighbors {
        #[command(flatten)]
        common: Common,
    },
    /// Passage manifest and pooled passage store.
    Passages {
        #[command(flatten)]
        common: Common,
    },
    /// Sphere scene with cross-reference arcs.
    Sphere {
        #[command(flatten)]
        common: Common,
    },
    /// Copy finished artifacts into the site's data directory.
    Stage {
        #[command(flatten)]
        common: Common,
        /// Destination directory
        #[arg(long, default_value = "site/data")]
        site_dir: PathBuf,
    },
    /// Every stage in order, then staging.
    All {
        #[command(flatten)]
        common: Common,
        /// Destination directory
        #[arg(long, default_value = "site/data")]
        site_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let catalog = Arc::new(BookCatalog::standard());
    let (common, site_dir) = match &cli.command {
        Commands::Search { common }
        | Commands::Neighbors { common }
        | Commands::Passages { common }
        | Commands::Sphere { common } => (common, None),
        Commands::Stage { common, site_dir } | Commands::All { common, site_dir } => {
            (common, Some(site_dir.clone()))
        }
    };

    let config = load_config(common.config.as_ref())?;
    let data = DataDir::new(&common.data_dir);

    let search = SearchExportStage::new(config.clone());
    let neighbors = NeighborStage::new(config.clone(), catalog.clone(), &data);
    let passages = PassageStage::new(config.clone(), catalog.clone());
    let sphere = SphereStage::new(config, catalog);
    let site = SiteStage::new(site_dir.unwrap_or_else(|| PathBuf::from("site/data")));

    let stages: Vec<&dyn Stage> = match cli.command {
        Commands::Search { .. } => vec![&search as &dyn Stage],
        Commands::Neighbors { .. } => vec![&neighbors as &dyn Stage],
        Commands::Passages { .. } => vec![&passages as &dyn Stage],
        Commands::Sphere { .. } => vec![&sphere as &dyn Stage],
        Commands::Stage { .. } => vec![&site as &dyn Stage],
        Commands::All { .. } => vec![
            &neighbors as &dyn Stage,
            &sphere as &dyn Stage,
            &search as &dyn Stage,
            &passages as &dyn Stage,
            &site as &dyn Stage,
        ],
    };

    let failed = run_stages(&stages, &data);
    if !failed.is_empty() {
        anyhow::bail!("{} stage(s) failed: {}", failed.len(), failed.join(", "));
    }
    info!("done");
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PipelineConfig> {
    let config = match path {
        Some(p) => PipelineConfig::from_json_file(p)?,
        None => PipelineConfig::default(),
    };
    info!("Using config: {:?}", config);
    Ok(config)
}
