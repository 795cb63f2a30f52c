use clap::{Parser, Subcommand};
use layergen::config::{self, GeneratorConfig};
use layergen::convert::{self, METADATA_DIR, Templates};
use layergen::duplicates::DuplicateSet;
use layergen::generate::{DATA_DIR, Generator, IMAGES_DIR};
use layergen::imaging::RustBackend;
use layergen::index::AssetIndex;
use layergen::{duplicates, index, output};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;

/// Shared flags for commands that generate images.
#[derive(clap::Args, Clone)]
struct GenerateArgs {
    /// Id of the first generated image
    #[arg(long, default_value_t = 1)]
    start: u32,

    /// Number of unique images to generate
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Seed the random generator for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
#[command(name = "layergen")]
#[command(about = "Composites layered image assets into unique randomized images")]
#[command(long_about = "\
Composites layered image assets into unique randomized images

Your filesystem is the data source. Categories are layer slots, types are
variants within a category, and items are the asset files themselves:

  assets/
  ├── background/                  # Category (layer 1, the base)
  │   ├── red/                     # Type
  │   │   ├── a.png                # Item
  │   │   └── b.png
  │   └── blue/
  │       └── c.png
  ├── character/                   # Category (layer 2, always drawn)
  │   └── robot/
  │       └── bolt.png
  └── overlay/                     # Category (layer 3, drawn with 25% chance)
      └── frame/
          └── gold.png

Every generated image picks one random item per category. The combination is
recorded in data/manifest.json and never produced twice, across runs.

Run 'layergen gen-config' to generate a documented layergen.toml.")]
#[command(version)]
struct Cli {
    /// Asset directory
    #[arg(long, default_value = "assets", global = true)]
    assets: PathBuf,

    /// Directory for caches (asset index, duplicate set)
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "output", global = true)]
    output: PathBuf,

    /// Config file
    #[arg(long, default_value = "layergen.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the asset directory into the index cache
    Index,
    /// Generate unique images from the cached index
    Generate(GenerateArgs),
    /// Run the full pipeline: index then generate
    Build(GenerateArgs),
    /// Convert per-image manifests into metadata records
    Convert {
        /// Name template: '#' becomes the id, '[hash]' becomes a literal '#'
        #[arg(long)]
        name: String,
        /// Description template, same tokens as --name
        #[arg(long)]
        description: String,
    },
    /// Reset caches and recreate the output directory skeleton
    Reset,
    /// Print a stock layergen.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Index => {
            let index = AssetIndex::scan(&cli.assets)?;
            index.save(&cli.data_dir)?;
            output::print_index_output(&index);
        }
        Command::Generate(args) => {
            let index = AssetIndex::load(&cli.data_dir)?;
            run_generate(&cli, args, &index)?;
        }
        Command::Build(args) => {
            println!("==> Stage 1: Indexing {}", cli.assets.display());
            let index = AssetIndex::scan(&cli.assets)?;
            index.save(&cli.data_dir)?;
            output::print_index_output(&index);

            println!("==> Stage 2: Generating {} images", args.count);
            run_generate(&cli, args, &index)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Convert { name, description } => {
            let templates = Templates {
                name: name.clone(),
                description: description.clone(),
            };
            let summary = convert::convert(
                &cli.output.join(DATA_DIR),
                &cli.output.join(METADATA_DIR),
                &templates,
            )?;
            output::print_convert_summary(&summary);
        }
        Command::Reset => {
            println!("==> Resetting caches and output");
            fs::create_dir_all(&cli.data_dir)?;
            fs::write(cli.data_dir.join(index::CACHE_FILENAME), "{}")?;
            fs::write(cli.data_dir.join(duplicates::SET_FILENAME), "[]")?;
            if cli.output.exists() {
                fs::remove_dir_all(&cli.output)?;
            }
            for dir in [IMAGES_DIR, DATA_DIR, METADATA_DIR] {
                fs::create_dir_all(cli.output.join(dir))?;
            }
            println!("==> Reset complete");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config and duplicate set, run the generation loop, persist the
/// updated set. The set is written exactly once, after the whole run.
fn run_generate(
    cli: &Cli,
    args: &GenerateArgs,
    index: &AssetIndex,
) -> Result<(), Box<dyn std::error::Error>> {
    let config: GeneratorConfig = config::load_config(&cli.config)?;
    let mut duplicates = DuplicateSet::load(&cli.data_dir)?;

    let backend = RustBackend::new();
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut generator = Generator::new(index, &config, &cli.assets, &backend, rng);
    let summary = generator.run(args.start, args.count, &mut duplicates, &cli.output)?;

    duplicates.save(&cli.data_dir)?;
    output::print_run_summary(&summary);
    Ok(())
}
