use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strapi_md::{config, dataset, export, output};

#[derive(Parser)]
#[command(name = "strapi-md")]
#[command(about = "Convert a Strapi JSON export into Markdown documents")]
#[command(long_about = "\
Convert a Strapi JSON export into Markdown documents

Every article and project becomes an index.md with front-matter, and the
images it references are downloaded next to it:

  <output>/
  ├── articles/
  │   └── en/
  │       └── my-post/
  │           ├── index.md
  │           └── images/
  │               └── image-1.png
  └── projects/
      └── en/
          └── tool/
              └── index.md

Settings are read from strapi-md.toml when present; --input and --output
override it.

Run 'strapi-md gen-config' to generate a documented strapi-md.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Strapi JSON export to read
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Root directory of the Markdown tree
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write every article and project as Markdown, downloading images
    Export,
    /// Load the export and list the files it would produce, without writing
    Check,
    /// Print a stock strapi-md.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Export => {
            let config = resolve_config(&cli)?;
            println!("==> Exporting {}", config.input.display());
            let output_root = config.output.clone();
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_export_event(&event, &output_root);
                }
            });
            let result = export::export(&config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_export_summary(&result?, &config.output);
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.input.display());
            let dataset = dataset::load_dataset(&config.input, &config.collections)?;
            let plan = export::plan_documents(&dataset, &config);
            let collisions = export::find_collisions(&plan);
            output::print_check_output(&plan, &collisions, &config.output);
            println!("==> Export is readable");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<config::ExportConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(input) = &cli.input {
        config.input = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    Ok(config)
}
