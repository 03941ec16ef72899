use clap::{Parser, Subcommand};
use notes_tools::{check, config, generate, output, vcs};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Checks a markdown notes repository and generates its website docs")]
#[command(long_about = "\
Checks a markdown notes repository and generates its website docs

The directory tree is the data source. Directories are topics titled by their
README.md, markdown files are notes, and _img folders hold images.

Repository structure:

  notes/
  ├── notes.toml                   # Optional config (see gen-config)
  ├── welcome.md                   # Note: front matter, '# Title', '## Contents'
  ├── Tools/
  │   ├── README.md                # Line 3 holds the directory title: '# Tools & Utilities'
  │   ├── shell.md
  │   └── Git/
  │       ├── README.md
  │       ├── branches.md
  │       └── _img/Graph.PNG       # Relocated to the website's image tree
  └── _website/                    # '_' and '.' directories are never walked
      ├── docs-static/             # Copied verbatim into docs/
      ├── docs/                    # Generated
      ├── static/img/from-notes/   # Generated
      └── sidebars.js              # Generated

Note front matter:
  description    Required. Becomes the doc's description and opening line.
  tree_title     Optional. Becomes the sidebar label.
  last_modified  Maintained by 'notes check'.

Run 'notes gen-config' to generate a documented notes.toml.")]
#[command(version)]
struct Cli {
    /// Repository root holding the notes tree
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the notes tree and update last_modified stamps (pre-commit)
    Check,
    /// Rebuild the website docs, images and sidebar from the notes
    Generate,
    /// Print a stock notes.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let report = check::check(&cli.root, &config, &vcs::Git::new())?;
            output::print_check_output(&report);
            println!("==> Notes are valid");
        }
        Command::Generate => {
            let config = config::load_config(&cli.root)?;
            println!(
                "==> Generating {}",
                config.website.docs_path(&cli.root).display()
            );
            let report = generate::generate(&cli.root, &config)?;
            output::print_generate_output(&report, &cli.root);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
