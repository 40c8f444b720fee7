use anyhow::{Context, Result};
use clap::Parser;

use bg3prof::paths::STORE_FILE_NAME;
use bg3prof::shell;
use bg3prof::ui::{ColorMode, Ui};

#[derive(Parser)]
#[command(name = "bg3prof")]
#[command(about = "Baldur's Gate 3 mod profile switcher - snapshot and swap mod sets")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ui = Ui::new(cli.color, cli.no_color);

    // The backing file lives in the working directory, like the tool it
    // replaces; pre-existing Profile.ini files keep working.
    let store_path = std::env::current_dir()
        .context("failed to resolve the working directory")?
        .join(STORE_FILE_NAME);

    shell::run(&store_path, &ui)
}
