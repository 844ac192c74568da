use std::path::PathBuf;

use clap::Parser;

use rowpick::app::dataset::{IdSource, LoadOptions};
use rowpick::ui::app::{LaunchOptions, UiApp};

/// Terminal viewer for tabular data with spreadsheet-style row selection.
#[derive(Parser)]
#[command(name = "rowpick", version, about)]
struct Cli {
    /// CSV file to open.
    file: PathBuf,

    /// Rows per page, overriding the configured default.
    #[arg(long)]
    page_size: Option<usize>,

    /// Column whose values identify rows; defaults to the record position.
    #[arg(long)]
    id_column: Option<String>,

    /// Field delimiter.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Skip loading and saving the session file.
    #[arg(long)]
    no_session: bool,
}

fn main() -> anyhow::Result<()> {
    rowpick::init();

    let cli = Cli::parse();
    let load = LoadOptions {
        delimiter: cli.delimiter as u8,
        id_source: match cli.id_column {
            Some(column) => IdSource::Column(column),
            None => IdSource::Ordinal,
        },
    };

    let mut app = UiApp::new(LaunchOptions {
        file: cli.file,
        load,
        page_size: cli.page_size,
        use_session: !cli.no_session,
    });
    app.run()
}
