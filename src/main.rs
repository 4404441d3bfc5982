use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use patient_registry::{
    api::{PatientApi, RestClient},
    cli::{delete_report, format_table, Cli, Commands, ExportFormat, ViewArgs},
    config::Config,
    registry::{export_rows, write_csv, write_xlsx, Dashboard},
    registry_tui::{App, Route},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "patient_registry=info");
    }

    let config = Config::from_env()?.with_api_base_url(cli.api_url.clone());
    let interactive = matches!(cli.command, None | Some(Commands::Tui { .. }));
    init_logging(&config, interactive);

    config.validate()?;
    let client = RestClient::new(&config).context("Failed to build HTTP client")?;
    info!("Using registry API at {}", client.base_url());

    match cli.command {
        None => run_tui(config, client, Route::Dashboard).await,
        Some(Commands::Tui { route }) => {
            let start = Route::from_path(&route)?;
            run_tui(config, client, start).await
        }
        Some(Commands::List { view }) => {
            let dashboard = load_dashboard(&client, &view).await?;
            for line in format_table(&dashboard.visible()) {
                println!("{}", line);
            }
            println!();
            println!("Total: {} patient(s)", dashboard.visible().len());
            Ok(())
        }
        Some(Commands::Export { view, output, format }) => {
            let dashboard = load_dashboard(&client, &view).await?;
            let path = output.unwrap_or_else(|| default_export_path(&config, format));
            let rows = export_rows(&dashboard.visible());

            match format {
                ExportFormat::Xlsx => write_xlsx(&rows, &path)?,
                ExportFormat::Csv => write_csv(&rows, &path)?,
            }
            info!("Exported {} row(s) to {}", rows.len(), path.display());
            println!("Exported {} patient(s) to {}", rows.len(), path.display());
            Ok(())
        }
        Some(Commands::Delete { id, yes }) => {
            let confirmed = yes || confirm(&format!("Are you sure you want to delete patient {}?", id))?;
            let mut dashboard = Dashboard::new();
            dashboard.request_delete(&id);

            let outcome = dashboard.resolve_delete(&client, confirmed).await;
            for line in delete_report(&outcome, dashboard.patients.len())? {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// Stderr and file for command-line runs; the TUI only writes the file
fn init_logging(config: &Config, interactive: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_name = config
        .log_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("patient_registry.log"));
    let file_appender = tracing_appender::rolling::never(config.log_dir(), file_name);

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();
}

async fn load_dashboard(api: &dyn PatientApi, view: &ViewArgs) -> Result<Dashboard> {
    let mut dashboard = Dashboard::new();
    dashboard.view = view.to_view_state()?;
    dashboard
        .refresh(api)
        .await
        .context("Failed to fetch patients")?;
    Ok(dashboard)
}

fn default_export_path(config: &Config, format: ExportFormat) -> PathBuf {
    config.export_path().with_extension(format.extension())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn run_tui(config: Config, client: RestClient, start: Route) -> Result<()> {
    info!("Launching TUI at {}", start.path());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Arc::new(client));
    let result = app.run(&mut terminal, start).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("TUI encountered an error: {}", e);
            Err(e)
        }
    }
}
