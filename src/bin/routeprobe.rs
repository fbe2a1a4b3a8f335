use clap::{CommandFactory, Parser};
use routeprobe::config::{CliConfig, Config};
use routeprobe::core::error::{Result, RouteProbeError};
use routeprobe::discovery::{RouteList, RouteListBuilder, RouteTable};
use routeprobe::reporting::logging;
use routeprobe::reporting::{ConsoleSink, ReportSink};
use routeprobe::ui::completion::print_completions;
use routeprobe::ui::{
    Cli, Commands, ListArgs, ProgressReporter, RouteCommands, SessionCommands, TestArgs,
    cli_to_config,
};
use routeprobe::validation::{BatchSummary, CancelFlag, Prober, login_url, session_cookies};

/// Exit code used when a run is interrupted
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Commands::CompletionGenerate { shell } = cli.command {
        let mut app = Cli::command();
        print_completions(shell, &mut app);
        std::process::exit(0);
    }

    match run_routeprobe_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Main command dispatch extracted from main() for testing
pub async fn run_routeprobe_logic(cli: &Cli) -> Result<i32> {
    let cli_config = cli_to_config(cli);

    let config = Config::resolve(&cli_config).inspect_err(|e| {
        logging::log_error("Could not load configuration", Some(e));
    })?;

    let output_settings = setup_output_settings(&cli_config, &config);
    logging::init_logger(output_settings.verbose, output_settings.quiet);
    logging::log_config_info(&config);

    match cli.command {
        Commands::Route {
            action: RouteCommands::List(ref args),
        } => list_routes(args, &config),
        Commands::Route {
            action: RouteCommands::Test(ref args),
        } => test_routes(args, &config, &output_settings).await,
        Commands::Session {
            action: SessionCommands::Cookie {
                ref username,
                ref password,
            },
        } => print_session_cookies(username, password, &config).await,
        Commands::CompletionGenerate { .. } => Ok(0),
    }
}

/// Settings for output and progress display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub show_progress: bool,
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);
    let show_progress = !quiet && !cli_config.no_progress;

    OutputSettings {
        quiet,
        verbose,
        show_progress,
    }
}

fn load_route_table(config: &Config) -> Result<RouteTable> {
    let path = config.routes_path();
    let table = RouteTable::load_from_file(&path).inspect_err(|e| {
        logging::log_error(
            &format!("Could not load route table '{}'", path.display()),
            Some(e),
        );
    })?;
    logging::log_route_table(&path, table.len());
    Ok(table)
}

fn log_skipped_routes(list: &RouteList<'_>) {
    for name in list.skipped_routes() {
        log::debug!("Skipping {name}: no handler applies");
    }
}

fn list_routes(args: &ListArgs, config: &Config) -> Result<i32> {
    let table = load_route_table(config)?;
    let registry = config.handler_registry(table.catalog().clone())?;
    let builder = RouteListBuilder::new(&table, &registry);

    let list = builder.build_route_list(args.route_name.as_deref())?;
    log_skipped_routes(&list);

    let sink = ConsoleSink::new();
    for url in list {
        sink.line(url.as_str());
    }

    Ok(0)
}

async fn test_routes(
    args: &TestArgs,
    config: &Config,
    output_settings: &OutputSettings,
) -> Result<i32> {
    if !config.url_renderer()?.is_absolute() {
        return Err(RouteProbeError::Config(
            "A base URL is required to test routes. Set base_url or pass --base-url.".to_string(),
        ));
    }

    let table = load_route_table(config)?;
    let registry = config.handler_registry(table.catalog().clone())?;
    let builder = RouteListBuilder::new(&table, &registry);
    let list = builder.build_route_list(args.route_name.as_deref())?;
    log_skipped_routes(&list);

    let prober = Prober::new(args.probe_config(config), config.transport_settings())?;

    let cancel = CancelFlag::new();
    spawn_interrupt_handler(cancel.clone());
    let runner = config.batch_runner()?.with_cancel_flag(cancel);

    let mut progress = create_progress_reporter(output_settings);
    let sink = match progress {
        Some(ref reporter) => ConsoleSink::with_progress(reporter.get_multi_progress()),
        None => ConsoleSink::new(),
    };

    let summary = runner.run(&prober, list, &sink, progress.as_mut()).await;

    if let Some(reporter) = progress {
        reporter.finish_and_clear();
    }

    Ok(determine_exit_code(&summary))
}

async fn print_session_cookies(username: &str, password: &str, config: &Config) -> Result<i32> {
    let path = config.routes_path();
    let table = if path.exists() {
        load_route_table(config)?
    } else {
        RouteTable::default()
    };

    let url = login_url(&table, &config.url_renderer()?)?;
    session_cookies(
        &url,
        username,
        password,
        &config.transport_settings(),
        config.verify_ssl(),
        &ConsoleSink::new(),
    )
    .await?;

    Ok(0)
}

/// Ctrl-C stops scheduling new probes; in-flight requests finish.
fn spawn_interrupt_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logging::log_warning("Interrupt received, finishing in-flight requests");
            cancel.cancel();
        }
    });
}

/// Create progress reporter if needed
pub fn create_progress_reporter(output_settings: &OutputSettings) -> Option<ProgressReporter> {
    if output_settings.show_progress {
        Some(ProgressReporter::new(true))
    } else {
        None
    }
}

pub fn determine_exit_code(summary: &BatchSummary) -> i32 {
    if summary.cancelled { EXIT_CANCELLED } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_output_settings() {
        let cli_config = CliConfig {
            quiet: true,
            ..Default::default()
        };
        let settings = setup_output_settings(&cli_config, &Config::default());
        assert!(settings.quiet);
        assert!(!settings.verbose);
        assert!(!settings.show_progress);

        let cli_config = CliConfig {
            no_progress: true,
            ..Default::default()
        };
        let config = Config {
            verbose: Some(true),
            ..Default::default()
        };
        let settings = setup_output_settings(&cli_config, &config);
        assert!(settings.verbose);
        assert!(!settings.show_progress);
        assert!(create_progress_reporter(&settings).is_none());
    }

    #[test]
    fn test_determine_exit_code() {
        assert_eq!(determine_exit_code(&BatchSummary::default()), 0);
        assert_eq!(
            determine_exit_code(&BatchSummary {
                cancelled: true,
                ..Default::default()
            }),
            EXIT_CANCELLED
        );
    }
}
