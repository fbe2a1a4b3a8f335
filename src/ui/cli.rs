// Command-line interface definitions and parsing for routeprobe

use crate::config::{CliConfig, Config};
use crate::core::types::ProbeConfig;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Sources
    /// Route table file, TOML or JSON (default: routes.toml)
    #[arg(long, value_name = "FILE", global = true, help_heading = "Sources")]
    pub routes: Option<String>,

    /// Base URL prepended to generated paths
    #[arg(long, value_name = "URL", global = true, help_heading = "Sources")]
    pub base_url: Option<String>,

    // Batching
    /// Request timeout in seconds (default: 30)
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        global = true,
        help_heading = "Batching"
    )]
    pub timeout: Option<u64>,

    /// URLs per progress report (default: 10)
    #[arg(long, value_name = "COUNT", global = true, help_heading = "Batching")]
    pub chunk_size: Option<usize>,

    /// Concurrent requests within a chunk (default: 1)
    #[arg(long, value_name = "COUNT", global = true, help_heading = "Batching")]
    pub concurrency: Option<usize>,

    /// Minimum delay between requests in ms (default: 0)
    #[arg(long, value_name = "MS", global = true, help_heading = "Batching")]
    pub rate_limit: Option<u64>,

    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", global = true, help_heading = "Batching")]
    pub user_agent: Option<String>,

    // Output & Verbosity
    /// Suppress progress output and logging
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List or test the site's routes
    Route {
        #[command(subcommand)]
        action: RouteCommands,
    },
    /// Session helpers
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum RouteCommands {
    /// Print every concrete URL, one per line
    List(ListArgs),
    /// Request every concrete URL and report the responses
    Test(TestArgs),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Log in and print the Set-Cookie headers returned
    Cookie {
        /// Username for login
        username: String,
        /// Password for login
        password: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only this route
    #[arg(long, value_name = "NAME")]
    pub route_name: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct TestArgs {
    /// Only this route
    #[arg(long, value_name = "NAME")]
    pub route_name: Option<String>,

    /// Only report responses with this status code
    #[arg(long, value_name = "CODE")]
    pub response_code: Option<u16>,

    /// Only report responses with this cache header value
    #[arg(long, value_name = "VALUE")]
    pub response_cache: Option<String>,

    /// Include response time and cache value in each line
    #[arg(long)]
    pub profile: bool,

    /// Cookie sent with every request, e.g. "SESSabc=xyz; path=/"
    #[arg(long, value_name = "COOKIE")]
    pub cookie: Option<String>,

    /// Verify TLS certificates (default: true)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub verify_ssl: Option<bool>,

    /// Follow redirects (default: false)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub follow_redirects: Option<bool>,
}

impl TestArgs {
    /// Probe settings for this invocation, with TLS and redirect handling
    /// taken from the merged configuration.
    pub fn probe_config(&self, config: &Config) -> ProbeConfig {
        ProbeConfig {
            cookie: self.cookie.clone(),
            response_code_filter: self.response_code,
            response_cache_filter: self.response_cache.clone(),
            profile: self.profile,
            verify_ssl: config.verify_ssl(),
            follow_redirects: config.follow_redirects(),
        }
    }
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let mut cli_config = CliConfig {
        base_url: cli.base_url.clone(),
        routes_file: cli.routes.clone(),
        timeout: cli.timeout,
        chunk_size: cli.chunk_size,
        concurrency: cli.concurrency,
        rate_limit_delay: cli.rate_limit,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_progress: cli.no_progress,
        user_agent: cli.user_agent.clone(),
        config_file: cli.config.clone(),
        no_config: cli.no_config,
        ..Default::default()
    };

    if let Commands::Route {
        action: RouteCommands::Test(ref args),
    } = cli.command
    {
        cli_config.verify_ssl = args.verify_ssl;
        cli_config.follow_redirects = args.follow_redirects;
    }

    cli_config
}
