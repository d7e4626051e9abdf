use crate::error::{HandlerError, RegistrationError};
use crate::logging::{init_logging_with_config, LogConfig, LogFormat};
use crate::router::{RouteTable, RouterBuilder};
use clap::{Parser, Subcommand};
use std::io::{self, Write};

/// Command-line interface for brrtrpc.
///
/// Inspects how handler names turn into routes and which route a request
/// would reach, without running a server.
#[derive(Debug, Parser)]
#[command(name = "brrtrpc")]
#[command(about = "brrtrpc route inspection", long_about = None)]
pub struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "warn", env = "BRRTRPC_LOG_LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that builds routes.
#[derive(Debug, Clone, clap::Args)]
pub struct RouteOptions {
    /// Wildcard separator in method names
    #[arg(long, default_value = "_", env = "BRRTRPC_SEPARATOR")]
    pub sep: String,

    /// Path prefix inserted after the verb, e.g. /v1
    #[arg(long, env = "BRRTRPC_PATTERN_PREFIX")]
    pub prefix: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the route each handler method name derives to
    Derive {
        /// Method names, e.g. PostFoo_Bar
        #[arg(required = true)]
        methods: Vec<String>,

        #[command(flatten)]
        opts: RouteOptions,
    },
    /// Report which route a request reaches and its captures
    Match {
        /// Explicit route specs, e.g. "POST /servers/*/action"
        #[arg(long = "route")]
        routes: Vec<String>,

        /// Method names registered after the explicit routes
        #[arg(long = "method")]
        methods: Vec<String>,

        #[command(flatten)]
        opts: RouteOptions,

        /// Request verb
        verb: String,

        /// Request path
        path: String,
    },
}

fn noop(_svc: &()) -> Result<(), HandlerError> {
    Ok(())
}

fn builder(opts: &RouteOptions) -> RouterBuilder<()> {
    let builder = RouterBuilder::new().separator(&opts.sep);
    match &opts.prefix {
        Some(prefix) => builder.prefix(prefix),
        None => builder,
    }
}

/// Route table for the given specs and method names, in that order.
///
/// # Errors
///
/// The first spec or method name that fails to register.
pub fn build_table(
    routes: &[String],
    methods: &[String],
    opts: &RouteOptions,
) -> Result<RouteTable<()>, RegistrationError> {
    let mut builder = builder(opts);
    for spec in routes {
        builder = builder.route(spec, spec, noop)?;
    }
    for name in methods {
        builder = builder.method(name, noop)?;
    }
    Ok(builder.build())
}

/// Execute `cli`, writing results to `out`.
///
/// # Errors
///
/// Registration failures and write errors.
pub fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Derive { methods, opts } => {
            let table = build_table(&[], methods, opts)?;
            for line in table.describe() {
                writeln!(out, "{line}")?;
            }
        }
        Commands::Match {
            routes,
            methods,
            opts,
            verb,
            path,
        } => {
            let table = build_table(routes, methods, opts)?;
            match table.find(verb, path) {
                Some(found) => writeln!(
                    out,
                    "{} -> {} captures={:?}",
                    found.route.pattern(),
                    found.route.name(),
                    found.captures.as_slice()
                )?,
                None => writeln!(out, "no route for {verb} {path}")?,
            }
        }
    }
    Ok(())
}

/// Parse the process arguments and run.
///
/// # Errors
///
/// See [`run`].
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_config = LogConfig {
        log_level: cli.log_level.clone(),
        format: LogFormat::Pretty,
        target_filter: None,
    };
    init_logging_with_config(&log_config)?;
    run(&cli, &mut io::stdout().lock())
}
