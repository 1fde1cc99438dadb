use std::process::ExitCode;

use bpaf::Bpaf;
use tracing_subscriber::prelude::*;

use yls_cli_common::{CLIGlobalOptions, CliCacheOptions};

mod commands;

#[derive(Debug, Clone, Bpaf)]
pub struct DocsArgs {
    /// Schema id to document, e.g. "Pod/v1" or a file-pattern catalog name
    #[bpaf(positional("SCHEMA_ID"))]
    pub schema_id: String,
}

#[derive(Debug, Clone, Bpaf)]
pub struct ValidateArgs {
    /// File to validate
    #[bpaf(positional("FILE"))]
    pub file: String,
}

#[derive(Debug, Clone, Bpaf)]
pub struct FillArgs {
    /// Schema to fill, as a URL or a local file path
    #[bpaf(long("schema"), argument("URL_OR_PATH"))]
    pub schema: String,

    /// Narrow the fill to a dotted sub-path within the schema, e.g. "spec.template"
    #[bpaf(long("path"), argument("DOTTED_PATH"), optional)]
    pub path: Option<String>,

    /// Overlay this `kind` onto the filled document (requires --api-version)
    #[bpaf(long("kind"), argument("KIND"), optional)]
    pub kind: Option<String>,

    /// Overlay this `apiVersion` onto the filled document (requires --kind)
    #[bpaf(long("api-version"), argument("API_VERSION"), optional)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
#[allow(clippy::upper_case_acronyms)]
/// YAML language server and CLI with JSON-Schema intelligence for Kubernetes manifests
struct CLI {
    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("schemas"))]
    /// List every schema id the resolver knows about
    Schemas(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
    ),

    #[bpaf(command("docs"))]
    /// Emit HTML documentation for one schema id
    Docs(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
        #[bpaf(external(docs_args))] DocsArgs,
    ),

    #[bpaf(command("fill"))]
    /// Emit a YAML skeleton generated from a schema
    Fill(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
        #[bpaf(external(fill_args))] FillArgs,
    ),

    #[bpaf(command("validate"))]
    /// Validate a file against its resolved schema
    Validate(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
        #[bpaf(external(validate_args))] ValidateArgs,
    ),

    #[bpaf(command("refresh"))]
    /// Rebuild the schema catalogs
    Refresh(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
    ),

    #[bpaf(command("server"))]
    /// Run the language server over stdio
    Server(
        #[bpaf(external(yls_cli_common::cli_global_options), hide_usage)] CLIGlobalOptions,
        #[bpaf(external(yls_cli_common::cli_cache_options), hide_usage)] CliCacheOptions,
    ),

    #[bpaf(command("version"))]
    /// Print version information
    Version,

    #[bpaf(command("man"), hide)]
    /// Generate man page in roff format
    Man,
}

/// Set up tracing from the CLI `--log-level` flag, falling back to
/// `YAMLLS_LOG` env. Not used for `server`, which logs to a file instead of
/// stderr since stderr is free but stdout carries the JSON-RPC transport.
fn setup_tracing(global: &CLIGlobalOptions) {
    let filter = match global.log_level {
        yls_cli_common::LogLevel::None => match tracing_subscriber::EnvFilter::try_from_env("YAMLLS_LOG") {
            Ok(f) => f,
            Err(_) => return,
        },
        yls_cli_common::LogLevel::Debug => tracing_subscriber::EnvFilter::new("debug"),
        yls_cli_common::LogLevel::Info => tracing_subscriber::EnvFilter::new("info"),
        yls_cli_common::LogLevel::Warn => tracing_subscriber::EnvFilter::new("warn"),
        yls_cli_common::LogLevel::Error => tracing_subscriber::EnvFilter::new("error"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_verbose_exit(true)
                .with_verbose_entry(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Set up the miette error handler with colors config.
fn setup_miette(global: &CLIGlobalOptions) {
    let color = match global.colors {
        Some(yls_cli_common::ColorsArg::Off) => miette::GraphicalTheme::none(),
        Some(yls_cli_common::ColorsArg::Force) => miette::GraphicalTheme::unicode(),
        None => {
            if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                miette::GraphicalTheme::unicode()
            } else {
                miette::GraphicalTheme::unicode_nocolor()
            }
        }
    };

    miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().terminal_links(true).context_lines(2).graphical_theme(color.clone()).build())
    }))
    .ok();
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = cli().run();

    let result = match opts.command {
        Commands::Schemas(global, cache) => {
            setup_tracing(&global);
            setup_miette(&global);
            commands::schemas::run(&cache).await
        }
        Commands::Docs(global, cache, args) => {
            setup_tracing(&global);
            setup_miette(&global);
            commands::docs::run(&cache, &args.schema_id).await
        }
        Commands::Fill(global, cache, args) => {
            setup_tracing(&global);
            setup_miette(&global);
            commands::fill::run(&cache, &args).await
        }
        Commands::Validate(global, cache, args) => {
            setup_tracing(&global);
            setup_miette(&global);
            commands::validate::run(&cache, &args.file).await
        }
        Commands::Refresh(global, cache) => {
            setup_tracing(&global);
            setup_miette(&global);
            commands::refresh::run(&cache).await
        }
        Commands::Server(_global, cache) => match commands::server::run(&cache).await {
            Ok(()) => return ExitCode::SUCCESS,
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("yamlls {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Commands::Man => {
            let roff = cli().render_manpage("yamlls", bpaf::doc::Section::General, None, None, Some("Yamlls Manual"));
            print!("{roff}");
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(had_errors) => {
            if had_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
