// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! # cfdot
//!
//! Operator command-line tool for a Diego deployment. Each subcommand issues
//! one RPC against the BBS or Locket and prints the result as
//! newline-delimited JSON on standard output.

#![deny(
    nonstandard_style,
    unconditional_recursion,
    while_true,
    unused_allocation,
    unused_comparisons,
    unused_parens
)]

mod client;
mod commands;
mod config;
mod error;
mod output;

#[cfg(test)]
mod testing;

use clap::{Args, CommandFactory, Parser, Subcommand};
use log::debug;
use std::io::Write;
use std::process;

use crate::client::bbs::{ActualLrpFilter, DesiredLrpFilter, HttpBbsClient};
use crate::client::factory::{new_bbs_client, new_locket_client};
use crate::client::locket::HttpLocketClient;
use crate::config::hooks::{PreRunChain, ServiceHook, ValidatedEndpoints};
use crate::config::resolve::{parse_bool, Service, ServiceFlags};
use crate::config::{ClientConfig, Config};
use crate::error::{CfdotError, EXIT_VALIDATION};
use crate::output::{report_error, OutputHandler};

/// Diego operator tooling
#[derive(Parser, Debug)]
#[command(
    name = "cfdot",
    version,
    about = "Diego operator tooling",
    long_about = "A command-line tool to interact with a Cloud Foundry Diego deployment",
    after_long_help = "CONFIGURATION SOURCES (highest to lowest priority):\n  \
        1. Command-line flags (--bbsURL, --bbsCACertFile, --caCertFile, etc.)\n  \
        2. Service environment variables (BBS_URL, LOCKET_API_LOCATION, etc.)\n  \
        3. CFDOT_ environment variables (CFDOT_TLS__CA_CERT_FILE, CFDOT_CLIENT__TIMEOUT)\n  \
        4. Configuration files (cfdot.toml, ~/.config/cfdot/config.toml)\n  \
        5. Built-in defaults",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    #[command(flatten)]
    bbs: BbsArgs,

    #[command(flatten)]
    locket: LocketArgs,

    #[command(flatten)]
    pub(crate) default_tls: DefaultTlsArgs,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub(crate) timeout: Option<u64>,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn service_flags(&self, service: Service) -> ServiceFlags {
        match service {
            Service::Bbs => self.bbs.flags(),
            Service::Locket => self.locket.flags(),
        }
    }
}

fn parse_bool_flag(value: &str) -> Result<bool, String> {
    parse_bool(value).ok_or_else(|| format!("invalid boolean '{value}'"))
}

/// Connection flags of the BBS
#[derive(Args, Debug, Clone, Default)]
struct BbsArgs {
    /// URL of the BBS server to target
    #[arg(long = "bbsURL", global = true, value_name = "URL")]
    url: Option<String>,

    /// Path to the CA certificate of the BBS server
    #[arg(long = "bbsCACertFile", id = "bbsCACertFile", global = true, value_name = "FILE")]
    ca_cert_file: Option<String>,

    /// Path to the client certificate for mutual TLS with the BBS
    #[arg(long = "bbsCertFile", id = "bbsCertFile", global = true, value_name = "FILE")]
    cert_file: Option<String>,

    /// Path to the client key for mutual TLS with the BBS
    #[arg(long = "bbsKeyFile", id = "bbsKeyFile", global = true, value_name = "FILE")]
    key_file: Option<String>,

    /// Skip verification of the BBS server certificate
    #[arg(
        long = "bbsSkipCertVerify",
        id = "bbsSkipCertVerify",
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag
    )]
    skip_cert_verify: Option<bool>,
}

impl BbsArgs {
    fn flags(&self) -> ServiceFlags {
        ServiceFlags {
            address: self.url.clone(),
            ca_cert_file: self.ca_cert_file.clone(),
            cert_file: self.cert_file.clone(),
            key_file: self.key_file.clone(),
            skip_cert_verify: self.skip_cert_verify,
        }
    }
}

/// Connection flags of Locket
#[derive(Args, Debug, Clone, Default)]
struct LocketArgs {
    /// host:port of the Locket server to target
    #[arg(long = "locketAPILocation", global = true, value_name = "HOST:PORT")]
    api_location: Option<String>,

    /// Path to the CA certificate of the Locket server
    #[arg(long = "locketCACertFile", id = "locketCACertFile", global = true, value_name = "FILE")]
    ca_cert_file: Option<String>,

    /// Path to the client certificate for mutual TLS with Locket
    #[arg(long = "locketCertFile", id = "locketCertFile", global = true, value_name = "FILE")]
    cert_file: Option<String>,

    /// Path to the client key for mutual TLS with Locket
    #[arg(long = "locketKeyFile", id = "locketKeyFile", global = true, value_name = "FILE")]
    key_file: Option<String>,

    /// Skip verification of the Locket server certificate
    #[arg(
        long = "locketSkipCertVerify",
        id = "locketSkipCertVerify",
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag
    )]
    skip_cert_verify: Option<bool>,
}

impl LocketArgs {
    fn flags(&self) -> ServiceFlags {
        ServiceFlags {
            address: self.api_location.clone(),
            ca_cert_file: self.ca_cert_file.clone(),
            cert_file: self.cert_file.clone(),
            key_file: self.key_file.clone(),
            skip_cert_verify: self.skip_cert_verify,
        }
    }
}

/// TLS settings inherited by every service that does not set its own
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DefaultTlsArgs {
    /// Default path to the CA certificate
    #[arg(long = "caCertFile", global = true, value_name = "FILE")]
    pub(crate) ca_cert_file: Option<String>,

    /// Default path to the client certificate
    #[arg(long = "clientCertFile", global = true, value_name = "FILE")]
    pub(crate) client_cert_file: Option<String>,

    /// Default path to the client key
    #[arg(long = "clientKeyFile", global = true, value_name = "FILE")]
    pub(crate) client_key_file: Option<String>,

    /// Skip server certificate verification by default
    #[arg(
        long = "skipCertVerify",
        global = true,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool_flag
    )]
    pub(crate) skip_cert_verify: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List domains
    #[command(long_about = "List fresh domains from the BBS")]
    Domains {
        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// List actual LRPs
    #[command(long_about = "List actual LRPs from the BBS")]
    ActualLrps {
        /// Retrieve only actual LRPs for the given domain
        #[arg(short, long, default_value = "")]
        domain: String,

        /// Retrieve only actual LRPs for the given cell id
        #[arg(short = 'c', long, default_value = "")]
        cell_id: String,

        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// List actual LRPs for a process guid
    #[command(
        long_about = "List actual LRPs from the BBS for a given process guid. \
                      Process guids can be obtained by running cfdot actual-lrps"
    )]
    ActualLrpsForGuid {
        /// Retrieve the actual LRP for the given index
        #[arg(short, long, value_name = "INDEX")]
        index: Option<String>,

        #[arg(value_name = "PROCESS_GUID")]
        args: Vec<String>,
    },

    /// List desired LRPs
    #[command(long_about = "List desired LRPs from the BBS")]
    DesiredLrps {
        /// Retrieve only desired LRPs for the given domain
        #[arg(short, long, default_value = "")]
        domain: String,

        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// Show the desired LRP of a process guid
    #[command(long_about = "Show the desired LRP from the BBS for a given process guid")]
    DesiredLrp {
        #[arg(value_name = "PROCESS_GUID")]
        args: Vec<String>,
    },

    /// List desired LRP scheduling infos
    #[command(long_about = "List desired LRP scheduling infos from the BBS")]
    DesiredLrpSchedulingInfos {
        /// Retrieve only scheduling infos for the given domain
        #[arg(short, long, default_value = "")]
        domain: String,

        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// Create a desired LRP
    #[command(
        long_about = "Create a desired LRP from the given spec. Spec can either be json \
                      encoded desired-lrp, e.g. '{\"process_guid\":\"some-guid\"}' or a \
                      file containing json encoded desired-lrp, e.g. @/path/to/spec/file"
    )]
    CreateDesiredLrp {
        #[arg(value_name = "SPEC|@FILE")]
        args: Vec<String>,
    },

    /// List all LRP deployments, optionally filtering on deployment ids
    #[command(
        long_about = "Returns a list of all LRP deployments. If a list of deployment ids \
                      is passed, only deployments matching one of those ids are returned."
    )]
    LrpDeployments {
        #[arg(value_name = "IDS")]
        ids: Vec<String>,
    },

    /// Create an LRP deployment
    #[command(
        long_about = "Create an LRP deployment from the given spec. Spec can either be \
                      json encoded, e.g. '{\"process_guid\":\"some-guid\"}' or a file \
                      containing the json encoded deployment, e.g. @/path/to/spec/file"
    )]
    CreateLrpDeployment {
        #[arg(value_name = "SPEC|@FILE")]
        args: Vec<String>,
    },

    /// Update an LRP deployment
    #[command(
        long_about = "Update the LRP deployment of the given process guid from the given \
                      spec. Spec can either be json encoded or a file containing the json \
                      encoded update, e.g. @/path/to/spec/file"
    )]
    UpdateLrpDeployment {
        #[arg(value_name = "PROCESS_GUID SPEC|@FILE")]
        args: Vec<String>,
    },

    /// Delete an LRP deployment
    #[command(long_about = "Delete the LRP deployment with the given process guid.")]
    DeleteLrpDeployment {
        #[arg(value_name = "PROCESS_GUID")]
        args: Vec<String>,
    },

    /// Activate the given definition id
    #[command(long_about = "Activate the given definition id of the LRP deployment")]
    ActivateLrpDefinition {
        #[arg(value_name = "PROCESS_GUID DEFINITION_ID")]
        args: Vec<String>,
    },

    /// Subscribe to BBS LRP events
    #[command(long_about = "Subscribe to BBS LRP events")]
    LrpEvents {
        /// Retrieve only events for the given cell id
        #[arg(short = 'c', long, default_value = "")]
        cell_id: String,

        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// List locks
    #[command(long_about = "List all locks held in Locket")]
    Locks {
        #[arg(hide = true)]
        args: Vec<String>,
    },

    /// List presences
    #[command(long_about = "List all presences registered in Locket")]
    Presences {
        #[arg(hide = true)]
        args: Vec<String>,
    },
}

impl Commands {
    /// Name of the subcommand as typed on the command line
    fn name(&self) -> &'static str {
        match self {
            Self::Domains { .. } => "domains",
            Self::ActualLrps { .. } => "actual-lrps",
            Self::ActualLrpsForGuid { .. } => "actual-lrps-for-guid",
            Self::DesiredLrps { .. } => "desired-lrps",
            Self::DesiredLrp { .. } => "desired-lrp",
            Self::DesiredLrpSchedulingInfos { .. } => {
                "desired-lrp-scheduling-infos"
            }
            Self::CreateDesiredLrp { .. } => "create-desired-lrp",
            Self::LrpDeployments { .. } => "lrp-deployments",
            Self::CreateLrpDeployment { .. } => "create-lrp-deployment",
            Self::UpdateLrpDeployment { .. } => "update-lrp-deployment",
            Self::DeleteLrpDeployment { .. } => "delete-lrp-deployment",
            Self::ActivateLrpDefinition { .. } => "activate-lrp-definition",
            Self::LrpEvents { .. } => "lrp-events",
            Self::Locks { .. } => "locks",
            Self::Presences { .. } => "presences",
        }
    }

    /// Services whose connection flags this command validates before running
    fn flag_groups(&self) -> &'static [Service] {
        match self {
            Self::Locks { .. } | Self::Presences { .. } => &[Service::Locket],
            _ => &[Service::Bbs],
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() { EXIT_VALIDATION } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        debug!("{} failed with {}", cli.command.name(), e.error_code());
        let usage = if e.is_validation() {
            command_usage(cli.command.name())
        } else {
            None
        };
        report_error(&e, usage.as_deref());
        process::exit(e.exit_code());
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    pretty_env_logger::formatted_builder()
        .filter_level(log_level)
        .target(pretty_env_logger::env_logger::Target::Stderr)
        .init();
}

/// Long help of a subcommand, shown after validation errors
fn command_usage(name: &str) -> Option<String> {
    let mut cmd = Cli::command();
    cmd.build();
    cmd.find_subcommand_mut(name)
        .map(|sub| sub.render_long_help().to_string())
}

/// Load configuration, validate the connection flags of the command and
/// execute it
async fn run(cli: &Cli) -> Result<(), CfdotError> {
    let config = Config::load(cli.config.as_deref())?.with_cli_overrides(cli);

    let mut chain = PreRunChain::new(&config);
    for service in cli.command.flag_groups() {
        chain.register(ServiceHook::from_process(
            *service,
            cli.service_flags(*service),
        )?);
    }
    let endpoints = chain.run()?;
    debug!(
        "Running {} after {} pre-run hooks",
        cli.command.name(),
        chain.len()
    );

    let mut output = OutputHandler::stdout();
    execute_command(&cli.command, &endpoints, &config.client, &mut output).await
}

fn bbs_client(
    endpoints: &ValidatedEndpoints,
    client_config: &ClientConfig,
) -> Result<HttpBbsClient, CfdotError> {
    Ok(new_bbs_client(endpoints.get(Service::Bbs)?, client_config)?)
}

fn locket_client(
    endpoints: &ValidatedEndpoints,
    client_config: &ClientConfig,
) -> Result<HttpLocketClient, CfdotError> {
    Ok(new_locket_client(endpoints.get(Service::Locket)?, client_config)?)
}

/// Validate the positional arguments, build the client and run the command
async fn execute_command<W: Write>(
    command: &Commands,
    endpoints: &ValidatedEndpoints,
    client_config: &ClientConfig,
    output: &mut OutputHandler<W>,
) -> Result<(), CfdotError> {
    match command {
        Commands::Domains { args } => {
            commands::domains::validate_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::domains::execute(&client, output).await
        }
        Commands::ActualLrps {
            domain,
            cell_id,
            args,
        } => {
            commands::lrps::validate_actual_lrps_arguments(args)?;
            let filter = ActualLrpFilter {
                domain: domain.clone(),
                cell_id: cell_id.clone(),
            };
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::actual_lrps(&client, &filter, output).await
        }
        Commands::ActualLrpsForGuid { index, args } => {
            let query = commands::lrps::validate_actual_lrps_for_guid_arguments(
                args,
                index.as_deref(),
            )?;
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::actual_lrps_for_guid(&client, &query, output).await
        }
        Commands::DesiredLrps { domain, args } => {
            commands::lrps::validate_desired_lrps_arguments(args)?;
            let filter = DesiredLrpFilter {
                domain: domain.clone(),
            };
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::desired_lrps(&client, &filter, output).await
        }
        Commands::DesiredLrp { args } => {
            let process_guid =
                commands::lrps::validate_desired_lrp_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::desired_lrp(&client, &process_guid, output).await
        }
        Commands::DesiredLrpSchedulingInfos { domain, args } => {
            commands::lrps::validate_scheduling_infos_arguments(args)?;
            let filter = DesiredLrpFilter {
                domain: domain.clone(),
            };
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::desired_lrp_scheduling_infos(&client, &filter, output)
                .await
        }
        Commands::CreateDesiredLrp { args } => {
            let spec =
                commands::lrps::validate_create_desired_lrp_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::lrps::create_desired_lrp(&client, &spec).await
        }
        Commands::LrpDeployments { ids } => {
            let client = bbs_client(endpoints, client_config)?;
            commands::deployments::list(&client, ids, output).await
        }
        Commands::CreateLrpDeployment { args } => {
            let spec = commands::deployments::validate_create_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::deployments::create(&client, &spec).await
        }
        Commands::UpdateLrpDeployment { args } => {
            let update = commands::deployments::validate_update_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::deployments::update(&client, &update).await
        }
        Commands::DeleteLrpDeployment { args } => {
            let process_guid =
                commands::deployments::validate_delete_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::deployments::delete(&client, &process_guid).await
        }
        Commands::ActivateLrpDefinition { args } => {
            let activation =
                commands::deployments::validate_activate_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::deployments::activate(&client, &activation).await
        }
        Commands::LrpEvents { cell_id, args } => {
            commands::events::validate_arguments(args)?;
            let client = bbs_client(endpoints, client_config)?;
            commands::events::execute(&client, cell_id, output).await
        }
        Commands::Locks { args } => {
            commands::locks::validate_arguments(args)?;
            let client = locket_client(endpoints, client_config)?;
            commands::locks::locks(&client, output).await
        }
        Commands::Presences { args } => {
            commands::locks::validate_arguments(args)?;
            let client = locket_client(endpoints, client_config)?;
            commands::locks::presences(&client, output).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "cfdot",
            "--bbsURL",
            "http://bbs.example:8889",
            "domains",
        ])
        .unwrap(); //#[allow_ci]
        let after = Cli::try_parse_from([
            "cfdot",
            "domains",
            "--bbsURL",
            "http://bbs.example:8889",
        ])
        .unwrap(); //#[allow_ci]

        assert_eq!(before.service_flags(Service::Bbs), after.service_flags(Service::Bbs));
        assert_eq!(
            after.service_flags(Service::Bbs).address.as_deref(),
            Some("http://bbs.example:8889")
        );
    }

    #[test]
    fn test_skip_cert_verify_values() {
        let cli = Cli::try_parse_from(["cfdot", "domains", "--bbsSkipCertVerify"])
            .unwrap(); //#[allow_ci]
        assert_eq!(cli.bbs.skip_cert_verify, Some(true));

        let cli = Cli::try_parse_from([
            "cfdot",
            "domains",
            "--bbsSkipCertVerify=false",
        ])
        .unwrap(); //#[allow_ci]
        assert_eq!(cli.bbs.skip_cert_verify, Some(false));

        let cli = Cli::try_parse_from(["cfdot", "domains"]).unwrap(); //#[allow_ci]
        assert_eq!(cli.bbs.skip_cert_verify, None);

        assert!(Cli::try_parse_from([
            "cfdot",
            "domains",
            "--bbsSkipCertVerify=maybe",
        ])
        .is_err());
    }

    #[test]
    fn test_explicit_empty_flag_is_kept() {
        let cli = Cli::try_parse_from(["cfdot", "locks", "--locketAPILocation="])
            .unwrap(); //#[allow_ci]
        assert_eq!(
            cli.service_flags(Service::Locket).address.as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_flag_groups() {
        let cli = Cli::try_parse_from(["cfdot", "presences"]).unwrap(); //#[allow_ci]
        assert_eq!(cli.command.flag_groups(), &[Service::Locket]);

        let cli = Cli::try_parse_from(["cfdot", "lrp-events", "-c", "cell-1"])
            .unwrap(); //#[allow_ci]
        assert_eq!(cli.command.flag_groups(), &[Service::Bbs]);
        assert_eq!(cli.command.name(), "lrp-events");
    }

    #[test]
    fn test_command_names_match_clap() {
        let cmd = Cli::command();
        for sub in cmd.get_subcommands() {
            assert!(command_usage(sub.get_name()).is_some());
        }
        let cli = Cli::try_parse_from([
            "cfdot",
            "desired-lrp-scheduling-infos",
            "-d",
            "cf-apps",
        ])
        .unwrap(); //#[allow_ci]
        assert_eq!(cli.command.name(), "desired-lrp-scheduling-infos");
    }

    #[test]
    fn test_usage_text_lists_service_flags() {
        let usage = command_usage("domains").unwrap(); //#[allow_ci]
        assert!(usage.contains("Usage:"));
        assert!(usage.contains("--bbsURL"));
        assert!(usage.contains("List fresh domains from the BBS"));
    }
}
