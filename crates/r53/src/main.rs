// # r53 - Route 53 command line
//
// Thin layer over the library crates:
// 1. Read configuration from environment variables
// 2. Parse the command
// 3. Initialize logging and the runtime
// 4. Run one command and print its result as JSON on stdout
//
// ## Configuration
//
// ### Credentials (required for every command except `public-ip` / `local-ip`)
// - `R53_ACCESS_KEY_ID` (falls back to `AWS_ACCESS_KEY_ID`)
// - `R53_SECRET_ACCESS_KEY` (falls back to `AWS_SECRET_ACCESS_KEY`)
//
// ### Endpoints
// - `R53_ENDPOINT`: Route 53 endpoint (default https://route53.amazonaws.com)
// - `R53_API_VERSION`: API version (default 2013-04-01)
// - `R53_TIMEOUT_SECS`: HTTP timeout in seconds (default 30)
// - `R53_METADATA_URL`: Instance metadata base URL
//
// ### Logging
// - `R53_LOG_LEVEL`: trace, debug, info, warn, error (default warn, to stderr)
//
// ## Example
//
// ```bash
// export R53_ACCESS_KEY_ID=AKIDEXAMPLE
// export R53_SECRET_ACCESS_KEY=...
//
// r53 get-zone example.com
// r53 replace-record --zone-id Z1D633PJN98FT9 --name foo.example.com \
//     --type A --ttl 300 --old-value 1.2.3.4 --value 5.6.7.8
// ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use r53_client::Route53Client;
use r53_core::config::{Credentials, Route53Config};
use r53_core::record::{RecordType, ResourceRecord};
use r53_core::traits::{MetadataSource, Route53Api, UpdateResult};
use r53_ip_metadata::InstanceMetadata;
use serde_json::json;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: Command succeeded
/// - 1: Configuration or usage error
/// - 2: Runtime error (network, provider, metadata)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum R53ExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<R53ExitCode> for ExitCode {
    fn from(code: R53ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "r53")]
#[command(about = "Route 53 hosted zones and record sets from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Record set given on the command line
#[derive(clap::Args, Debug)]
struct RecordArgs {
    /// Hosted zone id (with or without the /hostedzone/ prefix)
    #[arg(long)]
    zone_id: String,

    /// Record name
    #[arg(long)]
    name: String,

    /// Record type (A, AAAA, CNAME, MX, TXT, ...)
    #[arg(long = "type", default_value = "A")]
    record_type: RecordType,

    /// Time-to-live in seconds
    #[arg(long, default_value_t = 300)]
    ttl: u32,

    /// Comment attached to the change batch
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List every hosted zone
    ListHostedZones,

    /// Find the hosted zone of a domain
    GetZone {
        /// Domain name (matched case-insensitively against zone names)
        domain: String,
    },

    /// List the record sets of a hosted zone
    ListResourceRecordSets {
        /// Hosted zone id
        #[arg(long)]
        zone_id: String,
    },

    /// Create a record set
    CreateRecord {
        #[command(flatten)]
        record: RecordArgs,

        /// Record value (repeat for several values)
        #[arg(long = "value", required = true)]
        values: Vec<String>,
    },

    /// Replace a record set (DELETE old, then CREATE new, in one batch)
    ReplaceRecord {
        #[command(flatten)]
        record: RecordArgs,

        /// Current value (repeat for several values)
        #[arg(long = "old-value", required = true)]
        old_values: Vec<String>,

        /// Current TTL, when it differs from the new one
        #[arg(long)]
        old_ttl: Option<u32>,

        /// New value (repeat for several values)
        #[arg(long = "value", required = true)]
        values: Vec<String>,
    },

    /// Create or replace a record set so it holds exactly these values
    UpsertRecord {
        #[command(flatten)]
        record: RecordArgs,

        /// Record value (repeat for several values)
        #[arg(long = "value", required = true)]
        values: Vec<String>,
    },

    /// Point an A record at this instance's public IP address
    PointAtPublicIp {
        /// Hosted zone id
        #[arg(long)]
        zone_id: String,

        /// Record name
        #[arg(long)]
        name: String,

        /// Time-to-live in seconds
        #[arg(long, default_value_t = 300)]
        ttl: u32,
    },

    /// Print this instance's public IP address
    PublicIp,

    /// Print this instance's private IP address
    LocalIp,
}

impl Command {
    fn needs_credentials(&self) -> bool {
        !matches!(self, Command::PublicIp | Command::LocalIp)
    }
}

/// Application configuration
struct Config {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    endpoint: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<String>,
    metadata_url: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            access_key_id: non_empty("R53_ACCESS_KEY_ID").or_else(|| non_empty("AWS_ACCESS_KEY_ID")),
            secret_access_key: non_empty("R53_SECRET_ACCESS_KEY")
                .or_else(|| non_empty("AWS_SECRET_ACCESS_KEY")),
            endpoint: non_empty("R53_ENDPOINT"),
            api_version: non_empty("R53_API_VERSION"),
            timeout_secs: non_empty("R53_TIMEOUT_SECS"),
            metadata_url: non_empty("R53_METADATA_URL"),
            log_level: non_empty("R53_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        }
    }

    /// Log level, or an error naming the bad value
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "R53_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the validated client configuration
    ///
    /// Credentials are only demanded when `with_credentials` is set.
    fn route53_config(&self, with_credentials: bool) -> Result<Route53Config> {
        let credentials = if with_credentials {
            let access_key_id = self.access_key_id.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "R53_ACCESS_KEY_ID is required. \
                    Set it via: export R53_ACCESS_KEY_ID=your_key_id"
                )
            })?;
            let secret_access_key = self.secret_access_key.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "R53_SECRET_ACCESS_KEY is required. \
                    Set it via: export R53_SECRET_ACCESS_KEY=your_secret"
                )
            })?;
            Credentials::new(access_key_id, secret_access_key)
        } else {
            Credentials::new(
                self.access_key_id.clone().unwrap_or_else(|| "unused".to_string()),
                self.secret_access_key.clone().unwrap_or_else(|| "unused".to_string()),
            )
        };

        let mut config = Route53Config::new(credentials);
        if let Some(ref endpoint) = self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(ref api_version) = self.api_version {
            config = config.with_api_version(api_version);
        }
        if let Some(ref timeout) = self.timeout_secs {
            let secs: u64 = timeout.trim().parse().map_err(|_| {
                anyhow::anyhow!("R53_TIMEOUT_SECS must be a number of seconds. Got: {}", timeout)
            })?;
            if !(1..=600).contains(&secs) {
                anyhow::bail!(
                    "R53_TIMEOUT_SECS must be between 1 and 600 seconds. Got: {}",
                    secs
                );
            }
            config = config.with_timeout_secs(secs);
        }
        if let Some(ref metadata_url) = self.metadata_url {
            config = config.with_metadata_url(metadata_url);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                R53ExitCode::ConfigError.into()
            } else {
                R53ExitCode::Success.into()
            };
        }
    };

    let config = Config::from_env();

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return R53ExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return R53ExitCode::ConfigError.into();
    }

    let route53_config = match config.route53_config(cli.command.needs_credentials()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return R53ExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return R53ExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(cli.command, &route53_config).await {
            Ok(output) => {
                println!("{}", output);
                R53ExitCode::Success
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_code_for(&e)
            }
        }
    });

    result.into()
}

/// Configuration problems found while running map to 1, everything else to 2
fn exit_code_for(e: &anyhow::Error) -> R53ExitCode {
    match e.downcast_ref::<r53_core::Error>() {
        Some(r53_core::Error::Config(_)) => R53ExitCode::ConfigError,
        _ => R53ExitCode::RuntimeError,
    }
}

fn record_from(args: &RecordArgs, values: Vec<String>) -> ResourceRecord {
    ResourceRecord::new(args.name.clone(), args.record_type, args.ttl, values)
}

fn with_comment(batch: r53_core::ChangeBatch, comment: &Option<String>) -> r53_core::ChangeBatch {
    match comment {
        Some(comment) => batch.with_comment(comment.clone()),
        None => batch,
    }
}

/// DELETE of the current set (at `old_ttl` when given) then CREATE of the new one
fn replace_batch(
    args: &RecordArgs,
    old_values: Vec<String>,
    old_ttl: Option<u32>,
    values: Vec<String>,
) -> r53_core::ChangeBatch {
    let old = ResourceRecord::new(
        args.name.clone(),
        args.record_type,
        old_ttl.unwrap_or(args.ttl),
        old_values,
    );
    let new = record_from(args, values);
    with_comment(
        r53_core::ChangeBatchBuilder::build_replace(old, new),
        &args.comment,
    )
}

async fn submit(
    api: &Route53Client,
    zone_id: &str,
    batch: r53_core::ChangeBatch,
) -> Result<serde_json::Value> {
    let change = api.submit_changes(zone_id, &batch).await?;
    Ok(serde_json::to_value(change)?)
}

fn update_result_json(result: UpdateResult) -> serde_json::Value {
    match result {
        UpdateResult::Created { change } => json!({
            "result": "created",
            "change": change,
        }),
        UpdateResult::Updated { previous, change } => json!({
            "result": "updated",
            "previous": previous,
            "change": change,
        }),
        UpdateResult::Unchanged { current } => json!({
            "result": "unchanged",
            "current": current,
        }),
    }
}

/// Run one command and render its result
async fn run(command: Command, config: &Route53Config) -> Result<String> {
    let value = match command {
        Command::PublicIp => {
            let metadata = InstanceMetadata::new(&config.metadata_url)?;
            json!({ "public_ip": metadata.public_ip().await?.to_string() })
        }
        Command::LocalIp => {
            let metadata = InstanceMetadata::new(&config.metadata_url)?;
            json!({ "local_ip": metadata.local_ip().await?.to_string() })
        }
        command => {
            let api = Route53Client::new(config)?;
            run_api(command, &api, config).await?
        }
    };

    Ok(serde_json::to_string_pretty(&value)?)
}

async fn run_api(
    command: Command,
    api: &Route53Client,
    config: &Route53Config,
) -> Result<serde_json::Value> {
    use r53_core::ChangeBatchBuilder;

    match command {
        Command::ListHostedZones => {
            let zones = api.list_hosted_zones().await?;
            info!("Found {} hosted zone(s)", zones.len());
            Ok(serde_json::to_value(zones)?)
        }
        Command::GetZone { domain } => match api.get_zone(&domain).await? {
            Some(zone) => Ok(serde_json::to_value(zone)?),
            None => Err(r53_core::Error::not_found(format!("No hosted zone for {}", domain)).into()),
        },
        Command::ListResourceRecordSets { zone_id } => {
            let records = api.list_resource_record_sets(&zone_id).await?;
            Ok(serde_json::to_value(records)?)
        }
        Command::CreateRecord { record, values } => {
            let new = record_from(&record, values);
            let batch = with_comment(ChangeBatchBuilder::build_create(new), &record.comment);
            submit(api, &record.zone_id, batch).await
        }
        Command::ReplaceRecord {
            record,
            old_values,
            old_ttl,
            values,
        } => {
            let batch = replace_batch(&record, old_values, old_ttl, values);
            submit(api, &record.zone_id, batch).await
        }
        Command::UpsertRecord { record, values } => {
            let desired = record_from(&record, values);
            Ok(update_result_json(
                api.upsert_resource_record_set(&record.zone_id, desired).await?,
            ))
        }
        Command::PointAtPublicIp { zone_id, name, ttl } => {
            let metadata = InstanceMetadata::with_timeout(
                &config.metadata_url,
                Duration::from_secs(config.timeout_secs.min(5)),
            )?;
            let ip = metadata.public_ip().await?;
            let record_type = if ip.is_ipv4() { RecordType::A } else { RecordType::Aaaa };
            info!("Pointing {} at {}", name, ip);

            let desired = ResourceRecord::new(name, record_type, ttl, [ip.to_string()]);
            Ok(update_result_json(
                api.upsert_resource_record_set(&zone_id, desired).await?,
            ))
        }
        Command::PublicIp | Command::LocalIp => {
            anyhow::bail!("metadata commands do not use the Route 53 client")
        }
    }
}
