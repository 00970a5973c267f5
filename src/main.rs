//! Share Provisioner
//!
//! Creates a folder on a filer and shares it with optional AD user, AD group
//! and NFS access, in one submission:
//!
//! ```text
//! share-provisioner --filer edge.corp.local --admin-user admin \
//!     --base-path "cloud/users/Service Account/data1" --share-name proj1 \
//!     --ad-group 'CORP\eng' --ad-group-permission RW \
//!     --nfs-range 10.0.0.0 --nfs-mask 255.255.255.0 --nfs-permission RO
//! ```
//!
//! The admin password is taken from `--admin-password` or, preferably,
//! `FILER_ADMIN_PASSWORD`.

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use share_provisioner::{
    FilerConfig, FilerFactory, FormOverrides, HttpFilerConfig, OutputLog, ProvisioningFlow,
    RequestBuilder, ShareForm,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Share Provisioner - create a filer folder and share it with AD and NFS access
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Filer address (host, host:port or URL)
    #[arg(long, env = "FILER_ADDRESS")]
    filer: Option<String>,

    /// Admin username
    #[arg(long, env = "FILER_ADMIN_USER")]
    admin_user: Option<String>,

    /// Admin password
    #[arg(long, env = "FILER_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Base path (e.g. "cloud/users/Service Account/data1")
    #[arg(long)]
    base_path: Option<String>,

    /// Share name, also used as the new folder name
    #[arg(long)]
    share_name: Option<String>,

    /// AD user to grant access (user@domain.com); enables the AD user section
    #[arg(long)]
    ad_user: Option<String>,

    /// AD user permission (RW or RO)
    #[arg(long)]
    ad_user_permission: Option<String>,

    /// AD group to grant access (DOMAIN\group); enables the AD group section
    #[arg(long)]
    ad_group: Option<String>,

    /// AD group permission (RW or RO)
    #[arg(long)]
    ad_group_permission: Option<String>,

    /// NFS client range (IP); enables the NFS section
    #[arg(long)]
    nfs_range: Option<String>,

    /// NFS client netmask (e.g. 255.255.255.0)
    #[arg(long)]
    nfs_mask: Option<String>,

    /// NFS permission (RW or RO)
    #[arg(long)]
    nfs_permission: Option<String>,

    /// YAML or JSON file with form values; command-line values take precedence
    #[arg(long, env = "SHARE_REQUEST_FILE")]
    request_file: Option<PathBuf>,

    /// Filer connector (http or memory)
    #[arg(long, env = "FILER_KIND", default_value = "http")]
    filer_kind: String,

    /// Scheme used when the filer address has none
    #[arg(long, env = "FILER_SCHEME", default_value = "https")]
    scheme: String,

    /// Management API path prefix
    #[arg(long, env = "FILER_API_PREFIX", default_value = "/api")]
    api_prefix: String,

    /// Verify the filer's TLS certificate
    #[arg(long, env = "FILER_VERIFY_TLS")]
    verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FILER_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Print the request that would be submitted and exit
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("Starting Share Provisioner");
    info!("  Version: {}", share_provisioner::VERSION);
    info!("  Filer kind: {}", args.filer_kind);
    info!("  Verify TLS: {}", args.verify_tls);

    let form = build_form(&args)?;

    if args.dry_run {
        let submission = RequestBuilder::build(&form)?;
        let preview = json!({
            "filer": submission.credentials.address,
            "adminUser": submission.credentials.username,
            "directory": submission.request.directory(),
            "share": submission.request.share_spec(),
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let config = FilerConfig {
        http: HttpFilerConfig {
            scheme: args.scheme.clone(),
            api_prefix: args.api_prefix.clone(),
            verify_tls: args.verify_tls,
            timeout_secs: args.timeout_secs,
        },
    };
    let connector = FilerFactory::create(&args.filer_kind, config)?;
    let flow = ProvisioningFlow::new(connector);

    let mut log = OutputLog::new();
    let outcome = flow.submit(&form, &mut log).await;

    if let Err(e) = &outcome {
        if e.is_input_error() {
            log.info("Correct the input and resubmit.");
        } else {
            log.info("Check that the filer is reachable, then resubmit.");
        }
    }
    print!("{}", log);

    if let Err(e) = outcome {
        error!("Submission failed at {} stage", e.kind());
        std::process::exit(1);
    }

    info!("Submission complete");
    Ok(())
}

// =============================================================================
// Form Assembly
// =============================================================================

fn build_form(args: &Args) -> anyhow::Result<ShareForm> {
    let mut form = match &args.request_file {
        Some(path) => ShareForm::load(path)
            .with_context(|| format!("loading request file {}", path.display()))?,
        None => ShareForm::default(),
    };

    form.apply_overrides(&FormOverrides {
        filer: args.filer.clone(),
        admin_user: args.admin_user.clone(),
        admin_password: args.admin_password.clone(),
        base_path: args.base_path.clone(),
        share_name: args.share_name.clone(),
        ad_user: args.ad_user.clone(),
        ad_user_permission: args.ad_user_permission.clone(),
        ad_group: args.ad_group.clone(),
        ad_group_permission: args.ad_group_permission.clone(),
        nfs_range: args.nfs_range.clone(),
        nfs_mask: args.nfs_mask.clone(),
        nfs_permission: args.nfs_permission.clone(),
    });

    Ok(form)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    // stdout carries the output log; diagnostics go to stderr
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
