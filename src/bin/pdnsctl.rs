use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pdns_client::{
    ClientConfig, PowerDnsClient, ZoneOptions, canonicalize, validation::validate_fqdn_ascii,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    #[command(flatten)]
    conn: Connection,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Connection {
    /// URL scheme of the PowerDNS webserver
    #[arg(long, env = "PDNS_SCHEME", value_name = "SCHEME", default_value = "http")]
    scheme: String,
    /// PowerDNS webserver host
    #[arg(long, env = "PDNS_HOST", value_name = "HOST", default_value = "127.0.0.1")]
    host: String,
    /// PowerDNS webserver port
    #[arg(long, env = "PDNS_PORT", value_name = "PORT", default_value_t = 8081)]
    port: u16,
    /// PowerDNS server ID (virtual host)
    #[arg(long, env = "PDNS_VHOST", value_name = "ID", default_value = "localhost")]
    vhost: String,
    /// PowerDNS API key
    #[arg(long, env = "PDNS_API_KEY", value_name = "KEY", hide_env_values = true)]
    api_key: String,
    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Zone management
    #[command(subcommand)]
    Zones(ZonesCommand),
    /// Single-RRset changes
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Server statistics
    Stats {
        /// Only this statistic
        #[arg(long)]
        name: Option<String>,
    },
    /// Metadata of the configured server
    Server,
    /// Runtime configuration of the configured server
    Config,
}

#[derive(Subcommand, Debug)]
enum ZonesCommand {
    List,
    Get {
        #[arg(value_parser = parse_domain)]
        domain: String,
    },
    Export {
        #[arg(value_parser = parse_domain)]
        domain: String,
    },
    Notify {
        #[arg(value_parser = parse_domain)]
        domain: String,
    },
    Delete {
        #[arg(value_parser = parse_domain)]
        domain: String,
    },
    AddNative(AddZoneArgs),
    AddMaster(AddZoneArgs),
    AddSlave {
        #[arg(value_parser = parse_domain)]
        domain: String,
        /// Master address (repeat for multiple values)
        #[arg(long = "master", value_name = "ADDR")]
        masters: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct AddZoneArgs {
    #[arg(value_parser = parse_domain)]
    domain: String,
    /// Nameserver FQDN (repeat for multiple values)
    #[arg(long = "nameserver", value_name = "FQDN", value_parser = parse_domain)]
    nameservers: Vec<String>,
    #[arg(long)]
    dnssec: bool,
    #[arg(long, value_name = "PARAM")]
    nsec3param: Option<String>,
    #[arg(long)]
    nsec3narrow: bool,
    #[arg(long, value_name = "POLICY")]
    soa_edit: Option<String>,
    #[arg(long, value_name = "POLICY")]
    soa_edit_api: Option<String>,
    #[arg(long)]
    api_rectify: bool,
    #[arg(long)]
    account: Option<String>,
}

impl From<AddZoneArgs> for ZoneOptions {
    fn from(args: AddZoneArgs) -> Self {
        ZoneOptions {
            dnssec: args.dnssec,
            nsec3param: args.nsec3param,
            nsec3narrow: args.nsec3narrow,
            soa_edit: args.soa_edit,
            soa_edit_api: args.soa_edit_api,
            api_rectify: args.api_rectify,
            account: args.account,
            nameservers: args.nameservers,
        }
    }
}

#[derive(Subcommand, Debug)]
enum RecordsCommand {
    /// Create or replace an RRset
    Add {
        #[arg(value_parser = parse_domain)]
        zone: String,
        #[arg(value_parser = parse_domain)]
        name: String,
        rrtype: String,
        /// Record content (repeat for multiple values)
        #[arg(long = "content", value_name = "CONTENT", required = true)]
        contents: Vec<String>,
        #[arg(long, default_value_t = 300)]
        ttl: u32,
    },
    /// Remove an RRset
    Delete {
        #[arg(value_parser = parse_domain)]
        zone: String,
        #[arg(value_parser = parse_domain)]
        name: String,
        rrtype: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let pdns = build_client(&cli.conn)?;

    match cli.command {
        Command::Zones(cmd) => run_zones(&pdns, cmd).await,
        Command::Records(cmd) => run_records(&pdns, cmd).await,
        Command::Stats { name } => {
            let stats = match name {
                Some(name) => pdns.statistics().get(&name).await,
                None => pdns.statistics().list().await,
            }
            .context("failed to fetch statistics")?;
            print_json(&stats)
        }
        Command::Server => print_json(&pdns.servers().get().await?),
        Command::Config => print_json(&pdns.servers().config().await?),
    }
}

async fn run_zones(pdns: &PowerDnsClient, cmd: ZonesCommand) -> Result<()> {
    let zones = pdns.zones();
    match cmd {
        ZonesCommand::List => print_json(&zones.list().await?),
        ZonesCommand::Get { domain } => print_json(
            &zones
                .get(&domain)
                .await
                .with_context(|| format!("failed to fetch zone '{domain}'"))?,
        ),
        ZonesCommand::Export { domain } => {
            let text = zones
                .export(&domain)
                .await
                .with_context(|| format!("failed to export zone '{domain}'"))?;
            print!("{text}");
            Ok(())
        }
        ZonesCommand::Notify { domain } => print_json(&zones.notify(&domain).await?),
        ZonesCommand::Delete { domain } => {
            zones
                .delete(&domain)
                .await
                .with_context(|| format!("failed to delete zone '{domain}'"))?;
            info!("deleted {}", canonicalize(&domain));
            Ok(())
        }
        ZonesCommand::AddNative(args) => {
            let domain = args.domain.clone();
            print_json(&zones.add_native(&domain, args.into()).await?)
        }
        ZonesCommand::AddMaster(args) => {
            let domain = args.domain.clone();
            print_json(&zones.add_master(&domain, args.into()).await?)
        }
        ZonesCommand::AddSlave { domain, masters } => {
            if masters.is_empty() {
                bail!("at least one --master value is required for a slave zone");
            }
            print_json(&zones.add_slave(&domain, masters).await?)
        }
    }
}

async fn run_records(pdns: &PowerDnsClient, cmd: RecordsCommand) -> Result<()> {
    match cmd {
        RecordsCommand::Add {
            zone,
            name,
            rrtype,
            contents,
            ttl,
        } => {
            pdns.records()
                .add(&zone, &name, &rrtype, ttl, contents)
                .await
                .with_context(|| format!("failed to replace {name} {rrtype} in '{zone}'"))?;
            info!("replaced {} {}", canonicalize(&name), rrtype.to_ascii_uppercase());
        }
        RecordsCommand::Delete { zone, name, rrtype } => {
            pdns.records()
                .delete(&zone, &name, &rrtype)
                .await
                .with_context(|| format!("failed to delete {name} {rrtype} from '{zone}'"))?;
            info!("deleted {} {}", canonicalize(&name), rrtype.to_ascii_uppercase());
        }
    }
    Ok(())
}

fn build_client(conn: &Connection) -> Result<PowerDnsClient> {
    let mut config = ClientConfig::new(
        &conn.scheme,
        &conn.host,
        conn.port,
        &conn.vhost,
        &conn.api_key,
    );
    if let Some(secs) = conn.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    PowerDnsClient::new(config).context("failed to build HTTP client")
}

fn parse_domain(input: &str) -> Result<String> {
    validate_fqdn_ascii(input).with_context(|| format!("invalid domain name '{input}'"))?;
    Ok(canonicalize(input))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,pdns_client=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
