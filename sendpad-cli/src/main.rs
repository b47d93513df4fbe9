//! Sendpad CLI - wallet transfers from the terminal
//!
//! Connects to an EIP-1193 wallet endpoint, shows balances and sends native
//! or ERC-20 transfers through the wallet.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sendpad::chain::verify_tokens;
use sendpad::config::{ConfigError, IssueLevel, config_path as default_config_path, init_config};
use sendpad::prelude::*;
use sendpad::session::short_address;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Sendpad - connect a wallet, check balances, send transfers
#[derive(Parser)]
#[command(name = "sendpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "SENDPAD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show the account
    Connect,

    /// Show the balance of the native coin or a token
    Balance(BalanceArgs),

    /// Send a transfer through the wallet
    Send(SendArgs),

    /// List the configured tokens
    Tokens(TokensArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the balance command
#[derive(Args)]
struct BalanceArgs {
    /// Token symbol (defaults to the native coin)
    #[arg(short, long)]
    token: Option<String>,

    /// Keep printing the balance as new blocks arrive (Ctrl-C to stop)
    #[arg(short, long)]
    watch: bool,
}

/// Arguments for the tokens command
#[derive(Args)]
struct TokensArgs {
    /// Compare symbols and decimals with the token contracts
    #[arg(long)]
    check: bool,
}

/// Arguments for the send command
#[derive(Args)]
struct SendArgs {
    /// Token symbol (defaults to the native coin)
    #[arg(short, long)]
    token: Option<String>,

    /// Recipient address
    #[arg(long, default_value = "")]
    to: String,

    /// Amount in whole units, e.g. 1.5
    #[arg(short, long, default_value = "")]
    amount: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

type Session = WalletSession<HttpTransport, RpcChainReader>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sendpad_cli={level},sendpad={level},{}",
            if verbosity >= 3 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Connect => cmd_connect(&config_file).await,
        Commands::Balance(args) => cmd_balance(args, &config_file).await,
        Commands::Send(args) => cmd_send(args, &config_file).await,
        Commands::Tokens(args) => cmd_tokens(args, &config_file).await,
        Commands::Config(args) => cmd_config(args, &config_file).await,
    }
}

/// Load the configuration and build a session over it.
async fn open_session(config_file: &Path) -> Result<Session> {
    let config = load_config_from(config_file).await?;
    if !config.is_valid() {
        return Err(ConfigError::InvalidValue(format!(
            "{} has errors, run 'sendpad config validate'",
            config_file.display()
        ))
        .into());
    }

    tracing::debug!(
        rpc = %config.network.rpc_url,
        wallet = %config.wallet.endpoint,
        "opening session",
    );
    let reader = RpcChainReader::connect(&config.network.rpc_url).await?;
    let transport = HttpTransport::new(&config.wallet.endpoint)?;

    let session = WalletSession::from_config(&config, transport, reader)?
        .with_notifier(|n: &Notification| println!("{n}"));
    Ok(session)
}

/// Connect the wallet and print the account summary.
async fn cmd_connect(config_file: &Path) -> Result<()> {
    let mut session = open_session(config_file).await?;
    session.connect().await?;
    print_account(&session.state());
    Ok(())
}

/// Show a balance.
async fn cmd_balance(args: BalanceArgs, config_file: &Path) -> Result<()> {
    let mut session = open_session(config_file).await?.refresh_on_connect(false);
    if let Some(token) = args.token.as_deref() {
        session.select_token(token)?;
    }
    session.connect().await?;

    if let Some(query) = session.balance_query() {
        tracing::debug!(owner = %query.owner, asset = %query.asset, "balance query");
    }
    match session.refresh_balance().await? {
        Some(balance) => println!("{balance}"),
        None => println!("Not connected"),
    }

    if args.watch {
        watch_balance(&mut session).await?;
    }
    Ok(())
}

/// Print the balance again whenever a new block changes it.
async fn watch_balance(session: &mut Session) -> Result<()> {
    let blocks = session.reader().watch_blocks().await?;
    let blocks = std::pin::pin!(blocks);

    let mut rx = session.subscribe();
    rx.mark_unchanged();
    let printer = tokio::spawn(async move {
        let mut last = rx.borrow().balance.clone();
        while rx.changed().await.is_ok() {
            let balance = rx.borrow_and_update().balance.clone();
            if balance != last {
                if let Some(balance) = &balance {
                    println!("{balance}");
                }
                last = balance;
            }
        }
    });

    tokio::select! {
        () = session.refresh_on_new_blocks(blocks) => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    printer.abort();
    Ok(())
}

/// Send a transfer.
async fn cmd_send(args: SendArgs, config_file: &Path) -> Result<()> {
    let mut session = open_session(config_file).await?;
    if let Some(token) = args.token.as_deref() {
        session.select_token(token)?;
    }
    session.set_recipient(args.to);
    session.set_amount(args.amount);

    // Catch empty fields and bad recipients before prompting the wallet.
    if let Err(e) = session.prepare_transfer() {
        if !matches!(e, ValidationError::NotConnected) {
            return Err(e.into());
        }
    }

    session.connect().await?;
    let hash = session.submit_transfer().await?;
    println!("{hash}");

    if let Some(balance) = session.state().balance {
        println!("Balance: {balance}");
    }
    Ok(())
}

/// List tokens from the configuration, optionally checked against the chain.
async fn cmd_tokens(args: TokensArgs, config_file: &Path) -> Result<()> {
    let config = load_config_from(config_file).await?;
    let tokens = TokenList::from_config(&config)?;
    if args.check {
        return check_tokens(&config, &tokens).await;
    }

    println!("Network: {}", config.chain());
    println!();
    for token in tokens.iter() {
        let decimals = token
            .decimals
            .map_or_else(|| "?".to_owned(), |d| d.to_string());
        match token.asset {
            Asset::Native => println!("  {:<8} native  decimals={decimals}", token.symbol),
            Asset::Erc20(address) => {
                println!("  {:<8} {address}  decimals={decimals}", token.symbol);
            }
        }
    }
    Ok(())
}

/// Read each token contract and report where it disagrees with the config.
async fn check_tokens(config: &AppConfig, tokens: &TokenList) -> Result<()> {
    let reader = RpcChainReader::connect(&config.network.rpc_url).await?;
    if reader.chain_id() != config.network.chain_id {
        println!(
            "Warning: {} serves chain {}, configuration says {}",
            reader.rpc_url(),
            reader.chain_id(),
            config.network.chain_id
        );
    }

    let checks = verify_tokens(&reader, tokens).await;
    for check in &checks {
        let status = match &check.onchain {
            Ok(_) if check.is_consistent() => "ok".to_owned(),
            Ok(meta) => format!(
                "mismatch: contract says {} with {} decimals",
                meta.symbol, meta.decimals
            ),
            Err(e) => format!("unreadable: {e}"),
        };
        println!("  {:<8} {status}", check.token.symbol);
    }

    if checks.iter().all(sendpad::chain::TokenCheck::is_consistent) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue("token list disagrees with the chain".into()).into())
    }
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Init { force } => {
            if init_config(config_file, force).await? {
                println!("Configuration created: {}", config_file.display());
            } else {
                println!("Configuration already exists at: {}", config_file.display());
                println!("Use --force to overwrite.");
            }
        }
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            if config_file.exists() {
                let content = tokio::fs::read_to_string(config_file)
                    .await
                    .map_err(ConfigError::from)?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'sendpad config init' to create one.");
            }
        }
        ConfigCommands::Validate => {
            let config = load_config_from(config_file).await?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.level == IssueLevel::Error) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} has errors",
                    config_file.display()
                ))
                .into());
            }
        }
    }

    Ok(())
}

/// Print the connected account.
fn print_account(state: &SessionState) {
    let Some(address) = state.address else {
        println!("Not connected");
        return;
    };

    println!("Account: {address} ({})", short_address(&address));
    if let Some(chain_id) = state.chain_id {
        println!("Chain:   {}", EvmChain::from_id(chain_id));
    }
    if let Some(balance) = &state.balance {
        println!("Balance: {balance}");
    }
}
