//! `adt`: terminal dashboard for the ADT token.
//!
//! ```text
//!   adt.toml ──▶ config ──▶ ChainClient ──▶ LocalWalletProvider ──▶ SessionManager
//!                              │                                        │
//!                              ▼                                        ▼
//!                         Erc20Gateway ◀──── signer ──────────── TransferFlow
//!                              │
//!                              ▼
//!                      history / info / balance
//!
//!   prices.api_url ──▶ PriceFeed ──▶ PriceTicker (watch)
//!   storage.path ────▶ FileStore ──▶ poll / feedback
//! ```

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use adt_dashboard::amount::TokenAmount;
use adt_dashboard::blockchain::{Approver, AutoApprove, TerminalApprover};
use adt_dashboard::community::{
    faq, CommunityError, CommunityPoll, FeedbackBoard, FileStore, KeyValueStore, VoteOutcome,
};
use adt_dashboard::config::{load_or_default, ConfigError};
use adt_dashboard::history::load_history;
use adt_dashboard::lifecycle::{signals, Shutdown};
use adt_dashboard::observability::{logging, metrics};
use adt_dashboard::prices::{PriceFeed, PriceSnapshot, PriceTicker};
use adt_dashboard::session::{LocalWalletProvider, SessionManager, WalletProvider};
use adt_dashboard::token::{Erc20Gateway, TokenGateway};
use adt_dashboard::transfer::{TransferFlow, TransferRequest, TransferState};
use adt_dashboard::{DashboardConfig, DashboardError};

#[derive(Parser)]
#[command(name = "adt")]
#[command(about = "Dashboard for the ADT token: wallet, transfers, history, prices and community")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "adt.toml")]
    config: PathBuf,

    /// Approve wallet prompts without asking
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show account, network and native balance
    Connect,
    /// Show the token balance of the connected account
    Balance,
    /// Show token name, symbol, decimals and total supply
    Info,
    /// Send tokens from the connected account
    Transfer {
        /// Recipient address (0x followed by 40 hex digits)
        #[arg(long)]
        to: String,
        /// Amount in whole tokens, e.g. 10.5
        #[arg(long)]
        amount: String,
    },
    /// List token transfers sent or received by the connected account
    History,
    /// Show current prices
    Prices {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
        /// Include names and 24h change
        #[arg(long)]
        detailed: bool,
    },
    /// Community poll
    Poll {
        #[command(subcommand)]
        action: PollAction,
    },
    /// Community feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Frequently asked questions, optionally filtered
    Faq { query: Option<String> },
    /// Sign a message with the connected account
    Sign { message: String },
}

#[derive(Subcommand)]
enum PollAction {
    /// Show options and results
    Show,
    /// Vote for an option (once per device)
    Vote { option: String },
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Submit feedback
    Add { text: String },
    /// List feedback, newest first
    List,
}

/// Everything that can end a command.
#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Dashboard(DashboardError),
    Community(CommunityError),
    NotConfigured(&'static str),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Dashboard(e) => f.write_str(&e.status_message()),
            CliError::Community(e) => write!(f, "{}", e),
            CliError::NotConfigured(field) => {
                write!(f, "{} is not set in the configuration file", field)
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<DashboardError> for CliError {
    fn from(e: DashboardError) -> Self {
        CliError::Dashboard(e)
    }
}

impl From<CommunityError> for CliError {
    fn from(e: CommunityError) -> Self {
        CliError::Community(e)
    }
}

type CliResult = Result<(), CliError>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging("info");
            eprintln!("{}", CliError::Config(e));
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let approver: Arc<dyn Approver> = if cli.yes || config.wallet.auto_approve {
        Arc::new(AutoApprove)
    } else {
        Arc::new(TerminalApprover)
    };

    let result = match cli.command {
        Commands::Connect => connect(&config, approver).await,
        Commands::Balance => balance(&config, approver).await,
        Commands::Info => info(&config, approver).await,
        Commands::Transfer { to, amount } => {
            transfer(&config, approver, TransferRequest::new(to, amount)).await
        }
        Commands::History => history(&config, approver).await,
        Commands::Prices { watch, detailed } => prices(&config, watch, detailed).await,
        Commands::Poll { action } => poll(&config, action),
        Commands::Feedback { action } => feedback(&config, action),
        Commands::Faq { query } => {
            show_faq(query.as_deref().unwrap_or(""));
            Ok(())
        }
        Commands::Sign { message } => sign(&config, approver, &message).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let CliError::Dashboard(inner) = &e {
                tracing::debug!(error = %inner, kind = inner.kind(), "Command failed");
            }
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the key, connect the session and warn on a chain mismatch.
async fn open_session(
    config: &DashboardConfig,
    approver: Arc<dyn Approver>,
) -> Result<(Arc<LocalWalletProvider>, SessionManager), CliError> {
    let provider = Arc::new(LocalWalletProvider::from_config(config, approver)?);
    let mut sessions = SessionManager::new(provider.clone());
    let session = sessions.connect().await?;

    if session.network.chain_id != config.chain.chain_id {
        tracing::warn!(
            expected = config.chain.chain_id,
            actual = session.network.chain_id,
            "Connected to a different chain than configured"
        );
    }
    Ok((provider, sessions))
}

fn contract_address(config: &DashboardConfig) -> Result<Address, CliError> {
    let raw = config.token.contract_address.trim();
    if raw.is_empty() {
        return Err(CliError::NotConfigured("token.contract_address"));
    }
    // Syntax was checked by config validation.
    raw.parse()
        .map_err(|_| CliError::NotConfigured("token.contract_address"))
}

fn read_gateway(
    config: &DashboardConfig,
    provider: &LocalWalletProvider,
) -> Result<Erc20Gateway, CliError> {
    Ok(Erc20Gateway::new(
        contract_address(config)?,
        &config.token,
        config.transfer.clone(),
        config.history.clone(),
        provider.client().clone(),
    ))
}

async fn connect(config: &DashboardConfig, approver: Arc<dyn Approver>) -> CliResult {
    let (_, sessions) = open_session(config, approver).await?;
    if let Some(session) = sessions.session() {
        println!("Connected: {} ({})", session.address, session.short_address());
        println!("Network:   {} ({})", session.network.name, session.network.chain_id);
        println!("Balance:   {} ETH", session.native_balance);
    }
    Ok(())
}

async fn balance(config: &DashboardConfig, approver: Arc<dyn Approver>) -> CliResult {
    let (provider, sessions) = open_session(config, approver).await?;
    let gateway = read_gateway(config, &provider)?;
    let owner = sessions.address()?;

    let (raw, decimals) = tokio::try_join!(gateway.balance_of(owner), gateway.decimals())?;
    println!("{} {}", TokenAmount::from_raw(raw, decimals), gateway.symbol());
    Ok(())
}

async fn info(config: &DashboardConfig, approver: Arc<dyn Approver>) -> CliResult {
    let (provider, _) = open_session(config, approver).await?;
    let gateway = read_gateway(config, &provider)?;
    let meta = gateway.metadata().await?;

    println!("Name:         {}", meta.name);
    println!("Symbol:       {}", meta.symbol);
    println!("Decimals:     {}", meta.decimals);
    println!("Total supply: {} {}", meta.total_supply_amount(), meta.symbol);
    println!("Contract:     {}", meta.address);
    Ok(())
}

async fn transfer(
    config: &DashboardConfig,
    approver: Arc<dyn Approver>,
    request: TransferRequest,
) -> CliResult {
    let (provider, sessions) = open_session(config, approver).await?;
    let owner = sessions.address()?;
    let gateway = read_gateway(config, &provider)?.with_signer(provider.wallet()?.clone())?;
    let symbol = gateway.symbol().to_string();

    let mut flow = TransferFlow::new(
        Arc::new(gateway),
        owner,
        Duration::from_secs(config.transfer.confirmation_timeout_secs),
    );

    let mut states = flow.subscribe();
    let progress = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match &state {
                TransferState::AwaitingConfirmation { tx_hash } => {
                    eprintln!("{} ({})", state.status_message(), tx_hash)
                }
                TransferState::Validating | TransferState::Submitting => {
                    eprintln!("{}", state.status_message())
                }
                _ => {}
            }
            if state.is_terminal() {
                break;
            }
        }
    });

    let result = flow.execute(&request).await;
    drop(flow);
    let _ = progress.await;

    let receipt = result?;
    println!("Transfer successful!");
    println!("Sent:        {} {}", receipt.amount, symbol);
    println!("Transaction: {}", receipt.tx_hash);
    println!("Block:       {}", receipt.block_number);
    match receipt.new_balance {
        Some(balance) => println!("New balance: {} {}", balance, symbol),
        None => println!("New balance: unavailable"),
    }
    Ok(())
}

async fn history(config: &DashboardConfig, approver: Arc<dyn Approver>) -> CliResult {
    let (provider, sessions) = open_session(config, approver).await?;
    let gateway = read_gateway(config, &provider)?;
    let records = load_history(&gateway, sessions.address()?).await?;

    if records.is_empty() {
        println!("No transactions found");
        return Ok(());
    }
    for record in records {
        println!(
            "{:<8} {} {}  {}",
            record.direction,
            record.value,
            gateway.symbol(),
            record.formatted_time()
        );
        println!("         From: {}", record.from);
        println!("         To:   {}", record.to);
    }
    Ok(())
}

fn print_prices(snapshot: &PriceSnapshot, detailed: bool) {
    if detailed {
        println!("Market Overview");
        for line in snapshot.detailed_lines() {
            println!("  {}", line);
        }
        if snapshot.stale {
            println!("  (prices could not be refreshed)");
        }
    } else {
        println!("{}", snapshot.ticker_line());
    }
}

async fn prices(config: &DashboardConfig, watch: bool, detailed: bool) -> CliResult {
    let feed = PriceFeed::new(config.prices.clone())?;

    if !watch {
        let snapshot = match feed.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Price fetch failed");
                PriceSnapshot::placeholder(feed.asset_ids())
            }
        };
        print_prices(&snapshot, detailed);
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let mut subscription = PriceTicker::new(
        Arc::new(feed),
        Duration::from_secs(config.prices.refresh_interval_secs),
    )
    .spawn(shutdown.subscribe());

    loop {
        tokio::select! {
            next = subscription.next() => match next {
                Some(snapshot) => print_prices(&snapshot, detailed),
                None => break,
            },
            _ = signals::shutdown_on_signal(&shutdown) => break,
        }
    }

    subscription.cancel();
    Ok(())
}

fn community_store(config: &DashboardConfig) -> Result<Arc<dyn KeyValueStore>, CliError> {
    let store = FileStore::open(&config.storage.path).map_err(CommunityError::from)?;
    Ok(Arc::new(store))
}

fn print_poll(poll: &CommunityPoll) {
    println!("Community Poll: what should we build next?");
    for tally in poll.results() {
        let marker = if poll.selected() == Some(tally.option.as_str()) { "*" } else { " " };
        println!(
            "{} {:<26} {:>4} votes {:>4}%",
            marker, tally.option, tally.votes, tally.percentage
        );
    }
    println!("Total votes: {}", poll.total_votes());
}

fn poll(config: &DashboardConfig, action: PollAction) -> CliResult {
    let mut poll = CommunityPoll::load(community_store(config)?);
    match action {
        PollAction::Show => print_poll(&poll),
        PollAction::Vote { option } => {
            match poll.vote(&option)? {
                VoteOutcome::Recorded => println!("Thank you for voting!"),
                VoteOutcome::AlreadyVoted { selected } => {
                    println!("You have already voted for \"{}\".", selected)
                }
            }
            print_poll(&poll);
        }
    }
    Ok(())
}

fn feedback(config: &DashboardConfig, action: FeedbackAction) -> CliResult {
    let mut board = FeedbackBoard::load(community_store(config)?);
    match action {
        FeedbackAction::Add { text } => match board.submit(&text)? {
            Some(_) => println!("Thank you for your feedback!"),
            None => println!("Feedback is empty; nothing submitted."),
        },
        FeedbackAction::List => {
            if board.is_empty() {
                println!("No feedback yet.");
            }
            for entry in board.newest_first() {
                println!("[{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M"), entry.text);
            }
        }
    }
    Ok(())
}

fn show_faq(query: &str) {
    let hits = faq::search(query);
    if hits.is_empty() {
        println!("No questions match \"{}\".", query);
    }
    for entry in hits {
        println!("Q: {}", entry.question);
        println!("A: {}\n", entry.answer);
    }
}

async fn sign(config: &DashboardConfig, approver: Arc<dyn Approver>, message: &str) -> CliResult {
    let (provider, _) = open_session(config, approver).await?;
    let signature = provider.sign_message(message.as_bytes()).await?;
    println!("{}", alloy::hex::encode_prefixed(signature.as_bytes()));
    Ok(())
}
