use anchor_lang::AccountDeserialize;
use anyhow::{anyhow, Context, Result};
use borsh::BorshSerialize;
use clap::{Parser, Subcommand, ValueEnum};
use liquify_token::anti_whale::max_transfer_amount;
use liquify_token::constants::{ALLOWANCE_SEED, BALANCE_SEED, BURN_ADDRESS, CONFIG_SEED, DECIMALS};
use liquify_token::router_cpi::RouterCpi;
use liquify_token::state::{HolderBalance, TokenConfig};
use referral::state::{OperatorEntry, Referral, ReferrerStats};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "liquify-token", version, about = "Auto-liquify token CLI")]
struct Cli {
    #[arg(long)]
    cluster: Option<String>,

    #[arg(long)]
    keypair: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    Init(InitArgs),
    Open(HolderArgs),
    Mint(MintArgs),
    Transfer(TransferArgs),
    Approve(ApproveArgs),
    TransferFrom(TransferFromArgs),
    Set(SetArgs),
    TransferOperator(HolderArgs),
    Status(TokenOnlyArgs),
    Balance(HolderArgs),
    Holders(HoldersArgs),
    Referral(ReferralArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// TOML file with initial rates, exemptions and liquidity settings.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Parser)]
struct TokenOnlyArgs {
    #[arg(long)]
    token: Option<String>,
}

#[derive(Parser)]
struct HolderArgs {
    address: String,

    #[arg(long)]
    token: Option<String>,
}

#[derive(Parser)]
struct MintArgs {
    recipient: String,
    amount: String,

    #[arg(long)]
    token: Option<String>,
}

#[derive(Parser, Clone)]
struct LiquifyArgs {
    /// Base currency mint of the pool; enables the liquidity cycle for this call.
    #[arg(long)]
    base_mint: Option<String>,

    /// Extra writable accounts forwarded to the router program.
    #[arg(long = "router-account")]
    router_accounts: Vec<String>,
}

#[derive(Parser)]
struct TransferArgs {
    recipient: String,
    amount: String,

    #[arg(long)]
    token: Option<String>,

    #[command(flatten)]
    liquify: LiquifyArgs,
}

#[derive(Parser)]
struct ApproveArgs {
    spender: String,
    amount: String,

    #[arg(long)]
    token: Option<String>,
}

#[derive(Parser)]
struct TransferFromArgs {
    owner: String,
    recipient: String,
    amount: String,

    #[arg(long)]
    token: Option<String>,

    #[command(flatten)]
    liquify: LiquifyArgs,
}

#[derive(Parser)]
struct SetArgs {
    #[command(subcommand)]
    command: SetCmd,

    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum SetCmd {
    TaxRate { basis_points: u16 },
    BurnRate { percent: u16 },
    MaxTransferRate { basis_points: u16 },
    Liquify { enabled: Toggle },
    MinLiquify { amount: String },
    Router { router: String, base_mint: String },
    ExcludeAntiWhale(ExclusionArgs),
    ExcludeFee(ExclusionArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Parser)]
struct ExclusionArgs {
    address: String,

    #[arg(long)]
    remove: bool,
}

#[derive(Parser)]
struct HoldersArgs {
    #[arg(long)]
    min_balance: Option<String>,

    #[arg(long)]
    token: Option<String>,
}

#[derive(Parser)]
struct ReferralArgs {
    #[command(subcommand)]
    command: ReferralCmd,
}

#[derive(Subcommand)]
enum ReferralCmd {
    Init,
    Operator {
        address: String,
        #[arg(long)]
        disable: bool,
    },
    Record {
        user: String,
        referrer: String,
    },
    Commission {
        referrer: String,
        amount: String,
    },
    Show {
        address: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let solana_config = load_solana_cli_config().ok();

    match &cli.command {
        Commands::Init(args) => {
            let config_file = args
                .config
                .as_ref()
                .map(|path| load_liquify_config(path))
                .transpose()?;
            let network_override = config_file.as_ref().and_then(|cfg| cfg.network.as_ref());
            let ctx = build_context(&cli, solana_config.as_ref(), network_override)?;
            handle_init(&ctx, config_file.as_ref())
        }
        Commands::Open(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_open(&ctx, args)
        }
        Commands::Mint(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_mint(&ctx, args)
        }
        Commands::Transfer(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_transfer(&ctx, args)
        }
        Commands::Approve(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_approve(&ctx, args)
        }
        Commands::TransferFrom(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_transfer_from(&ctx, args)
        }
        Commands::Set(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_set(&ctx, args)
        }
        Commands::TransferOperator(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_transfer_operator(&ctx, args)
        }
        Commands::Status(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_status(&ctx, args)
        }
        Commands::Balance(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_balance(&ctx, args)
        }
        Commands::Holders(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_holders(&ctx, args)
        }
        Commands::Referral(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_referral(&ctx, &args.command)
        }
    }
}

#[derive(Debug, Clone)]
struct ClusterInfo {
    url: String,
    label: Option<String>,
}

#[derive(Clone, Copy)]
struct AppContext<'a> {
    client: &'a RpcClient,
    payer: &'a Keypair,
    output: OutputFormat,
    cluster: &'a ClusterInfo,
    commitment: CommitmentConfig,
}

struct OwnedContext {
    client: RpcClient,
    payer: Keypair,
    output: OutputFormat,
    cluster: ClusterInfo,
    commitment: CommitmentConfig,
}

impl OwnedContext {
    fn as_ref(&self) -> AppContext<'_> {
        AppContext {
            client: &self.client,
            payer: &self.payer,
            output: self.output,
            cluster: &self.cluster,
            commitment: self.commitment,
        }
    }
}

fn build_context(
    cli: &Cli,
    solana_config: Option<&SolanaCliConfig>,
    network_override: Option<&NetworkConfig>,
) -> Result<OwnedContext> {
    let cluster_value = if let Some(value) = cli.cluster.as_deref() {
        value.to_string()
    } else if let Some(value) = network_override.and_then(|cfg| cfg.cluster.as_deref()) {
        value.to_string()
    } else if let Some(config) = solana_config {
        config.json_rpc_url.clone()
    } else {
        "devnet".to_string()
    };
    let cluster = resolve_cluster(&cluster_value)?;

    let keypair_value = if let Some(value) = cli.keypair.as_deref() {
        value.to_string()
    } else if let Some(value) = network_override.and_then(|cfg| cfg.keypair_path.as_deref()) {
        value.to_string()
    } else if let Some(config) = solana_config {
        config.keypair_path.clone()
    } else {
        return Err(anyhow!(
            "Missing keypair path. Use --keypair or Solana CLI config."
        ));
    };

    let commitment_value = network_override
        .and_then(|cfg| cfg.commitment.clone())
        .or_else(|| solana_config.and_then(|cfg| cfg.commitment.clone()));
    let commitment = parse_commitment(commitment_value.as_deref());

    let payer = read_keypair_file(expand_tilde(&keypair_value))
        .map_err(|err| anyhow!("Failed to read keypair: {}", err))?;
    let client = RpcClient::new_with_commitment(cluster.url.clone(), commitment);

    Ok(OwnedContext {
        client,
        payer,
        output: cli.output,
        cluster,
        commitment,
    })
}

fn handle_init(ctx: &OwnedContext, file: Option<&LiquifyConfig>) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let identity = Keypair::new();
    let program_id = liquify_token::ID;
    let config_pda = find_config_pda(&identity.pubkey(), &program_id).0;
    let authority = ctx_ref.payer.pubkey();

    let initialize_ix = build_instruction(
        "initialize",
        Vec::new(),
        vec![
            AccountMeta::new(authority, true),
            AccountMeta::new_readonly(identity.pubkey(), true),
            AccountMeta::new(config_pda, false),
            AccountMeta::new(find_balance_pda(&config_pda, &config_pda).0, false),
            AccountMeta::new(find_balance_pda(&config_pda, &BURN_ADDRESS).0, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        program_id,
    );
    let signature = send_transaction(ctx_ref, vec![initialize_ix], vec![&identity])?;

    if let Some(file) = file {
        let setup = build_setup_instructions(&authority, &config_pda, file)?;
        if !setup.is_empty() {
            send_transaction(ctx_ref, setup, vec![])?;
        }
    }

    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&InitOutput {
            token: config_pda.to_string(),
            identity: identity.pubkey().to_string(),
            signature,
            explorer,
        })
    } else {
        println!("Token initialized");
        println!("Token:    {}", config_pda);
        println!("Identity: {}", identity.pubkey());
        println!("Tx:       {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

/// Operator updates that bring a fresh token in line with a config file.
fn build_setup_instructions(
    operator: &Pubkey,
    config_pda: &Pubkey,
    file: &LiquifyConfig,
) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let update = |name: &str, data: Vec<u8>| update_config_instruction(name, data, operator, config_pda);

    if let Some(fees) = &file.fees {
        if let Some(rate) = fees.transfer_tax_rate {
            instructions.push(update("update_transfer_tax_rate", rate.try_to_vec()?));
        }
        if let Some(rate) = fees.burn_rate {
            instructions.push(update("update_burn_rate", rate.try_to_vec()?));
        }
        for address in fees.exempt.iter().flatten() {
            let args = SetExclusionArgs {
                account: parse_pubkey(address)?,
                excluded: true,
            };
            instructions.push(update("set_excluded_from_fee", args.try_to_vec()?));
        }
    }

    if let Some(anti_whale) = &file.anti_whale {
        if let Some(rate) = anti_whale.max_transfer_amount_rate {
            instructions.push(update("update_max_transfer_amount_rate", rate.try_to_vec()?));
        }
        for address in anti_whale.excluded.iter().flatten() {
            let args = SetExclusionArgs {
                account: parse_pubkey(address)?,
                excluded: true,
            };
            instructions.push(update("set_excluded_from_anti_whale", args.try_to_vec()?));
        }
    }

    if let Some(liquidity) = &file.liquidity {
        if let (Some(router), Some(base_mint)) = (&liquidity.router, &liquidity.base_mint) {
            instructions.push(router_update_instruction(
                operator,
                config_pda,
                &parse_pubkey(router)?,
                &parse_pubkey(base_mint)?,
            ));
        }
        if let Some(amount) = &liquidity.min_amount {
            let amount = parse_amount(amount, DECIMALS)?;
            instructions.push(update("update_min_amount_to_liquify", amount.try_to_vec()?));
        }
        if let Some(enabled) = liquidity.enabled {
            instructions.push(update("update_swap_and_liquify_enabled", enabled.try_to_vec()?));
        }
    }

    // last, so the earlier updates still run under the creator
    if let Some(operator_value) = &file.operator {
        let new_operator = parse_pubkey(operator_value)?;
        instructions.push(update("transfer_operator", new_operator.to_bytes().to_vec()));
    }

    Ok(instructions)
}

fn handle_open(ctx: &OwnedContext, args: &HolderArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let holder = parse_pubkey(&args.address)?;
    let balance_pda = find_balance_pda(&config_pda, &holder).0;

    let ix = build_instruction(
        "open_balance",
        Vec::new(),
        vec![
            AccountMeta::new(ctx_ref.payer.pubkey(), true),
            AccountMeta::new_readonly(config_pda, false),
            AccountMeta::new_readonly(holder, false),
            AccountMeta::new(balance_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        liquify_token::ID,
    );
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(ctx_ref, signature, &format!("Opened balance {} for {}", balance_pda, holder))
}

fn handle_mint(ctx: &OwnedContext, args: &MintArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let recipient = parse_pubkey(&args.recipient)?;
    let amount = parse_amount(&args.amount, DECIMALS)?;

    let ix = build_instruction(
        "mint",
        amount.try_to_vec()?,
        vec![
            AccountMeta::new(ctx_ref.payer.pubkey(), true),
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(recipient, false),
            AccountMeta::new(find_balance_pda(&config_pda, &recipient).0, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        liquify_token::ID,
    );
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    let config = fetch_config(ctx_ref, &config_pda)?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&MintOutput {
            signature,
            explorer,
            new_supply: config.total_supply.to_string(),
        })
    } else {
        println!(
            "Minted {} tokens to {}",
            format_amount(amount, DECIMALS),
            recipient
        );
        println!("New supply: {}", format_amount(config.total_supply, DECIMALS));
        println!("Tx: {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn handle_transfer(ctx: &OwnedContext, args: &TransferArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let recipient = parse_pubkey(&args.recipient)?;
    let amount = parse_amount(&args.amount, DECIMALS)?;
    let sender = ctx_ref.payer.pubkey();

    let mut accounts = vec![
        AccountMeta::new(sender, true),
        AccountMeta::new(config_pda, false),
        AccountMeta::new(find_balance_pda(&config_pda, &sender).0, false),
        AccountMeta::new_readonly(recipient, false),
        AccountMeta::new(find_balance_pda(&config_pda, &recipient).0, false),
        AccountMeta::new(find_balance_pda(&config_pda, &config_pda).0, false),
        AccountMeta::new(find_balance_pda(&config_pda, &BURN_ADDRESS).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(liquify_accounts(ctx_ref, &config_pda, &args.liquify)?);

    let ix = build_instruction("transfer", amount.try_to_vec()?, accounts, liquify_token::ID);
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(
        ctx_ref,
        signature,
        &format!("Transferred {} tokens to {}", format_amount(amount, DECIMALS), recipient),
    )
}

fn handle_approve(ctx: &OwnedContext, args: &ApproveArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let spender = parse_pubkey(&args.spender)?;
    let amount = parse_amount(&args.amount, DECIMALS)?;
    let owner = ctx_ref.payer.pubkey();

    let ix = build_instruction(
        "approve",
        amount.try_to_vec()?,
        vec![
            AccountMeta::new(owner, true),
            AccountMeta::new(config_pda, false),
            AccountMeta::new_readonly(spender, false),
            AccountMeta::new(find_allowance_pda(&config_pda, &owner, &spender).0, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        liquify_token::ID,
    );
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(
        ctx_ref,
        signature,
        &format!("Approved {} to spend {}", spender, format_amount(amount, DECIMALS)),
    )
}

fn handle_transfer_from(ctx: &OwnedContext, args: &TransferFromArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let owner = parse_pubkey(&args.owner)?;
    let recipient = parse_pubkey(&args.recipient)?;
    let amount = parse_amount(&args.amount, DECIMALS)?;
    let spender = ctx_ref.payer.pubkey();

    let mut accounts = vec![
        AccountMeta::new(spender, true),
        AccountMeta::new(config_pda, false),
        AccountMeta::new_readonly(owner, false),
        AccountMeta::new(find_balance_pda(&config_pda, &owner).0, false),
        AccountMeta::new(find_allowance_pda(&config_pda, &owner, &spender).0, false),
        AccountMeta::new_readonly(recipient, false),
        AccountMeta::new(find_balance_pda(&config_pda, &recipient).0, false),
        AccountMeta::new(find_balance_pda(&config_pda, &config_pda).0, false),
        AccountMeta::new(find_balance_pda(&config_pda, &BURN_ADDRESS).0, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(liquify_accounts(ctx_ref, &config_pda, &args.liquify)?);

    let ix = build_instruction(
        "transfer_from",
        amount.try_to_vec()?,
        accounts,
        liquify_token::ID,
    );
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(
        ctx_ref,
        signature,
        &format!(
            "Transferred {} tokens from {} to {}",
            format_amount(amount, DECIMALS),
            owner,
            recipient
        ),
    )
}

/// Trailing accounts that let a transfer run the liquidity cycle:
/// `[router_program, pair_balance, base_mint, ..router accounts]`.
fn liquify_accounts(
    ctx: AppContext<'_>,
    config_pda: &Pubkey,
    args: &LiquifyArgs,
) -> Result<Vec<AccountMeta>> {
    let Some(base_mint) = args.base_mint.as_deref() else {
        return Ok(Vec::new());
    };
    let base_mint = parse_pubkey(base_mint)?;
    let config = fetch_config(ctx, config_pda)?;
    let router = config
        .liquidity
        .router
        .ok_or_else(|| anyhow!("Liquidity router is not configured for this token"))?;
    let pair = RouterCpi::pair_address(&router, config_pda, &base_mint);

    let mut accounts = vec![
        AccountMeta::new_readonly(router, false),
        AccountMeta::new(find_balance_pda(config_pda, &pair).0, false),
        AccountMeta::new_readonly(base_mint, false),
    ];
    for value in &args.router_accounts {
        accounts.push(AccountMeta::new(parse_pubkey(value)?, false));
    }
    Ok(accounts)
}

fn handle_set(ctx: &OwnedContext, args: &SetArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let operator = ctx_ref.payer.pubkey();
    let update = |name: &str, data: Vec<u8>| update_config_instruction(name, data, &operator, &config_pda);

    let (ix, summary) = match &args.command {
        SetCmd::TaxRate { basis_points } => (
            update("update_transfer_tax_rate", basis_points.try_to_vec()?),
            format!("Transfer tax rate set to {} bps", basis_points),
        ),
        SetCmd::BurnRate { percent } => (
            update("update_burn_rate", percent.try_to_vec()?),
            format!("Burn rate set to {}%", percent),
        ),
        SetCmd::MaxTransferRate { basis_points } => (
            update("update_max_transfer_amount_rate", basis_points.try_to_vec()?),
            format!("Max transfer amount rate set to {} bps", basis_points),
        ),
        SetCmd::Liquify { enabled } => {
            let enabled = matches!(enabled, Toggle::On);
            (
                update("update_swap_and_liquify_enabled", enabled.try_to_vec()?),
                format!("Swap and liquify enabled: {}", enabled),
            )
        }
        SetCmd::MinLiquify { amount } => {
            let amount = parse_amount(amount, DECIMALS)?;
            (
                update("update_min_amount_to_liquify", amount.try_to_vec()?),
                format!("Min amount to liquify set to {}", format_amount(amount, DECIMALS)),
            )
        }
        SetCmd::Router { router, base_mint } => {
            let router = parse_pubkey(router)?;
            let base_mint = parse_pubkey(base_mint)?;
            let pair = RouterCpi::pair_address(&router, &config_pda, &base_mint);
            (
                router_update_instruction(&operator, &config_pda, &router, &base_mint),
                format!("Liquidity router set to {} (pair {})", router, pair),
            )
        }
        SetCmd::ExcludeAntiWhale(exclusion) => {
            let args = SetExclusionArgs {
                account: parse_pubkey(&exclusion.address)?,
                excluded: !exclusion.remove,
            };
            (
                update("set_excluded_from_anti_whale", args.try_to_vec()?),
                format!("Anti-whale exclusion for {}: {}", exclusion.address, args.excluded),
            )
        }
        SetCmd::ExcludeFee(exclusion) => {
            let args = SetExclusionArgs {
                account: parse_pubkey(&exclusion.address)?,
                excluded: !exclusion.remove,
            };
            (
                update("set_excluded_from_fee", args.try_to_vec()?),
                format!("Fee exclusion for {}: {}", exclusion.address, args.excluded),
            )
        }
    };

    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(ctx_ref, signature, &summary)
}

fn handle_transfer_operator(ctx: &OwnedContext, args: &HolderArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let new_operator = parse_pubkey(&args.address)?;
    let ix = update_config_instruction(
        "transfer_operator",
        new_operator.to_bytes().to_vec(),
        &ctx_ref.payer.pubkey(),
        &config_pda,
    );
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(ctx_ref, signature, &format!("Operator transferred to {}", new_operator))
}

fn handle_status(ctx: &OwnedContext, args: &TokenOnlyArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let config = fetch_config(ctx_ref, &config_pda)?;
    let accrued = fetch_balance(ctx_ref, &config_pda, &config_pda)?.unwrap_or(0);
    let burned = fetch_balance(ctx_ref, &config_pda, &BURN_ADDRESS)?.unwrap_or(0);
    let cap = max_transfer_amount(
        config.total_supply,
        config.anti_whale.max_transfer_amount_rate,
    )
    .map_err(|err| anyhow!("Failed to compute transfer cap: {}", err))?;

    let output = StatusOutput {
        token: config_pda.to_string(),
        owner: config.owner.to_string(),
        operator: config.operator.to_string(),
        total_supply: format_amount(config.total_supply, DECIMALS),
        transfer_tax_rate: config.fees.transfer_tax_rate,
        burn_rate: config.fees.burn_rate,
        max_transfer_amount_rate: config.anti_whale.max_transfer_amount_rate,
        max_transfer_amount: format_amount(cap, DECIMALS),
        swap_and_liquify_enabled: config.liquidity.swap_and_liquify_enabled,
        min_amount_to_liquify: format_amount(config.liquidity.min_amount_to_liquify, DECIMALS),
        liquidity_router: config.liquidity.router.map(|key| key.to_string()),
        liquidity_pair: config.liquidity.pair.map(|key| key.to_string()),
        accrued_for_liquidity: format_amount(accrued, DECIMALS),
        burned: format_amount(burned, DECIMALS),
        excluded_from_anti_whale: config
            .anti_whale
            .excluded
            .iter()
            .map(|key| key.to_string())
            .collect(),
        excluded_from_fee: config.fee_exempt.iter().map(|key| key.to_string()).collect(),
    };

    if ctx_ref.output == OutputFormat::Json {
        return print_json(&output);
    }

    println!("Token status");
    println!("Token: {}", output.token);
    println!("Owner: {}", output.owner);
    println!("Operator: {}", output.operator);
    println!("Total supply: {}", output.total_supply);
    println!("Fees:");
    println!("  Transfer tax: {} bps", output.transfer_tax_rate);
    println!("  Burn share: {}%", output.burn_rate);
    println!("  Burned so far: {}", output.burned);
    println!("Anti-whale:");
    println!("  Max transfer rate: {} bps", output.max_transfer_amount_rate);
    println!("  Max transfer amount: {}", output.max_transfer_amount);
    println!("  Excluded: {}", output.excluded_from_anti_whale.len());
    println!("Liquidity:");
    println!("  Swap and liquify: {}", output.swap_and_liquify_enabled);
    println!("  Min amount: {}", output.min_amount_to_liquify);
    println!("  Accrued: {}", output.accrued_for_liquidity);
    println!(
        "  Router: {}",
        output.liquidity_router.as_deref().unwrap_or("not set")
    );
    println!(
        "  Pair: {}",
        output.liquidity_pair.as_deref().unwrap_or("not set")
    );
    println!("Fee exempt: {}", output.excluded_from_fee.len());
    Ok(())
}

fn handle_balance(ctx: &OwnedContext, args: &HolderArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let holder = parse_pubkey(&args.address)?;
    let amount = fetch_balance(ctx_ref, &config_pda, &holder)?;

    if ctx_ref.output == OutputFormat::Json {
        print_json(&BalanceOutput {
            holder: holder.to_string(),
            opened: amount.is_some(),
            amount: amount.unwrap_or(0).to_string(),
        })
    } else {
        match amount {
            Some(amount) => println!("{} {}", holder, format_amount(amount, DECIMALS)),
            None => println!("{} has no balance account", holder),
        }
        Ok(())
    }
}

fn handle_holders(ctx: &OwnedContext, args: &HoldersArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let config_pda = resolve_token(&args.token)?;
    let min_balance = args
        .min_balance
        .as_deref()
        .map(|value| parse_amount(value, DECIMALS))
        .transpose()?;

    let mut holders: Vec<HolderInfo> = list_balance_accounts(ctx_ref, &config_pda)?
        .into_iter()
        .filter(|(_, balance)| min_balance.map_or(true, |min| balance.amount >= min))
        .map(|(address, balance)| HolderInfo {
            holder: balance.holder.to_string(),
            balance_account: address.to_string(),
            amount: balance.amount.to_string(),
            raw: balance.amount,
        })
        .collect();
    holders.sort_by(|a, b| b.raw.cmp(&a.raw));

    if ctx_ref.output == OutputFormat::Json {
        print_json(&HoldersOutput { holders })
    } else {
        if holders.is_empty() {
            println!("No holders found");
        }
        for holder in holders {
            println!("{} {}", holder.holder, format_amount(holder.raw, DECIMALS));
        }
        Ok(())
    }
}

fn handle_referral(ctx: &OwnedContext, cmd: &ReferralCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let program_id = referral::ID;
    let signer = ctx_ref.payer.pubkey();
    let config_pda = find_referral_config_pda(&program_id).0;

    let (ix, summary) = match cmd {
        ReferralCmd::Init => (
            build_instruction(
                "initialize",
                Vec::new(),
                vec![
                    AccountMeta::new(signer, true),
                    AccountMeta::new(config_pda, false),
                    AccountMeta::new_readonly(system_program::id(), false),
                ],
                program_id,
            ),
            format!("Referral registry initialized at {}", config_pda),
        ),
        ReferralCmd::Operator { address, disable } => {
            let operator = parse_pubkey(address)?;
            let status = !disable;
            (
                build_instruction(
                    "update_operator",
                    status.try_to_vec()?,
                    vec![
                        AccountMeta::new(signer, true),
                        AccountMeta::new_readonly(config_pda, false),
                        AccountMeta::new_readonly(operator, false),
                        AccountMeta::new(find_operator_pda(&config_pda, &operator).0, false),
                        AccountMeta::new_readonly(system_program::id(), false),
                    ],
                    program_id,
                ),
                format!("Referral operator {}: {}", operator, status),
            )
        }
        ReferralCmd::Record { user, referrer } => {
            let user = parse_pubkey(user)?;
            let referrer = parse_pubkey(referrer)?;
            (
                build_instruction(
                    "record_referral",
                    Vec::new(),
                    vec![
                        AccountMeta::new(signer, true),
                        AccountMeta::new_readonly(config_pda, false),
                        AccountMeta::new_readonly(find_operator_pda(&config_pda, &signer).0, false),
                        AccountMeta::new_readonly(user, false),
                        AccountMeta::new_readonly(referrer, false),
                        AccountMeta::new(find_referral_pda(&config_pda, &user).0, false),
                        AccountMeta::new(find_referrer_pda(&config_pda, &referrer).0, false),
                        AccountMeta::new_readonly(system_program::id(), false),
                    ],
                    program_id,
                ),
                format!("Recorded referral of {} by {}", user, referrer),
            )
        }
        ReferralCmd::Commission { referrer, amount } => {
            let referrer = parse_pubkey(referrer)?;
            let amount = parse_amount(amount, DECIMALS)?;
            (
                build_instruction(
                    "record_referral_commission",
                    amount.try_to_vec()?,
                    vec![
                        AccountMeta::new(signer, true),
                        AccountMeta::new_readonly(config_pda, false),
                        AccountMeta::new_readonly(find_operator_pda(&config_pda, &signer).0, false),
                        AccountMeta::new_readonly(referrer, false),
                        AccountMeta::new(find_referrer_pda(&config_pda, &referrer).0, false),
                        AccountMeta::new_readonly(system_program::id(), false),
                    ],
                    program_id,
                ),
                format!(
                    "Recorded {} commission for {}",
                    format_amount(amount, DECIMALS),
                    referrer
                ),
            )
        }
        ReferralCmd::Show { address } => {
            let address = parse_pubkey(address)?;
            return show_referral(ctx_ref, &config_pda, &address);
        }
    };

    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    print_simple(ctx_ref, signature, &summary)
}

fn show_referral(ctx: AppContext<'_>, config_pda: &Pubkey, address: &Pubkey) -> Result<()> {
    let referrer = fetch_anchor_account::<Referral>(ctx, &find_referral_pda(config_pda, address).0)?
        .map(|entry| entry.referrer)
        .filter(|referrer| *referrer != Pubkey::default());
    let stats = fetch_anchor_account::<ReferrerStats>(ctx, &find_referrer_pda(config_pda, address).0)?;
    let operator = fetch_anchor_account::<OperatorEntry>(ctx, &find_operator_pda(config_pda, address).0)?
        .map_or(false, |entry| entry.is_active);

    let output = ReferralOutput {
        address: address.to_string(),
        referrer: referrer.map(|key| key.to_string()),
        referrals_count: stats.as_ref().map_or(0, |stats| stats.referrals_count),
        total_referral_commissions: stats
            .as_ref()
            .map_or(0, |stats| stats.total_commissions)
            .to_string(),
        is_operator: operator,
    };

    if ctx.output == OutputFormat::Json {
        print_json(&output)
    } else {
        println!("Address: {}", output.address);
        println!(
            "Referrer: {}",
            output.referrer.as_deref().unwrap_or("none")
        );
        println!("Referrals: {}", output.referrals_count);
        println!(
            "Commissions: {}",
            format_amount(
                stats.map_or(0, |stats| stats.total_commissions),
                DECIMALS
            )
        );
        println!("Operator: {}", output.is_operator);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LiquifyConfig {
    fees: Option<FeesConfig>,
    anti_whale: Option<AntiWhaleFileConfig>,
    liquidity: Option<LiquidityFileConfig>,
    operator: Option<String>,
    network: Option<NetworkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FeesConfig {
    transfer_tax_rate: Option<u16>,
    burn_rate: Option<u16>,
    exempt: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AntiWhaleFileConfig {
    max_transfer_amount_rate: Option<u16>,
    excluded: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LiquidityFileConfig {
    enabled: Option<bool>,
    min_amount: Option<String>,
    router: Option<String>,
    base_mint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct NetworkConfig {
    cluster: Option<String>,
    keypair_path: Option<String>,
    commitment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SolanaCliConfig {
    json_rpc_url: String,
    keypair_path: String,
    commitment: Option<String>,
}

fn load_liquify_config(path: &str) -> Result<LiquifyConfig> {
    let contents = fs::read_to_string(expand_tilde(path))
        .with_context(|| format!("Failed to read config: {}", path))?;
    toml::from_str(&contents).context("Failed to parse config")
}

fn load_solana_cli_config() -> Result<SolanaCliConfig> {
    let path = default_solana_config_path();
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read Solana config: {}", path.display()))?;
    serde_yaml::from_str(&contents).context("Failed to parse Solana config")
}

fn default_solana_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("solana");
    path.push("cli");
    path.push("config.yml");
    path
}

fn resolve_cluster(input: &str) -> Result<ClusterInfo> {
    let lowered = input.to_lowercase();
    let (url, label) = match lowered.as_str() {
        "devnet" => ("https://api.devnet.solana.com", Some("devnet")),
        "testnet" => ("https://api.testnet.solana.com", Some("testnet")),
        "mainnet" | "mainnet-beta" => ("https://api.mainnet-beta.solana.com", Some("mainnet-beta")),
        "localnet" => ("http://127.0.0.1:8899", Some("localnet")),
        _ if input.starts_with("http://") || input.starts_with("https://") => {
            let label = ["devnet", "testnet", "mainnet"]
                .into_iter()
                .find(|name| lowered.contains(name))
                .map(|name| if name == "mainnet" { "mainnet-beta" } else { name });
            (input, label)
        }
        _ => return Err(anyhow!("Unknown cluster: {}", input)),
    };
    Ok(ClusterInfo {
        url: url.to_string(),
        label: label.map(str::to_string),
    })
}

fn parse_commitment(value: Option<&str>) -> CommitmentConfig {
    match value.unwrap_or("confirmed") {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|_| anyhow!("Invalid pubkey: {}", value))
}

fn resolve_token(token: &Option<String>) -> Result<Pubkey> {
    let value = token.as_deref().ok_or_else(|| anyhow!("Missing --token"))?;
    parse_pubkey(value)
}

/// Parses a decimal token amount into base units. Whole numbers are token
/// units too: `"1"` is `10^decimals`.
fn parse_amount(value: &str, decimals: u8) -> Result<u128> {
    let sanitized = value.replace('_', "");
    let (whole, fractional) = sanitized.split_once('.').unwrap_or((&sanitized, ""));
    if fractional.len() > decimals as usize {
        return Err(anyhow!("Too many decimal places"));
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .with_context(|| format!("Invalid amount: {}", value))?
    };
    let fraction = format!("{:0<width$}", fractional, width = decimals as usize);
    let fractional_value: u128 = if fraction.is_empty() {
        0
    } else {
        fraction
            .parse()
            .with_context(|| format!("Invalid amount: {}", value))?
    };

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| anyhow!("Decimal overflow"))?;
    whole_value
        .checked_mul(scale)
        .and_then(|value| value.checked_add(fractional_value))
        .ok_or_else(|| anyhow!("Amount overflow"))
}

fn format_amount(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let frac = amount % scale;
    format!("{}.{:0width$}", whole, frac, width = decimals as usize)
}

fn explorer_url(signature: &str, cluster: &ClusterInfo) -> Option<String> {
    cluster.label.as_ref().map(|label| {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature, label
        )
    })
}

fn send_transaction(
    ctx: AppContext<'_>,
    instructions: Vec<Instruction>,
    extra_signers: Vec<&Keypair>,
) -> Result<String> {
    let blockhash = ctx.client.get_latest_blockhash()?;
    let mut transaction = Transaction::new_with_payer(&instructions, Some(&ctx.payer.pubkey()));
    let mut signers: Vec<&dyn Signer> = vec![ctx.payer];
    for signer in extra_signers {
        if signer.pubkey() != ctx.payer.pubkey() {
            signers.push(signer);
        }
    }
    transaction.sign(&signers, blockhash);
    let signature = ctx.client.send_and_confirm_transaction(&transaction)?;
    Ok(signature.to_string())
}

fn fetch_config(ctx: AppContext<'_>, config_pda: &Pubkey) -> Result<TokenConfig> {
    fetch_anchor_account::<TokenConfig>(ctx, config_pda)?
        .ok_or_else(|| anyhow!("Token config {} not found", config_pda))
}

fn fetch_balance(ctx: AppContext<'_>, config_pda: &Pubkey, holder: &Pubkey) -> Result<Option<u128>> {
    let balance =
        fetch_anchor_account::<HolderBalance>(ctx, &find_balance_pda(config_pda, holder).0)?;
    Ok(balance.map(|balance| balance.amount))
}

fn fetch_anchor_account<T: AccountDeserialize>(
    ctx: AppContext<'_>,
    address: &Pubkey,
) -> Result<Option<T>> {
    let account = match ctx.client.get_account(address) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    let mut data = account.data.as_slice();
    let decoded = T::try_deserialize(&mut data)
        .with_context(|| format!("Failed to decode account {}", address))?;
    Ok(Some(decoded))
}

fn list_balance_accounts(
    ctx: AppContext<'_>,
    config_pda: &Pubkey,
) -> Result<Vec<(Pubkey, HolderBalance)>> {
    let mut config = RpcProgramAccountsConfig::default();
    config.filters = Some(vec![
        RpcFilterType::DataSize(8 + HolderBalance::INIT_SPACE as u64),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(8, config_pda.as_ref())),
    ]);
    config.account_config = RpcAccountInfoConfig {
        encoding: None,
        commitment: Some(ctx.commitment),
        data_slice: None,
        min_context_slot: None,
    };

    let accounts = ctx
        .client
        .get_program_accounts_with_config(&liquify_token::ID, config)?;

    let mut result = Vec::new();
    for (key, account) in accounts {
        let mut data = account.data.as_slice();
        if let Ok(decoded) = HolderBalance::try_deserialize(&mut data) {
            result.push((key, decoded));
        }
    }
    Ok(result)
}

fn find_config_pda(identity: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED, identity.as_ref()], program_id)
}

fn find_balance_pda(config: &Pubkey, holder: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[BALANCE_SEED, config.as_ref(), holder.as_ref()],
        &liquify_token::ID,
    )
}

fn find_allowance_pda(config: &Pubkey, owner: &Pubkey, spender: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[ALLOWANCE_SEED, config.as_ref(), owner.as_ref(), spender.as_ref()],
        &liquify_token::ID,
    )
}

fn find_referral_config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[referral::CONFIG_SEED], program_id)
}

fn find_operator_pda(config: &Pubkey, operator: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[referral::OPERATOR_SEED, config.as_ref(), operator.as_ref()],
        &referral::ID,
    )
}

fn find_referral_pda(config: &Pubkey, user: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[referral::REFERRAL_SEED, config.as_ref(), user.as_ref()],
        &referral::ID,
    )
}

fn find_referrer_pda(config: &Pubkey, referrer: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[referral::REFERRER_SEED, config.as_ref(), referrer.as_ref()],
        &referral::ID,
    )
}

fn anchor_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{}", name));
    let hash = hasher.finalize();
    let mut output = [0u8; 8];
    output.copy_from_slice(&hash[..8]);
    output
}

fn build_instruction(
    name: &str,
    data: Vec<u8>,
    accounts: Vec<AccountMeta>,
    program_id: Pubkey,
) -> Instruction {
    let mut payload = Vec::with_capacity(8 + data.len());
    payload.extend_from_slice(&anchor_discriminator(name));
    payload.extend_from_slice(&data);
    Instruction {
        program_id,
        accounts,
        data: payload,
    }
}

fn update_config_instruction(
    name: &str,
    data: Vec<u8>,
    operator: &Pubkey,
    config_pda: &Pubkey,
) -> Instruction {
    build_instruction(
        name,
        data,
        vec![
            AccountMeta::new_readonly(*operator, true),
            AccountMeta::new(*config_pda, false),
        ],
        liquify_token::ID,
    )
}

fn router_update_instruction(
    operator: &Pubkey,
    config_pda: &Pubkey,
    router: &Pubkey,
    base_mint: &Pubkey,
) -> Instruction {
    build_instruction(
        "update_liquidity_venue_router",
        Vec::new(),
        vec![
            AccountMeta::new_readonly(*operator, true),
            AccountMeta::new(*config_pda, false),
            AccountMeta::new_readonly(*router, false),
            AccountMeta::new_readonly(*base_mint, false),
        ],
        liquify_token::ID,
    )
}

#[derive(BorshSerialize)]
struct SetExclusionArgs {
    account: Pubkey,
    excluded: bool,
}

#[derive(Serialize)]
struct InitOutput {
    token: String,
    identity: String,
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct MintOutput {
    signature: String,
    explorer: Option<String>,
    new_supply: String,
}

#[derive(Serialize)]
struct SimpleOutput {
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct StatusOutput {
    token: String,
    owner: String,
    operator: String,
    total_supply: String,
    transfer_tax_rate: u16,
    burn_rate: u16,
    max_transfer_amount_rate: u16,
    max_transfer_amount: String,
    swap_and_liquify_enabled: bool,
    min_amount_to_liquify: String,
    liquidity_router: Option<String>,
    liquidity_pair: Option<String>,
    accrued_for_liquidity: String,
    burned: String,
    excluded_from_anti_whale: Vec<String>,
    excluded_from_fee: Vec<String>,
}

#[derive(Serialize)]
struct BalanceOutput {
    holder: String,
    opened: bool,
    amount: String,
}

#[derive(Serialize, Clone)]
struct HolderInfo {
    holder: String,
    balance_account: String,
    amount: String,
    #[serde(skip)]
    raw: u128,
}

#[derive(Serialize)]
struct HoldersOutput {
    holders: Vec<HolderInfo>,
}

#[derive(Serialize)]
struct ReferralOutput {
    address: String,
    referrer: Option<String>,
    referrals_count: u64,
    total_referral_commissions: String,
    is_operator: bool,
}

fn print_simple(ctx: AppContext<'_>, signature: String, summary: &str) -> Result<()> {
    let explorer = explorer_url(&signature, ctx.cluster);
    if ctx.output == OutputFormat::Json {
        print_json(&SimpleOutput {
            signature,
            explorer,
        })
    } else {
        println!("{}", summary);
        println!("Tx: {}", signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
