use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{Write, stdout};
use uuid::Uuid;

use crate::application::{AppError, LedgerStore, spending_by_category};
use crate::domain::{Category, Cents, RewardId, TransactionKind, format_cents, parse_cents};
use crate::io::Exporter;
use crate::storage::SqliteStore;

/// Pocketbook - allowance ledger with savings rewards
#[derive(Parser)]
#[command(name = "pocketbook")]
#[command(about = "Track an allowance, income and expenses, and save towards rewards")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "POCKETBOOK_DB", default_value = "pocketbook.db", global = true)]
    pub database: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database file
    Init,

    /// Show the current balance
    Balance,

    /// Set the base allowance
    Allowance {
        /// Amount (e.g., "25.00" or "25")
        amount: String,
    },

    /// Record an expense (or income with --income)
    Add {
        /// Amount (e.g., "4.50")
        amount: String,

        /// What the money was for
        reason: String,

        /// Record as income instead of expense
        #[arg(long)]
        income: bool,

        /// Category: food, clothing, transport, entertainment, reward_deposit, misc
        #[arg(short, long)]
        category: Option<String>,

        /// Date of the transaction (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    Transactions {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a transaction by ID
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Delete every transaction
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Reward goal commands
    #[command(subcommand)]
    Reward(RewardCommands),

    /// Totals and spending by category
    Report,

    /// Export data to CSV or JSON
    Export {
        /// What to export: transactions, rewards, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RewardCommands {
    /// Add a reward goal at the end of the list
    Add {
        /// Reward title
        title: String,

        /// Goal amount (e.g., "200")
        goal: String,
    },

    /// List reward goals in priority order
    List,

    /// Delete rewards by their position in `reward list`
    Delete {
        /// Positions (1-based)
        #[arg(required = true)]
        positions: Vec<usize>,
    },

    /// Move money from the balance into a reward
    Deposit {
        /// Position in `reward list` (1-based)
        position: usize,

        /// Amount to deposit
        amount: String,
    },

    /// Adjust a reward's progress without touching the balance
    Progress {
        /// Position in `reward list` (1-based)
        position: usize,

        /// Amount to add (may be negative)
        #[arg(allow_hyphen_values = true)]
        delta: String,
    },
}

type Store = LedgerStore<SqliteStore>;

async fn open_store(database: &str) -> Result<Store, AppError> {
    let storage = SqliteStore::open_path(database).await?;
    Ok(LedgerStore::open(storage).await)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut store = open_store(&self.database).await?;

        match self.command {
            Commands::Init => {
                store.save().await?;
                println!("Ledger initialized: {}", self.database);
            }

            Commands::Balance => {
                println!("Balance: {}", format_cents(store.current_balance()));
            }

            Commands::Allowance { amount } => {
                let amount_cents = parse_amount(&amount)?;
                store.set_allowance(amount_cents).await;
                println!(
                    "Allowance set to {} (balance: {})",
                    format_cents(amount_cents),
                    format_cents(store.current_balance())
                );
            }

            Commands::Add {
                amount,
                reason,
                income,
                category,
                date,
            } => {
                let amount_cents = parse_positive_amount(&amount)?;
                if reason.trim().is_empty() {
                    bail!("Reason cannot be empty");
                }

                let kind = if income {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                };
                let category = match category {
                    Some(c) => parse_category(&c)?,
                    None if income => Category::RewardDeposit,
                    None => Category::Misc,
                };
                let date = date.map(|d| parse_date(&d)).transpose()?;

                let tx = store
                    .add_transaction(amount_cents, reason.trim(), kind, category, date)
                    .await;
                println!(
                    "Recorded {}: {} {} ({})",
                    tx.kind,
                    format_cents(tx.amount_cents),
                    tx.reason,
                    tx.id
                );
                println!("Balance: {}", format_cents(store.current_balance()));
            }

            Commands::Transactions { category, limit } => {
                let category = category.map(|c| parse_category(&c)).transpose()?;
                run_transactions_command(&store, category, limit);
            }

            Commands::Delete { id } => {
                let tx_id =
                    Uuid::parse_str(&id).context("Invalid transaction ID format (expected UUID)")?;
                if !store.delete_transaction(tx_id).await {
                    return Err(AppError::TransactionNotFound(id).into());
                }
                println!("Deleted transaction {}", tx_id);
            }

            Commands::Clear { yes } => {
                if !yes {
                    bail!("Refusing to delete all transactions without --yes");
                }
                let count = store.transactions().len();
                store.clear_all_transactions().await;
                println!("Deleted {} transaction(s)", count);
            }

            Commands::Reward(reward_cmd) => {
                run_reward_command(&mut store, reward_cmd).await?;
            }

            Commands::Report => run_report_command(&store),

            Commands::Export {
                export_type,
                output,
            } => {
                run_export_command(&store, &export_type, output)?;
            }
        }

        Ok(())
    }
}

fn run_transactions_command(store: &Store, category: Option<Category>, limit: Option<usize>) {
    let mut transactions: Vec<_> = store
        .transactions()
        .iter()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .collect();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        transactions.truncate(limit);
    }

    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<10} {:<8} {:<14} {:>10}  {:<30} {}",
        "Date", "Kind", "Category", "Amount", "Reason", "ID"
    );
    println!("{}", "-".repeat(110));
    for tx in transactions {
        println!(
            "{:<10} {:<8} {:<14} {:>10}  {:<30} {}",
            tx.date.format("%Y-%m-%d"),
            tx.kind,
            tx.category,
            format_cents(tx.signed_amount()),
            truncate(&tx.reason, 30),
            tx.id
        );
    }
}

async fn run_reward_command(store: &mut Store, cmd: RewardCommands) -> Result<()> {
    match cmd {
        RewardCommands::Add { title, goal } => {
            let goal_cents = parse_positive_amount(&goal)?;
            if title.trim().is_empty() {
                bail!("Reward title cannot be empty");
            }
            let reward = store.add_reward(title.trim(), goal_cents).await;
            println!(
                "Added reward '{}' with goal {} (priority {})",
                reward.title,
                format_cents(reward.goal_cents),
                reward.priority
            );
        }

        RewardCommands::List => {
            if store.rewards().is_empty() {
                println!("No rewards found.");
                return Ok(());
            }
            println!(
                "{:<4} {:<24} {:>10} {:>10} {:>7}",
                "#", "Title", "Progress", "Goal", "Done"
            );
            println!("{}", "-".repeat(59));
            for (index, reward) in store.rewards().iter().enumerate() {
                println!(
                    "{:<4} {:<24} {:>10} {:>10} {:>6.0}%",
                    index + 1,
                    truncate(&reward.title, 24),
                    format_cents(reward.progress_cents),
                    format_cents(reward.goal_cents),
                    reward.percent_complete()
                );
            }
        }

        RewardCommands::Delete { positions } => {
            let indexes = positions
                .iter()
                .map(|&p| to_index(store, p))
                .collect::<Result<Vec<_>, _>>()?;
            let ids = store.reward_ids_at(&indexes);
            let removed = store.delete_rewards(&ids).await;
            println!("Deleted {} reward(s)", removed);
        }

        RewardCommands::Deposit { position, amount } => {
            let id = reward_id_at(store, position)?;
            let amount_cents = parse_amount(&amount)?;
            let outcome = store.deposit_to_reward(id, amount_cents).await;
            if !outcome.success {
                bail!("{}", outcome.message);
            }
            println!("{}", outcome.message);
        }

        RewardCommands::Progress { position, delta } => {
            let id = reward_id_at(store, position)?;
            let delta_cents = parse_amount(&delta)?;
            store.update_reward_progress(id, delta_cents).await;
            if let Some(reward) = store.reward(id) {
                println!(
                    "'{}' progress: {} of {}",
                    reward.title,
                    format_cents(reward.progress_cents),
                    format_cents(reward.goal_cents)
                );
            }
        }
    }
    Ok(())
}

fn run_report_command(store: &Store) {
    let summary = store.summary();
    println!("Ledger Summary");
    println!("{}", "-".repeat(32));
    println!("  Allowance: {:>15}", format_cents(summary.allowance));
    println!("  Income:    {:>15}", format_cents(summary.total_income));
    println!("  Expenses:  {:>15}", format_cents(summary.total_expense));
    println!("  Balance:   {:>15}", format_cents(summary.balance));
    println!(
        "  Saved in {} reward(s): {}",
        summary.reward_count,
        format_cents(summary.reserved_in_rewards)
    );

    let spending = spending_by_category(store.transactions());
    if spending.is_empty() {
        return;
    }
    println!();
    println!("{:<16} {:>12} {:>6} {:>8}", "Category", "Total", "Count", "Share");
    println!("{}", "-".repeat(45));
    for row in spending {
        println!(
            "{:<16} {:>12} {:>6} {:>7.1}%",
            row.category,
            format_cents(row.total),
            row.count,
            row.percentage
        );
    }
}

fn run_export_command(store: &Store, export_type: &str, output: Option<String>) -> Result<()> {
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(stdout()),
    };

    let exporter = Exporter::new(store);
    match export_type {
        "transactions" => {
            let count = exporter.export_transactions_csv(writer)?;
            eprintln!("Exported {} transactions", count);
        }
        "rewards" => {
            let count = exporter.export_rewards_csv(writer)?;
            eprintln!("Exported {} rewards", count);
        }
        "full" => {
            exporter.export_json(writer)?;
            eprintln!("Exported full ledger");
        }
        other => bail!(
            "Unknown export type '{}'. Use transactions, rewards or full",
            other
        ),
    }
    Ok(())
}

/// Convert a 1-based list position into an index into the priority-sorted rewards.
fn to_index(store: &Store, position: usize) -> Result<usize, AppError> {
    if position == 0 || position > store.rewards().len() {
        return Err(AppError::RewardNotFound(format!("#{}", position)));
    }
    Ok(position - 1)
}

fn reward_id_at(store: &Store, position: usize) -> Result<RewardId, AppError> {
    let index = to_index(store, position)?;
    store
        .reward_ids_at(&[index])
        .first()
        .copied()
        .ok_or_else(|| AppError::RewardNotFound(format!("#{}", position)))
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

fn parse_positive_amount(input: &str) -> Result<Cents> {
    let cents = parse_amount(input)?;
    if cents <= 0 {
        return Err(AppError::InvalidAmount("Amount must be positive".to_string()).into());
    }
    Ok(cents)
}

fn parse_category(input: &str) -> Result<Category> {
    Category::from_str(input).with_context(|| {
        format!(
            "Unknown category '{}'. Use food, clothing, transport, entertainment, reward_deposit or misc",
            input
        )
    })
}

/// Parse a YYYY-MM-DD date as midnight UTC.
fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", input))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .context("Invalid time")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
