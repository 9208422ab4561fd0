// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use config::Config;
use estatery_app::{
    Agent, AgentFormInput, Client, Discount, DiscountFormInput, EntityKind, Installment, Lead,
    Payment, Transaction, parse_date,
};
use estatery_db::Store;
use runtime::ViewOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ESTATERY_LOG";

/// Runs `$call::<Entity>($args)` for the entity named by `$kind`.
macro_rules! with_entity {
    ($kind:expr, $($call:ident)::+, $($arg:expr),* $(,)?) => {
        match $kind {
            EntityKind::Client => $($call)::+::<Client>($($arg),*),
            EntityKind::Payment => $($call)::+::<Payment>($($arg),*),
            EntityKind::Transaction => $($call)::+::<Transaction>($($arg),*),
            EntityKind::Lead => $($call)::+::<Lead>($($arg),*),
            EntityKind::Discount => $($call)::+::<Discount>($($arg),*),
            EntityKind::Agent => $($call)::+::<Agent>($($arg),*),
            EntityKind::Installment => $($call)::+::<Installment>($($arg),*),
        }
    };
}

/// Tables behind the estatery console: list, export, import and status changes.
#[derive(Debug, Parser)]
#[command(name = "estatery", version, about, long_about = None)]
struct Cli {
    /// Config file (default: $ESTATERY_CONFIG_PATH or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding [storage].db_path and $ESTATERY_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use an in-memory database seeded with demo data
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of a table
    List {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Write every matching row to <entity>-<date>.csv in the export directory
    Export {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Prepend the rows of a CSV file; malformed lines are skipped
    Import {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        file: PathBuf,
    },
    /// Change one row's status (a label, or toggle/advance/approve/deactivate/reactivate)
    SetStatus {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        id: String,
        status: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Select all rows in view and move them to one status
    BulkStatus {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        #[arg(id = "target_status", value_name = "STATUS")]
        status: String,
        #[command(flatten)]
        view: ViewArgs,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Add an agent or a discount
    Add {
        #[command(subcommand)]
        row: AddCommand,
    },
    /// Show one client and a page of their installment plan
    Client {
        /// Row id (C-1001) or client number (32484)
        client: String,
        #[command(flatten)]
        view: ViewArgs,
        /// Write the whole plan to client-<number>-report.csv in the export directory
        #[arg(long)]
        report: bool,
    },
    /// Per-status row counts
    Stats {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
    },
    /// Print the resolved config path
    PrintConfigPath,
    /// Print a config template
    PrintExampleConfig,
    /// Validate config and database, then print row counts
    Check,
}

#[derive(Debug, Subcommand)]
enum AddCommand {
    /// New agents start Pending with a 4.0 rating
    Agent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value_t = 0)]
        properties: i64,
        #[arg(long, default_value_t = 0)]
        deals_closed: i64,
    },
    /// New discounts start Scheduled; the code is upper-cased
    Discount {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long, default_value_t = 10)]
        percentage: i64,
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        start: time::Date,
        /// YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        end: time::Date,
    },
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Case-insensitive substring over the searchable fields
    #[arg(long)]
    search: Option<String>,
    /// Status label, or `all`
    #[arg(long)]
    status: Option<String>,
    /// Category label (payment or transaction type, client deal type, lead source), or `all`
    #[arg(long = "type")]
    category: Option<String>,
    /// Sort field; unknown names fall back to the table default
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    desc: bool,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
}

impl From<ViewArgs> for ViewOptions {
    fn from(args: ViewArgs) -> Self {
        Self {
            search: args.search,
            status: args.status,
            category: args.category,
            sort: args.sort,
            descending: args.desc,
            page: args.page,
        }
    }
}

fn parse_entity(raw: &str) -> Result<EntityKind, String> {
    EntityKind::parse(raw)
        .or_else(|| {
            EntityKind::ALL
                .iter()
                .copied()
                .find(|kind| kind.singular().eq_ignore_ascii_case(raw.trim()))
        })
        .ok_or_else(|| {
            let known: Vec<_> = EntityKind::ALL.iter().map(|kind| kind.as_str()).collect();
            format!("unknown table {raw:?}; expected one of: {}", known.join(", "))
        })
}

fn parse_day(raw: &str) -> Result<time::Date, String> {
    parse_date(raw).ok_or_else(|| format!("{raw:?} is not a YYYY-MM-DD date"))
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    match cli.command {
        Command::PrintConfigPath => {
            println!("{}", config_path.display());
            return Ok(());
        }
        Command::PrintExampleConfig => {
            print!("{}", Config::example_config(&config_path));
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load(&config_path).with_context(|| {
        format!(
            "load config {}; run `estatery print-example-config` to generate a template",
            config_path.display()
        )
    })?;
    init_logging(config.log_level());

    let db_path = if cli.demo {
        PathBuf::from(":memory:")
    } else {
        match cli.db {
            Some(path) => path,
            None => config.db_path()?,
        }
    };
    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, pass --db or set [storage].db_path or ESTATERY_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if cli.demo {
        store.seed_demo_data()?;
    }
    tracing::debug!(db = %db_path.display(), "database ready");

    match cli.command {
        Command::List { entity, view } => {
            let view = ViewOptions::from(view);
            println!("{}", with_entity!(entity, runtime::list, &store, &config, &view)?);
        }
        Command::Export { entity, view } => {
            let view = ViewOptions::from(view);
            let today = OffsetDateTime::now_utc().date();
            let path = with_entity!(entity, runtime::export, &store, &config, &view, today)?;
            println!("{}", path.display());
        }
        Command::Import { entity, file } => {
            println!("{}", with_entity!(entity, runtime::import, &store, &file)?);
        }
        Command::SetStatus {
            entity,
            id,
            status,
            yes,
        } => {
            let mut confirm = confirmer(yes);
            let output =
                with_entity!(entity, runtime::set_status, &store, &id, &status, &mut confirm)?;
            println!("{output}");
        }
        Command::BulkStatus {
            entity,
            status,
            view,
            yes,
        } => {
            let view = ViewOptions::from(view);
            let mut confirm = confirmer(yes);
            let output = with_entity!(
                entity,
                runtime::bulk_status,
                &store,
                &config,
                &view,
                &status,
                &mut confirm,
            )?;
            println!("{output}");
        }
        Command::Add { row } => {
            let output = match row {
                AddCommand::Agent {
                    name,
                    email,
                    phone,
                    properties,
                    deals_closed,
                } => runtime::add_agent(
                    &store,
                    AgentFormInput {
                        name,
                        email,
                        phone,
                        properties,
                        deals_closed,
                    },
                )?,
                AddCommand::Discount {
                    name,
                    code,
                    percentage,
                    start,
                    end,
                } => runtime::add_discount(
                    &store,
                    DiscountFormInput {
                        name,
                        code,
                        percentage,
                        start_date: Some(start),
                        end_date: Some(end),
                    },
                )?,
            };
            println!("{output}");
        }
        Command::Client {
            client,
            view,
            report,
        } => {
            if report {
                let path = runtime::client_report(&store, &config, &client)?;
                println!("{}", path.display());
            } else {
                let view = ViewOptions::from(view);
                println!("{}", runtime::client_detail(&store, &client, &view)?);
            }
        }
        Command::Stats { entity } => {
            println!("{}", with_entity!(entity, runtime::stats, &store)?);
        }
        Command::Check => {
            for (kind, count) in store.entity_counts()? {
                println!("{}: {count}", kind.as_str());
            }
        }
        Command::PrintConfigPath | Command::PrintExampleConfig => {}
    }
    Ok(())
}

fn init_logging(config_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn confirmer(assume_yes: bool) -> impl FnMut(&str) -> Result<bool> {
    move |question: &str| {
        if assume_yes {
            return Ok(true);
        }
        prompt_on_stdin(question)
    }
}

fn prompt_on_stdin(question: &str) -> Result<bool> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{question} [y/N] ").context("write confirmation prompt")?;
    stderr.flush().context("flush confirmation prompt")?;

    let mut answer = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("read confirmation from stdin")?;
    if read == 0 {
        return Err(anyhow!("stdin closed before the prompt was answered; pass --yes to skip it"));
    }
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::{AddCommand, Cli, Command, parse_entity};
    use anyhow::Result;
    use clap::Parser;
    use estatery_app::EntityKind;
    use std::path::PathBuf;

    #[test]
    fn entity_names_accept_plural_and_singular() {
        assert_eq!(parse_entity("clients"), Ok(EntityKind::Client));
        assert_eq!(parse_entity("Agent"), Ok(EntityKind::Agent));
        let error = parse_entity("houses").expect_err("unknown table should fail");
        assert!(error.contains("transactions"));
    }

    #[test]
    fn global_flags_parse_after_subcommand() -> Result<()> {
        let cli = Cli::try_parse_from([
            "estatery",
            "list",
            "clients",
            "--status",
            "on going",
            "--page",
            "-2",
            "--demo",
            "--config",
            "/tmp/estatery.toml",
        ])?;
        assert!(cli.demo);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/estatery.toml")));
        match cli.command {
            Command::List { entity, view } => {
                assert_eq!(entity, EntityKind::Client);
                assert_eq!(view.status.as_deref(), Some("on going"));
                assert_eq!(view.page, -2);
            }
            other => panic!("unexpected command {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn set_status_requires_id_and_status() {
        assert!(Cli::try_parse_from(["estatery", "set-status", "agents", "A-1022"]).is_err());
        assert!(
            Cli::try_parse_from(["estatery", "set-status", "agents", "A-1022", "approve", "--yes"])
                .is_ok()
        );
    }

    #[test]
    fn add_discount_parses_dates_and_rejects_bad_ones() -> Result<()> {
        let cli = Cli::try_parse_from([
            "estatery",
            "add",
            "discount",
            "--name",
            "Fall Deal",
            "--code",
            "fall20",
            "--start",
            "2025-09-01",
            "--end",
            "2025-09-30",
        ])?;
        match cli.command {
            Command::Add {
                row: AddCommand::Discount {
                    percentage, start, ..
                },
            } => {
                assert_eq!(percentage, 10);
                assert_eq!(start.to_string(), "2025-09-01");
            }
            other => panic!("unexpected command {other:?}"),
        }

        let result = Cli::try_parse_from([
            "estatery", "add", "discount", "--name", "X", "--code", "X", "--start", "soon",
            "--end", "2025-09-30",
        ]);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn type_flag_and_client_report_parse() -> Result<()> {
        let cli = Cli::try_parse_from(["estatery", "list", "payments", "--type", "sale"])?;
        match cli.command {
            Command::List { view, .. } => assert_eq!(view.category.as_deref(), Some("sale")),
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["estatery", "client", "32484", "--report"])?;
        match cli.command {
            Command::Client { client, report, .. } => {
                assert_eq!(client, "32484");
                assert!(report);
            }
            other => panic!("unexpected command {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn bulk_status_defaults_to_first_page() -> Result<()> {
        let cli = Cli::try_parse_from(["estatery", "bulk-status", "leads", "Closed"])?;
        match cli.command {
            Command::BulkStatus { view, yes, .. } => {
                assert_eq!(view.page, 1);
                assert!(!yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
        Ok(())
    }
}
