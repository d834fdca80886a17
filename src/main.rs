use anyhow::{Error, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use template_sync::{
    config::Config,
    models::change::ChangeSource,
    sync::{PushMethod, TemplateSync},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "template-sync", version, about = "Sync email templates with Iterable")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch templates from Iterable into the local folders
    Pull,
    /// Send local templates to Iterable
    Push {
        /// Which templates to send
        #[arg(long, value_enum, default_value_t = Changes::All)]
        changes: Changes,

        #[arg(long, value_enum, default_value_t = Method::Upsert)]
        method: Method,

        /// Pull request whose changed files select the templates
        #[arg(long)]
        pr_number: Option<u64>,

        /// Commit whose changed files select the templates
        #[arg(long)]
        commit_sha: Option<String>,
    },
    /// Set every remote template's client template id to its name
    AssignClientIds,
}

#[derive(Clone, Copy, ValueEnum)]
enum Changes {
    All,
    PullRequest,
    Commit,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Upsert,
    Update,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "template_sync=info",
        1 => "template_sync=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn change_source(
    changes: Changes,
    config: &Config,
    pr_number: Option<u64>,
    commit_sha: Option<String>,
) -> Result<ChangeSource, Error> {
    let source = match changes {
        Changes::All => return Ok(ChangeSource::All),
        Changes::PullRequest => ChangeSource::PullRequest(
            pr_number
                .or(config.pr_number)
                .ok_or_else(|| anyhow!("Missing environment variable: PR_NUMBER"))?,
        ),
        Changes::Commit => ChangeSource::Commit(
            commit_sha
                .or_else(|| config.commit_sha.clone())
                .ok_or_else(|| anyhow!("Missing environment variable: COMMIT_SHA"))?,
        ),
    };

    config.github_config()?;
    Ok(source)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Command::Pull => {
            TemplateSync::new(config)?.pull().await;
        }
        Command::Push {
            changes,
            method,
            pr_number,
            commit_sha,
        } => {
            let source = change_source(changes, &config, pr_number, commit_sha)?;
            let method = match method {
                Method::Upsert => PushMethod::Upsert,
                Method::Update => PushMethod::Update,
            };

            let sync = TemplateSync::new(config)?;
            let change_set = sync.resolve_changes(&source).await?;
            info!(count = change_set.len(), "Templates to update");

            sync.push(&change_set, method).await;
        }
        Command::AssignClientIds => {
            TemplateSync::new(config)?.assign_client_ids().await;
        }
    }

    Ok(())
}
