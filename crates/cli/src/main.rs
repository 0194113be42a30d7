use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use scenario_core::{
    simulation::{self, LossRow, ManagementSummary, MitigationComparison},
    CoreConfig, PortfolioStore, Provider, RawConfig, ScenarioGateway, ScenarioId, ScenarioRecord,
    ScenarioService,
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scenario")]
#[command(about = "Generative scenario explorer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List providers and whether each has a credential
    Providers,
    /// Generate and tag one scenario
    Generate {
        /// Seed prompt, e.g. "What if a major earthquake hits LA during a cyberattack?"
        prompt: String,
        /// Provider to write the narrative (openrouter or openai)
        #[arg(long, default_value = "openrouter")]
        provider: String,
    },
    /// Interactive session with an in-memory portfolio
    Explore {
        /// Provider to write narratives (openrouter or openai)
        #[arg(long, default_value = "openrouter")]
        provider: String,
    },
    /// Print a synthetic loss table by line of business
    Simulate {
        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the mitigation agent and print the strategy comparison
    Mitigate,
    /// Print the management summary
    Summary,
}

const PREVIEW_CHARS: usize = 60;

fn render_record(record: &ScenarioRecord) -> String {
    let tags = if record.tags().is_empty() {
        "None".to_string()
    } else {
        record.tags().join(", ")
    };
    format!(
        "[{}] {}\nPrompt: {}\nNarrative: {}\nTags: {}\n",
        record.id(),
        record.prompt().preview(PREVIEW_CHARS),
        record.prompt(),
        record.narrative(),
        tags
    )
}

/// Most recent first.
fn render_portfolio(store: &PortfolioStore) -> String {
    if store.is_empty() {
        return "Portfolio is empty.\n".to_string();
    }
    store
        .list_newest_first()
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_losses(rows: &[LossRow]) -> String {
    let mut out = format!("{:<20}{:>12}\n", "Line of Business", "Losses ($M)");
    for row in rows {
        out.push_str(&format!("{:<20}{:>12.1}\n", row.line_of_business, row.loss_musd));
    }
    out
}

fn render_mitigation(cmp: &MitigationComparison) -> String {
    let mut out = format!(
        "{:<12}{:>20}{:>28}{:>26}\n",
        "Strategy", "Expected Loss ($M)", "Tail Loss @ 1-in-100 ($M)", "Reinsurance Spend ($M)"
    );
    for row in [&cmp.baseline, &cmp.mitigated] {
        out.push_str(&format!(
            "{:<12}{:>20.0}{:>28.0}{:>26.0}\n",
            row.strategy,
            row.expected_loss_musd,
            row.tail_loss_1_in_100_musd,
            row.reinsurance_spend_musd
        ));
    }
    out.push_str(&format!(
        "\nExpected loss reduced by {:.1}%, tail loss reduced by {:.1}%, spend up ${:.0}M.\n",
        cmp.expected_loss_reduction_pct(),
        cmp.tail_loss_reduction_pct(),
        cmp.spend_increase_musd()
    ));
    out
}

fn render_summary(summary: &ManagementSummary) -> String {
    let mut out = format!("{}\n\nKey insights:\n", summary.summary);
    for insight in &summary.insights {
        out.push_str(&format!("- {insight}\n"));
    }
    out
}

async fn explore(service: &ScenarioService, provider: Provider) -> anyhow::Result<()> {
    let store = PortfolioStore::new();
    println!("Describe a scenario to generate it. Commands: :list, :remove <id>, :quit");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) => break,
            (":list", _) => print!("{}", render_portfolio(&store)),
            (":remove", id) => match ScenarioId::parse(id.trim()) {
                Ok(id) => match store.remove(id) {
                    Some(_) => println!("Removed {id}."),
                    None => println!("No scenario {id} in this session."),
                },
                Err(e) => println!("Error: {e}"),
            },
            _ => match service.create_scenario(&store, line, provider).await {
                Ok(record) => print!("Scenario saved to portfolio.\n{}", render_record(&record)),
                Err(e) => println!("Error generating scenario: {e}"),
            },
        }
    }

    println!("Session ended; {} scenario(s) discarded.", store.len());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scenario_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = CoreConfig::resolve(RawConfig::from_env())?;

    match cli.command {
        Some(Commands::Providers) => {
            for provider in Provider::ALL {
                let status = if cfg.credential(provider).is_some() {
                    "configured".to_string()
                } else {
                    format!("missing {}", provider.credential_env_var())
                };
                let tagging = if cfg.tagging_provider() == provider {
                    " (tagging)"
                } else {
                    ""
                };
                println!("{:<12}{:<24}{}{}", provider, provider.label(), status, tagging);
            }
        }
        Some(Commands::Generate { prompt, provider }) => {
            let provider: Provider = provider.parse()?;
            let service = ScenarioService::new(
                Arc::new(ScenarioGateway::from_config(&cfg)?),
                cfg.tag_failure(),
            );
            let store = PortfolioStore::new();
            match service.create_scenario(&store, &prompt, provider).await {
                Ok(record) => print!("{}", render_record(&record)),
                Err(e) => eprintln!("Error generating scenario: {}", e),
            }
        }
        Some(Commands::Explore { provider }) => {
            let provider: Provider = provider.parse()?;
            let service = ScenarioService::new(
                Arc::new(ScenarioGateway::from_config(&cfg)?),
                cfg.tag_failure(),
            );
            explore(&service, provider).await?;
        }
        Some(Commands::Simulate { seed }) => {
            let rows = match seed {
                Some(seed) => simulation::simulate_losses(&mut StdRng::seed_from_u64(seed)),
                None => simulation::simulate_losses(&mut rand::thread_rng()),
            };
            print!("{}", render_losses(&rows));
        }
        Some(Commands::Mitigate) => {
            println!("Training and optimizing...");
            tokio::time::sleep(cfg.mitigation_delay()).await;
            print!("{}", render_mitigation(&simulation::mitigation_comparison()));
        }
        Some(Commands::Summary) => {
            print!("{}", render_summary(&simulation::management_summary()));
        }
        None => {
            println!("Use 'scenario --help' for commands");
        }
    }

    Ok(())
}
