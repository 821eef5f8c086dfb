// File: faber/src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use faber::config::{DemoPorts, FaberConfig};
use faber::handler::{FaberHandler, PREFIX};
use faber::prompt::{MenuOption, Prompt, MENU};
use faber::scenario;
use harness::genesis::default_genesis_txns;
use harness::output::{log_json, log_msg, LogTimer};
use harness::{AgentOptions, DemoAgent, Settings};

/// Issuer side of the credential demo
#[derive(Debug, Parser)]
#[command(name = "faber", version)]
struct Cli {
    /// First of three consecutive ports: inbound transport, admin, webhooks
    port: Option<u16>,

    /// Ask the agent to collect timing data and print it on exit
    #[arg(long)]
    timing: bool,

    /// TOML file with start_port, bin_path, python_path, timing
    #[arg(long)]
    config: Option<PathBuf>,
}

fn log_status(msg: &str) {
    log_msg(None, msg);
}

fn required_str<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    value
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Response missing '{}': {}", name, value))
}

async fn run(
    agent: &mut DemoAgent,
    handler: Arc<FaberHandler>,
    ports: DemoPorts,
    config: &FaberConfig,
) -> Result<()> {
    agent.listen_webhooks(ports.webhook, handler.clone()).await?;
    agent.register_did(None, None).await?;

    {
        let _timer = LogTimer::new("Startup duration:", None, true);
        agent
            .start_process(
                config.python_path.as_deref(),
                config.bin_path.as_deref(),
                true,
            )
            .await?;
    }
    log_msg(None, &format!("Admin url is at: {}", agent.admin_url));
    log_msg(None, &format!("Endpoint url is at: {}", agent.endpoint));

    log_status("#3 Create a new schema on the ledger");
    let schema_response = {
        let _timer = LogTimer::new("Publish schema duration:", None, true);
        let body = scenario::schema_body(&scenario::random_schema_version());
        agent
            .admin_post("/schemas", Some(&body))
            .await?
            .ok_or_else(|| anyhow!("Empty schema response"))?
    };
    let schema_id = required_str(&schema_response, "schema_id")?.to_string();
    log_msg(None, &format!("Schema ID: {}", schema_id));

    log_status("#4 Create a new credential definition on the ledger");
    let cred_def_response = {
        let _timer = LogTimer::new("Publish credential definition duration:", None, true);
        let body = scenario::credential_definition_body(&schema_id);
        agent
            .admin_post("/credential-definitions", Some(&body))
            .await?
            .ok_or_else(|| anyhow!("Empty credential definition response"))?
    };
    let cred_def_id = required_str(&cred_def_response, "credential_definition_id")?.to_string();
    log_msg(None, &format!("Cred def ID: {}", cred_def_id));

    let connection = {
        let _timer = LogTimer::new("Generate invitation duration:", None, true);
        log_status("#5 Create a connection to alice and print out the invite details");
        agent
            .admin_post("/connections/create-invitation", None)
            .await?
            .ok_or_else(|| anyhow!("Empty invitation response"))?
    };
    let connection_id = required_str(&connection, "connection_id")?.to_string();
    handler.set_connection_id(&connection_id).await;

    log_json(None, Some("Invitation response:"), &connection);
    log_msg(None, "*****************");
    log_msg(
        None,
        &format!(
            "Invitation: {}",
            connection.get("invitation").cloned().unwrap_or(Value::Null)
        ),
    );
    log_msg(None, "*****************");

    log_msg(None, "Waiting for connection...");
    handler.detect_connection().await?;

    let mut prompt = Prompt::stdio();
    while let Some(answer) = prompt.ask(MENU).await? {
        match MenuOption::parse(&answer) {
            Some(MenuOption::Exit) => break,
            Some(MenuOption::IssueCredential) => {
                log_status("#13 Issue credential offer to X");
                let offer = scenario::credential_offer(&cred_def_id, &connection_id);
                agent
                    .admin_post("/credential_exchange/send-offer", Some(&offer))
                    .await?;
            }
            Some(MenuOption::SendProofRequest) => {
                log_status("#20 Request proof of degree from alice");
                let request = scenario::proof_request(&connection_id, agent.did.as_deref());
                agent
                    .admin_post("/presentation_exchange/send_request", Some(&request))
                    .await?;
            }
            Some(MenuOption::SendMessage) => {
                let Some(msg) = prompt.ask("Enter message: ").await? else {
                    break;
                };
                agent
                    .admin_post(
                        &format!("/connections/{}/send-message", connection_id),
                        Some(&scenario::basic_message(&msg)),
                    )
                    .await?;
            }
            None => {}
        }
    }

    if agent.timing {
        if let Some(report) = agent.fetch_timing().await? {
            for line in agent.format_timing(&report) {
                log_msg(None, &line);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    harness::init_logging("faber")?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FaberConfig::load(path).await?,
        None => FaberConfig::default(),
    };
    let start_port = cli
        .port
        .or(config.start_port)
        .ok_or_else(|| anyhow!("No start port given on the command line or in the config"))?;
    let ports = DemoPorts::from_start(start_port)?;
    let timing = cli.timing || config.timing.unwrap_or(false);

    let settings = Settings::from_env();
    let Some(genesis) = default_genesis_txns(&settings, &reqwest::Client::new()).await else {
        error!("Error retrieving ledger genesis transactions");
        std::process::exit(1);
    };

    log_status("#1 Provision an agent and wallet, get back configuration details");
    let mut agent = DemoAgent::new(
        "Faber Agent",
        ports.http,
        ports.admin,
        &settings,
        AgentOptions {
            prefix: Some(PREFIX.to_string()),
            genesis_data: Some(genesis),
            timing,
            ..Default::default()
        },
    );
    let handler = Arc::new(FaberHandler::new(agent.admin_client()));

    let outcome = run(&mut agent, handler, ports, &config).await;
    if let Err(e) = &outcome {
        error!("Demo aborted: {:#}", e);
    }

    if let Err(e) = agent.terminate().await {
        error!("Error terminating agent: {:#}", e);
        std::process::exit(1);
    }

    outcome
}
