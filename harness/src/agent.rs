// File: harness/src/agent.rs
use anyhow::{anyhow, Result};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::admin::AdminClient;
use crate::config::Settings;
use crate::constants::{network, process, wallet};
use crate::errors::HarnessError;
use crate::output::{self, LogTimer, OutputCallback};
use crate::process::AgentProcess;
use crate::readiness::ReadinessProbe;
use crate::timing::{format_timing, TimingReport};
use crate::webhooks::{WebhookHandler, WebhookServer};

/// Optional knobs for a demo agent; anything left `None` gets a default
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub internal_host: Option<String>,
    pub external_host: Option<String>,
    pub genesis_data: Option<String>,
    pub label: Option<String>,
    pub prefix: Option<String>,
    pub timing: bool,
    /// Overrides the environment's postgres setting
    pub postgres: Option<bool>,
    /// Appended verbatim after the generated flags
    pub extra_args: Vec<String>,
    pub seed: Option<String>,
    pub storage_type: Option<String>,
    pub wallet_type: Option<String>,
    pub wallet_name: Option<String>,
    pub wallet_key: Option<String>,
}

/// One command-line flag of the agent with its values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentArg {
    pub flag: String,
    pub values: Vec<String>,
}

impl AgentArg {
    pub fn flag(flag: &str) -> Self {
        Self {
            flag: flag.to_string(),
            values: Vec::new(),
        }
    }

    pub fn with<I, S>(flag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flag: flag.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Flatten structured flags into an argv tail
pub fn flatten_args(args: &[AgentArg]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| std::iter::once(arg.flag.clone()).chain(arg.values.iter().cloned()))
        .collect()
}

#[derive(Debug, Serialize)]
struct PostgresStorageConfig<'a> {
    url: String,
    tls: &'a str,
    max_connections: u32,
    min_idle_time: u32,
    connection_timeout: u32,
}

#[derive(Debug, Serialize)]
struct PostgresStorageCreds<'a> {
    account: &'a str,
    password: &'a str,
    admin_account: &'a str,
    admin_password: &'a str,
}

/// A demo agent: the external agent process plus the harness plumbing around it
pub struct DemoAgent {
    pub ident: String,
    pub label: String,
    pub seed: String,
    pub wallet_type: String,
    pub wallet_name: String,
    pub wallet_key: String,
    pub storage_type: Option<String>,
    pub did: Option<String>,

    pub internal_host: String,
    pub external_host: String,
    pub http_port: u16,
    pub admin_port: u16,
    pub endpoint: String,
    pub admin_url: String,
    pub webhook_port: Option<u16>,
    pub webhook_url: Option<String>,

    pub genesis_data: Option<String>,
    pub prefix: Option<String>,
    pub timing: bool,
    pub postgres: bool,
    pub extra_args: Vec<String>,

    settings: Settings,
    client: Client,
    admin: AdminClient,
    probe: ReadinessProbe,
    relay: Option<OutputCallback>,
    process: Option<AgentProcess>,
    webhook_server: Option<WebhookServer>,
}

impl DemoAgent {
    pub fn new(
        ident: &str,
        http_port: u16,
        admin_port: u16,
        settings: &Settings,
        options: AgentOptions,
    ) -> Self {
        let internal_host = options
            .internal_host
            .unwrap_or_else(|| settings.internal_host.clone());
        let external_host = options
            .external_host
            .unwrap_or_else(|| settings.external_host.clone());

        let endpoint = format!("http://{}:{}", external_host, http_port);
        let admin_url = format!("http://{}:{}", external_host, admin_port);

        let rand_name = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        let seed = options
            .seed
            .unwrap_or_else(|| default_seed(&rand_name));
        let wallet_name = options
            .wallet_name
            .unwrap_or_else(|| format!("{}{}", ident.to_lowercase().replace(' ', ""), rand_name));
        let wallet_key = options
            .wallet_key
            .unwrap_or_else(|| format!("{}{}", ident, rand_name));

        let client = Client::new();
        let admin = AdminClient::new(client.clone(), admin_url.clone());

        Self {
            ident: ident.to_string(),
            label: options.label.unwrap_or_else(|| ident.to_string()),
            seed,
            wallet_type: options
                .wallet_type
                .unwrap_or_else(|| wallet::DEFAULT_TYPE.to_string()),
            wallet_name,
            wallet_key,
            storage_type: options.storage_type,
            did: None,
            internal_host,
            external_host,
            http_port,
            admin_port,
            endpoint,
            admin_url,
            webhook_port: None,
            webhook_url: None,
            genesis_data: options.genesis_data,
            prefix: options.prefix,
            timing: options.timing,
            postgres: options.postgres.unwrap_or(settings.postgres),
            extra_args: options.extra_args,
            settings: settings.clone(),
            client,
            admin,
            probe: ReadinessProbe::default(),
            relay: None,
            process: None,
            webhook_server: None,
        }
    }

    /// Replace the default 10 x 2s readiness budget
    pub fn with_readiness_probe(mut self, probe: ReadinessProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Receive the agent process output instead of logging it
    pub fn with_output_relay(mut self, relay: OutputCallback) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Clone of the admin client, for webhook handlers that call back into the agent
    pub fn admin_client(&self) -> AdminClient {
        self.admin.clone()
    }

    pub fn agent_args(&self) -> Result<Vec<AgentArg>> {
        let mut args = vec![
            AgentArg::with("--endpoint", [self.endpoint.as_str()]),
            AgentArg::with("--label", [self.label.as_str()]),
            AgentArg::flag("--auto-respond-messages"),
            AgentArg::flag("--accept-invites"),
            AgentArg::flag("--accept-requests"),
            AgentArg::flag("--auto-ping-connection"),
            AgentArg::with(
                "--inbound-transport",
                ["http".to_string(), network::BIND_ALL.to_string(), self.http_port.to_string()],
            ),
            AgentArg::with("--outbound-transport", ["http"]),
            AgentArg::with(
                "--admin",
                [network::BIND_ALL.to_string(), self.admin_port.to_string()],
            ),
            AgentArg::with("--wallet-type", [self.wallet_type.as_str()]),
            AgentArg::with("--wallet-name", [self.wallet_name.as_str()]),
            AgentArg::with("--wallet-key", [self.wallet_key.as_str()]),
            AgentArg::with("--seed", [self.seed.as_str()]),
        ];

        if let Some(genesis) = &self.genesis_data {
            args.push(AgentArg::with("--genesis-transactions", [genesis.as_str()]));
        }
        if let Some(storage_type) = &self.storage_type {
            args.push(AgentArg::with("--storage-type", [storage_type.as_str()]));
        }
        if self.timing {
            args.push(AgentArg::flag("--timing"));
        }
        if self.postgres {
            args.extend(self.postgres_args()?);
        }
        if let Some(webhook_url) = &self.webhook_url {
            args.push(AgentArg::with("--webhook-url", [webhook_url.as_str()]));
        }

        Ok(args)
    }

    fn postgres_args(&self) -> Result<Vec<AgentArg>> {
        let config = PostgresStorageConfig {
            url: format!("{}:{}", self.internal_host, network::POSTGRES_PORT),
            tls: "None",
            max_connections: 5,
            min_idle_time: 0,
            connection_timeout: 10,
        };
        let creds = PostgresStorageCreds {
            account: wallet::POSTGRES_ACCOUNT,
            password: wallet::POSTGRES_PASSWORD,
            admin_account: wallet::POSTGRES_ACCOUNT,
            admin_password: wallet::POSTGRES_PASSWORD,
        };

        Ok(vec![
            AgentArg::with("--wallet-storage-type", ["postgres_storage"]),
            AgentArg::with("--wallet-storage-config", [serde_json::to_string(&config)?]),
            AgentArg::with("--wallet-storage-creds", [serde_json::to_string(&creds)?]),
        ])
    }

    /// Full command line: interpreter, agent entry point, flags, extra args
    pub fn process_args(&self, bin_path: Option<&str>) -> Result<Vec<String>> {
        let bin_path = bin_path.unwrap_or(&self.settings.bin_path);
        let command = if bin_path.is_empty() {
            process::AGENT_COMMAND.to_string()
        } else {
            format!(
                "{}/{}",
                bin_path.trim_end_matches('/'),
                process::AGENT_COMMAND
            )
        };

        let mut argv = vec![process::INTERPRETER.to_string(), command];
        argv.extend(flatten_args(&self.agent_args()?));
        argv.extend(self.extra_args.iter().cloned());
        Ok(argv)
    }

    /// Spawn the agent process and, if `wait`, block until it is ready
    pub async fn start_process(
        &mut self,
        python_path: Option<&str>,
        bin_path: Option<&str>,
        wait: bool,
    ) -> Result<()> {
        let python_path = python_path.unwrap_or(&self.settings.python_path).to_string();
        let mut envs = Vec::new();
        if !python_path.is_empty() {
            envs.push(("PYTHONPATH".to_string(), python_path));
        }

        let argv = self.process_args(bin_path)?;
        self.start_command(&argv, &envs)?;

        if wait {
            self.detect_process().await?;
        }
        Ok(())
    }

    /// Spawn an arbitrary command line as this agent's process
    pub fn start_command(&mut self, argv: &[String], envs: &[(String, String)]) -> Result<()> {
        if self.process.is_some() {
            return Err(anyhow!("Agent process for {} already started", self.ident));
        }

        let relay = self
            .relay
            .clone()
            .unwrap_or_else(|| output::tracing_relay(self.prefix.clone()));
        let process = AgentProcess::spawn(argv, envs, self.prefix.clone(), relay)?;
        debug!("Agent {} started with pid {:?}", self.ident, process.id());
        self.process = Some(process);
        Ok(())
    }

    /// Wait for the admin API to come up
    pub async fn detect_process(&self) -> Result<()> {
        self.probe.wait_ready(&self.client, &self.admin_url).await
    }

    pub fn is_running(&mut self) -> bool {
        self.process.as_mut().is_some_and(AgentProcess::is_running)
    }

    /// Stop the agent process and the webhook listener
    pub async fn terminate(&mut self) -> Result<()> {
        let process_result = match self.process.as_mut() {
            Some(proc) => proc
                .terminate(process::TERMINATE_TIMEOUT)
                .await
                .map(|_| ()),
            None => Ok(()),
        };
        self.process = None;

        let stop_result = match self.webhook_server.take() {
            Some(mut server) => server.stop().await,
            None => Ok(()),
        };

        if let Err(e) = &stop_result {
            warn!("Webhook listener for {} did not stop cleanly: {}", self.ident, e);
        }
        process_result?;
        stop_result
    }

    /// Serve webhooks on `webhook_port` and advertise them to the agent.
    ///
    /// Must run before [`start_process`](Self::start_process) for the agent
    /// to learn the webhook URL.
    pub async fn listen_webhooks(
        &mut self,
        webhook_port: u16,
        handler: Arc<dyn WebhookHandler>,
    ) -> Result<()> {
        let server = WebhookServer::start(network::BIND_ALL, webhook_port, handler).await?;
        let port = if webhook_port == 0 {
            server.local_addr().port()
        } else {
            webhook_port
        };

        self.webhook_port = Some(port);
        self.webhook_url = Some(format!("http://{}:{}/webhooks", self.external_host, port));
        self.webhook_server = Some(server);
        Ok(())
    }

    /// Register this agent's seed with the ledger and remember its DID
    pub async fn register_did(&mut self, ledger_url: Option<&str>, alias: Option<&str>) -> Result<String> {
        self.log(&format!("Registering {} with seed {}", self.ident, self.seed));

        let ledger_url = ledger_url
            .map(str::to_string)
            .unwrap_or_else(|| format!("http://{}:{}", self.external_host, network::LEDGER_PORT));
        let data = json!({
            "alias": alias.unwrap_or(&self.ident),
            "seed": self.seed,
            "role": "TRUST_ANCHOR",
        });

        let response = self
            .client
            .post(format!("{}/register", ledger_url))
            .json(&data)
            .send()
            .await
            .map_err(|e| anyhow!("Ledger registration request failed: {}", e))?;

        if response.status() != StatusCode::OK {
            return Err(HarnessError::Registration {
                status: response.status().as_u16(),
            }
            .into());
        }

        let nym_info: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse registration response: {}", e))?;
        let did = nym_info
            .get("did")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Registration response has no DID: {}", nym_info))?
            .to_string();

        self.log(&format!("Got DID: {}", did));
        self.did = Some(did.clone());
        Ok(did)
    }

    pub async fn admin_get(&self, path: &str) -> Result<Option<Value>> {
        self.admin.get(path).await
    }

    pub async fn admin_post(&self, path: &str, data: Option<&Value>) -> Result<Option<Value>> {
        self.admin.post(path, data).await
    }

    pub async fn admin_get_text(&self, path: &str) -> Result<String> {
        self.admin.get_text(path).await
    }

    pub async fn admin_post_text(&self, path: &str, data: Option<&Value>) -> Result<String> {
        self.admin.post_text(path, data).await
    }

    /// Timing counters from `/status`, if the agent collects them
    pub async fn fetch_timing(&self) -> Result<Option<TimingReport>> {
        let status = self.admin_get("/status").await?;
        match status.and_then(|s| s.get("timing").cloned()) {
            Some(Value::Null) | None => Ok(None),
            Some(timing) => serde_json::from_value(timing)
                .map(Some)
                .map_err(|e| anyhow!("Invalid timing report: {}", e)),
        }
    }

    pub fn format_timing(&self, report: &TimingReport) -> Vec<String> {
        format_timing(report)
    }

    pub async fn reset_timing(&self) -> Result<()> {
        self.admin_post_text("/status/reset", None).await?;
        Ok(())
    }

    pub fn log(&self, msg: &str) {
        output::log_msg(self.prefix.as_deref(), msg);
    }

    pub fn log_json(&self, data: &Value, label: Option<&str>) {
        output::log_json(self.prefix.as_deref(), label, data);
    }

    pub fn log_timer(&self, label: &str) -> LogTimer {
        LogTimer::new(label, self.prefix.as_deref(), true)
    }
}

fn default_seed(rand_name: &str) -> String {
    let padded = format!("{}{}", wallet::SEED_PREFIX, rand_name);
    let skip = padded.chars().count().saturating_sub(wallet::SEED_LEN);
    padded.chars().skip(skip).collect()
}
