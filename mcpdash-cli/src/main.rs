//! mcpdash: terminal front end for the MCP server and SQL agent dashboard API
//!
//! Drives the same loaders as the web dashboard and prints the resulting view
//! as text, or as JSON with `--json`.
//!
//! # Subcommands
//! - `servers`                                   registered MCP servers
//! - `server <key>`                              server info, latest execution, logs
//! - `logs [--server <key>] [--page N] [--list]` MCP server logs
//! - `sql-logs [--page N] [--from D --to D]`     SQL agent logs
//! - `latest --server <key> --instruction <t>`   results of an execution
//! - `execute <key> --instruction <t>`           run a server
//! - `update <key> [--name ..]`                  change a server's configuration

mod text;

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mcpdash_core::models::{DateRangeRequest, ExecuteServerRequest, ServerDetail, UpdateServerRequest};
use mcpdash_core::orchestrator::{
    execute_action, execution_results, load_server_page, mcp_logs_section, server_logs_section,
    servers_section, sql_agent_logs_section, sql_agent_range_section, update_server_action,
    DashboardQuery, ServerPageQuery,
};
use mcpdash_core::view::AlertLevel;
use mcpdash_core::{DashConfig, DashboardApi, ExecutionSession, HttpDashboardClient, ViewNode};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "mcpdash",
    version,
    about = "MCP server and SQL agent dashboard in the terminal"
)]
struct Cli {
    /// Config file; missing is fine
    #[arg(short, long, default_value = "mcpdash.toml")]
    config: String,

    /// Dashboard API base URL (overrides the config file)
    #[arg(long, env = "MCPDASH_API_URL")]
    api_url: Option<String>,

    /// Print the view as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Server fields that replace the current configuration when given.
#[derive(Debug, Args, Default)]
struct ServerFields {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    prompt: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered MCP servers
    Servers,

    /// Show one server: info, latest execution and logs
    Server {
        key: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        per_page: Option<u32>,
    },

    /// MCP server logs, one request group per page unless --list
    Logs {
        /// Only this server's logs (always a flat list)
        #[arg(long)]
        server: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        per_page: Option<u32>,

        /// Flat paginated list instead of request groups
        #[arg(long)]
        list: bool,
    },

    /// SQL agent logs, one request group per page or a date range
    SqlLogs {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// First day (YYYY-MM-DD), inclusive
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), inclusive
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    /// Results of an execution, by instruction or request id
    Latest {
        #[arg(long)]
        server: String,

        #[arg(long)]
        instruction: String,

        #[arg(long)]
        request_id: Option<String>,
    },

    /// Execute a server with an instruction
    Execute {
        key: String,

        #[arg(short, long)]
        instruction: String,

        #[command(flatten)]
        fields: ServerFields,
    },

    /// Update a server's name, description or prompt
    Update {
        key: String,

        #[command(flatten)]
        fields: ServerFields,
    },
}

// ============================================================================
// Output
// ============================================================================

/// Titled sections of one command's output.
type Sections = Vec<(&'static str, Vec<ViewNode>)>;

/// Text of the first error alert, if any section failed to load.
fn first_failure(sections: &Sections) -> Option<&str> {
    sections.iter().flat_map(|(_, nodes)| nodes).find_map(|node| match node {
        ViewNode::Alert {
            level: AlertLevel::Danger,
            text,
        } => Some(text.as_str()),
        _ => None,
    })
}

fn print_sections(sections: &Sections, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let map: serde_json::Map<String, serde_json::Value> = sections
            .iter()
            .map(|(title, nodes)| Ok((title.to_string(), serde_json::to_value(nodes)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        let blocks: Vec<String> = sections
            .iter()
            .map(|(title, nodes)| text::render_section(title, nodes))
            .collect();
        print!("{}", blocks.join("\n"));
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

/// Fields not given on the command line keep the server's current values.
fn merge_fields(fields: ServerFields, current: &ServerDetail) -> (String, String, String) {
    (
        fields
            .name
            .or_else(|| current.display_name.clone())
            .unwrap_or_default(),
        fields
            .description
            .or_else(|| current.description.clone())
            .unwrap_or_default(),
        fields
            .prompt
            .or_else(|| current.prompt_template.clone())
            .unwrap_or_default(),
    )
}

async fn current_detail(api: &dyn DashboardApi, key: &str) -> anyhow::Result<ServerDetail> {
    let detail = api.server_detail(key).await?;
    if !detail.is_known() {
        anyhow::bail!("unknown MCP server: {}", key);
    }
    Ok(detail)
}

async fn run(cli: Cli, config: DashConfig, api: &dyn DashboardApi) -> anyhow::Result<()> {
    let view = &config.view;
    let per_page = |requested: Option<u32>| requested.unwrap_or(view.per_page).max(1);

    let sections: Sections = match cli.command {
        Commands::Servers => vec![("MCP Servers", servers_section(api, view.preview_chars).await)],

        Commands::Server { key, page, per_page: pp } => {
            let query = ServerPageQuery {
                page: page.max(1),
                per_page: per_page(pp),
            };
            let page = load_server_page(api, &key, &query, None, view).await;
            vec![
                ("Server", page.info),
                ("Execution Result", page.results.mcp),
                ("SQL Agent Steps", page.results.sql_agent),
                ("Server Logs", page.logs),
            ]
        }

        Commands::Logs {
            server,
            page,
            per_page: pp,
            list,
        } => {
            let nodes = match server {
                Some(key) => {
                    let query = ServerPageQuery {
                        page: page.max(1),
                        per_page: per_page(pp),
                    };
                    server_logs_section(api, &key, &query, view.page_radius).await
                }
                None => {
                    let query = DashboardQuery {
                        mcp_page: page.max(1),
                        per_page: per_page(pp),
                        group_mode: !list,
                        ..Default::default()
                    };
                    mcp_logs_section(api, &query, view.page_radius).await
                }
            };
            vec![("MCP Server Logs", nodes)]
        }

        Commands::SqlLogs { page, from, to } => {
            let nodes = match (from, to) {
                (Some(start_date), Some(end_date)) => {
                    let range = DateRangeRequest {
                        start_date,
                        end_date,
                    };
                    sql_agent_range_section(api, &range).await
                }
                _ => sql_agent_logs_section(api, page.max(1), view.page_radius).await,
            };
            vec![("SQL Agent Logs", nodes)]
        }

        Commands::Latest {
            server,
            instruction,
            request_id,
        } => {
            let session = ExecutionSession {
                correlation_id: request_id.filter(|id| !id.is_empty()),
                ..ExecutionSession::new(server, instruction)
            };
            let results = execution_results(api, &session).await;
            vec![
                ("Execution Result", results.mcp),
                ("SQL Agent Steps", results.sql_agent),
            ]
        }

        Commands::Execute {
            key,
            instruction,
            fields,
        } => {
            let detail = current_detail(api, &key).await?;
            let (display_name, description, prompt_template) = merge_fields(fields, &detail);
            let req = ExecuteServerRequest {
                server_key: key,
                display_name,
                description,
                instruction,
                prompt_template,
            };
            let output = execute_action(api, &req).await;
            let mut sections = vec![("Execute", vec![output.banner])];
            if let Some(answer) = output.answer {
                sections.push(("Answer", vec![ViewNode::Card(mcpdash_core::view::Card {
                    title: req.server_key.clone(),
                    subtitle: None,
                    badge: None,
                    body: vec![mcpdash_core::view::Inline::Markdown(answer)],
                    footer: None,
                    link: None,
                })]));
            }
            if let Some(session) = output.session {
                let results = execution_results(api, &session).await;
                sections.push(("Execution Result", results.mcp));
                sections.push(("SQL Agent Steps", results.sql_agent));
            }
            sections
        }

        Commands::Update { key, fields } => {
            let detail = current_detail(api, &key).await?;
            let (display_name, description, prompt_template) = merge_fields(fields, &detail);
            let req = UpdateServerRequest {
                server_key: key,
                display_name,
                description,
                prompt_template,
            };
            vec![("Update", vec![update_server_action(api, &req).await])]
        }
    };

    print_sections(&sections, cli.json)?;

    // The view is still printed in full; the exit code reports the failure
    if let Some(failure) = first_failure(&sections) {
        anyhow::bail!("{}", failure);
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

/// Log filter from `[service] log_level`, used when `RUST_LOG` is unset.
fn configured_filter(config: &DashConfig) -> EnvFilter {
    EnvFilter::new(&config.service.log_level)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match DashConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("mcpdash: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    // Diagnostics go to stderr so --json output stays clean
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(&config)),
        )
        .init();

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }

    tracing::debug!(api = %config.api.base_url, "Using dashboard API");
    let client = match HttpDashboardClient::with_base_url(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_seconds),
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("mcpdash: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config, &client).await {
        eprintln!("mcpdash: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
