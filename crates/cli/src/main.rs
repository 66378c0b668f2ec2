//! CLI entrypoint and subcommand orchestration.

mod callback;
mod config;
mod tenant;
#[cfg(test)]
mod test_support;

use clap::{Parser, Subcommand};
use connectors::DisconnectOutcome;
use proto::{ConnectorStatus, ConnectorSummary, CreatedResource, SearchItem};
use serde_json::Value;

#[cfg(not(test))]
use anyhow::Context;
#[cfg(not(test))]
use client::{ApiClient, ConnectorApi, DEFAULT_BASE_URL};
#[cfg(not(test))]
use config::Config;
#[cfg(not(test))]
use connectors::{
    OAuthController, OAuthPhase, SearchOutcome, SearchRunner, StatusReconciler, registry,
};
#[cfg(not(test))]
use proto::{
    ConfluencePageDraft, JiraIssueDraft, OAuthError, PatCredentials, SearchQuery, TenantContext,
};
#[cfg(not(test))]
use tenant::TenantStore;
#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level command-line arguments for the uconnect application.
#[derive(Parser)]
#[command(name = "uconnect")]
#[command(about = "Unified connector client for Jira and Confluence", version = "0.1.0")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable debug logging to ~/.uconnect/logs/debug.log
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Tenant id for this invocation (overrides the stored tenant)
    #[arg(long, global = true)]
    tenant: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI subcommands available in the application.
#[derive(Subcommand)]
enum Commands {
    /// Inspect connectors and their connection status
    Connectors {
        #[command(subcommand)]
        command: ConnectorCommands,
    },

    /// Connect a connector via browser OAuth, or with an API token
    Connect {
        /// Connector id (jira, confluence)
        connector: String,

        /// Site URL for token-based connect (e.g. https://acme.atlassian.net)
        #[arg(long)]
        site_url: Option<String>,

        /// Account email for token-based connect
        #[arg(long)]
        email: Option<String>,

        /// API token; switches from OAuth to token-based connect
        #[arg(long)]
        api_token: Option<String>,

        /// Print the authorize URL instead of opening a browser
        #[arg(long, default_value_t = false)]
        no_browser: bool,
    },

    /// Disconnect a connector
    Disconnect {
        /// Connector id (jira, confluence)
        connector: String,
    },

    /// OAuth helpers
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Search a connector's resources
    Search {
        /// Connector id (jira, confluence)
        connector: String,

        /// Search text
        query: String,

        /// Resource type filter (e.g. issue, page)
        #[arg(long = "type")]
        resource_type: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        per_page: Option<u32>,

        /// Extra filters as a JSON object
        #[arg(long)]
        filters: Option<String>,
    },

    /// Jira operations
    Jira {
        #[command(subcommand)]
        command: JiraCommands,
    },

    /// Confluence operations
    Confluence {
        #[command(subcommand)]
        command: ConfluenceCommands,
    },

    /// Show or change the stored tenant
    Tenant {
        #[command(subcommand)]
        command: TenantCommands,
    },
}

/// `connectors` sub-subcommands.
#[derive(Subcommand)]
enum ConnectorCommands {
    /// List connectors known to the backend (or the local catalog)
    List,
    /// Show connection status for one or all connectors
    Status {
        /// Connector id; all registry connectors when omitted
        connector: Option<String>,
    },
}

/// `auth` sub-subcommands.
#[derive(Subcommand)]
enum AuthCommands {
    /// Finish an OAuth flow from a pasted callback URL or query string
    Complete {
        /// Full callback URL or its query string
        callback: String,
    },
}

/// `jira` sub-subcommands.
#[derive(Subcommand)]
enum JiraCommands {
    /// Create an issue
    CreateIssue {
        /// Project key (e.g. DEMO)
        #[arg(short, long)]
        project: String,

        #[arg(short, long)]
        summary: String,

        /// Issue type
        #[arg(long = "type", default_value = "Task")]
        issue_type: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// List projects visible to the connection
    Projects,
}

/// `confluence` sub-subcommands.
#[derive(Subcommand)]
enum ConfluenceCommands {
    /// Create a page
    CreatePage {
        /// Space key (e.g. ENG)
        #[arg(short, long)]
        space: String,

        #[arg(short, long)]
        title: String,

        /// Page body (storage format)
        #[arg(short, long)]
        body: String,
    },
    /// List spaces visible to the connection
    Spaces,
}

/// `tenant` sub-subcommands.
#[derive(Subcommand)]
enum TenantCommands {
    /// Show the effective tenant
    Show,
    /// Store a tenant id for future invocations
    Set { tenant_id: String },
    /// Remove the stored tenant id
    Clear,
}

#[cfg(not(test))]
#[tokio::main]
/// Program entrypoint.
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // When --debug is passed, write debug-level logs to ~/.uconnect/logs/debug.YYYY-MM-DD.log.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>;

    if cli.debug {
        let log_dir = config::app_dir().join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _file_guard = Some(guard);

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter);
        let file = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
        tracing_subscriber::registry()
            .with(console)
            .with(file)
            .init();
    } else {
        _file_guard = None;
        fmt()
            .with_env_filter(console_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    if cli.debug {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command = command_label(&cli.command),
            log_level = %cli.log_level,
            "========== uconnect session start =========="
        );
    }

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config ({e}), using defaults");
        Config::default()
    });
    let mut store = TenantStore::load();

    if let Commands::Tenant { command } = &cli.command {
        return cmd_tenant(&mut store, command, cli.tenant.as_deref());
    }

    let app = App::new(config, store.context(cli.tenant.as_deref()))?;
    match cli.command {
        Commands::Connectors { command } => match command {
            ConnectorCommands::List => cmd_connectors_list(&app).await,
            ConnectorCommands::Status { connector } => {
                cmd_connectors_status(&app, connector.as_deref()).await
            }
        },
        Commands::Connect {
            connector,
            site_url,
            email,
            api_token,
            no_browser,
        } => match api_token {
            Some(api_token) => {
                let credentials = PatCredentials {
                    site_url: site_url.unwrap_or_default(),
                    email,
                    api_token,
                };
                cmd_connect_token(&app, &connector, credentials).await
            }
            None => cmd_connect_oauth(&app, &connector, no_browser).await,
        },
        Commands::Disconnect { connector } => cmd_disconnect(&app, &connector).await,
        Commands::Auth { command } => match command {
            AuthCommands::Complete { callback } => cmd_auth_complete(&app, &callback).await,
        },
        Commands::Search {
            connector,
            query,
            resource_type,
            page,
            per_page,
            filters,
        } => {
            let query = SearchQuery {
                q: query,
                resource_type,
                page,
                per_page,
                filters: parse_filters(filters.as_deref())?,
            };
            cmd_search(&app, &connector, query).await
        }
        Commands::Jira { command } => match command {
            JiraCommands::CreateIssue {
                project,
                summary,
                issue_type,
                description,
            } => {
                let draft = JiraIssueDraft {
                    issuetype: issue_type,
                    description,
                    ..JiraIssueDraft::new(project, summary)
                };
                cmd_jira_create_issue(&app, draft).await
            }
            JiraCommands::Projects => {
                let projects = app.api.list_jira_projects(&app.tenant).await?;
                print_resources("projects", &projects);
                Ok(())
            }
        },
        Commands::Confluence { command } => match command {
            ConfluenceCommands::CreatePage { space, title, body } => {
                let draft = ConfluencePageDraft {
                    space_key: space,
                    title,
                    body,
                };
                cmd_confluence_create_page(&app, draft).await
            }
            ConfluenceCommands::Spaces => {
                let spaces = app.api.list_confluence_spaces(&app.tenant).await?;
                print_resources("spaces", &spaces);
                Ok(())
            }
        },
        Commands::Tenant { .. } => Ok(()),
    }
}

/// Shared handles for one invocation.
#[cfg(not(test))]
struct App {
    config: Config,
    api: ConnectorApi,
    tenant: TenantContext,
}

#[cfg(not(test))]
impl App {
    fn new(config: Config, tenant: TenantContext) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.backend.base_url.clone(), config.backend.timeout())
            .context("failed to build HTTP client")?;
        info!(base_url = %client.base_url(), tenant = %tenant, "Backend client ready");
        Ok(Self {
            api: ConnectorApi::new(client),
            config,
            tenant,
        })
    }

    fn reconciler(&self) -> StatusReconciler {
        StatusReconciler::new(self.api.clone())
    }
}

#[cfg(not(test))]
fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Connectors { .. } => "connectors",
        Commands::Connect { .. } => "connect",
        Commands::Disconnect { .. } => "disconnect",
        Commands::Auth { .. } => "auth",
        Commands::Search { .. } => "search",
        Commands::Jira { .. } => "jira",
        Commands::Confluence { .. } => "confluence",
        Commands::Tenant { .. } => "tenant",
    }
}

#[cfg(not(test))]
async fn cmd_connectors_list(app: &App) -> anyhow::Result<()> {
    let listing = app.reconciler().connector_listing(&app.tenant).await;
    if let Some(warning) = &listing.warning {
        eprintln!("{warning}");
        eprintln!(
            "Set UCONNECT_API_BASE_URL or [backend].base_url (default {DEFAULT_BASE_URL})."
        );
    }
    for connector in &listing.connectors {
        println!("{}", format_connector_line(connector));
    }
    Ok(())
}

#[cfg(not(test))]
async fn cmd_connectors_status(app: &App, connector: Option<&str>) -> anyhow::Result<()> {
    let reconciler = app.reconciler();
    match connector {
        Some(id) => {
            let descriptor = registry::resolve_connector(id)?;
            let status = reconciler
                .fetch_status(descriptor.id, &app.tenant)
                .await
                .with_context(|| format!("failed to fetch status for {}", descriptor.id))?;
            println!("{}", format_status_line(&status));
        }
        None => {
            let statuses = reconciler
                .fetch_all_statuses(&registry::connector_ids(), &app.tenant)
                .await;
            for status in statuses.values() {
                println!("{}", format_status_line(status));
            }
        }
    }
    Ok(())
}

#[cfg(not(test))]
async fn cmd_connect_oauth(app: &App, connector: &str, no_browser: bool) -> anyhow::Result<()> {
    let descriptor = registry::resolve_connector(connector)?;

    let current = app
        .reconciler()
        .fetch_status(descriptor.id, &app.tenant)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Status unavailable before connect, assuming disconnected");
            ConnectorStatus::disconnected(descriptor.id)
        });

    let listener = callback::CallbackListener::bind(
        &app.config.oauth.callback_host,
        app.config.oauth.callback_port,
        &app.config.oauth.callback_path,
    )
    .await?;
    let settings = app.config.oauth.settings_for_port(listener.port()?);
    let controller = OAuthController::new(app.api.clone(), settings);

    let phase = controller
        .start(descriptor.id, &current, &app.tenant)
        .await?;
    let OAuthPhase::Redirecting { auth_url, .. } = &phase else {
        anyhow::bail!("unexpected OAuth phase: {}", phase.name());
    };

    println!("Authorize {} in your browser:\n", descriptor.display_name);
    println!("  {auth_url}\n");
    if app.config.oauth.open_browser && !no_browser {
        callback::open_browser(auth_url);
        println!("(If the browser does not open automatically, copy the URL above.)");
    }
    let phase = phase.awaiting();
    let OAuthPhase::AwaitingCallback { session } = &phase else {
        anyhow::bail!("unexpected OAuth phase: {}", phase.name());
    };

    let timeout_secs = app.config.oauth.timeout_secs;
    println!(
        "\nWaiting for authorization callback on {} (timeout: {timeout_secs}s)...",
        session.redirect_target
    );
    let query = tokio::time::timeout(app.config.oauth.timeout(), listener.accept_query())
        .await
        .map_err(|_| {
            OAuthError::Callback(
                "authorization timed out; no callback received within the time limit".to_string(),
            )
        })?
        .context("failed to receive OAuth callback")?;

    let phase = controller
        .complete_callback(Some(session), &query, &app.tenant)
        .await;
    finish_oauth(app, &controller, phase).await
}

#[cfg(not(test))]
async fn cmd_auth_complete(app: &App, callback: &str) -> anyhow::Result<()> {
    let controller = OAuthController::new(app.api.clone(), app.config.oauth.settings());
    let phase = controller.complete_callback(None, callback, &app.tenant).await;
    finish_oauth(app, &controller, phase).await
}

/// Reports a terminal OAuth phase and reconciles status after success.
#[cfg(not(test))]
async fn finish_oauth(
    app: &App,
    controller: &OAuthController,
    phase: OAuthPhase,
) -> anyhow::Result<()> {
    match &phase {
        OAuthPhase::Connected { connector_id, .. } => {
            println!("{}", format_connected_banner(connector_id));
            let destination = controller
                .follow_redirect(&phase)
                .await
                .context("connected phase has no destination")?;
            let connector = connectors::parse_connected_banner(destination)
                .context("post-connect destination has no connector")?;
            let status = app
                .reconciler()
                .fetch_status(&connector, &app.tenant)
                .await
                .with_context(|| format!("failed to refresh status for {connector}"))?;
            println!("{}", format_status_line(&status));
            Ok(())
        }
        OAuthPhase::Failed { message, .. } => anyhow::bail!("{message}"),
        other => anyhow::bail!("OAuth flow stopped in phase {}", other.name()),
    }
}

#[cfg(not(test))]
async fn cmd_connect_token(
    app: &App,
    connector: &str,
    credentials: PatCredentials,
) -> anyhow::Result<()> {
    connectors::connect_with_token(&app.api, connector, &credentials, &app.tenant).await?;
    let descriptor = registry::resolve_connector(connector)?;
    println!("{}", format_connected_banner(descriptor.id));
    let status = app
        .reconciler()
        .fetch_status(descriptor.id, &app.tenant)
        .await?;
    println!("{}", format_status_line(&status));
    Ok(())
}

#[cfg(not(test))]
async fn cmd_disconnect(app: &App, connector: &str) -> anyhow::Result<()> {
    let descriptor = registry::resolve_connector(connector)?;
    let outcome = connectors::disconnect_connector(&app.api, descriptor.id, &app.tenant)
        .await
        .with_context(|| format!("failed to disconnect {}", descriptor.display_name))?;
    println!("{}", describe_disconnect(descriptor.display_name, outcome));
    Ok(())
}

#[cfg(not(test))]
async fn cmd_search(app: &App, connector: &str, query: SearchQuery) -> anyhow::Result<()> {
    let descriptor = registry::resolve_connector(connector)?;
    let runner = SearchRunner::new(app.api.clone());
    match runner
        .search(descriptor.id, query, app.tenant.clone())
        .await
    {
        SearchOutcome::Completed(result) => {
            let page = result.with_context(|| format!("search on {} failed", descriptor.id))?;
            if page.items.is_empty() {
                println!("No results.");
            }
            for item in &page.items {
                println!("{}", format_search_item(item));
            }
            if let Some(total) = page.total {
                println!("\n{} of {total} results", page.items.len());
            }
            Ok(())
        }
        SearchOutcome::Superseded => anyhow::bail!("search was superseded"),
    }
}

#[cfg(not(test))]
async fn cmd_jira_create_issue(app: &App, draft: JiraIssueDraft) -> anyhow::Result<()> {
    let created = app
        .api
        .create_jira_issue(&draft, &app.tenant)
        .await
        .context("failed to create Jira issue")?;
    println!("{}", format_created("issue", &created));
    Ok(())
}

#[cfg(not(test))]
async fn cmd_confluence_create_page(app: &App, draft: ConfluencePageDraft) -> anyhow::Result<()> {
    let created = app
        .api
        .create_confluence_page(&draft, &app.tenant)
        .await
        .context("failed to create Confluence page")?;
    println!("{}", format_created("page", &created));
    Ok(())
}

#[cfg(not(test))]
fn cmd_tenant(
    store: &mut TenantStore,
    command: &TenantCommands,
    override_id: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        TenantCommands::Show => {
            println!("Tenant: {}", store.context(override_id));
        }
        TenantCommands::Set { tenant_id } => {
            store
                .set(Some(tenant_id))
                .with_context(|| format!("failed to write {}", TenantStore::path().display()))?;
            println!("Tenant: {}", store.context(None));
        }
        TenantCommands::Clear => {
            store
                .set(None)
                .with_context(|| format!("failed to write {}", TenantStore::path().display()))?;
            println!("Tenant cleared.");
        }
    }
    Ok(())
}

// ── Output formatting ─────────────────────────────────────────

fn parse_filters(raw: Option<&str>) -> anyhow::Result<Option<Value>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("--filters must be JSON: {e}"))?;
            anyhow::ensure!(value.is_object(), "--filters must be a JSON object");
            Ok(Some(value))
        }
    }
}

fn format_connector_line(connector: &ConnectorSummary) -> String {
    let mark = if connector.is_connected() { "●" } else { "○" };
    let name = if connector.name.is_empty() {
        &connector.id
    } else {
        &connector.name
    };
    match &connector.description {
        Some(desc) => format!("{mark} {:<12} {name} - {desc}", connector.id),
        None => format!("{mark} {:<12} {name}", connector.id),
    }
}

fn format_status_line(status: &ConnectorStatus) -> String {
    let mut line = format!("{:<12} {}", status.connector_id, status.label());
    if let Some(at) = status.last_refresh {
        line.push_str(&format!(" (refreshed {})", at.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(err) = &status.error {
        line.push_str(&format!(": {err}"));
    }
    line
}

fn format_connected_banner(connector_id: &str) -> String {
    format!(
        "✓ {} connected.",
        connectors::registry::display_name(connector_id)
    )
}

fn describe_disconnect(display_name: &str, outcome: DisconnectOutcome) -> String {
    match outcome {
        DisconnectOutcome::ConnectionDeleted => format!("{display_name} disconnected."),
        DisconnectOutcome::LegacyDisconnect => {
            format!("{display_name} disconnected (legacy endpoint).")
        }
    }
}

fn format_search_item(item: &SearchItem) -> String {
    let mut line = match &item.kind {
        Some(kind) => format!("[{kind}] {}", item.title),
        None => item.title.clone(),
    };
    if let Some(subtitle) = &item.subtitle {
        line.push_str(&format!(" - {subtitle}"));
    }
    if let Some(url) = &item.url {
        line.push_str(&format!("\n    {url}"));
    }
    line
}

fn format_created(kind: &str, created: &CreatedResource) -> String {
    match &created.url {
        Some(url) => format!("Created {kind} {} ({url})", created.display_id()),
        None => format!("Created {kind} {}", created.display_id()),
    }
}

fn print_resources(kind: &str, resources: &[Value]) {
    if resources.is_empty() {
        println!("No {kind}.");
        return;
    }
    for resource in resources {
        let key = resource
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let name = resource
            .get("name")
            .or_else(|| resource.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        println!("{key:<12} {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::SearchPage;
    use serde_json::json;

    #[test]
    fn cli_parses_connect_with_global_tenant() {
        let cli = Cli::try_parse_from(["uconnect", "connect", "jira", "--tenant", "acme"])
            .expect("parse");
        assert_eq!(cli.tenant.as_deref(), Some("acme"));
        assert!(matches!(
            cli.command,
            Commands::Connect { ref connector, api_token: None, .. } if connector == "jira"
        ));
    }

    #[test]
    fn cli_parses_search_and_jira_commands() {
        let cli = Cli::try_parse_from([
            "uconnect", "search", "confluence", "roadmap", "--type", "page", "--per-page", "5",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Search { ref resource_type, per_page: Some(5), .. }
                if resource_type.as_deref() == Some("page")
        ));

        let cli = Cli::try_parse_from([
            "uconnect", "jira", "create-issue", "-p", "DEMO", "-s", "Login broken",
        ])
        .expect("parse");
        let Commands::Jira {
            command: JiraCommands::CreateIssue { issue_type, .. },
        } = cli.command
        else {
            panic!("expected jira create-issue");
        };
        assert_eq!(issue_type, "Task");
    }

    #[test]
    fn cli_default_log_level_is_warn() {
        let cli = Cli::try_parse_from(["uconnect", "tenant", "show"]).expect("parse");
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.debug);
    }

    #[test]
    fn parse_filters_requires_json_object() {
        assert_eq!(parse_filters(None).unwrap(), None);
        assert_eq!(parse_filters(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_filters(Some(r#"{"project":"DEMO"}"#)).unwrap(),
            Some(json!({"project": "DEMO"}))
        );
        assert!(parse_filters(Some("[1]")).is_err());
        assert!(parse_filters(Some("{oops")).is_err());
    }

    #[test]
    fn status_line_shows_label_and_error() {
        let ok = ConnectorStatus {
            connected: true,
            ..ConnectorStatus::disconnected("jira")
        };
        assert!(format_status_line(&ok).ends_with("connected"));

        let failed = ConnectorStatus::failed("confluence", "API Error 502 Bad Gateway");
        assert_eq!(
            format_status_line(&failed),
            "confluence   error: API Error 502 Bad Gateway"
        );
    }

    #[test]
    fn connector_line_marks_connection() {
        let summary = ConnectorSummary {
            connected: Some(true),
            ..ConnectorSummary::from_descriptor(&connectors::CONNECTORS[0])
        };
        let line = format_connector_line(&summary);
        assert!(line.starts_with("● jira"));
        assert!(line.contains("Atlassian Jira integration"));
    }

    #[test]
    fn disconnect_message_names_legacy_path() {
        assert_eq!(
            describe_disconnect("Jira", DisconnectOutcome::ConnectionDeleted),
            "Jira disconnected."
        );
        assert!(
            describe_disconnect("Jira", DisconnectOutcome::LegacyDisconnect).contains("legacy")
        );
    }

    #[test]
    fn search_item_and_created_formatting() {
        let page = SearchPage {
            items: vec![SearchItem {
                id: Some("1".to_string()),
                title: "DEMO-1".to_string(),
                url: Some("https://acme.atlassian.net/browse/DEMO-1".to_string()),
                kind: Some("issue".to_string()),
                subtitle: Some("Login broken".to_string()),
            }],
            total: Some(1),
        };
        let line = format_search_item(&page.items[0]);
        assert!(line.starts_with("[issue] DEMO-1 - Login broken"));
        assert!(line.contains("browse/DEMO-1"));

        let created = CreatedResource {
            id: Some("10001".to_string()),
            key: Some("DEMO-2".to_string()),
            title: None,
            url: None,
            raw: json!({}),
        };
        assert_eq!(format_created("issue", &created), "Created issue DEMO-2");
    }

    #[test]
    fn print_resources_does_not_panic() {
        print_resources("projects", &[json!({"key": "DEMO", "name": "Demo"}), json!(42)]);
        print_resources("spaces", &[]);
    }

    #[test]
    fn connected_banner_uses_display_name() {
        assert_eq!(format_connected_banner("confluence"), "✓ Confluence connected.");
    }
}
