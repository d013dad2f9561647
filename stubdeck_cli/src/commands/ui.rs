//! Interactive dashboard: terminal loop and command execution

use crate::admin::AdminClient;
use crate::config::Settings;
use crate::dashboard::{Command, Dashboard, Outcome, SaveMode};
use crate::tui::{TuiApp, TuiEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stubdeck_common::constants::POLL_INTERVAL_SECONDS;
use stubdeck_common::{ImportDocument, Instance, MappingsDocument};
use tokio::sync::mpsc;

/// Admin clients keyed by instance id
pub type Clients = HashMap<String, AdminClient>;

/// Build one client per configured instance
pub fn build_clients(instances: &[Instance]) -> Result<Clients> {
    instances
        .iter()
        .map(|instance| {
            let client = AdminClient::new(&instance.url)
                .with_context(|| format!("Failed to create client for {}", instance.url))?;
            Ok((instance.id.clone(), client))
        })
        .collect()
}

/// Run the interactive dashboard
pub async fn run(instances: Vec<Instance>, active: usize) -> Result<()> {
    let theme = Settings::load().unwrap_or_default().resolve_theme();
    let clients = Arc::new(build_clients(&instances)?);
    let export_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    tracing::info!(instances = instances.len(), theme = theme.as_str(), "Starting dashboard");
    let mut app = TuiApp::new(Dashboard::new(instances, active, theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui_loop(&mut terminal, &mut app, clients, export_dir).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    clients: Arc<Clients>,
    export_dir: PathBuf,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<Outcome>(100);
    let export_dir = Arc::new(export_dir);

    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));
    // The first poll tick fires immediately; start() already covers it
    let mut poll_interval = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_secs(POLL_INTERVAL_SECONDS),
        Duration::from_secs(POLL_INTERVAL_SECONDS),
    );

    let startup = app.dashboard.start();
    dispatch(startup, &clients, &export_dir, &tx);

    loop {
        // Draw UI
        terminal.draw(|f| crate::tui::draw(f, app))?;

        let commands = tokio::select! {
            // Handle keyboard events (non-blocking)
            _ = tick_interval.tick() => {
                let mut commands = Vec::new();
                while event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            commands.extend(app.handle_event(TuiEvent::Key(key)));
                        }
                    }
                }
                commands
            }

            _ = poll_interval.tick() => app.handle_event(TuiEvent::Poll),

            Some(outcome) = rx.recv() => app.handle_event(TuiEvent::Outcome(outcome)),
        };

        dispatch(commands, &clients, &export_dir, &tx);

        if app.should_quit() {
            return Ok(());
        }
    }
}

/// Run each command on its own task and send the outcome back
fn dispatch(
    commands: Vec<Command>,
    clients: &Arc<Clients>,
    export_dir: &Arc<PathBuf>,
    tx: &mpsc::Sender<Outcome>,
) {
    for command in commands {
        let clients = Arc::clone(clients);
        let export_dir = Arc::clone(export_dir);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(outcome) = perform(command, &clients, &export_dir).await {
                let _ = tx.send(outcome).await;
            }
        });
    }
}

/// Execute one command
///
/// Returns `None` for fire-and-forget commands and for tickets whose
/// instance has no client.
pub async fn perform(command: Command, clients: &Clients, export_dir: &Path) -> Option<Outcome> {
    let outcome = match command {
        Command::FetchRequests { ticket, scope } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = client.list_requests(scope).await.map_err(|e| e.to_string());
            Outcome::Requests {
                ticket,
                scope,
                result,
            }
        }
        Command::FetchMappings { ticket } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = client.list_mappings().await.map_err(|e| e.to_string());
            Outcome::Mappings { ticket, result }
        }
        Command::LookupStub {
            ticket,
            stub_id,
            from,
        } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = client
                .list_mappings()
                .await
                .map(|envelope| envelope.mappings.into_iter().find(|m| m.id == stub_id))
                .map_err(|e| e.to_string());
            Outcome::StubLookup {
                ticket,
                from,
                result,
            }
        }
        Command::SaveMapping {
            ticket,
            mode,
            mapping,
        } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = match mode {
                SaveMode::Create => client.create_mapping(&mapping).await,
                SaveMode::Update => client.update_mapping(&mapping).await,
            }
            .map_err(|e| e.to_string());
            Outcome::Saved {
                ticket,
                mode,
                result,
            }
        }
        Command::DeleteMapping { ticket, id, origin } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = client.delete_mapping(&id).await.map_err(|e| e.to_string());
            Outcome::Deleted {
                ticket,
                id,
                origin,
                result,
            }
        }
        Command::BulkDelete { ticket, ids } => {
            let client = clients.get(&ticket.instance_id)?;
            let results = client
                .delete_mappings(&ids)
                .await
                .into_iter()
                .map(|(id, result)| (id, result.map_err(|e| e.to_string())))
                .collect();
            Outcome::BulkDeleted { ticket, results }
        }
        Command::Import {
            ticket,
            path,
            known_ids,
        } => {
            let client = clients.get(&ticket.instance_id)?;
            let result = async {
                let text = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
                let document = ImportDocument::parse(&text).map_err(|e| e.to_string())?;
                let summary = document.classify(&known_ids);
                client
                    .import_mappings(document.as_json())
                    .await
                    .map_err(|e| e.to_string())?;
                Ok::<_, String>(summary)
            }
            .await;
            Outcome::Imported { ticket, result }
        }
        Command::Export {
            file_name,
            document,
        } => Outcome::Exported(
            write_export(&export_dir.join(file_name), &document)
                .await
                .map_err(|e| format!("{:#}", e)),
        ),
        Command::SaveTheme(theme) => {
            if let Err(e) = Settings::store_theme(theme) {
                tracing::warn!("Failed to save theme: {:#}", e);
            }
            return None;
        }
    };
    Some(outcome)
}

/// Write an export document, returning where it went
pub async fn write_export(path: &Path, document: &MappingsDocument) -> Result<PathBuf> {
    let text = document
        .to_pretty_json()
        .context("Failed to serialize mappings")?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), count = document.mappings.len(), "Exported mappings");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Ticket;
    use stubdeck_common::parse_instances;

    #[test]
    fn test_build_clients_keys_by_instance_id() {
        let instances = parse_instances("http://a:1,http://b:2/").unwrap();
        let clients = build_clients(&instances).unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients["1"].base_url(), "http://b:2");
    }

    #[tokio::test]
    async fn test_unknown_instance_yields_nothing() {
        let command = Command::FetchMappings {
            ticket: Ticket {
                instance_id: "7".to_string(),
                epoch: 0,
            },
        };
        assert!(perform(command, &Clients::new(), Path::new(".")).await.is_none());
    }

    #[tokio::test]
    async fn test_export_writes_document() {
        let dir = std::env::temp_dir().join(format!("stubdeck-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let command = Command::Export {
            file_name: "mappings-1.json".to_string(),
            document: MappingsDocument::default(),
        };
        let outcome = perform(command, &Clients::new(), &dir).await;

        let Some(Outcome::Exported(Ok(path))) = outcome else {
            panic!("expected an export outcome");
        };
        assert_eq!(path, dir.join("mappings-1.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"mappings\": []"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
