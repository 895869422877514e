#![deny(unused)]
//! MirrorBrain - personal cognitive assistant engine.
//!
//! Binds the decision/execution core to a stdin REPL: classify each line,
//! answer on the fast path when a device tool can, otherwise reason locally
//! or relay to a remote peer over the mesh, depending on session mode.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mirrorbrain_controller::Orchestrator;
use mirrorbrain_core::{
    config::AppConfig,
    traits::GenerationClient,
    types::SessionMode,
    EngineEvent, Error, EventSink, Result,
};
use mirrorbrain_mesh::MeshClient;
use mirrorbrain_skills::{
    OpenAppTool, SaveNoteTool, ShowToastTool, StaticBatteryTool, ToolRegistry, VibrateTool,
    WeatherTool,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Placeholder generation client for hosts without a model runtime.
///
/// Reports not-ready so the orchestrator short-circuits the slow path with
/// a user-facing message instead of starting a loop that cannot generate.
struct UnavailableGeneration;

#[async_trait]
impl GenerationClient for UnavailableGeneration {
    async fn generate(&self, _transcript: &str) -> Result<String> {
        Err(Error::ModelUnavailable)
    }

    fn is_ready(&self) -> bool {
        false
    }
}

fn register_builtins(tools: &ToolRegistry) -> Result<()> {
    tools.register(Arc::new(ShowToastTool))?;
    tools.register(Arc::new(VibrateTool))?;
    tools.register(Arc::new(StaticBatteryTool::default()))?;
    tools.register(Arc::new(OpenAppTool))?;
    tools.register(Arc::new(SaveNoteTool::new()))?;
    tools.register(Arc::new(WeatherTool))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("Starting MirrorBrain v{}", env!("CARGO_PKG_VERSION"));

    let tools = Arc::new(ToolRegistry::new());
    register_builtins(&tools)?;
    tracing::info!(tools_count = tools.len(), "tool registry initialized");

    let mesh = Arc::new(MeshClient::new(
        config.mesh.relay_addr.clone(),
        config.mesh.peer_id.clone(),
        Duration::from_millis(config.mesh.reply_timeout_ms),
    ));

    let (events, mut event_rx) = EventSink::channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                EngineEvent::Thought { summary } => println!("  · {summary}"),
                EngineEvent::ActionStarted { tool } => println!("  › running {tool}..."),
                EngineEvent::ActionFinished { tool, ok } => {
                    println!("  › {tool} {}", if ok { "done" } else { "failed" })
                }
                EngineEvent::RelayReply { from, content } => {
                    println!("[late reply from {from}] {content}")
                }
            }
        }
    });

    // Late mesh replies are surfaced out of band rather than dropped.
    {
        let mut relay_rx = mesh.subscribe();
        let events = events.clone();
        let brain = config.mesh.brain_peer_id.clone();
        tokio::spawn(async move {
            while let Ok(envelope) = relay_rx.recv().await {
                if envelope.is_chat_from(&brain) {
                    events.emit(EngineEvent::RelayReply {
                        from: envelope.from,
                        content: envelope.content,
                    });
                }
            }
        });
    }

    let orchestrator =
        Orchestrator::new(config, Arc::new(UnavailableGeneration), tools, events).with_mesh(mesh);

    println!("MirrorBrain ready. Type a request, or 'quit' to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if let Some(command) = input.strip_prefix('/') {
            handle_command(&orchestrator, command);
            continue;
        }

        match orchestrator.handle(input, None).await {
            Ok(reply) => println!("{reply}"),
            Err(Error::SessionBusy) => println!("(still working on the previous request)"),
            Err(err) => println!("(error: {err})"),
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn handle_command(orchestrator: &Orchestrator, command: &str) {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("mode"), Some("local")) => {
            orchestrator.set_mode(SessionMode::Local);
            println!("(slow path now reasons locally)");
        }
        (Some("mode"), Some("mesh")) => {
            orchestrator.set_mode(SessionMode::Mesh);
            println!("(slow path now relays over the mesh)");
        }
        (Some("offline"), Some(flag)) => {
            let offline = flag == "on";
            orchestrator.set_offline(offline);
            println!("(offline gate {})", if offline { "on" } else { "off" });
        }
        (Some("cancel"), _) => {
            orchestrator.cancel();
            println!("(cancellation requested)");
        }
        (Some("close"), _) => match orchestrator.close_session() {
            Ok(()) => println!("(session closed)"),
            Err(err) => println!("(cannot close: {err})"),
        },
        _ => println!("(commands: /mode local|mesh, /offline on|off, /cancel, /close)"),
    }
}
