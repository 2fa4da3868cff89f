//! Interactive conversation command.
//!
//! Reads questions from stdin, forwards them through the orchestrator and
//! renders each answer with the streaming reveal: text first, one character
//! at a time, then sources, images and links once the text has fully
//! revealed.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use askdoc_config::{Config, FilePreferenceStore};
use askdoc_conversation::{QueryOrchestrator, Reveal, RevealConfig, SubmitOutcome, spawn_reveal};
use askdoc_core::{Message, PreferenceStore, RevealState};
use askdoc_transport::HttpTransport;
use tracing::{info, warn};

const BANNER_LINES: [&str; 2] = [
    "Hello, I am askdoc",
    "Enable web search to connect to the world",
];

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single question to send (non-interactive mode)
    pub message: Option<String>,
    /// Enable web search for this session
    pub websearch: bool,
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default();

        let transport = HttpTransport::with_timeout(
            config.backend.base_url.clone(),
            Duration::from_secs(config.backend.timeout_secs),
        )?;

        let mut orchestrator = QueryOrchestrator::new(Arc::new(transport));
        // Config default first; a stored preference, then an explicit
        // flag, each override it.
        orchestrator.set_websearch_enabled(config.websearch_default);
        match FilePreferenceStore::open_default() {
            Ok(prefs) => {
                orchestrator =
                    orchestrator.with_preferences(Arc::new(prefs) as Arc<dyn PreferenceStore>);
            }
            Err(e) => warn!("preference persistence unavailable: {e}"),
        }
        if input.websearch {
            orchestrator.set_websearch_enabled(true);
        }

        let answer_tick = Duration::from_millis(config.reveal.answer_tick_ms);
        let banner_tick = Duration::from_millis(config.reveal.banner_tick_ms);

        if let Some(question) = input.message {
            run_turn(&mut orchestrator, &question, answer_tick).await?;
            return Ok(());
        }

        run_interactive(&mut orchestrator, answer_tick, banner_tick).await
    }
}

async fn run_interactive(
    orchestrator: &mut QueryOrchestrator,
    answer_tick: Duration,
    banner_tick: Duration,
) -> anyhow::Result<()> {
    print_banner(banner_tick).await?;
    println!("Type 'exit', 'quit' or Ctrl+C to end. '/clear' resets, '/websearch' toggles.\n");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input, "exit" | "quit" | "q") {
            break;
        }

        match input {
            "" => {}
            "/clear" => {
                orchestrator.reset().await;
                println!("Conversation cleared.\n");
            }
            "/websearch" => {
                let enabled = !orchestrator.store().websearch_enabled();
                orchestrator.set_websearch_enabled(enabled);
                println!(
                    "Web search {}.\n",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            question => run_turn(orchestrator, question, answer_tick).await?,
        }
    }

    info!(
        "conversation ended with {} messages",
        orchestrator.store().messages().len()
    );
    Ok(())
}

async fn run_turn(
    orchestrator: &mut QueryOrchestrator,
    question: &str,
    tick: Duration,
) -> anyhow::Result<()> {
    match orchestrator.submit(question).await {
        SubmitOutcome::Answered(id) => {
            print_answer(orchestrator, id, tick).await?;
        }
        SubmitOutcome::Duplicate => {
            println!("(the backend repeated an earlier answer)\n");
        }
        SubmitOutcome::Failed => {
            let error = orchestrator
                .store()
                .last_error()
                .unwrap_or("Failed to send query")
                .to_string();
            eprintln!("Error: {error}\n");
            orchestrator.clear_error();
        }
        SubmitOutcome::Rejected => {}
    }
    Ok(())
}

/// Disclose the answer text one character per tick, then the attachments.
async fn print_answer(
    orchestrator: &mut QueryOrchestrator,
    id: u64,
    tick: Duration,
) -> anyhow::Result<()> {
    let Some(content) = orchestrator.store().message(id).map(|m| m.content.clone()) else {
        return Ok(());
    };

    orchestrator
        .store_mut()
        .set_reveal_state(id, RevealState::Revealing);

    println!();
    let mut reveal = Reveal::new(&content);
    reveal.begin();
    let mut out = std::io::stdout();
    while let Some(ch) = reveal.tick() {
        write!(out, "{ch}")?;
        out.flush()?;
        tokio::time::sleep(tick).await;
    }
    println!();

    orchestrator
        .store_mut()
        .set_reveal_state(id, RevealState::Revealed);

    if let Some(message) = orchestrator.store().message(id) {
        print_attachments(message);
    }
    println!();
    Ok(())
}

/// Render sources, images and link for a message whose text has revealed.
fn print_attachments(message: &Message) {
    if !message.attachments_visible() || !message.has_attachments() {
        return;
    }

    if let Some(url) = &message.image_url {
        println!("[image] {url}");
    }
    for url in &message.images {
        println!("[image] {url}");
    }
    if let Some(url) = &message.link_url {
        println!("[link] {url}");
    }
    if !message.sources.is_empty() {
        println!("Sources:");
        for (i, source) in message.sources.iter().enumerate() {
            match source.url.as_deref() {
                Some(url) => println!("  {} ({url})", source.display_label(i)),
                None => println!("  {}", source.display_label(i)),
            }
        }
    }
}

/// Type out the welcome lines through the reveal task. The terminal gets
/// the single-pass variant; the looping variant is for persistent UI
/// surfaces.
async fn print_banner(tick: Duration) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    for line in BANNER_LINES {
        let handle = spawn_reveal(
            line.to_string(),
            RevealConfig::banner().with_tick(tick).without_loop(),
        );
        let mut rx = handle.subscribe();
        let mut printed = 0_usize;
        while rx.changed().await.is_ok() {
            let frame = rx.borrow().clone();
            for ch in frame.visible.chars().skip(printed) {
                write!(out, "{ch}")?;
                printed += 1;
            }
            out.flush()?;
            if frame.state == RevealState::Revealed {
                break;
            }
        }
        println!();
    }
    println!();
    Ok(())
}
