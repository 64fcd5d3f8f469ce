//! Terminal chat front end for the Destek helpdesk bot.
//!
//! Loads a knowledge-base JSON file, builds the engine with the shipped
//! rule set and a file log sink, and runs a line-based chat loop.
//! Disambiguation payloads are rendered as a numbered "did you mean" list.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use destek_engine::{
    Engine, EngineConfig, FileTurnLogger, KnowledgeBase, builtin_rules, parse_suggestion_payload,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Destek — IT-helpdesk chat bot.
#[derive(Parser)]
#[command(
    name = "destek",
    version,
    about = "Destek — IT-helpdesk chat bot",
    long_about = "A helpdesk bot that resolves free-text questions through keyword rules, \
                  a trained intent classifier, and fuzzy matching, with a confirm/cancel \
                  sub-dialogue for opening support requests."
)]
struct Cli {
    /// Knowledge-base JSON file ({"intents": [...]}).
    #[arg(long, default_value = "data/faq.json")]
    kb: PathBuf,

    /// Conversation log file (append-only; write failures are ignored).
    #[arg(long, default_value = "talep_log.txt")]
    log_file: PathBuf,

    /// Tags held to the stricter classifier threshold, comma-separated.
    #[arg(long, value_delimiter = ',')]
    low_priority: Vec<String>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();

    let json = fs::read_to_string(&cli.kb)
        .with_context(|| format!("failed to read knowledge base {}", cli.kb.display()))?;
    let kb = KnowledgeBase::from_json_str(&json)
        .with_context(|| format!("failed to parse knowledge base {}", cli.kb.display()))?;

    let mut config = EngineConfig::default();
    config.low_priority_tags.extend(cli.low_priority);

    let mut engine = Engine::new(kb, builtin_rules()?, config)
        .with_logger(Box::new(FileTurnLogger::new(&cli.log_file)));

    info!(
        kb = %cli.kb.display(),
        classifier = engine.classifier_ready(),
        "destek started"
    );

    println!("Destek hazır. Çıkmak için /quit yazın.");
    let stdin = io::stdin();
    loop {
        print!("siz> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "/quit" || line == "/exit" {
            break;
        }

        let reply = engine.resolve_text(line);
        print_reply(&reply);
    }

    println!("Görüşmek üzere!");
    Ok(())
}

/// Print a reply, expanding disambiguation payloads into a numbered list.
fn print_reply(reply: &str) {
    match parse_suggestion_payload(reply) {
        Some(suggestions) => {
            println!("bot> Şunlardan birini mi demek istediniz?");
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("     {}. {suggestion}", i + 1);
            }
        }
        None => println!("bot> {reply}"),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_with_defaults() {
        let cli = Cli::parse_from(["destek"]);
        assert_eq!(cli.kb, PathBuf::from("data/faq.json"));
        assert_eq!(cli.log_file, PathBuf::from("talep_log.txt"));
        assert!(cli.low_priority.is_empty());
    }

    #[test]
    fn low_priority_list_splits_on_commas() {
        let cli = Cli::parse_from(["destek", "--low-priority", "company_ceo,company_web"]);
        assert_eq!(cli.low_priority, ["company_ceo", "company_web"]);
    }
}
