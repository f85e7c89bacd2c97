use std::io::{self, Write};

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::chat::{ChatEvent, Session};
use crate::core::AppConfig;
use crate::openai::OpenAiProvider;

async fn print_deltas(mut rx: mpsc::UnboundedReceiver<ChatEvent>) {
    while let Some(event) = rx.recv().await {
        if let ChatEvent::Delta { content } = event {
            print!("{}", content);
            let _ = io::stdout().flush();
        }
    }
}

/// Parse `/feedback <rating> <comment>`
fn parse_feedback(args: &str) -> Option<(i64, String)> {
    let (rating, comment) = args.trim().split_once(' ').unwrap_or((args.trim(), ""));
    let rating = rating.parse().ok()?;
    Some((rating, comment.trim().to_string()))
}

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let provider = OpenAiProvider::from_config(&config);
    let mut session = Session::new(&Uuid::new_v4().to_string(), &config.system_message);

    println!("Cyber-Advisor ({}). /reset clears the conversation, /feedback <1-5> <comment> rates it.", provider.model());

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if line == "/reset" {
                    session = Session::new(&Uuid::new_v4().to_string(), &config.system_message);
                    println!("Conversation cleared");
                    continue;
                }
                if let Some(args) = line.strip_prefix("/feedback") {
                    match parse_feedback(args) {
                        Some((rating, comment)) => {
                            let entry = session.add_feedback(rating, &comment);
                            println!("Thanks! Recorded {}/5", entry.rating.value());
                        }
                        None => println!("Usage: /feedback <1-5> <comment>"),
                    }
                    continue;
                }

                let (tx, rx) = mpsc::unbounded_channel();
                let turn = async {
                    let tx = tx;
                    session.submit(&provider, line, &tx).await
                };
                let (result, ()) = tokio::join!(turn, print_deltas(rx));
                println!();

                if let Err(e) = result {
                    eprintln!("{}", e);
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
