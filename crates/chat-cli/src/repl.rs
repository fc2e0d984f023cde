//! Interactive chat pane

use std::io::Write;

use chat_core::Direction;
use colored::Colorize;
use session_manager::{ChatSession, SendOutcome, ThreadView};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render::print_threads;

const HELP: &str = "\
Type a message and press enter to send it.
  /edit <n> [text]   edit thread n (without text: load it into the input)
  /prev <n>          show the previous version of thread n
  /next <n>          show the next version of thread n
  /cancel            leave edit mode
  /reload            reload the conversation
  /help              show this help
  /quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Edit { thread: usize, text: Option<String> },
    Navigate { thread: usize, direction: Direction },
    Cancel,
    Reload,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one input line. Thread numbers are 1-based as printed.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(ReplCommand::Send(line.to_string()));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "edit" => {
                let (number, text) = match args.split_once(char::is_whitespace) {
                    Some((number, text)) => (number, Some(text.trim().to_string())),
                    None => (args, None),
                };
                Ok(ReplCommand::Edit {
                    thread: parse_thread_number(number)?,
                    text: text.filter(|t| !t.is_empty()),
                })
            }
            "prev" => Ok(ReplCommand::Navigate {
                thread: parse_thread_number(args)?,
                direction: Direction::Prev,
            }),
            "next" => Ok(ReplCommand::Navigate {
                thread: parse_thread_number(args)?,
                direction: Direction::Next,
            }),
            "cancel" => Ok(ReplCommand::Cancel),
            "reload" => Ok(ReplCommand::Reload),
            "help" | "?" => Ok(ReplCommand::Help),
            "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
            other => Err(format!("unknown command /{other}, try /help")),
        }
    }
}

fn parse_thread_number(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a thread number, got {value:?}")),
    }
}

fn thread_at(views: &[ThreadView], number: usize) -> Result<&ThreadView, String> {
    views
        .get(number - 1)
        .ok_or_else(|| format!("no thread {number} (there are {})", views.len()))
}

fn report(outcome: &SendOutcome) {
    if outcome.message.is_none() {
        println!("{}", "Message could not be saved; see the log.".red());
    } else if outcome.reply.is_none() {
        println!("{}", "No reply was generated.".yellow());
    }
}

pub async fn run(session: ChatSession, title: &str) -> anyhow::Result<()> {
    println!("{}", format!("Conversation: {title}").green().bold());
    println!("{}", "Type /help for commands.".dimmed());
    print_threads(&session.thread_views().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = if session.editing_message().await.is_some() {
            "edit> "
        } else {
            "> "
        };
        print!("{}", prompt.bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.red());
                continue;
            }
        };

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ReplCommand::Send(text) => {
                session.set_input(text).await;
                match session.submit().await {
                    Ok(outcome) => report(&outcome),
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            ReplCommand::Edit { thread, text } => {
                let views = session.thread_views().await;
                let target = match thread_at(&views, thread) {
                    Ok(view) => view.message_id,
                    Err(message) => {
                        println!("{}", message.red());
                        continue;
                    }
                };
                if let Err(e) = session.begin_edit(target).await {
                    println!("{}", e.to_string().red());
                    continue;
                }
                match text {
                    Some(text) => match session.send_edit(target, &text).await {
                        Ok(outcome) => report(&outcome),
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    None => {
                        println!("{} {}", "Editing:".cyan(), session.input().await);
                        println!("{}", "Type the new text, or /cancel.".dimmed());
                        continue;
                    }
                }
            }
            ReplCommand::Navigate { thread, direction } => {
                let views = session.thread_views().await;
                let thread_id = match thread_at(&views, thread) {
                    Ok(view) => view.thread_id,
                    Err(message) => {
                        println!("{}", message.red());
                        continue;
                    }
                };
                if let Err(e) = session.advance(thread_id, direction).await {
                    println!("{}", e.to_string().red());
                }
            }
            ReplCommand::Cancel => session.cancel_edit().await,
            ReplCommand::Reload => {
                if let Err(e) = session.reload().await {
                    println!("{}", e.to_string().red());
                }
            }
        }

        print_threads(&session.thread_views().await);
    }
    Ok(())
}
