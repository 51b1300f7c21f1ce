use anyhow::{anyhow, bail, Result};
use folio::ThreadId;

pub const HELP: &str = "\
Commands:
  /new                      start a new chat (reuses an unsaved one)
  /threads                  list this document's threads
  /switch <id|pending>      open a thread
  /delete <id|pending>      delete a thread
  /rename <id> <title>      rename a thread
  /pin <page> <text>        pin an excerpt for the next message
  /unpin <n>                drop pin number n
  /pins                     show pinned excerpts
  /page <n|none>            set the page you are reading
  /help                     show this help
  /quit                     exit
Anything else is sent as a message.";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Send(String),
    New,
    Threads,
    Switch(ThreadId),
    Delete(ThreadId),
    Rename { thread_id: String, title: String },
    Pin { page: u32, text: String },
    /// 1-based position in the pin list
    Unpin(usize),
    Pins,
    Page(Option<u32>),
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse(line: &str) -> Result<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(body) = line.strip_prefix('/') else {
        return Ok(Some(ReplCommand::Send(line.to_string())));
    };

    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };

    let command = match name {
        "new" => ReplCommand::New,
        "threads" => ReplCommand::Threads,
        "switch" => ReplCommand::Switch(thread_arg(args)?),
        "delete" => ReplCommand::Delete(thread_arg(args)?),
        "rename" => {
            let (thread_id, title) = args
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: /rename <id> <title>"))?;
            ReplCommand::Rename {
                thread_id: thread_id.to_string(),
                title: title.trim().to_string(),
            }
        }
        "pin" => {
            let (page, text) = args
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: /pin <page> <text>"))?;
            ReplCommand::Pin {
                page: page.parse().map_err(|_| anyhow!("invalid page: {}", page))?,
                text: text.trim().to_string(),
            }
        }
        "unpin" => match args.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Unpin(n),
            _ => bail!("usage: /unpin <n>"),
        },
        "pins" => ReplCommand::Pins,
        "page" => match args {
            "" | "none" => ReplCommand::Page(None),
            n => ReplCommand::Page(Some(
                n.parse().map_err(|_| anyhow!("invalid page: {}", n))?,
            )),
        },
        "help" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => bail!("unknown command /{} (try /help)", other),
    };

    Ok(Some(command))
}

fn thread_arg(args: &str) -> Result<ThreadId> {
    if args.is_empty() {
        bail!("a thread id (or `pending`) is required");
    }
    Ok(ThreadId::parse(args))
}
