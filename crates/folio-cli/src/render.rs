use folio::{Message, MessageRole, SessionUpdate, Thread, ThreadId};
use std::collections::HashMap;

/// Text to write for one update
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Continues the current line (streamed text)
    Inline(String),
    Line(String),
}

/// Turns session updates into terminal output
///
/// Streamed fragments are printed inline as they arrive.
#[derive(Default)]
pub struct Renderer {
    active: Option<ThreadId>,
    printed: HashMap<ThreadId, usize>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, update: &SessionUpdate) -> Option<Output> {
        match update {
            SessionUpdate::ActiveThreadChanged { thread } => {
                self.active = Some(thread.clone());
                Some(Output::Line(format!("--- thread {} ---", thread)))
            }
            SessionUpdate::MessagesLoaded { thread, messages } if self.is_active(thread) => {
                if messages.is_empty() {
                    return None;
                }
                let lines: Vec<String> = messages.iter().map(format_message).collect();
                Some(Output::Line(lines.join("\n")))
            }
            SessionUpdate::StreamingContent {
                thread,
                delta,
                length,
            } if self.is_active(thread) => {
                let first = !self.printed.contains_key(thread);
                self.printed.insert(thread.clone(), *length);
                if first {
                    Some(Output::Inline(format!("assistant: {}", delta)))
                } else if delta.is_empty() {
                    None
                } else {
                    Some(Output::Inline(delta.clone()))
                }
            }
            SessionUpdate::ThreadMigrated { thread_id, title } => {
                let real = ThreadId::real(thread_id.as_str());
                if let Some(seen) = self.printed.remove(&ThreadId::Pending) {
                    self.printed.insert(real.clone(), seen);
                }
                if self.is_active(&ThreadId::Pending) {
                    self.active = Some(real);
                }
                let title = title.as_deref().unwrap_or("New Chat");
                Some(Output::Line(format!("(saved as {}: {})", thread_id, title)))
            }
            SessionUpdate::SendCompleted { thread, message } => {
                let streamed = self.printed.remove(thread).is_some();
                if !self.is_active(thread) {
                    return Some(Output::Line(format!("(answer ready in thread {})", thread)));
                }
                let mut text = if streamed {
                    String::new()
                } else {
                    format!("assistant: {}", message.content)
                };
                let pages = message.referenced_pages();
                if !pages.is_empty() {
                    text.push_str(&format!("\n  [pages: {}]", join_pages(&pages)));
                }
                Some(Output::Line(text))
            }
            SessionUpdate::SendFailed {
                thread,
                reason,
                message,
            } => {
                let streamed = self.printed.remove(thread).is_some();
                let prefix = if streamed { "\n" } else { "" };
                Some(Output::Line(format!(
                    "{}! send failed ({}): {}",
                    prefix, reason, message
                )))
            }
            SessionUpdate::ThreadDeleted { thread } => {
                self.printed.remove(thread);
                Some(Output::Line(format!("(thread {} deleted)", thread)))
            }
            SessionUpdate::PinsChanged { pins } => {
                Some(Output::Line(format!("({} pinned excerpt(s))", pins.len())))
            }
            _ => None,
        }
    }

    fn is_active(&self, thread: &ThreadId) -> bool {
        self.active.as_ref() == Some(thread)
    }
}

pub fn format_message(message: &Message) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    format!("{}: {}", speaker, message.content)
}

pub fn format_threads(threads: &[Thread], active: Option<&ThreadId>) -> String {
    if threads.is_empty() {
        return "(no saved threads)".to_string();
    }
    threads
        .iter()
        .map(|t| {
            let marker = if active.and_then(ThreadId::as_real) == Some(t.id.as_str()) {
                "*"
            } else {
                " "
            };
            format!(
                "{} {}  {}  ({})",
                marker,
                t.id,
                t.display_title(),
                t.updated_at.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
