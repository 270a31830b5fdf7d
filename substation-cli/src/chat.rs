use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use substation_core::respond::HELP_MESSAGE;
use substation_server::{AppState, ChatQuery, ChatReply};
use tracing::warn;

/// Where chat messages are answered
pub enum Backend {
    Local(AppState),
    Remote { client: reqwest::Client, url: String },
}

impl Backend {
    pub fn remote(server: &str) -> Self {
        Backend::Remote {
            client: reqwest::Client::new(),
            url: query_url(server),
        }
    }

    fn describe(&self) -> String {
        match self {
            Backend::Local(_) => "local assistant".to_string(),
            Backend::Remote { url, .. } => url.clone(),
        }
    }

    pub async fn ask(&self, message: &str) -> Result<ChatReply> {
        match self {
            Backend::Local(state) => Ok(substation_server::respond(state, message).await),
            Backend::Remote { client, url } => {
                let resp = client
                    .post(url)
                    .json(&ChatQuery {
                        message: Some(message.to_string()),
                    })
                    .send()
                    .await
                    .with_context(|| format!("POST {url}"))?;
                let status = resp.status();
                if !status.is_success() {
                    let body: serde_json::Value = resp.json().await.unwrap_or_default();
                    let msg = body["error"]
                        .as_str()
                        .or_else(|| body["message"].as_str())
                        .unwrap_or("request failed");
                    bail!("server returned {status}: {msg}");
                }
                resp.json().await.context("parse chat reply")
            }
        }
    }
}

/// `http://host:port` or a full endpoint URL
pub fn query_url(server: &str) -> String {
    let base = server.trim().trim_end_matches('/');
    if base.ends_with("/api/chat/query") {
        base.to_string()
    } else {
        format!("{base}/api/chat/query")
    }
}

#[derive(Clone, Debug)]
struct Msg {
    role: Role,
    content: String,
}

#[derive(Clone, Debug)]
enum Role {
    User,
    Assistant,
    System,
}

struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    fn open_today() -> Result<Self> {
        let dir = crate::state::chat_log_dir()?;
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        Ok(Self {
            path: dir.join(format!("{today}.md")),
        })
    }

    fn append(&self, role: &str, msg: &str) -> Result<()> {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Local::now().to_rfc3339(),
            role,
            msg.replace('\n', " ")
        )?;
        Ok(())
    }
}

pub async fn run_chat(backend: Backend) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    let res = chat_loop(&mut terminal, &backend).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    messages: &[Msg],
    input: &str,
    source: &str,
    show_help: bool,
) -> Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(f.area());

        let splash = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                "Substation Operations Assistant",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("answering from {source}"),
                Style::default().fg(Color::Cyan),
            )),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(splash, chunks[0]);

        let mut lines: Vec<Line> = Vec::new();
        if show_help {
            lines.push(Line::from(Span::styled(
                "Enter=send  Esc=quit  F1=toggle this line  /help /clear /quit",
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::raw(""));
        }
        for m in messages {
            let (tag, color) = match m.role {
                Role::User => ("you", Color::Cyan),
                Role::Assistant => ("assistant", Color::Magenta),
                Role::System => ("system", Color::Gray),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{tag}: "), Style::default().fg(color)),
                Span::raw(m.content.clone()),
            ]));
            lines.push(Line::raw(""));
        }

        // keep the newest lines in view
        let height = chunks[1].height.saturating_sub(2) as usize;
        let skip = lines.len().saturating_sub(height) as u16;
        let history = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("conversation"))
            .wrap(Wrap { trim: false })
            .scroll((skip, 0));
        f.render_widget(history, chunks[1]);

        let input_widget = Paragraph::new(input)
            .block(Block::default().borders(Borders::ALL).title("message"))
            .style(Style::default().fg(Color::White));
        f.render_widget(input_widget, chunks[2]);
    })?;
    Ok(())
}

async fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    backend: &Backend,
) -> Result<()> {
    let mut messages = vec![Msg {
        role: Role::Assistant,
        content: "Hello! Ask me about asset health, maintenance, inspections, safety or real-time readings."
            .to_string(),
    }];
    let mut input = String::new();
    let mut show_help = true;
    let source = backend.describe();

    let log = ChatLog::open_today()?;
    log.append("system", "session_start")?;

    loop {
        draw(terminal, &messages, &input, &source, show_help)?;

        if !event::poll(std::time::Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::F(1) => show_help = !show_help,
            KeyCode::Enter => {
                let trimmed = input.trim().to_string();
                input.clear();
                if trimmed.is_empty() {
                    continue;
                }
                log.append("user", &trimmed)?;

                match handle_slash(&trimmed) {
                    Some(Slash::Quit) => break,
                    Some(Slash::Clear) => messages.clear(),
                    Some(Slash::Reply(reply)) => {
                        messages.push(Msg {
                            role: Role::System,
                            content: reply,
                        });
                    }
                    None => {
                        messages.push(Msg {
                            role: Role::User,
                            content: trimmed.clone(),
                        });
                        draw(terminal, &messages, &input, &source, show_help)?;

                        let msg = match backend.ask(&trimmed).await {
                            Ok(reply) => {
                                log.append("assistant", &reply.response)?;
                                Msg {
                                    role: Role::Assistant,
                                    content: reply.response,
                                }
                            }
                            Err(err) => {
                                warn!(error = %err, "chat request failed");
                                Msg {
                                    role: Role::System,
                                    content: format!("error: {err}"),
                                }
                            }
                        };
                        messages.push(msg);
                    }
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    log.append("system", "session_end")?;
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Slash {
    Reply(String),
    Clear,
    Quit,
}

fn handle_slash(input: &str) -> Option<Slash> {
    let s = input.trim();
    if !s.starts_with('/') {
        return None;
    }
    Some(match s {
        "/help" => Slash::Reply(HELP_MESSAGE.to_string()),
        "/clear" => Slash::Clear,
        "/quit" | "/exit" => Slash::Quit,
        "/status" => Slash::Reply(
            "Chat logs are saved daily under ~/.substation/chat/YYYY-MM-DD.md".to_string(),
        ),
        _ => Slash::Reply("Unknown command. Try /help".to_string()),
    })
}
