//! Line-oriented console: wire-protocol lines are local edits, `:`-prefixed
//! lines are commands.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use termcanvas_canvas::Surface;
use termcanvas_protocol::{decode, Operation};
use termcanvas_relay::Session;

pub const HELP: &str = "\
commands:
  set:/region:/clearRegion:/clear   draw (wire protocol syntax)
  :save <path>                      write the drawing as CSV
  :load <path>                      overlay a CSV drawing
  :peers                            list connected peers
  :show                             print the canvas
  :help                             this text
  :quit                             leave (EOF and `exit` also quit)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Edit(Operation),
    Save(PathBuf),
    Load(PathBuf),
    Peers,
    Show,
    Help,
    Quit,
}

/// Parse one console line. Blank lines give `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        return match decode(line) {
            Ok(Operation::Disconnect) => Ok(Some(Command::Quit)),
            Ok(op) => Ok(Some(Command::Edit(op))),
            Err(e) => Err(e.to_string()),
        };
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    let path = |cmd: &str| {
        if arg.is_empty() {
            Err(format!(":{cmd} needs a file path"))
        } else {
            Ok(PathBuf::from(arg))
        }
    };

    match name {
        "save" => path("save").map(|p| Some(Command::Save(p))),
        "load" => path("load").map(|p| Some(Command::Load(p))),
        "peers" => Ok(Some(Command::Peers)),
        "show" => Ok(Some(Command::Show)),
        "help" => Ok(Some(Command::Help)),
        "quit" | "q" => Ok(Some(Command::Quit)),
        other => Err(format!("unknown command :{other} (try :help)")),
    }
}

/// Read commands from `input` until `:quit` or EOF.
pub async fn run<R, W>(session: &Session, input: R, mut out: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                let reply = execute(session, command).await;
                if !reply.is_empty() {
                    out.write_all(reply.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                }
            }
            Err(e) => out.write_all(format!("error: {e}\n").as_bytes()).await?,
        }
        out.flush().await?;
    }
    Ok(())
}

async fn execute(session: &Session, command: Command) -> String {
    match command {
        Command::Edit(op) => match session.submit(op).await {
            Ok(()) => String::new(),
            Err(e) => format!("error: {e}"),
        },
        Command::Save(path) => {
            let csv = session.save_csv().await;
            match tokio::fs::write(&path, csv).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Saved drawing");
                    format!("Successfully saved to {}", path.display())
                }
                Err(e) => format!("Unable to write to file: {e}"),
            }
        }
        Command::Load(path) => match tokio::fs::read_to_string(&path).await {
            Ok(text) => match session.load_csv(&text).await {
                Ok(count) => format!("Loaded {count} cells from {}", path.display()),
                Err(e) => format!("Unable to load {}: {e}", path.display()),
            },
            Err(e) => format!("Unable to read {}: {e}", path.display()),
        },
        Command::Peers => {
            let peers = session.peers().await;
            if peers.is_empty() {
                "Not connected".to_string()
            } else {
                format!("Connected to: {}", peers.join(", "))
            }
        }
        Command::Show => session.with_canvas(|c| render(c.surface.as_ref())).await,
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

/// Text picture of a surface, trailing blanks trimmed per row.
fn render(surface: &dyn Surface) -> String {
    let (width, height) = surface.size();
    let mut rows: Vec<String> = (0..height)
        .map(|y| {
            let row: String = (0..width).map(|x| surface.get_cell(x, y).0).collect();
            row.trim_end().to_string()
        })
        .collect();
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows.join("\n")
}
