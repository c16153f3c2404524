use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use xo::prelude::*;

const BOARD_WIDTH: u16 = 10;
const CELLS: usize = (BOARD_WIDTH * BOARD_WIDTH) as usize;

const HELP: &str = "\
commands:
  new                 create a game and wait for an opponent
  join <id>           join a game from the lobby
  move <n>            play cell n (1-100, row-major)
  move <row> <col>    play the cell at row, col (1-10 each)
  surrender           give up the current game
  quit";

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Draws the lobby and the board on stdout.
struct TerminalPresenter {
    cells: Vec<Option<Side>>,
    lobby: Vec<SessionId>,
    side: Option<Side>,
}

impl TerminalPresenter {
    fn new() -> Self {
        Self {
            cells: vec![None; CELLS],
            lobby: Vec::new(),
            side: None,
        }
    }

    fn board(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(BOARD_WIDTH as usize) {
            let line: Vec<&str> = row
                .iter()
                .map(|cell| match cell {
                    Some(Side::X) => "x",
                    Some(Side::O) => "o",
                    None => ".",
                })
                .collect();
            let _ = writeln!(out, "  {}", line.join(" "));
        }
        out
    }

    fn lobby(&self) -> String {
        if self.lobby.is_empty() {
            return "lobby: no open games (type `new` to create one)".into();
        }
        let ids: Vec<&str> = self.lobby.iter().map(SessionId::as_str).collect();
        format!("lobby: {}", ids.join(", "))
    }
}

impl Presenter for TerminalPresenter {
    fn show_lobby(&mut self) {
        self.side = None;
        println!("{}", self.lobby());
    }

    fn show_game_board(&mut self) {
        self.cells = vec![None; CELLS];
        println!("game starting...");
    }

    fn render_board(&mut self, side: Side) {
        self.side = Some(side);
        let turn = if side.moves_first() {
            "your move"
        } else {
            "waiting for opponent"
        };
        println!("you play {side}, {turn}\n{}", self.board());
    }

    fn render_move(&mut self, position: Position, side: Side) {
        let index = match position.to_cell(BOARD_WIDTH) {
            Ok((row, col)) => usize::from(row * BOARD_WIDTH + col),
            Err(e) => {
                tracing::warn!(error = %e, "cannot draw move");
                return;
            }
        };
        let Some(cell) = self.cells.get_mut(index) else {
            tracing::warn!(%position, "move is off the board");
            return;
        };
        *cell = Some(side);

        let whose = if Some(side) == self.side { "you" } else { "opponent" };
        println!("{whose} played {position}\n{}", self.board());
    }

    fn report_error(&mut self, message: &str) {
        println!("error: {message}");
    }

    fn report_winner(&mut self, message: &str) {
        println!("game over: {message}");
    }

    fn add_lobby_entry(&mut self, id: &SessionId) {
        if !self.lobby.contains(id) {
            self.lobby.push(id.clone());
        }
        if self.side.is_none() {
            println!("{}", self.lobby());
        }
    }

    fn remove_lobby_entry(&mut self, id: &SessionId) {
        self.lobby.retain(|entry| entry != id);
    }

    fn set_create_game_enabled(&mut self, enabled: bool) {
        tracing::debug!(enabled, "create game toggled");
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Ui(UiEvent),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["new"] => Ok(Command::Ui(UiEvent::CreateGame)),
        ["join", id] => {
            Ok(Command::Ui(UiEvent::SelectLobbyEntry(SessionId::from(*id))))
        }
        ["move", n] => {
            let n: u16 = n.parse().map_err(|_| format!("not a cell: {n}"))?;
            if n == 0 || usize::from(n) > CELLS {
                return Err(format!("cell must be 1-{CELLS}"));
            }
            Ok(Command::Ui(UiEvent::CellClicked(Position(n))))
        }
        ["move", row, col] => {
            let row = parse_coordinate(row)?;
            let col = parse_coordinate(col)?;
            let position = Position::from_cell(row - 1, col - 1, BOARD_WIDTH)
                .map_err(|e| e.to_string())?;
            Ok(Command::Ui(UiEvent::CellClicked(position)))
        }
        ["surrender"] => Ok(Command::Ui(UiEvent::Surrender)),
        ["help"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] => Ok(Command::Quit),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}

fn parse_coordinate(word: &str) -> Result<u16, String> {
    match word.parse::<u16>() {
        Ok(v) if (1..=BOARD_WIDTH).contains(&v) => Ok(v),
        _ => Err(format!("coordinate must be 1-{BOARD_WIDTH}, got {word}")),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

async fn load_config() -> Result<ClientConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(ClientConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config().await?;
    eprintln!("connecting to {} / {}", config.server_url, config.push_url);

    let (client, ui) = GameClientBuilder::new()
        .config(config)
        .connect(TerminalPresenter::new())
        .await?;
    let running = tokio::spawn(client.run());

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Ui(event)) => ui.send(event)?,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }

    ui.shutdown()?;
    running.await??;
    Ok(())
}
