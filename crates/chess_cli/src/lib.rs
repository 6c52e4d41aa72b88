// Text driver: board output, command input and the engine's turns.

mod render;

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chess_core::{Color, GameState, Move};
use chess_engine::{ChessAI, SearchConfig, SearchTask, TaskStatus};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};

pub use render::{render_board, render_moves};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const REPETITION_LIMIT: usize = 3;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Human,
    Ai,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "chess-negamax", about = "Play chess against a negamax engine")]
pub struct Args {
    /// Search depth in plies.
    #[arg(long, default_value_t = 3)]
    pub depth: u8,

    #[arg(long, value_enum, default_value_t = Player::Human)]
    pub white: Player,

    #[arg(long, value_enum, default_value_t = Player::Ai)]
    pub black: Player,

    /// Seed for the engine's move shuffling.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(String),
    Moves,
    Depth(u8),
    Undo,
    New,
    Board,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let word = line.trim();
    if let Some(depth) = word.strip_prefix("depth ") {
        return depth.trim().parse().ok().map(Command::Depth);
    }
    let command = match word.to_ascii_lowercase().as_str() {
        "" => return None,
        "moves" => Command::Moves,
        "undo" => Command::Undo,
        "new" => Command::New,
        "board" => Command::Board,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Move(word.to_string()),
    };
    Some(command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One game as seen by the driver: the live state, the engine, the
/// in-flight search if any, and the repetition history.
pub struct Session<W: Write> {
    state: GameState,
    ai: ChessAI,
    white: Player,
    black: Player,
    ai_task: Option<SearchTask>,
    valid_moves: Vec<Move>,
    history: Vec<String>,
    game_over: bool,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(args: &Args, out: W) -> Self {
        let mut config = SearchConfig::new(args.depth);
        config.seed = args.seed;
        let mut state = GameState::new();
        let valid_moves = state.get_valid_moves();
        let history = vec![position_key(&state)];
        Self {
            state,
            ai: ChessAI::with_config(config),
            white: args.white,
            black: args.black,
            ai_task: None,
            valid_moves,
            history,
            game_over: false,
            out,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_thinking(&self) -> bool {
        self.ai_task.is_some()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn player_to_move(&self) -> Player {
        match self.state.side_to_move() {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn show(&mut self) -> io::Result<()> {
        render_board(&mut self.out, self.state.board())?;
        let side = match self.state.side_to_move() {
            Color::White => "White",
            Color::Black => "Black",
        };
        if !self.game_over {
            writeln!(self.out, "{side} to move")?;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let Some(command) = parse_command(line) else {
            return Ok(Flow::Continue);
        };
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(
                self.out,
                "commands: <move> (e2e4, e7e8n), moves, depth <n>, undo, new, board, quit"
            )?,
            Command::Depth(depth) => {
                // A search already running keeps the depth it started with.
                self.ai.set_depth(depth);
                writeln!(self.out, "search depth {}", self.ai.config().depth)?;
            }
            Command::Board => self.show()?,
            Command::Moves => render_moves(&mut self.out, &self.valid_moves)?,
            Command::New => {
                self.cancel_search();
                self.state = GameState::new();
                self.history = vec![position_key(&self.state)];
                self.refresh()?;
                self.show()?;
            }
            Command::Undo => self.undo()?,
            Command::Move(text) => self.human_move(&text)?,
        }
        Ok(Flow::Continue)
    }

    fn human_move(&mut self, text: &str) -> io::Result<()> {
        if self.game_over {
            return writeln!(self.out, "game is over: undo or start a new one");
        }
        if self.player_to_move() != Player::Human || self.ai_task.is_some() {
            return writeln!(self.out, "the engine is thinking");
        }

        let candidate = match Move::parse_coordinate(text, self.state.board()) {
            Ok(mv) => mv,
            Err(err) => return writeln!(self.out, "{err}"),
        };
        // Matching on endpoints lets `e1g1` find the castle move.
        match self.valid_moves.iter().find(|mv| **mv == candidate) {
            Some(&legal) => self.apply(legal.with_promotion(candidate.promotion)),
            None => writeln!(self.out, "illegal move: {text}"),
        }
    }

    fn apply(&mut self, mv: Move) -> io::Result<()> {
        self.state.make_move(mv);
        self.history.push(position_key(&self.state));
        writeln!(self.out, "{}. {}", self.state.move_log().len().div_ceil(2), mv)?;
        self.refresh()?;
        self.show()
    }

    fn undo(&mut self) -> io::Result<()> {
        self.cancel_search();
        if self.state.move_log().is_empty() {
            return writeln!(self.out, "nothing to undo");
        }
        self.undo_ply();
        // Against the engine, step back to the human's turn.
        let opponent_is_human = self.white == Player::Human || self.black == Player::Human;
        if opponent_is_human
            && self.player_to_move() == Player::Ai
            && !self.state.move_log().is_empty()
        {
            self.undo_ply();
        }
        self.refresh()?;
        self.show()
    }

    fn undo_ply(&mut self) {
        self.state.undo_move();
        self.history.pop();
    }

    fn cancel_search(&mut self) {
        if let Some(task) = self.ai_task.take() {
            info!("discarding in-flight search");
            task.cancel();
        }
    }

    /// Recomputes the legal moves and announces how the game stands.
    fn refresh(&mut self) -> io::Result<()> {
        self.valid_moves = self.state.get_valid_moves();
        self.game_over = true;

        if self.state.checkmate() {
            let winner = match self.state.side_to_move() {
                Color::White => "Black",
                Color::Black => "White",
            };
            return writeln!(self.out, "checkmate, {winner} wins");
        }
        if self.state.stalemate() {
            return writeln!(self.out, "stalemate");
        }
        if self.state.has_insufficient_material() {
            return writeln!(self.out, "draw by insufficient material");
        }
        let key = position_key(&self.state);
        let repeats = self.history.iter().filter(|k| **k == key).count();
        if repeats >= REPETITION_LIMIT {
            return writeln!(self.out, "draw by threefold repetition");
        }

        self.game_over = false;
        if self.state.in_check() {
            writeln!(self.out, "check")?;
        }
        Ok(())
    }

    /// Starts the engine when it is its turn and applies a finished result,
    /// unless the game has moved on since the search began.
    pub fn update_ai(&mut self) -> io::Result<()> {
        if self.game_over {
            return Ok(());
        }

        if self.ai_task.is_none() {
            if self.player_to_move() == Player::Ai {
                debug!("starting search at ply {}", self.state.move_log().len());
                self.ai_task = Some(self.ai.spawn_search(&self.state));
            }
            return Ok(());
        }

        let Some(task) = self.ai_task.take() else {
            return Ok(());
        };
        match task.poll() {
            Ok(TaskStatus::Thinking) => {
                self.ai_task = Some(task);
                Ok(())
            }
            Ok(TaskStatus::Finished(_)) if task.is_stale_for(&self.state) => {
                warn!("dropping a search result for an old position");
                Ok(())
            }
            Ok(TaskStatus::Finished(Some(mv))) => self.apply(mv),
            Ok(TaskStatus::Finished(None)) | Ok(TaskStatus::Cancelled) => Ok(()),
            Err(err) => {
                warn!("{err}");
                Ok(())
            }
        }
    }
}

fn position_key(state: &GameState) -> String {
    let mut key = state.board().fingerprint();
    key.push(if state.white_to_move() { 'w' } else { 'b' });
    key
}

/// Runs an interactive game on stdin/stdout until `quit` or end of input.
pub fn run(args: Args) -> io::Result<()> {
    let stdout = io::stdout();
    let mut session = Session::new(&args, stdout.lock());
    writeln!(
        io::stdout(),
        "white: {:?}, black: {:?}, depth {}. Type `help` for commands.",
        args.white,
        args.black,
        session.ai.config().depth
    )?;
    session.show()?;

    let (line_sender, lines) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            if line_sender.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        session.update_ai()?;
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if session.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Input is closed; keep going only while engines are playing.
                if session.is_game_over() || session.player_to_move() == Player::Human {
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    session.cancel_search();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn args(white: Player, black: Player) -> Args {
        Args {
            depth: 1,
            white,
            black,
            seed: Some(1),
        }
    }

    fn output(session: Session<Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    fn wait_for_engine(session: &mut Session<Vec<u8>>, plies: usize) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while session.state().move_log().len() < plies && Instant::now() < deadline {
            session.update_ai().unwrap();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("UNDO"), Some(Command::Undo));
        assert_eq!(parse_command("e2e4\n"), Some(Command::Move("e2e4".into())));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
        assert_eq!(parse_command("depth 4"), Some(Command::Depth(4)));
        assert_eq!(parse_command("depth x"), None);
    }

    #[test]
    fn depth_command_is_clamped() {
        let mut session = Session::new(&args(Player::Human, Player::Ai), Vec::new());
        session.handle_line("depth 5").unwrap();
        assert_eq!(session.ai.config().depth, 5);
        session.handle_line("depth 40").unwrap();
        assert_eq!(session.ai.config().depth, 6);
        assert!(output(session).contains("search depth 6"));
    }

    #[test]
    fn human_moves_and_undo() {
        let mut session = Session::new(&args(Player::Human, Player::Human), Vec::new());
        session.handle_line("e2e4").unwrap();
        session.handle_line("e7e5").unwrap();
        assert_eq!(session.state().move_log().len(), 2);

        session.handle_line("e4e5").unwrap();
        assert_eq!(session.state().move_log().len(), 2);

        session.handle_line("undo").unwrap();
        assert_eq!(session.state().move_log().len(), 1);
        assert_eq!(session.handle_line("quit").unwrap(), Flow::Quit);

        let text = output(session);
        assert!(text.contains("1. e4"));
        assert!(text.contains("illegal move: e4e5"));
    }

    #[test]
    fn announces_mate_and_refuses_further_moves() {
        let mut session = Session::new(&args(Player::Human, Player::Human), Vec::new());
        for line in ["f2f3", "e7e5", "g2g4", "d8h4", "a2a3"] {
            session.handle_line(line).unwrap();
        }
        assert!(session.is_game_over());
        assert_eq!(session.state().move_log().len(), 4);
        let text = output(session);
        assert!(text.contains("checkmate, Black wins"));
        assert!(text.contains("game is over"));
    }

    #[test]
    fn threefold_repetition_is_a_draw() {
        let mut session = Session::new(&args(Player::Human, Player::Human), Vec::new());
        for _ in 0..2 {
            for line in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                session.handle_line(line).unwrap();
            }
        }
        assert!(session.is_game_over());
        assert!(output(session).contains("threefold repetition"));
    }

    #[test]
    fn engine_answers_a_human_move() {
        let mut session = Session::new(&args(Player::Human, Player::Ai), Vec::new());
        session.handle_line("e2e4").unwrap();
        wait_for_engine(&mut session, 2);
        assert_eq!(session.state().move_log().len(), 2);
        assert!(!session.is_thinking());
    }

    #[test]
    fn undo_while_thinking_discards_the_search() {
        let mut session = Session::new(&args(Player::Human, Player::Ai), Vec::new());
        session.handle_line("e2e4").unwrap();
        session.update_ai().unwrap();
        session.handle_line("undo").unwrap();

        assert!(!session.is_thinking());
        assert!(session.state().move_log().is_empty());
        // White (human) is to move, so nothing gets started or applied.
        session.update_ai().unwrap();
        assert!(!session.is_thinking());
        assert!(session.state().move_log().is_empty());
    }
}
