// Net snake wire format
//
// Server state datagram:
//   <size>::<me>_<count>#<ax>,<ay>#<player>#<player>...
// where each player is
//   <status>|<score>|<hx>,<hy>_<HEADING>_<tail>
// `status` is "d" for a dead player. `tail` is a run of l/r/u/d tokens, each
// giving the next body segment relative to the previous one.
//
// Client commands: "s" join, "m<token>" move, "r" restart, "q" quit.

use crate::error::ProtocolError;
use crate::types::{Coord, Direction};

/// One player's view in a state datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub alive: bool,
    pub score: u32,
    pub heading: Option<Direction>,
    /// Head first
    pub body: Vec<Coord>,
}

impl PlayerState {
    pub fn head(&self) -> Option<Coord> {
        self.body.first().copied()
    }
}

/// Decoded server state for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerState {
    /// Index of the receiving player in `players`
    pub me: usize,
    pub apple: Coord,
    pub players: Vec<PlayerState>,
}

impl ServerState {
    pub fn my_player(&self) -> Option<&PlayerState> {
        self.players.get(self.me)
    }

    /// My body without the head, then every other player's cells, deduplicated
    pub fn obstacles_for_me(&self) -> Vec<Coord> {
        let mut cells: Vec<Coord> = Vec::new();
        let mine = self
            .my_player()
            .map(|p| p.body.iter().skip(1))
            .into_iter()
            .flatten();
        let others = self
            .players
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.me)
            .flat_map(|(_, p)| p.body.iter());
        for c in mine.chain(others) {
            if !cells.contains(c) {
                cells.push(*c);
            }
        }
        cells
    }
}

/// Messages sent to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Move(Direction),
    Restart,
    Quit,
}

impl Command {
    pub fn encode(&self) -> String {
        match self {
            Command::Start => "s".to_string(),
            Command::Move(dir) => format!("m{}", dir.token()),
            Command::Restart => "r".to_string(),
            Command::Quit => "q".to_string(),
        }
    }
}

/// Decodes one state datagram
pub fn parse_state(data: &str) -> Result<ServerState, ProtocolError> {
    let data = data.trim_end_matches(['\0', '\n', '\r']);
    // Older servers send the payload without the size prefix
    let payload = match data.split_once("::") {
        Some((size, payload)) => {
            parse_number::<usize>(size)?;
            payload
        }
        None => data,
    };

    let mut sections = payload.split('#');
    let header = sections
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(ProtocolError::MissingSection("player header"))?;
    let (me, count) = header
        .split_once('_')
        .ok_or(ProtocolError::MissingSection("player count"))?;
    let me = parse_number::<usize>(me)?;
    let count = parse_number::<usize>(count)?;

    let apple = parse_coord(
        sections
            .next()
            .ok_or(ProtocolError::MissingSection("apple"))?,
    )?;

    let players = sections
        .filter(|s| !s.is_empty())
        .map(parse_player)
        .collect::<Result<Vec<_>, _>>()?;

    if me >= players.len() {
        return Err(ProtocolError::PlayerOutOfRange {
            index: me,
            count: players.len().max(count),
        });
    }

    Ok(ServerState { me, apple, players })
}

fn parse_player(section: &str) -> Result<PlayerState, ProtocolError> {
    let mut fields = section.splitn(3, '|');
    let status = fields.next().ok_or(ProtocolError::MissingSection("status"))?;
    let score = parse_number::<u32>(
        fields.next().ok_or(ProtocolError::MissingSection("score"))?,
    )?;
    let snake = fields.next().ok_or(ProtocolError::MissingSection("snake"))?;

    let mut parts = snake.splitn(3, '_');
    let head = parse_coord(parts.next().ok_or(ProtocolError::MissingSection("head"))?)?;
    let heading = match parts.next().unwrap_or("").chars().next() {
        Some(c) => Some(Direction::from_token(c).ok_or(ProtocolError::UnknownToken(c))?),
        None => None,
    };

    let mut body = vec![head];
    let mut last = head;
    for c in parts.next().unwrap_or("").chars() {
        let dir = Direction::from_token(c).ok_or(ProtocolError::UnknownToken(c))?;
        last = dir.apply(&last);
        body.push(last);
    }

    Ok(PlayerState {
        alive: status != "d",
        score,
        heading,
        body,
    })
}

fn parse_coord(s: &str) -> Result<Coord, ProtocolError> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| ProtocolError::InvalidCoord(s.to_string()))?;
    Ok(Coord::new(parse_number(x)?, parse_number(y)?))
}

fn parse_number<T: std::str::FromStr>(s: &str) -> Result<T, ProtocolError> {
    s.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(s.to_string()))
}
