use anyhow::{Context, Result, anyhow, bail};
use nback_core::GameType;

/// One line typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Match,
    SetGameType(GameType),
    SetNBack(u32),
    SetInterval(u32),
    SetEvents(u32),
    Status,
    Cancel,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("too many arguments for `{head}`");
        }

        let command = match head.to_ascii_lowercase().as_str() {
            "start" | "s" => Command::Start,
            "match" | "m" => Command::Match,
            "type" | "t" => Command::SetGameType(parse_game_type(required(head, arg)?)?),
            "n" => Command::SetNBack(number(head, arg)?),
            "interval" | "time" => Command::SetInterval(number(head, arg)?),
            "events" => Command::SetEvents(number(head, arg)?),
            "status" => Command::Status,
            "cancel" | "stop" => Command::Cancel,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command `{other}`, try `help`"),
        };
        Ok(Some(command))
    }
}

pub fn parse_game_type(word: &str) -> Result<GameType> {
    match word.to_ascii_lowercase().as_str() {
        "visual" | "v" => Ok(GameType::Visual),
        "audio" | "a" => Ok(GameType::Audio),
        "av" | "audiovisual" | "audio-visual" => Ok(GameType::AudioVisual),
        "none" => Ok(GameType::NoSelection),
        other => Err(anyhow!("unknown game type `{other}` (visual, audio, av, none)")),
    }
}

fn required<'a>(head: &str, arg: Option<&'a str>) -> Result<&'a str> {
    arg.ok_or_else(|| anyhow!("`{head}` needs a value"))
}

fn number(head: &str, arg: Option<&str>) -> Result<u32> {
    let raw = required(head, arg)?;
    raw.parse()
        .with_context(|| format!("`{raw}` is not a valid value for `{head}`"))
}

pub const HELP: &str = "\
commands:
  start            begin a game
  m | match        signal that the current item matches n steps back
  type <kind>      visual, audio, av or none
  n <k>            n-back distance
  interval <s>     seconds per stimulus
  events <k>       stimuli per game
  status           show score and settings
  cancel           abort the running game
  quit";
