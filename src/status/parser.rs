//! Grammar for the three-line `mpc` status report.
//!
//! ```text
//! <artist> - <song>
//! [<state>]  #<track>/<tracks>  <time>/<duration>  (<percent>%)
//! volume: <percent>%  repeat: <on|off>  random: <on|off>  single: <on|off>  consume: <on|off>
//! ```
//!
//! Lines after the third are ignored. The second and third lines are searched for their opening
//! token (`[` and `volume:`), so leading noise on those lines is tolerated.

use std::fmt;

use crate::status::model::PlaybackStatus;

/// Which of the three line grammars failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusPattern {
    /// `<artist> - <song>`
    Title,
    /// `[<state>] #<track>/<tracks> <time>/<duration> (<percent>%)`
    Playback,
    /// `volume: ...% repeat: ... random: ... single: ... consume: ...`
    Options,
}

impl fmt::Display for StatusPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Playback => "playback",
            Self::Options => "options",
        })
    }
}

/// Structured parse failure: the 1-based line, its grammar, and what was wrong.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line} ({pattern}): {reason}")]
pub struct StatusParseError {
    /// 1-based line number.
    pub line: usize,
    /// Grammar that line was parsed with.
    pub pattern: StatusPattern,
    /// Human-readable reason.
    pub reason: String,
}

impl StatusParseError {
    /// Build a parse error.
    pub fn new(line: usize, pattern: StatusPattern, reason: impl Into<String>) -> Self {
        Self {
            line,
            pattern,
            reason: reason.into(),
        }
    }
}

type ParseResult<T> = Result<T, StatusParseError>;

/// Fields of the title line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleLine {
    /// Text before the first separator, or the whole line.
    pub artist: String,
    /// Text after the first separator, or empty.
    pub song: String,
}

/// Fields of the playback line.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackLine {
    /// `true` only for the literal state `playing`.
    pub playing: bool,
    /// Playlist position.
    pub track: u32,
    /// Playlist length.
    pub tracks: u32,
    /// Elapsed time token.
    pub time: String,
    /// Duration token.
    pub duration: String,
    /// Percent as a fraction.
    pub progress: f32,
}

/// Fields of the options line.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionsLine {
    /// Volume as a fraction.
    pub volume: f32,
    /// `repeat: on`.
    pub repeat: bool,
    /// `random: on`.
    pub random: bool,
    /// `single: on`.
    pub single: bool,
    /// `consume: on`.
    pub consume: bool,
}

const TITLE_SEPARATOR: &str = " - ";

/// Parse a full status report into one record. Fails without a partial result.
pub fn parse_status(text: &str) -> ParseResult<PlaybackStatus> {
    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let mut next_line = |line: usize, pattern: StatusPattern| {
        lines
            .next()
            .ok_or_else(|| StatusParseError::new(line, pattern, "line is missing"))
    };

    let title = parse_title_line(next_line(1, StatusPattern::Title)?);
    let playback = parse_playback_line(2, next_line(2, StatusPattern::Playback)?)?;
    let options = parse_options_line(3, next_line(3, StatusPattern::Options)?)?;

    Ok(PlaybackStatus {
        artist: title.artist,
        song: title.song,
        playing: playback.playing,
        track: playback.track,
        tracks: playback.tracks,
        time: playback.time,
        duration: playback.duration,
        progress: playback.progress,
        volume: options.volume,
        repeat: options.repeat,
        random: options.random,
        single: options.single,
        consume: options.consume,
    })
}

/// Split on the first `" - "`. A name that itself contains the separator splits early.
pub fn parse_title_line(line: &str) -> TitleLine {
    match line.split_once(TITLE_SEPARATOR) {
        Some((artist, song)) => TitleLine {
            artist: artist.to_string(),
            song: song.to_string(),
        },
        None => TitleLine {
            artist: line.to_string(),
            song: String::new(),
        },
    }
}

/// Parse `[<state>] #<track>/<tracks> <time>/<duration> (<percent>%)`.
pub fn parse_playback_line(line_no: usize, line: &str) -> ParseResult<PlaybackLine> {
    first_match(line_no, StatusPattern::Playback, line, "[", |c| {
        c.literal("[")?;
        let state = c.word("player state")?;
        c.literal("]")?;
        c.blanks(1)?;
        c.literal("#")?;
        let track = c.number("track")?;
        c.literal("/")?;
        let tracks = c.number("track count")?;
        c.blanks(1)?;
        let time = c.clock("elapsed time")?;
        c.literal("/")?;
        let duration = c.clock("duration")?;
        c.blanks(1)?;
        c.literal("(")?;
        let percent = c.number("progress percent")?;
        c.literal("%")?;
        c.literal(")")?;
        Ok(PlaybackLine {
            playing: state == "playing",
            track,
            tracks,
            time: time.to_string(),
            duration: duration.to_string(),
            progress: fraction(percent),
        })
    })
}

/// Parse `volume: <n>% repeat: <on|off> random: <on|off> single: <on|off> consume: <on|off>`.
pub fn parse_options_line(line_no: usize, line: &str) -> ParseResult<OptionsLine> {
    first_match(line_no, StatusPattern::Options, line, "volume:", |c| {
        c.literal("volume:")?;
        c.blanks(0)?;
        let volume = c.number("volume percent")?;
        c.literal("%")?;
        c.blanks(0)?;
        let repeat = c.flag("repeat:")?;
        c.blanks(1)?;
        let random = c.flag("random:")?;
        c.blanks(1)?;
        let single = c.flag("single:")?;
        c.blanks(1)?;
        let consume = c.flag("consume:")?;
        Ok(OptionsLine {
            volume: fraction(volume),
            repeat,
            random,
            single,
            consume,
        })
    })
}

fn fraction(percent: u32) -> f32 {
    percent.min(100) as f32 / 100.0
}

/// Try the grammar at every occurrence of `anchor`; the first full match wins.
///
/// When no occurrence matches, the failure of the first attempt is reported.
fn first_match<T>(
    line_no: usize,
    pattern: StatusPattern,
    line: &str,
    anchor: &str,
    grammar: impl Fn(&mut Cursor<'_>) -> ParseResult<T>,
) -> ParseResult<T> {
    let mut first_err = None;
    for (start, _) in line.match_indices(anchor) {
        let mut cursor = Cursor {
            rest: &line[start..],
            line: line_no,
            pattern,
        };
        match grammar(&mut cursor) {
            Ok(v) => return Ok(v),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    Err(first_err.unwrap_or_else(|| {
        StatusParseError::new(line_no, pattern, format!("expected '{anchor}' in {line:?}"))
    }))
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
    pattern: StatusPattern,
}

impl<'a> Cursor<'a> {
    fn fail(&self, reason: impl Into<String>) -> StatusParseError {
        StatusParseError::new(self.line, self.pattern, reason)
    }

    fn peek_context(&self) -> String {
        let shown: String = self.rest.chars().take(12).collect();
        if shown.is_empty() {
            "end of line".to_string()
        } else {
            format!("{shown:?}")
        }
    }

    fn literal(&mut self, lit: &str) -> ParseResult<()> {
        match self.rest.strip_prefix(lit) {
            Some(rest) => {
                self.rest = rest;
                Ok(())
            }
            None => Err(self.fail(format!(
                "expected '{lit}' at {}",
                self.peek_context()
            ))),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self
            .rest
            .char_indices()
            .find(|&(_, ch)| !pred(ch))
            .map_or(self.rest.len(), |(i, _)| i);
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    fn blanks(&mut self, at_least: usize) -> ParseResult<()> {
        let taken = self.take_while(char::is_whitespace);
        if taken.chars().count() < at_least {
            return Err(self.fail(format!(
                "expected whitespace at {}",
                self.peek_context()
            )));
        }
        Ok(())
    }

    fn word(&mut self, what: &str) -> ParseResult<&'a str> {
        let word = self.take_while(|ch| ch.is_alphanumeric() || ch == '_');
        if word.is_empty() {
            return Err(self.fail(format!("expected {what} at {}", self.peek_context())));
        }
        Ok(word)
    }

    fn digits(&mut self, what: &str) -> ParseResult<&'a str> {
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        if digits.is_empty() {
            return Err(self.fail(format!("expected {what} at {}", self.peek_context())));
        }
        Ok(digits)
    }

    fn number(&mut self, what: &str) -> ParseResult<u32> {
        let digits = self.digits(what)?;
        digits
            .parse()
            .map_err(|_| self.fail(format!("{what} '{digits}' is out of range")))
    }

    /// `m:ss` or `h:mm:ss`.
    fn clock(&mut self, what: &str) -> ParseResult<&'a str> {
        let start = self.rest;
        self.digits(what)?;
        let mut groups = 0;
        while self.rest.starts_with(':') {
            self.literal(":")?;
            self.digits(what)?;
            groups += 1;
        }
        if groups == 0 {
            return Err(self.fail(format!("{what} is missing ':'")));
        }
        Ok(&start[..start.len() - self.rest.len()])
    }

    fn flag(&mut self, label: &str) -> ParseResult<bool> {
        self.literal(label)?;
        self.blanks(0)?;
        let value = self.word(label.trim_end_matches(':'))?;
        Ok(value == "on")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/status/parser.rs"]
mod tests;
