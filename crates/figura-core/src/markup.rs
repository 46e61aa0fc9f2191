//! Inline emphasis markup.
//!
//! Figure text (captions, labels, cell values) may carry lightweight
//! emphasis markers:
//!
//! | Markup | Result |
//! |--------|--------|
//! | `*text*` | italic |
//! | `**text**` | bold |
//! | `***text***` | bold italic |
//! | `\*` | a literal asterisk (any character can be escaped) |
//!
//! Markers that never find a matching closer are kept as literal text, so
//! parsing never fails.
//!
//! # Example
//!
//! ```
//! # use figura_core::markup::parse_emphasis;
//! let segments = parse_emphasis("Revenue **grew** by *12%*");
//! assert_eq!(segments.len(), 4);
//! assert_eq!(segments[1].text, "grew");
//! assert!(segments[1].bold);
//! assert!(segments[3].italic);
//! ```

use log::trace;
use winnow::{
    ModalResult, Parser as _,
    combinator::{alt, preceded, repeat},
    token::{any, take_till, take_while},
};

use crate::draw::StyledSegment;

/// Lexical pieces of a markup string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'src> {
    Text(&'src str),
    Escaped(char),
    /// A run of `*` characters of the given length
    Marker(usize),
}

/// How a marker token was resolved by the pairing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerRole {
    Open,
    Close,
}

fn text<'src>(input: &mut &'src str) -> ModalResult<Token<'src>> {
    take_till(1.., ['*', '\\'])
        .map(Token::Text)
        .parse_next(input)
}

fn escaped<'src>(input: &mut &'src str) -> ModalResult<Token<'src>> {
    preceded('\\', any).map(Token::Escaped).parse_next(input)
}

/// A trailing backslash with nothing left to escape.
fn lone_backslash<'src>(input: &mut &'src str) -> ModalResult<Token<'src>> {
    '\\'.map(|_| Token::Text("\\")).parse_next(input)
}

fn marker<'src>(input: &mut &'src str) -> ModalResult<Token<'src>> {
    take_while(1.., '*')
        .map(|run: &str| Token::Marker(run.len()))
        .parse_next(input)
}

fn tokens<'src>(input: &mut &'src str) -> ModalResult<Vec<Token<'src>>> {
    repeat(0.., alt((text, escaped, lone_backslash, marker))).parse_next(input)
}

/// Pairs opening and closing markers of equal length.
///
/// Markers left open when a closer matches an outer marker, and markers never
/// closed at all, resolve to `None` and are rendered literally.
fn pair_markers(tokens: &[Token<'_>]) -> Vec<Option<MarkerRole>> {
    let mut roles = vec![None; tokens.len()];
    let mut open: Vec<(usize, usize)> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let Token::Marker(len) = token else {
            continue;
        };
        if *len > 3 {
            continue;
        }

        match open.iter().rposition(|(open_len, _)| open_len == len) {
            Some(pos) => {
                let (_, open_idx) = open[pos];
                roles[open_idx] = Some(MarkerRole::Open);
                roles[idx] = Some(MarkerRole::Close);
                open.truncate(pos);
            }
            None => open.push((*len, idx)),
        }
    }

    roles
}

/// Parses emphasis markup into ordered styled segments.
///
/// Adjacent pieces with identical emphasis are merged; the result never
/// contains empty segments. An empty input yields no segments.
pub fn parse_emphasis(source: &str) -> Vec<StyledSegment> {
    let mut input = source;
    let tokens = match tokens.parse_next(&mut input) {
        Ok(tokens) => tokens,
        Err(_) => return vec![StyledSegment::plain(source)],
    };
    let roles = pair_markers(&tokens);

    let mut segments: Vec<StyledSegment> = Vec::new();
    let mut buffer = String::new();
    let mut bold_depth = 0usize;
    let mut italic_depth = 0usize;

    let flush = |buffer: &mut String, segments: &mut Vec<StyledSegment>, bold, italic| {
        if buffer.is_empty() {
            return;
        }
        let text = std::mem::take(buffer);
        match segments.last_mut() {
            Some(last) if last.bold == bold && last.italic == italic => last.text.push_str(&text),
            _ => segments.push(StyledSegment::new(text, bold, italic)),
        }
    };

    for (token, role) in tokens.iter().zip(&roles) {
        match (token, role) {
            (Token::Text(text), _) => buffer.push_str(text),
            (Token::Escaped(ch), _) => buffer.push(*ch),
            (Token::Marker(len), None) => buffer.push_str(&"*".repeat(*len)),
            (Token::Marker(len), Some(role)) => {
                flush(&mut buffer, &mut segments, bold_depth > 0, italic_depth > 0);
                let bold = *len >= 2;
                let italic = *len != 2;
                match role {
                    MarkerRole::Open => {
                        bold_depth += usize::from(bold);
                        italic_depth += usize::from(italic);
                    }
                    MarkerRole::Close => {
                        bold_depth = bold_depth.saturating_sub(usize::from(bold));
                        italic_depth = italic_depth.saturating_sub(usize::from(italic));
                    }
                }
            }
        }
    }
    flush(&mut buffer, &mut segments, bold_depth > 0, italic_depth > 0);

    // Anything the lexer could not consume is kept verbatim.
    if !input.is_empty() {
        segments.push(StyledSegment::plain(input));
    }

    trace!(source, segments = segments.len(); "Parsed emphasis markup");
    segments
}
