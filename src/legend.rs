//! Legend parsing and back-reference resolution
//!
//! A legend line has the form `<symbol>: <expression>`. Expressions are small
//! call trees whose leaves may be `@<char>` placeholders naming the position of
//! a character in the map section:
//!
//! ```text
//! C: Trigger(@A, @B)      trigger action "Trigger" targeting A and B
//! L: Lever(Toggle(@D))    tile "Lever" with trigger action "Toggle" on D
//! >: Conveyor(Right)      directional tile
//! k: Key(Red)             coloured tile
//! i: Ice                  custom tile without payload
//! ```
//!
//! Parsing produces an [`Expr`] tree with explicit placeholder nodes. Resolution
//! then types the tree into a [`CustomTile`] and binds every placeholder to the
//! single map position of its character.

use crate::error::{CompileError, ReferenceError};
use crate::models::{Color, CustomTile, Direction, Position, TilePayload, TriggerAction};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// Unresolved legend expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `@c` - position of the character `c` in the map
    Placeholder(char),
    /// Bare identifier, e.g. `Red` or `Up`
    Ident(String),
    /// `Name(arg, ...)`
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Placeholder characters in left-to-right order.
    pub fn placeholders(&self) -> Vec<char> {
        let mut out = Vec::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut Vec<char>) {
        match self {
            Expr::Placeholder(c) => out.push(*c),
            Expr::Ident(_) => {}
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_placeholders(out);
                }
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Placeholder(c) => write!(f, "@{}", c),
            Expr::Ident(name) => f.write_str(name),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One parsed, unresolved legend line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendLine {
    pub symbol: char,
    pub expr: Expr,
    /// 1-based line number in the level file
    pub line: usize,
}

/// A resolved legend entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub symbol: char,
    pub tile: CustomTile,
    pub line: usize,
}

/// Resolved legend: symbol to custom tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    entries: HashMap<char, LegendEntry>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: char) -> Option<&CustomTile> {
        self.entries.get(&symbol).map(|e| &e.tile)
    }

    pub fn entry(&self, symbol: char) -> Option<&LegendEntry> {
        self.entries.get(&symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by their line in the file.
    pub fn entries(&self) -> Vec<&LegendEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.line);
        entries
    }

    fn insert(&mut self, entry: LegendEntry) {
        self.entries.insert(entry.symbol, entry);
    }
}

/// Every position of every character in the map section.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    positions: HashMap<char, Vec<Position>>,
}

impl PositionIndex {
    /// Index all characters of the map rows.
    pub fn build<S: AsRef<str>>(map_rows: &[S]) -> Self {
        let mut positions: HashMap<char, Vec<Position>> = HashMap::new();
        for (row, text) in map_rows.iter().enumerate() {
            for (column, ch) in text.as_ref().chars().enumerate() {
                positions.entry(ch).or_default().push(Position::new(row, column));
            }
        }
        Self { positions }
    }

    /// All positions of `ch`, in row-major order.
    pub fn positions(&self, ch: char) -> &[Position] {
        self.positions.get(&ch).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of occurrences of `ch`.
    pub fn count(&self, ch: char) -> usize {
        self.positions(ch).len()
    }

    /// The unique position of `target`, as referenced from legend `symbol`.
    pub fn lookup(&self, symbol: char, target: char) -> Result<Position, ReferenceError> {
        match self.positions(target) {
            [] => Err(ReferenceError::Unresolved { symbol, target }),
            [only] => Ok(*only),
            many => Err(ReferenceError::Ambiguous {
                symbol,
                target,
                count: many.len(),
                first: many[0],
            }),
        }
    }
}

/// Parse one non-blank legend line of the form `<symbol>: <expression>`.
pub fn parse_legend_line(text: &str, line: usize) -> Result<LegendLine, CompileError> {
    let text = text.trim();
    let mut chars = text.chars();
    let symbol =
        chars.next().ok_or_else(|| CompileError::format(line, "empty legend line"))?;
    let rest = chars.as_str().trim_start();
    let body = rest.strip_prefix(':').ok_or_else(|| {
        CompileError::format(
            line,
            format!("expected `<symbol>: <expression>`, missing ':' separator in '{}'", text),
        )
    })?;

    let expr = ExprParser::new(body, line).parse()?;
    Ok(LegendLine { symbol, expr, line })
}

/// Recursive-descent parser for legend expressions.
struct ExprParser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
}

impl<'a> ExprParser<'a> {
    fn new(src: &'a str, line: usize) -> Self {
        Self { src, chars: src.char_indices().peekable(), line }
    }

    fn parse(mut self) -> Result<Expr, CompileError> {
        self.skip_ws();
        if self.chars.peek().is_none() {
            return Err(self.error("missing expression after ':'"));
        }
        let expr = self.parse_call()?;
        self.skip_ws();
        if let Some(&(_, c)) = self.chars.peek() {
            return Err(self.error(format!("unexpected '{}' after expression", c)));
        }
        Ok(expr)
    }

    fn parse_call(&mut self) -> Result<Expr, CompileError> {
        let name = self.parse_ident()?;
        self.skip_ws();
        if !self.eat('(') {
            return Ok(Expr::Ident(name));
        }

        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(')') {
            return Ok(Expr::Call { name, args });
        }
        loop {
            args.push(self.parse_arg()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                break;
            }
            return Err(match self.chars.peek() {
                Some(&(_, c)) => self.error(format!("expected ',' or ')' but found '{}'", c)),
                None => self.error(format!("unclosed '(' in call to {}", name)),
            });
        }
        Ok(Expr::Call { name, args })
    }

    fn parse_arg(&mut self) -> Result<Expr, CompileError> {
        self.skip_ws();
        if self.eat('@') {
            return match self.chars.next() {
                Some((_, c)) if !c.is_whitespace() => Ok(Expr::Placeholder(c)),
                _ => Err(self.error("'@' must be followed by a map character")),
            };
        }
        self.parse_call()
    }

    fn parse_ident(&mut self) -> Result<String, CompileError> {
        self.skip_ws();
        let start = match self.chars.peek() {
            Some(&(i, c)) if c.is_ascii_alphabetic() || c == '_' => i,
            Some(&(_, c)) => return Err(self.error(format!("expected a name but found '{}'", c))),
            None => return Err(self.error("expected a name but reached end of line")),
        };
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Ok(self.src[start..end].to_string())
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::format(self.line, message)
    }
}

/// Type a parsed legend line into a custom tile, binding placeholders.
pub fn resolve_entry(
    parsed: &LegendLine,
    index: &PositionIndex,
) -> Result<LegendEntry, CompileError> {
    let symbol = parsed.symbol;
    let line = parsed.line;
    let unsupported = || {
        CompileError::format(line, format!("unsupported legend expression '{}'", parsed.expr))
    };

    let tile = match &parsed.expr {
        Expr::Ident(name) => CustomTile::plain(name.clone()),
        Expr::Call { name, args } => {
            if args.iter().all(|a| matches!(a, Expr::Placeholder(_))) {
                let action = resolve_trigger(symbol, name, args, index)?;
                CustomTile::with_payload(name.clone(), TilePayload::Trigger(action))
            } else {
                match args.as_slice() {
                    [Expr::Ident(word)] => {
                        let payload = match Direction::from_keyword(word) {
                            Some(dir) => TilePayload::Direction(dir),
                            None => TilePayload::Color(Color::new(word.clone())),
                        };
                        CustomTile::with_payload(name.clone(), payload)
                    }
                    [Expr::Call { name: action, args: targets }]
                        if targets.iter().all(|a| matches!(a, Expr::Placeholder(_))) =>
                    {
                        let action = resolve_trigger(symbol, action, targets, index)?;
                        CustomTile::with_payload(name.clone(), TilePayload::Trigger(action))
                    }
                    _ => return Err(unsupported()),
                }
            }
        }
        Expr::Placeholder(_) => return Err(unsupported()),
    };

    Ok(LegendEntry { symbol, tile, line })
}

fn resolve_trigger(
    symbol: char,
    action: &str,
    args: &[Expr],
    index: &PositionIndex,
) -> Result<TriggerAction, ReferenceError> {
    let targets = args
        .iter()
        .filter_map(|a| match a {
            Expr::Placeholder(c) => Some(index.lookup(symbol, *c)),
            _ => None,
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TriggerAction { action: action.to_string(), targets })
}

/// Parse and resolve all legend lines against the map rows.
///
/// Blank lines are skipped. A symbol defined twice is a format error.
pub fn resolve_legend<S: AsRef<str>>(
    map_rows: &[S],
    legend_lines: &[(usize, String)],
) -> Result<Legend, CompileError> {
    let index = PositionIndex::build(map_rows);
    let mut legend = Legend::new();

    for (line, text) in legend_lines {
        if text.trim().is_empty() {
            continue;
        }
        let parsed = parse_legend_line(text, *line)?;
        if let Some(previous) = legend.entry(parsed.symbol) {
            return Err(CompileError::format(
                *line,
                format!(
                    "legend symbol '{}' is already defined on line {}",
                    parsed.symbol, previous.line
                ),
            ));
        }
        legend.insert(resolve_entry(&parsed, &index)?);
    }

    Ok(legend)
}
