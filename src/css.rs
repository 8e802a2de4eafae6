//! CSS-like transform strings.
//!
//! Nodes are positioned on the rendering surface with a transform such as
//! `translate(120px,40px) scale(1)`. The drag engine reads the current
//! position back out of that string and writes the updated one, so code
//! paths that mutate the transform directly stay consistent with dragging.
//!
//! Token order matters: `translate` is always written first because the
//! composition order of translate and scale changes the visual result.

use indexmap::IndexMap;

use crate::error::TransformParseError;
use crate::geometry::{logical_point, LogicalPoint};

/// An ordered list of transform functions and their raw arguments.
///
/// `"scale(1) translate(12px,2px)"` reads as
/// `{ scale: ["1"], translate: ["12px", "2px"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformList {
    functions: IndexMap<String, Vec<String>>,
}

impl TransformList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a transform string. An empty (or whitespace-only) string yields
    /// an empty list.
    pub fn parse(input: &str) -> Result<Self, TransformParseError> {
        let mut functions = IndexMap::new();
        let bytes = input.as_bytes();
        let mut pos = 0;

        loop {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }

            let name_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                pos += 1;
            }
            if pos == name_start
                || !bytes[name_start].is_ascii_alphabetic()
                || bytes.get(pos) != Some(&b'(')
            {
                return Err(TransformParseError::ExpectedName {
                    input: input.to_string(),
                    offset: name_start,
                });
            }
            let name = &input[name_start..pos];
            pos += 1;

            let close = input[pos..].find(')').map(|i| pos + i).ok_or_else(|| {
                TransformParseError::Unterminated {
                    input: input.to_string(),
                    name: name.to_string(),
                }
            })?;
            let raw = &input[pos..close];
            let allowed = |c: char| {
                c.is_ascii_alphanumeric()
                    || matches!(c, '.' | ',' | '-' | '+' | '%')
                    || c.is_whitespace()
            };
            if let Some(found) = raw.chars().find(|&c| !allowed(c)) {
                return Err(TransformParseError::InvalidArgument {
                    input: input.to_string(),
                    name: name.to_string(),
                    found,
                });
            }

            let args: Vec<String> = raw
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if args.is_empty() {
                return Err(TransformParseError::EmptyArguments {
                    input: input.to_string(),
                    name: name.to_string(),
                });
            }

            functions.insert(name.to_string(), args);
            pos = close + 1;
        }

        Ok(Self { functions })
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.functions.get(name).map(Vec::as_slice)
    }

    pub fn set<I, S>(&mut self, name: &str, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions
            .insert(name.to_string(), args.into_iter().map(Into::into).collect());
    }

    /// Replace the `translate` function with pixel arguments.
    pub fn set_translate_px(&mut self, x: f32, y: f32) {
        self.set("translate", [format!("{x}px"), format!("{y}px")]);
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Position encoded by `translate`, or `default` if there is none.
    ///
    /// Fails if `translate` does not carry exactly two numeric arguments.
    pub fn position_or(&self, default: LogicalPoint) -> Result<LogicalPoint, TransformParseError> {
        let Some(args) = self.get("translate") else {
            return Ok(default);
        };
        let invalid = || TransformParseError::InvalidTranslate { args: args.join(",") };
        if args.len() != 2 {
            return Err(invalid());
        }
        let x = parse_length(&args[0]).ok_or_else(invalid)?;
        let y = parse_length(&args[1]).ok_or_else(invalid)?;
        Ok(logical_point(x, y))
    }

    /// Write the list back, `translate` first, arguments joined by `separator`.
    pub fn write(&self, separator: &str) -> String {
        let translate = self.functions.get_key_value("translate");
        translate
            .into_iter()
            .chain(self.functions.iter().filter(|(name, _)| name.as_str() != "translate"))
            .map(|(name, args)| format!("{}({})", name, args.join(separator)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for TransformList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.write(","))
    }
}

impl std::str::FromStr for TransformList {
    type Err = TransformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Read a position from a transform string; a string without `translate`
/// resolves to the origin.
pub fn position_from_transform(input: &str) -> Result<LogicalPoint, TransformParseError> {
    TransformList::parse(input)?.position_or(logical_point(0.0, 0.0))
}

fn parse_length(arg: &str) -> Option<f32> {
    let number = arg.strip_suffix("px").unwrap_or(arg);
    number.parse::<f32>().ok().filter(|v| v.is_finite())
}
