//! Two-pass preprocessing: pass 1 builds the symbol table and the image's high-water mark
//! in one traversal, pass 2 lays out constants and extracts the code region in a second.
//! The source traversed the program three times for these three concerns; design note 2
//! folds them into the two passes below.

use std::collections::HashMap;

use log::debug;
use super32::MemoryImage;

use crate::error::{AssembleError, DirectiveError, SourceError};

pub type SymbolTable = HashMap<String, u32>;

pub struct PreprocessResult {
    pub code_address: u32,
    pub code_lines: Vec<(String, u32)>,
    pub image: MemoryImage,
    pub symbols: SymbolTable,
}

/// Drops empty lines and lines whose first non-space character is `'`, retaining each
/// surviving line's original 1-based index.
pub fn strip_lines(source: &str) -> Vec<(String, u32)> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('\'') {
                None
            } else {
                Some((trimmed.to_string(), (idx + 1) as u32))
            }
        })
        .collect()
}

fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.find(':') {
        Some(idx) => (Some(line[..idx].trim()), line[idx + 1..].trim()),
        None => (None, line),
    }
}

pub fn parse_number(text: &str, line: u32) -> Result<i64, SourceError> {
    if let Some(hex) = text.strip_prefix('$') {
        i64::from_str_radix(hex, 16).map_err(|_| SourceError::BadNumericLiteral {
            line,
            text: text.to_string(),
        })
    } else {
        text.parse::<i64>().map_err(|_| SourceError::BadNumericLiteral {
            line,
            text: text.to_string(),
        })
    }
}

#[derive(Default)]
struct Cursor {
    address: u32,
    org_seen: bool,
}

enum Directive<'a> {
    Org(u32),
    Define(i64),
    Start,
    End,
    Other(&'a str),
    None,
}

fn classify<'a>(rest: &'a str, line: u32) -> Result<Directive<'a>, AssembleError> {
    if rest.is_empty() {
        return Ok(Directive::None);
    }
    let mut tokens = rest.split_whitespace();
    let head = tokens.next().unwrap();
    Ok(match head {
        "ORG" => {
            let text = tokens.next().ok_or(SourceError::BadNumericLiteral {
                line,
                text: String::new(),
            })?;
            let n = parse_number(text, line)?;
            Directive::Org(n as u32)
        }
        "DEFINE" => {
            let text = tokens.next().ok_or(SourceError::BadNumericLiteral {
                line,
                text: String::new(),
            })?;
            Directive::Define(parse_number(text, line)?)
        }
        "START" => Directive::Start,
        "END" => Directive::End,
        _ => Directive::Other(rest),
    })
}

fn pass1(lines: &[(String, u32)]) -> Result<(SymbolTable, u32), AssembleError> {
    let mut symbols = SymbolTable::new();
    let mut cursor = Cursor::default();
    let mut max_address = 0u32;

    for (text, line) in lines {
        let (label, rest) = split_label(text);
        if let Some(label) = label {
            if symbols.contains_key(label) {
                return Err(crate::error::LabelError::Collision {
                    line: *line,
                    label: label.to_string(),
                }
                .into());
            }
            symbols.insert(label.to_string(), cursor.address);
            if rest.is_empty() {
                cursor.address += 4;
                max_address = max_address.max(cursor.address);
                continue;
            }
        }
        match classify(rest, *line)? {
            Directive::Org(n) => {
                cursor.address = n;
                cursor.org_seen = true;
            }
            Directive::Define(_) => cursor.address += 4,
            Directive::Start | Directive::End => {}
            Directive::Other(_) => cursor.address += 4,
            Directive::None => {}
        }
        max_address = max_address.max(cursor.address);
    }

    if !cursor.org_seen {
        return Err(DirectiveError::MissingOrg.into());
    }

    Ok((symbols, max_address))
}

fn pass2(
    lines: &[(String, u32)],
    image_len_words: usize,
) -> Result<(MemoryImage, u32, Vec<(String, u32)>), AssembleError> {
    let mut image = MemoryImage::new(image_len_words);
    let mut cursor = Cursor::default();
    let mut code_address = None;
    let mut in_code = false;
    let mut seen_start = false;
    let mut seen_end = false;
    let mut code_lines = Vec::new();

    for (text, line) in lines {
        let (label, rest) = split_label(text);
        if label.is_some() && rest.is_empty() {
            cursor.address += 4;
            continue;
        }
        match classify(rest, *line)? {
            Directive::Org(n) => {
                cursor.address = n;
                cursor.org_seen = true;
            }
            Directive::Define(value) => {
                if !cursor.org_seen {
                    return Err(DirectiveError::DefineWithoutOrg { line: *line }.into());
                }
                image.write(cursor.address / 4, value as u32).expect(
                    "image sized by pass1's high-water mark; cursor stays within range",
                );
                debug!("line {}: DEFINE {:#x} at word {}", line, value, cursor.address / 4);
                cursor.address += 4;
            }
            Directive::Start => {
                if !cursor.org_seen {
                    return Err(DirectiveError::StartWithoutOrg { line: *line }.into());
                }
                code_address = Some(cursor.address);
                seen_start = true;
                in_code = true;
            }
            Directive::End => {
                seen_end = true;
                in_code = false;
            }
            Directive::Other(_) => {
                if in_code {
                    code_lines.push((rest.to_string(), *line));
                }
                cursor.address += 4;
            }
            Directive::None => {}
        }
    }

    if !seen_start || !seen_end {
        return Err(DirectiveError::MissingStartOrEnd.into());
    }

    Ok((image, code_address.expect("seen_start implies code_address is set"), code_lines))
}

pub fn preprocess(source: &str) -> Result<PreprocessResult, AssembleError> {
    let lines = strip_lines(source);
    let (symbols, max_address) = pass1(&lines)?;
    debug!("symbol table: {} label(s), high-water mark {:#x}", symbols.len(), max_address);
    let (image, code_address, code_lines) = pass2(&lines, (max_address / 4) as usize)?;
    debug!("code region: {} line(s) at word {}", code_lines.len(), code_address / 4);
    Ok(PreprocessResult {
        code_address,
        code_lines,
        image,
        symbols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let lines = strip_lines("\n' a comment\nORG 0\n\n  \nSTART\n");
        assert_eq!(lines, vec![("ORG 0".to_string(), 3), ("START".to_string(), 6)]);
    }

    #[test]
    fn missing_org_is_an_error() {
        let result = preprocess("START\nEND\n");
        assert!(matches!(result, Err(AssembleError::Directive(DirectiveError::MissingOrg))));
    }

    #[test]
    fn missing_end_is_an_error() {
        let result = preprocess("ORG 0\nSTART\nADD R1,R2,R3\n");
        assert!(matches!(
            result,
            Err(AssembleError::Directive(DirectiveError::MissingStartOrEnd))
        ));
    }

    #[test]
    fn labels_are_recorded_at_the_address_they_precede() {
        let result = preprocess("ORG 0\nLOOP:\nSTART\nADD R1,R2,R3\nBEQ R1,R2,LOOP\nEND\n").unwrap();
        assert_eq!(result.symbols.get("LOOP"), Some(&0));
        assert_eq!(result.code_address, 0);
        assert_eq!(result.code_lines.len(), 2);
    }

    #[test]
    fn define_lays_down_a_constant_and_advances() {
        let result = preprocess("ORG 0\nDEFINE 5\nSTART\nLI R1,R0,$A\nEND\n").unwrap();
        assert_eq!(result.image.read(0), Ok(5));
        assert_eq!(result.code_address, 4);
    }

    #[test]
    fn duplicate_label_is_a_collision() {
        let result = preprocess("ORG 0\nL:\nSTART\nL: ADD R1,R2,R3\nEND\n");
        assert!(matches!(
            result,
            Err(AssembleError::Label(crate::error::LabelError::Collision { .. }))
        ));
    }
}
