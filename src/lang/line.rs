use super::lex::split_line_number;
use super::LineNumber;

/// A raw line of input split into its optional line number and source text.
/// Source text is normalized the way the tokenizer would read it: trimmed
/// and uppercased outside of string literals and remarks.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    number: LineNumber,
    source: String,
}

impl Line {
    pub fn new(raw: &str) -> Line {
        let (number, rest) = split_line_number(raw);
        Line {
            number,
            source: normalize(rest),
        }
    }

    pub fn number(&self) -> LineNumber {
        self.number
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_direct(&self) -> bool {
        self.number.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.number {
            Some(number) => write!(f, "{} {}", number, self.source),
            None => write!(f, "{}", self.source),
        }
    }
}

/// Uppercase outside string literals, leave `'` remark text alone, trim.
pub fn normalize(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut chars = source.trim().chars();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            in_string = !in_string;
        }
        if !in_string && ch == '\'' {
            out.push(ch);
            out.extend(chars.by_ref());
            break;
        }
        out.push(if in_string {
            ch
        } else {
            ch.to_ascii_uppercase()
        });
    }
    out
}
