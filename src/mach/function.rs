use super::{Rng, Val};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Built-in functions. `GET` reads the console and is handled by the
/// executor; `RND` carries the runtime's generator; everything else is a
/// pure function of its arguments.
pub struct Function;

impl Function {
    pub fn arity(name: &str) -> Option<std::ops::RangeInclusive<usize>> {
        match name {
            "ABS" | "ASC" | "ATN" | "CHR$" | "COS" | "EXP" | "INT" | "LEN" | "LOG" | "SGN"
            | "SIN" | "SPC" | "SQR" | "STR$" | "TAB" | "TAN" | "VAL" => Some(1..=1),
            "LEFT$" | "RIGHT$" => Some(2..=2),
            "MID$" => Some(2..=3),
            "RND" => Some(0..=1),
            "GET" => Some(0..=0),
            _ => None,
        }
    }

    pub fn call(name: &str, args: &[Val]) -> Result<Val> {
        match name {
            "ABS" => Ok(Val::Number(args[0].as_number().abs())),
            "ATN" => Ok(Val::Number(args[0].as_number().atan())),
            "COS" => Ok(Val::Number(args[0].as_number().cos())),
            "EXP" => Ok(Val::Number(args[0].as_number().exp())),
            "INT" => Ok(Val::Number(args[0].as_number().floor())),
            "LOG" => Ok(Val::Number(args[0].as_number().ln())),
            "SGN" => Ok(Val::Number(Function::sgn(args[0].as_number()))),
            "SIN" => Ok(Val::Number(args[0].as_number().sin())),
            "SQR" => Ok(Val::Number(args[0].as_number().sqrt())),
            "TAN" => Ok(Val::Number(args[0].as_number().tan())),
            "LEN" => Ok(Val::Number(args[0].as_string().chars().count() as f64)),
            "LEFT$" => Ok(Val::Text(Function::left(&args[0].as_string(), args[1].as_int()))),
            "RIGHT$" => Ok(Val::Text(Function::right(&args[0].as_string(), args[1].as_int()))),
            "MID$" => Ok(Val::Text(Function::mid(
                &args[0].as_string(),
                args[1].as_int(),
                args.get(2).map(Val::as_int),
            ))),
            "CHR$" => Function::chr(args[0].as_int()),
            "ASC" => Ok(Val::Number(
                args[0]
                    .as_string()
                    .chars()
                    .next()
                    .map_or(0.0, |c| c as u32 as f64),
            )),
            "STR$" => Ok(Val::Text(Function::str(&args[0]))),
            "VAL" => Ok(Val::Number(Function::val(&args[0].as_string()))),
            "TAB" | "SPC" => Ok(Val::Text(" ".repeat(args[0].as_int().max(0) as usize))),
            _ => Err(error!(Runtime; "Unknown function {}", name)),
        }
    }

    pub fn rnd(rng: &mut Rng, arg: Option<&Val>) -> Val {
        let x = arg.map_or(1.0, Val::as_number);
        if x < 0.0 {
            rng.reseed(x.abs() as u32);
        }
        if x == 0.0 {
            Val::Number(rng.value())
        } else {
            Val::Number(rng.next())
        }
    }

    fn sgn(n: f64) -> f64 {
        if n > 0.0 {
            1.0
        } else if n < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    fn left(s: &str, n: i32) -> String {
        let n = n.max(0) as usize;
        s.chars().take(n).collect()
    }

    fn right(s: &str, n: i32) -> String {
        let n = n.max(0) as usize;
        let length = s.chars().count();
        s.chars().skip(length.saturating_sub(n)).collect()
    }

    /// `start` is 1-based; both bounds clamp to the string.
    fn mid(s: &str, start: i32, length: Option<i32>) -> String {
        let skip = (start.max(1) - 1) as usize;
        let rest = s.chars().skip(skip);
        match length {
            None => rest.collect(),
            Some(n) => rest.take(n.max(0) as usize).collect(),
        }
    }

    fn chr(code: i32) -> Result<Val> {
        match u32::try_from(code).ok().and_then(char::from_u32) {
            Some(ch) => Ok(Val::Text(ch.to_string())),
            None => Err(error!(Runtime; "Invalid character code {}", code)),
        }
    }

    fn str(value: &Val) -> String {
        let n = value.as_number();
        if n >= 0.0 {
            format!(" {}", Val::Number(n).as_string())
        } else {
            Val::Number(n).as_string()
        }
    }

    /// Scan a leading number: optional sign, digits, decimal point, and an
    /// `E`/`D` exponent; stop at the first character that does not fit.
    fn val(s: &str) -> f64 {
        let text = s.trim_start();
        let mut out = String::new();
        let mut chars = text.chars().peekable();
        if matches!(chars.peek(), Some('+') | Some('-')) {
            out.push(chars.next().unwrap());
        }
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            out.push(chars.next().unwrap());
        }
        if chars.peek() == Some(&'.') {
            out.push(chars.next().unwrap());
            while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
                out.push(chars.next().unwrap());
            }
        }
        if matches!(chars.peek(), Some('E') | Some('e') | Some('D') | Some('d')) {
            let before = out.len();
            chars.next();
            out.push('E');
            if matches!(chars.peek(), Some('+') | Some('-')) {
                out.push(chars.next().unwrap());
            }
            let mut digits = false;
            while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
                out.push(chars.next().unwrap());
                digits = true;
            }
            if !digits {
                out.truncate(before);
            }
        }
        out.parse::<f64>().unwrap_or(0.0)
    }
}
