//! Форматирование записи в байты:
//! `YYYY-MM-DD HH:MM:SS.uuuuuu LEVEL file:llll <message>\n`.
//!
//! Числовые поля пишутся арифметикой по цифрам, без `format!`.
//! Сообщение без шаблона: аргументы через пробел, перед ними ещё один пробел.
//! С шаблоном: `{}`, `{N}`, `{:spec}`, `{{`/`}}`. Форматтер никогда не падает.

use std::fmt::Write as _;
use std::io::Write as _;

use crate::clock::Stamp;
use crate::record::{Arg, LogRecord};

pub const TIMESTAMP_LEN: usize = 27;

// Ширина и точность больше этого считаются нераспознанным плейсхолдером
const MAX_SPEC_NUMBER: usize = u16::MAX as usize;

#[inline]
fn digit(n: u32) -> u8 {
    b'0' + (n % 10) as u8
}

/// `YYYY-MM-DD HH:MM:SS.uuuuuu ` (с завершающим пробелом).
pub fn timestamp_bytes(s: &Stamp) -> [u8; TIMESTAMP_LEN] {
    let us = s.micros;
    [
        digit(s.year / 1000),
        digit(s.year / 100),
        digit(s.year / 10),
        digit(s.year),
        b'-',
        digit(s.month / 10),
        digit(s.month),
        b'-',
        digit(s.day / 10),
        digit(s.day),
        b' ',
        digit(s.hour / 10),
        digit(s.hour),
        b':',
        digit(s.minute / 10),
        digit(s.minute),
        b':',
        digit(s.second / 10),
        digit(s.second),
        b'.',
        digit(us / 100_000),
        digit(us / 10_000),
        digit(us / 1_000),
        digit(us / 100),
        digit(us / 10),
        digit(us),
        b' ',
    ]
}

/// `:llll ` — номер строки по модулю 10000.
fn line_bytes(line: u32) -> [u8; 6] {
    [
        b':',
        digit(line / 1000),
        digit(line / 100),
        digit(line / 10),
        digit(line),
        b' ',
    ]
}

/// Дописывает запись целиком в `buf`, возвращает её длину в байтах.
pub fn format_record(record: &LogRecord, stamp: &Stamp, buf: &mut Vec<u8>) -> usize {
    let start = buf.len();
    buf.extend_from_slice(&timestamp_bytes(stamp));
    buf.extend_from_slice(record.level.token());
    buf.extend_from_slice(record.site.file.as_bytes());
    buf.extend_from_slice(&line_bytes(record.site.line));
    match record.template.as_deref() {
        None => {
            buf.push(b' ');
            write_values(buf, &record.args);
        }
        Some(template) => render_template(buf, template, &record.args),
    }
    buf.push(b'\n');
    buf.len() - start
}

fn write_values(buf: &mut Vec<u8>, args: &[Arg]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_arg(buf, arg);
    }
}

fn write_arg(buf: &mut Vec<u8>, arg: &Arg) {
    match arg {
        Arg::Str(s) => buf.extend_from_slice(s.as_bytes()),
        other => {
            let _ = write!(buf, "{}", other);
        }
    }
}

// ===== Шаблоны =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Display,
    Debug,
    LowerHex,
    UpperHex,
    Octal,
    Binary,
    LowerExp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spec {
    fill: char,
    align: Option<Align>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Kind,
}

impl Spec {
    const PLAIN: Spec = Spec {
        fill: ' ',
        align: None,
        zero: false,
        width: 0,
        precision: None,
        kind: Kind::Display,
    };

    fn parse(s: &str) -> Option<Spec> {
        let mut spec = Spec::PLAIN;
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        };
        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            spec.fill = chars[0];
            spec.align = align_of(chars[1]);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(align_of) {
            spec.align = Some(align);
            i = 1;
        }

        if chars.get(i) == Some(&'0') {
            spec.zero = true;
            i += 1;
        }

        let (width, next) = parse_number(&chars, i);
        spec.width = width.unwrap_or(0);
        if spec.width > MAX_SPEC_NUMBER {
            return None;
        }
        i = next;

        if chars.get(i) == Some(&'.') {
            let (precision, next) = parse_number(&chars, i + 1);
            let precision = precision?;
            if precision > MAX_SPEC_NUMBER {
                return None;
            }
            spec.precision = Some(precision);
            i = next;
        }

        let rest: String = chars[i..].iter().collect();
        spec.kind = match rest.as_str() {
            "" => Kind::Display,
            "?" => Kind::Debug,
            "x" => Kind::LowerHex,
            "X" => Kind::UpperHex,
            "o" => Kind::Octal,
            "b" => Kind::Binary,
            "e" => Kind::LowerExp,
            _ => return None,
        };
        Some(spec)
    }
}

fn parse_number(chars: &[char], mut i: usize) -> (Option<usize>, usize) {
    let start = i;
    let mut n: usize = 0;
    while let Some(d) = chars.get(i).and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(d as usize);
        i += 1;
    }
    if i == start {
        (None, i)
    } else {
        (Some(n), i)
    }
}

/// Подставляет аргументы в шаблон. Лишние аргументы дописываются в конец,
/// недостающие помечаются `{!missing}`, нераспознанные плейсхолдеры копируются как есть.
pub fn render_template(buf: &mut Vec<u8>, template: &str, args: &[Arg]) {
    let bytes = template.as_bytes();
    let mut used = vec![false; args.len()];
    let mut next = 0usize;
    let mut literal_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                buf.extend_from_slice(&bytes[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                buf.extend_from_slice(&bytes[literal_start..=i]);
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let Some(len) = template[i + 1..].find('}') else {
                    // Незакрытая скобка: остаток шаблона как есть
                    break;
                };
                let close = i + 1 + len;
                let inner = &template[i + 1..close];
                let Some((index, spec)) = parse_placeholder(inner) else {
                    i = close + 1;
                    continue;
                };
                buf.extend_from_slice(&bytes[literal_start..i]);
                let index = index.unwrap_or_else(|| {
                    let n = next;
                    next += 1;
                    n
                });
                match args.get(index) {
                    Some(arg) => {
                        used[index] = true;
                        write_with_spec(buf, arg, &spec);
                    }
                    None => buf.extend_from_slice(b"{!missing}"),
                }
                i = close + 1;
                literal_start = i;
            }
            _ => i += 1,
        }
    }
    buf.extend_from_slice(&bytes[literal_start..]);

    let mut extra = args
        .iter()
        .enumerate()
        .filter(|(i, _)| !used[*i])
        .peekable();
    if extra.peek().is_some() {
        buf.extend_from_slice(b" {!extra:");
        for (_, arg) in extra {
            buf.push(b' ');
            write_arg(buf, arg);
        }
        buf.push(b'}');
    }
}

fn parse_placeholder(inner: &str) -> Option<(Option<usize>, Spec)> {
    let (index, spec) = match inner.split_once(':') {
        Some((index, spec)) => (index, Spec::parse(spec)?),
        None => (inner, Spec::PLAIN),
    };
    if index.is_empty() {
        return Some((None, spec));
    }
    if !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().map(|n| (Some(n), spec))
}

fn write_with_spec(buf: &mut Vec<u8>, arg: &Arg, spec: &Spec) {
    if *spec == Spec::PLAIN {
        write_arg(buf, arg);
        return;
    }

    let mut body = String::new();
    render_body(&mut body, arg, spec);

    let len = body.chars().count();
    if len >= spec.width {
        buf.extend_from_slice(body.as_bytes());
        return;
    }
    let pad = spec.width - len;
    let numeric = !matches!(arg, Arg::Str(_) | Arg::Char(_) | Arg::Bool(_));

    if spec.zero && spec.align.is_none() && numeric {
        let (sign, digits) = match body.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", body.as_str()),
        };
        buf.extend_from_slice(sign.as_bytes());
        buf.resize(buf.len() + pad, b'0');
        buf.extend_from_slice(digits.as_bytes());
        return;
    }

    let align = spec
        .align
        .unwrap_or(if numeric { Align::Right } else { Align::Left });
    let (left, right) = match align {
        Align::Left => (0, pad),
        Align::Right => (pad, 0),
        Align::Center => (pad / 2, pad - pad / 2),
    };
    let mut fill = [0u8; 4];
    let fill = spec.fill.encode_utf8(&mut fill).as_bytes();
    for _ in 0..left {
        buf.extend_from_slice(fill);
    }
    buf.extend_from_slice(body.as_bytes());
    for _ in 0..right {
        buf.extend_from_slice(fill);
    }
}

fn render_body(out: &mut String, arg: &Arg, spec: &Spec) {
    let p = spec.precision;
    let _ = match (spec.kind, arg) {
        (Kind::LowerHex, Arg::Int(v)) => write!(out, "{:x}", v),
        (Kind::LowerHex, Arg::Uint(v)) => write!(out, "{:x}", v),
        (Kind::UpperHex, Arg::Int(v)) => write!(out, "{:X}", v),
        (Kind::UpperHex, Arg::Uint(v)) => write!(out, "{:X}", v),
        (Kind::Octal, Arg::Int(v)) => write!(out, "{:o}", v),
        (Kind::Octal, Arg::Uint(v)) => write!(out, "{:o}", v),
        (Kind::Binary, Arg::Int(v)) => write!(out, "{:b}", v),
        (Kind::Binary, Arg::Uint(v)) => write!(out, "{:b}", v),
        (Kind::LowerExp, Arg::Float(v)) => match p {
            Some(p) => write!(out, "{:.*e}", p, v),
            None => write!(out, "{:e}", v),
        },
        (Kind::LowerExp, Arg::Int(v)) => write!(out, "{:e}", v),
        (Kind::LowerExp, Arg::Uint(v)) => write!(out, "{:e}", v),
        (Kind::Debug, Arg::Str(s)) => write!(out, "{:?}", s),
        (Kind::Debug, Arg::Char(c)) => write!(out, "{:?}", c),
        (Kind::Debug, Arg::Float(v)) => match p {
            Some(p) => write!(out, "{:.*?}", p, v),
            None => write!(out, "{:?}", v),
        },
        (_, Arg::Float(v)) => match p {
            Some(p) => write!(out, "{:.*}", p, v),
            None => write!(out, "{}", v),
        },
        (_, Arg::Str(s)) => match p {
            Some(p) => write!(out, "{:.*}", p, s),
            None => write!(out, "{}", s),
        },
        // Тип спецификатора не подходит к значению: печатаем как есть
        (_, other) => write!(out, "{}", other),
    };
}
