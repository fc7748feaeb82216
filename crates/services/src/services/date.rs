//! Date parsing with the leniency of a browser `Date` constructor.
//!
//! Input is first read as an ISO date-time string (`YYYY`, `YYYY-MM`,
//! `YYYY-MM-DD`, optionally followed by `THH:mm[:ss[.sss]]` and `Z` or an
//! offset). Whatever that grammar does not consume is handed to a legacy
//! reader that understands slash dates, month names, AM/PM and zone names,
//! so `05/07/2025`, `2025/05/07`, `May 7, 2025` and RFC 2822 all parse.
//! Times without a zone are read as UTC.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use super::value::is_js_whitespace;

/// Digits past this count are scanned but do not change a number's value.
const MAX_SIGNIFICANT_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordKind {
    MonthName,
    AmPm,
    TimeZoneName,
    TimeSeparator,
}

const KEYWORDS: [(&str, KeywordKind, i64); 27] = [
    ("jan", KeywordKind::MonthName, 1),
    ("feb", KeywordKind::MonthName, 2),
    ("mar", KeywordKind::MonthName, 3),
    ("apr", KeywordKind::MonthName, 4),
    ("may", KeywordKind::MonthName, 5),
    ("jun", KeywordKind::MonthName, 6),
    ("jul", KeywordKind::MonthName, 7),
    ("aug", KeywordKind::MonthName, 8),
    ("sep", KeywordKind::MonthName, 9),
    ("oct", KeywordKind::MonthName, 10),
    ("nov", KeywordKind::MonthName, 11),
    ("dec", KeywordKind::MonthName, 12),
    ("am", KeywordKind::AmPm, 0),
    ("pm", KeywordKind::AmPm, 12),
    ("ut", KeywordKind::TimeZoneName, 0),
    ("utc", KeywordKind::TimeZoneName, 0),
    ("z", KeywordKind::TimeZoneName, 0),
    ("gmt", KeywordKind::TimeZoneName, 0),
    ("cdt", KeywordKind::TimeZoneName, -5),
    ("cst", KeywordKind::TimeZoneName, -6),
    ("edt", KeywordKind::TimeZoneName, -4),
    ("est", KeywordKind::TimeZoneName, -5),
    ("mdt", KeywordKind::TimeZoneName, -6),
    ("mst", KeywordKind::TimeZoneName, -7),
    ("pdt", KeywordKind::TimeZoneName, -7),
    ("pst", KeywordKind::TimeZoneName, -8),
    ("t", KeywordKind::TimeSeparator, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number { value: i64, len: usize },
    Symbol(char),
    Keyword { kind: KeywordKind, value: i64, len: usize },
    Word,
    WhiteSpace,
    Unknown,
    End,
}

impl Token {
    fn is_number_of_len(&self, n: usize) -> bool {
        matches!(*self, Token::Number { len, .. } if len == n)
    }

    fn number(&self) -> Option<i64> {
        match *self {
            Token::Number { value, .. } => Some(value),
            _ => None,
        }
    }

    fn is_sign(&self) -> bool {
        matches!(self, Token::Symbol('+' | '-'))
    }

    fn is_keyword_z(&self) -> bool {
        matches!(
            self,
            Token::Keyword {
                kind: KeywordKind::TimeZoneName,
                len: 1,
                ..
            }
        )
    }
}

fn lookup_keyword(word: &str) -> Option<(KeywordKind, i64)> {
    let lower = word.to_ascii_lowercase();
    let prefix: String = lower.chars().take(3).collect();
    KEYWORDS.iter().find_map(|&(name, kind, value)| {
        let matches = if kind == KeywordKind::MonthName {
            prefix == name
        } else {
            lower == name
        };
        matches.then_some((kind, value))
    })
}

struct Scanner {
    tokens: Vec<Token>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            tokens: tokenize(input),
            pos: 0,
        }
    }

    fn peek(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or(Token::End)
    }

    fn next(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn skip_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Token::Symbol(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let start = i;
            let mut value: i64 = 0;
            while i < chars.len() && chars[i].is_ascii_digit() {
                if i - start < MAX_SIGNIFICANT_DIGITS {
                    value = value * 10 + i64::from(chars[i] as u8 - b'0');
                }
                i += 1;
            }
            tokens.push(Token::Number {
                value,
                len: i - start,
            });
        } else if matches!(c, ':' | '-' | '+' | '.' | ')') {
            tokens.push(Token::Symbol(c));
            i += 1;
        } else if c >= 'A' && !is_js_whitespace(c) {
            let start = i;
            while i < chars.len() && chars[i] >= 'A' && !is_js_whitespace(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(match lookup_keyword(&word) {
                Some((kind, value)) => Token::Keyword {
                    kind,
                    value,
                    len: i - start,
                },
                None => Token::Word,
            });
        } else if is_js_whitespace(c) {
            while i < chars.len() && is_js_whitespace(chars[i]) {
                i += 1;
            }
            tokens.push(Token::WhiteSpace);
        } else if c == '(' {
            // Parenthesised comments are skipped, nesting included.
            let mut depth = 0usize;
            while i < chars.len() {
                match chars[i] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                i += 1;
                if depth == 0 {
                    break;
                }
            }
            tokens.push(Token::Unknown);
        } else {
            tokens.push(Token::Unknown);
            i += 1;
        }
    }

    tokens
}

fn is_month(n: i64) -> bool {
    (1..=12).contains(&n)
}

fn is_day(n: i64) -> bool {
    (1..=31).contains(&n)
}

fn is_hour(n: i64) -> bool {
    (0..=23).contains(&n)
}

fn is_minute(n: i64) -> bool {
    (0..=59).contains(&n)
}

fn is_millisecond(n: i64) -> bool {
    (0..=999).contains(&n)
}

/// Scales a fraction-of-second numeral to milliseconds from its leading digits.
fn read_milliseconds(value: i64, len: usize) -> i64 {
    match len {
        1 => value * 100,
        2 => value * 10,
        3 => value,
        _ => {
            let significant = len.min(MAX_SIGNIFICANT_DIGITS);
            value / 10i64.pow((significant - 3) as u32)
        }
    }
}

#[derive(Default)]
struct DayParts {
    comps: Vec<i64>,
    named_month: Option<i64>,
    iso: bool,
}

impl DayParts {
    fn add(&mut self, n: i64) -> bool {
        if self.comps.len() < 3 {
            self.comps.push(n);
            true
        } else {
            false
        }
    }

    /// Resolves the collected numbers into (year, month, day).
    fn resolve(&self) -> Option<(i64, i64, i64)> {
        if self.comps.is_empty() {
            return None;
        }
        let mut comps = self.comps.clone();
        comps.resize(3, 1);

        let (mut year, month, day) = match self.named_month {
            None if self.iso || !is_day(comps[0]) => (comps[0], comps[1], comps[2]),
            None => (comps[2], comps[0], comps[1]),
            Some(month) if !is_day(comps[0]) => (comps[0], month, comps[1]),
            Some(month) => (comps[1], month, comps[0]),
        };

        if !self.iso {
            if (0..=49).contains(&year) {
                year += 2000;
            } else if (50..=99).contains(&year) {
                year += 1900;
            }
        }

        (is_month(month) && is_day(day)).then_some((year, month, day))
    }
}

#[derive(Default)]
struct TimeParts {
    comps: Vec<i64>,
    hour_offset: Option<i64>,
}

impl TimeParts {
    const SIZE: usize = 4;

    fn is_empty(&self) -> bool {
        self.comps.is_empty()
    }

    fn add(&mut self, n: i64) -> bool {
        if self.comps.len() < Self::SIZE {
            self.comps.push(n);
            true
        } else {
            false
        }
    }

    fn add_final(&mut self, n: i64) -> bool {
        if !self.add(n) {
            return false;
        }
        self.comps.resize(Self::SIZE, 0);
        true
    }

    fn is_expecting(&self, n: i64) -> bool {
        match self.comps.len() {
            1 => is_minute(n),
            2 => is_minute(n),
            3 => is_millisecond(n),
            _ => false,
        }
    }

    /// Milliseconds since midnight.
    fn resolve(&self) -> Option<i64> {
        let mut comps = self.comps.clone();
        comps.resize(Self::SIZE, 0);
        let (mut hour, minute, second, millis) = (comps[0], comps[1], comps[2], comps[3]);

        if let Some(offset) = self.hour_offset {
            if !(0..=12).contains(&hour) {
                return None;
            }
            hour = hour % 12 + offset;
        }

        let in_range =
            is_hour(hour) && is_minute(minute) && is_minute(second) && is_millisecond(millis);
        let end_of_day = hour == 24 && minute == 0 && second == 0 && millis == 0;
        if !in_range && !end_of_day {
            return None;
        }

        Some(((hour * 60 + minute) * 60 + second) * 1000 + millis)
    }
}

#[derive(Default)]
struct ZoneParts {
    sign: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
}

impl ZoneParts {
    fn is_empty(&self) -> bool {
        self.hour.is_none()
    }

    fn set(&mut self, offset_hours: i64) {
        self.sign = Some(if offset_hours < 0 { -1 } else { 1 });
        self.hour = Some(offset_hours.abs());
        self.minute = Some(0);
    }

    fn is_utc(&self) -> bool {
        self.hour == Some(0) && self.minute == Some(0)
    }

    fn is_expecting(&self, n: i64) -> bool {
        self.hour.is_some() && self.minute.is_none() && is_minute(n)
    }

    /// Offset east of UTC in minutes; `None` when no zone was given.
    fn resolve(&self) -> Option<i64> {
        let sign = self.sign?;
        Some(sign * (self.hour.unwrap_or(0) * 60 + self.minute.unwrap_or(0)))
    }
}

struct Parts {
    day: DayParts,
    time: TimeParts,
    zone: ZoneParts,
}

enum IsoOutcome {
    /// The whole input matched the ISO grammar.
    Complete,
    /// The ISO grammar stopped here; the legacy reader continues from this token.
    Continue(Token),
    Invalid,
}

fn parse_iso(scanner: &mut Scanner, parts: &mut Parts) -> IsoOutcome {
    let day = &mut parts.day;
    let time = &mut parts.time;
    let zone = &mut parts.zone;

    if scanner.peek().is_sign() {
        let sign_token = scanner.next();
        if !scanner.peek().is_number_of_len(6) {
            return IsoOutcome::Continue(sign_token);
        }
        let sign = if sign_token == Token::Symbol('-') { -1 } else { 1 };
        let year = scanner.next().number().unwrap_or(0);
        if sign < 0 && year == 0 {
            return IsoOutcome::Continue(sign_token);
        }
        day.add(sign * year);
    } else if scanner.peek().is_number_of_len(4) {
        day.add(scanner.next().number().unwrap_or(0));
    } else {
        return IsoOutcome::Continue(scanner.next());
    }

    if scanner.skip_symbol('-') {
        let month = scanner.peek();
        if !month.is_number_of_len(2) || !month.number().is_some_and(is_month) {
            return IsoOutcome::Continue(scanner.next());
        }
        day.add(scanner.next().number().unwrap_or(0));
        if scanner.skip_symbol('-') {
            let dom = scanner.peek();
            if !dom.is_number_of_len(2) || !dom.number().is_some_and(is_day) {
                return IsoOutcome::Continue(scanner.next());
            }
            day.add(scanner.next().number().unwrap_or(0));
        }
    }

    let is_separator = matches!(
        scanner.peek(),
        Token::Keyword {
            kind: KeywordKind::TimeSeparator,
            ..
        }
    );
    if !is_separator {
        if scanner.peek() != Token::End {
            return IsoOutcome::Continue(scanner.next());
        }
    } else {
        scanner.next();

        let hour = scanner.peek();
        let Some(hour_value) = hour.number().filter(|h| (0..=24).contains(h)) else {
            return IsoOutcome::Invalid;
        };
        if !hour.is_number_of_len(2) {
            return IsoOutcome::Invalid;
        }
        let hour_is_24 = hour_value == 24;
        scanner.next();

        if !scanner.skip_symbol(':') {
            return IsoOutcome::Invalid;
        }
        let minute = scanner.peek();
        let minute_ok = minute.is_number_of_len(2)
            && minute.number().is_some_and(is_minute)
            && !(hour_is_24 && minute.number() != Some(0));
        if !minute_ok {
            return IsoOutcome::Invalid;
        }
        time.add(hour_value);
        time.add(scanner.next().number().unwrap_or(0));

        if scanner.skip_symbol(':') {
            let second = scanner.peek();
            let second_ok = second.is_number_of_len(2)
                && second.number().is_some_and(is_minute)
                && !(hour_is_24 && second.number() != Some(0));
            if !second_ok {
                return IsoOutcome::Invalid;
            }
            time.add(scanner.next().number().unwrap_or(0));

            if scanner.skip_symbol('.') {
                let Token::Number { value, len } = scanner.peek() else {
                    return IsoOutcome::Invalid;
                };
                if hour_is_24 && value > 0 {
                    return IsoOutcome::Invalid;
                }
                scanner.next();
                time.add(read_milliseconds(value, len));
            }
        }

        if scanner.peek().is_keyword_z() {
            scanner.next();
            zone.set(0);
        } else if scanner.peek().is_sign() {
            zone.sign = Some(if scanner.next() == Token::Symbol('-') { -1 } else { 1 });
            if let Token::Number { value, len: 4 } = scanner.peek() {
                let (h, m) = (value / 100, value % 100);
                if !is_hour(h) || !is_minute(m) {
                    return IsoOutcome::Invalid;
                }
                scanner.next();
                zone.hour = Some(h);
                zone.minute = Some(m);
            } else {
                let h = scanner.peek();
                if !h.is_number_of_len(2) || !h.number().is_some_and(is_hour) {
                    return IsoOutcome::Invalid;
                }
                zone.hour = scanner.next().number();
                if !scanner.skip_symbol(':') {
                    return IsoOutcome::Invalid;
                }
                let m = scanner.peek();
                if !m.is_number_of_len(2) || !m.number().is_some_and(is_minute) {
                    return IsoOutcome::Invalid;
                }
                zone.minute = scanner.next().number();
            }
        }

        if scanner.peek() != Token::End {
            return IsoOutcome::Invalid;
        }
    }

    // Date-only ISO forms are UTC by definition.
    if zone.is_empty() && time.is_empty() {
        zone.set(0);
    }
    day.iso = true;
    IsoOutcome::Complete
}

fn parse_legacy(scanner: &mut Scanner, parts: &mut Parts, first: Token) -> bool {
    let day = &mut parts.day;
    let time = &mut parts.time;
    let zone = &mut parts.zone;

    let mut has_read_number = !day.comps.is_empty();
    let mut token = first;

    while token != Token::End {
        match token {
            Token::Number { value: n, .. } => {
                has_read_number = true;
                if scanner.skip_symbol(':') {
                    if scanner.skip_symbol(':') {
                        if !time.is_empty() {
                            return false;
                        }
                        time.add(n);
                        time.add(0);
                    } else {
                        if !time.add(n) {
                            return false;
                        }
                        scanner.skip_symbol('.');
                    }
                } else if scanner.skip_symbol('.') && time.is_expecting(n) {
                    time.add(n);
                    let Token::Number { value, len } = scanner.peek() else {
                        return false;
                    };
                    scanner.next();
                    if !time.add_final(read_milliseconds(value, len)) {
                        return false;
                    }
                } else if zone.is_expecting(n) {
                    zone.minute = Some(n);
                } else if time.is_expecting(n) {
                    time.add_final(n);
                    let after = scanner.peek();
                    let ends_time = matches!(after, Token::End | Token::WhiteSpace)
                        || after.is_keyword_z()
                        || after.is_sign();
                    if !ends_time {
                        return false;
                    }
                } else {
                    if !day.add(n) {
                        return false;
                    }
                    scanner.skip_symbol('-');
                }
            }
            Token::Keyword { kind, value, .. } => match kind {
                KeywordKind::AmPm if !time.is_empty() => time.hour_offset = Some(value),
                KeywordKind::MonthName => {
                    day.named_month = Some(value);
                    scanner.skip_symbol('-');
                }
                KeywordKind::TimeZoneName if has_read_number => zone.set(value),
                _ => {
                    if has_read_number || matches!(scanner.peek(), Token::Number { .. }) {
                        return false;
                    }
                }
            },
            Token::Word => {
                // Stray words are tolerated only before the first number.
                if has_read_number || matches!(scanner.peek(), Token::Number { .. }) {
                    return false;
                }
            }
            Token::Symbol('+' | '-') if zone.is_utc() || !time.is_empty() => {
                zone.sign = Some(if token == Token::Symbol('-') { -1 } else { 1 });
                let (n, len) = match scanner.peek() {
                    Token::Number { value, len } => {
                        scanner.next();
                        (value, len)
                    }
                    _ => (0, 0),
                };
                has_read_number = true;

                if scanner.peek() == Token::Symbol(':') {
                    zone.hour = Some(n);
                    zone.minute = None;
                } else if len == 1 || len == 2 {
                    zone.hour = Some(n);
                    zone.minute = Some(0);
                } else if len == 3 || len == 4 {
                    zone.hour = Some(n / 100);
                    zone.minute = Some(n % 100);
                } else {
                    return false;
                }
            }
            Token::Symbol('+' | '-' | ')') if has_read_number => return false,
            _ => {}
        }
        token = scanner.next();
    }

    true
}

/// Parses `raw` as a date, returning the UTC instant it names.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let mut scanner = Scanner::new(raw);
    let mut parts = Parts {
        day: DayParts::default(),
        time: TimeParts::default(),
        zone: ZoneParts::default(),
    };

    match parse_iso(&mut scanner, &mut parts) {
        IsoOutcome::Complete => {}
        IsoOutcome::Invalid => return None,
        IsoOutcome::Continue(token) => {
            if !parse_legacy(&mut scanner, &mut parts, token) {
                return None;
            }
        }
    }

    let (year, month, day) = parts.day.resolve()?;
    let millis_of_day = parts.time.resolve()?;
    let offset_minutes = parts.zone.resolve().unwrap_or(0);

    // Days past the end of the month roll over, as `Date` does.
    let first_of_month = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month as u32, 1)?;
    let date = first_of_month.checked_add_signed(TimeDelta::try_days(day - 1)?)?;
    let millis = millis_of_day - offset_minutes * 60_000;
    let instant = date
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;

    Some(instant.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn ymd(raw: &str) -> (i32, u32, u32) {
        let date = parse_date(raw).unwrap_or_else(|| panic!("{raw:?} should parse"));
        (date.year(), date.month(), date.day())
    }

    fn rfc3339(raw: &str) -> String {
        parse_date(raw)
            .unwrap_or_else(|| panic!("{raw:?} should parse"))
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    #[test]
    fn test_iso_reduced_precision() {
        assert_eq!(rfc3339("2025"), "2025-01-01T00:00:00.000Z");
        assert_eq!(rfc3339("2025-05"), "2025-05-01T00:00:00.000Z");
        assert_eq!(rfc3339("2025-05-07"), "2025-05-07T00:00:00.000Z");
        assert_eq!(rfc3339("+002025-05-07"), "2025-05-07T00:00:00.000Z");
    }

    #[test]
    fn test_iso_with_time_and_zone() {
        assert_eq!(rfc3339("2025-05-07T10:30Z"), "2025-05-07T10:30:00.000Z");
        assert_eq!(rfc3339("2025-05-07T10:30"), "2025-05-07T10:30:00.000Z");
        assert_eq!(rfc3339("2025-05-07T10:30:15"), "2025-05-07T10:30:15.000Z");
        assert_eq!(
            rfc3339("2025-05-07T10:30:00.123-03:00"),
            "2025-05-07T13:30:00.123Z"
        );
        assert_eq!(rfc3339("2025-05-07T10:30:00.5+0200"), "2025-05-07T08:30:00.500Z");
        assert_eq!(rfc3339("2025-05-07T24:00"), "2025-05-08T00:00:00.000Z");
    }

    #[test]
    fn test_slash_and_dash_dates() {
        assert_eq!(ymd("05/07/2025"), (2025, 5, 7));
        assert_eq!(ymd("2025/05/07"), (2025, 5, 7));
        assert_eq!(ymd("5-7-2025"), (2025, 5, 7));
        assert_eq!(ymd("1/2/99"), (1999, 1, 2));
        assert_eq!(ymd("1/2/03"), (2003, 1, 2));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(ymd("May 7, 2025"), (2025, 5, 7));
        assert_eq!(ymd("7 May 2025"), (2025, 5, 7));
        assert_eq!(ymd("September 30 2024"), (2024, 9, 30));
        assert_eq!(ymd("2025 Dec 25"), (2025, 12, 25));
        assert_eq!(ymd("May 2025"), (2025, 5, 1));
    }

    #[test]
    fn test_legacy_times_and_zones() {
        assert_eq!(rfc3339("2025-05-07 10:30:15"), "2025-05-07T10:30:15.000Z");
        assert_eq!(
            rfc3339("Wed, 07 May 2025 10:30:00 +0000"),
            "2025-05-07T10:30:00.000Z"
        );
        assert_eq!(rfc3339("May 7, 2025 10:30 GMT+0200"), "2025-05-07T08:30:00.000Z");
        assert_eq!(rfc3339("May 7, 2025 10:30 EST"), "2025-05-07T15:30:00.000Z");
        assert_eq!(rfc3339("05/07/2025 3:15 PM"), "2025-05-07T15:15:00.000Z");
        assert_eq!(rfc3339("05/07/2025 12:00 am"), "2025-05-07T00:00:00.000Z");
        assert_eq!(
            rfc3339("Thu May 07 2025 10:30:00 GMT+0000 (Coordinated Universal Time)"),
            "2025-05-07T10:30:00.000Z"
        );
    }

    #[test]
    fn test_day_overflow_rolls_into_next_month() {
        assert_eq!(ymd("2025-02-30"), (2025, 3, 2));
        assert_eq!(ymd("02/31/2025"), (2025, 3, 3));
    }

    #[test]
    fn test_rejects() {
        for raw in [
            "",
            "abc",
            "not-a-date",
            "10:30",
            "2025-13-01",
            "13/01/2025",
            "2025-05-32",
            "2025-05-07T25:00",
            "2025-05-07T10",
            "2025-05-07T10:30:00Zjunk",
            "2025-05-07T24:30",
            "May 7 2025 hello",
            "05/07/2025 13:00 PM",
            "1/2/3/4",
        ] {
            assert_eq!(parse_date(raw), None, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_surrounding_whitespace() {
        let date = parse_date("\u{FEFF} 2025-05-07 ").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 5, 7));
        assert_eq!(date.hour(), 0);
    }
}
