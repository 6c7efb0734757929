//! Log message normalization.
//!
//! Turns a raw message into a signature (a template with its variable
//! tokens abstracted) plus the ordered list of tokens that were removed.
//! Two lines share a signature when they differ only in numbers, clock
//! times, addresses or identifiers, which is what the ingestor groups on.
//!
//! ```text
//! "Nozzle temp 215C at 10:22:01"  ──▶  "Nozzle temp {N}C at {TIME}"
//!                                      ["215", "10:22:01"]
//! ```
//!
//! Extraction is total: any input, including the empty string, produces a
//! result.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use ultiui_types::LogType;

/// Variable tokens, highest priority first. Alternation is leftmost-first,
/// so a UUID beginning with digits is never split into numbers.
static VARIABLE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
          (?P<uuid>\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b)
        | (?P<ip>\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b)
        | (?P<time>\b\d{1,2}:\d{2}:\d{2}(?:\.\d+)?\b)
        | (?P<hex>\b0[xX][0-9a-fA-F]+\b)
        | (?P<num>\d+(?:\.\d+)?)
        ",
    )
    .expect("variable token pattern is valid")
});

/// Kind of token abstracted out of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Uuid,
    Ip,
    Time,
    Hex,
    Number,
}

impl Placeholder {
    /// Text written into the signature.
    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::Uuid => "{UUID}",
            Placeholder::Ip => "{IP}",
            Placeholder::Time => "{TIME}",
            Placeholder::Hex => "{HEX}",
            Placeholder::Number => "{N}",
        }
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        if caps.name("uuid").is_some() {
            Placeholder::Uuid
        } else if caps.name("ip").is_some() {
            Placeholder::Ip
        } else if caps.name("time").is_some() {
            Placeholder::Time
        } else if caps.name("hex").is_some() {
            Placeholder::Hex
        } else {
            Placeholder::Number
        }
    }
}

/// Result of normalizing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub signature: String,
    pub parameters: Vec<String>,
    pub kind: LogType,
}

/// Normalize a raw log message.
///
/// An empty or whitespace-only message yields an empty signature and
/// [`LogType::Unknown`].
pub fn extract(raw_message: &str) -> Extraction {
    let message = raw_message.trim();
    let kind = classify(message);

    let mut signature = String::with_capacity(message.len());
    let mut parameters = Vec::new();
    let mut last = 0;

    for caps in VARIABLE_TOKEN.captures_iter(message) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_escaped(&mut signature, &message[last..whole.start()]);
        signature.push_str(Placeholder::from_captures(&caps).as_str());
        parameters.push(whole.as_str().to_string());
        last = whole.end();
    }
    push_escaped(&mut signature, &message[last..]);

    Extraction {
        signature,
        parameters,
        kind,
    }
}

/// Literal braces are doubled so message text can never impersonate a
/// placeholder.
fn push_escaped(out: &mut String, literal: &str) {
    for c in literal.chars() {
        match c {
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            other => out.push(other),
        }
    }
}

/// Fill a signature's placeholders with `parameters`, in order.
///
/// Inverse of [`extract`]: `render(&e.signature, &e.parameters)` gives back
/// the trimmed original message. Placeholders without a matching parameter
/// are left as-is.
pub fn render(signature: &str, parameters: &[String]) -> String {
    let mut out = String::with_capacity(signature.len());
    let mut params = parameters.iter();
    let mut chars = signature.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                match (closed, params.next()) {
                    (true, Some(value)) => out.push_str(value),
                    (true, None) => {
                        out.push('{');
                        out.push_str(&name);
                        out.push('}');
                    }
                    (false, _) => {
                        out.push('{');
                        out.push_str(&name);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Classify severity from the words of a message.
///
/// Error markers win over warning markers regardless of position. A message
/// with no alphanumeric content at all is [`LogType::Unknown`].
pub fn classify(message: &str) -> LogType {
    if !message.chars().any(char::is_alphanumeric) {
        return LogType::Unknown;
    }

    let mut warning = false;
    for word in message
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_ascii_lowercase();
        if is_error_marker(&word) {
            return LogType::Error;
        }
        if is_warning_marker(&word) {
            warning = true;
        }
    }

    if warning {
        LogType::Warning
    } else {
        LogType::Info
    }
}

fn is_error_marker(word: &str) -> bool {
    word.starts_with("error")
        || word.starts_with("fail")
        || matches!(word, "err" | "fatal" | "critical" | "crit")
}

fn is_warning_marker(word: &str) -> bool {
    // "WAR" is the printer firmware's own warning level tag.
    word.starts_with("warn") || word == "war"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_become_placeholders() {
        let e = extract("Nozzle temp 210C");
        assert_eq!(e.signature, "Nozzle temp {N}C");
        assert_eq!(e.parameters, vec!["210"]);
        assert_eq!(e.kind, LogType::Info);
    }

    #[test]
    fn same_template_same_signature() {
        let a = extract("Nozzle temp 210C");
        let b = extract("Nozzle temp 215C");
        let c = extract("Bed temp 60C");
        assert_eq!(a.signature, b.signature);
        assert_ne!(a.signature, c.signature);
    }

    #[test]
    fn decimals_are_one_token() {
        let e = extract("PrintCore 1 extruded 12.5 mm in 3.25 s, remaining length = 4000 mm");
        assert_eq!(
            e.signature,
            "PrintCore {N} extruded {N} mm in {N} s, remaining length = {N} mm"
        );
        assert_eq!(e.parameters, vec!["1", "12.5", "3.25", "4000"]);
    }

    #[test]
    fn recognizes_identifiers() {
        let e = extract(
            "job 1b4e28ba-2fa1-11d2-883f-0016d3cca427 from 192.168.6.218 at 10:22:01 reg 0x1F",
        );
        assert_eq!(e.signature, "job {UUID} from {IP} at {TIME} reg {HEX}");
        assert_eq!(
            e.parameters,
            vec![
                "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
                "192.168.6.218",
                "10:22:01",
                "0x1F"
            ]
        );
    }

    #[test]
    fn process_ids_are_abstracted() {
        let a = extract("PrinterService[1234]:WAR - Hotend 0 not detected");
        let b = extract("PrinterService[99]:WAR - Hotend 0 not detected");
        assert_eq!(a.signature, b.signature);
        assert_eq!(a.signature, "PrinterService[{N}]:WAR - Hotend {N} not detected");
        assert_eq!(a.kind, LogType::Warning);
    }

    #[test]
    fn empty_message_is_unknown_with_empty_signature() {
        for raw in ["", "   ", "\t\n"] {
            let e = extract(raw);
            assert!(e.signature.is_empty());
            assert!(e.parameters.is_empty());
            assert_eq!(e.kind, LogType::Unknown);
        }
    }

    #[test]
    fn punctuation_only_is_unknown() {
        let e = extract("-- ** --");
        assert_eq!(e.kind, LogType::Unknown);
        assert_eq!(e.signature, "-- ** --");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(extract("  Bed temp 60C \n"), extract("Bed temp 60C"));
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify("Warning: print failed"), LogType::Error);
        assert_eq!(classify("ERROR while homing"), LogType::Error);
        assert_eq!(classify("Failed to open camera"), LogType::Error);
        assert_eq!(classify("fan speed WARNING"), LogType::Warning);
        assert_eq!(classify("Build Complete"), LogType::Info);
    }

    #[test]
    fn classification_uses_whole_words() {
        assert_eq!(classify("software update available"), LogType::Info);
        assert_eq!(classify("terror"), LogType::Info);
    }

    #[test]
    fn literal_braces_cannot_forge_placeholders() {
        let forged = extract("value {N}C");
        let real = extract("value 5C");
        assert_ne!(forged.signature, real.signature);
        assert_eq!(forged.signature, "value {{N}}C");
        assert!(forged.parameters.is_empty());
    }

    #[test]
    fn render_restores_the_message() {
        for raw in [
            "Nozzle temp 215C",
            "json {\"a\": 1}",
            "job 1b4e28ba-2fa1-11d2-883f-0016d3cca427 done",
            "no variables here",
            "",
        ] {
            let e = extract(raw);
            assert_eq!(render(&e.signature, &e.parameters), raw);
        }
    }

    #[test]
    fn render_keeps_unfilled_placeholders() {
        assert_eq!(render("temp {N}C", &[]), "temp {N}C");
        assert_eq!(render("dangling {N", &["1".to_string()]), "dangling {N");
    }
}
