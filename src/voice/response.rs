// Voice response document and its TwiML rendering

use std::fmt::{self, Write};

/// One instruction for the telephony provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(String),
    /// Collect `num_digits` digits within `timeout` seconds. Results are
    /// posted back to the current webhook URL.
    Gather {
        num_digits: u32,
        timeout: u32,
        prompt: String,
    },
    Dial(String),
    /// Restart the call flow at `url`
    Redirect(String),
    Pause(u32),
    /// Send DTMF tones down the line
    PlayDigits(String),
}

/// An ordered list of verbs, executed top to bottom by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    pub fn gather(mut self, num_digits: u32, timeout: u32, prompt: impl Into<String>) -> Self {
        self.verbs.push(Verb::Gather {
            num_digits,
            timeout,
            prompt: prompt.into(),
        });
        self
    }

    pub fn dial(mut self, number: impl Into<String>) -> Self {
        self.verbs.push(Verb::Dial(number.into()));
        self
    }

    pub fn redirect(mut self, url: impl Into<String>) -> Self {
        self.verbs.push(Verb::Redirect(url.into()));
        self
    }

    pub fn pause(mut self, seconds: u32) -> Self {
        self.verbs.push(Verb::Pause(seconds));
        self
    }

    pub fn play_digits(mut self, digits: impl Into<String>) -> Self {
        self.verbs.push(Verb::PlayDigits(digits.into()));
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// All spoken text, including gather prompts, in order
    pub fn spoken(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|verb| match verb {
                Verb::Say(text) => Some(text.as_str()),
                Verb::Gather { prompt, .. } => Some(prompt.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_gather(&self) -> bool {
        self.verbs.iter().any(|v| matches!(v, Verb::Gather { .. }))
    }

    pub fn dialed(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|verb| match verb {
                Verb::Dial(number) => Some(number.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VoiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        f.write_str("<Response>")?;
        for verb in &self.verbs {
            write_verb(f, verb)?;
        }
        f.write_str("</Response>")
    }
}

fn write_verb(out: &mut impl Write, verb: &Verb) -> fmt::Result {
    match verb {
        Verb::Say(text) => write!(out, "<Say>{}</Say>", escape_xml(text)),
        Verb::Gather {
            num_digits,
            timeout,
            prompt,
        } => write!(
            out,
            r#"<Gather numDigits="{}" timeout="{}"><Say>{}</Say></Gather>"#,
            num_digits,
            timeout,
            escape_xml(prompt)
        ),
        Verb::Dial(number) => write!(out, "<Dial>{}</Dial>", escape_xml(number)),
        Verb::Redirect(url) => write!(
            out,
            r#"<Redirect method="POST">{}</Redirect>"#,
            escape_xml(url)
        ),
        Verb::Pause(seconds) => write!(out, r#"<Pause length="{}"/>"#, seconds),
        Verb::PlayDigits(digits) => write!(out, r#"<Play digits="{}"/>"#, escape_xml(digits)),
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
