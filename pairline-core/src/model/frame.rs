use crate::model::envelope::Envelope;
use std::borrow::Cow;

/// An envelope together with the text it travels as.
///
/// Frames parsed from a client keep the exact text they arrived in, so
/// forwarding one to the partner sends the same bytes back out: unknown
/// fields, key order and number spelling all survive. Frames built by the
/// relay itself are encoded on demand.
#[derive(Debug, Clone)]
pub struct Frame {
    envelope: Envelope,
    text: Option<String>,
}

impl Frame {
    /// Decodes `text` and keeps it for verbatim forwarding.
    pub fn parse(text: impl Into<String>) -> Result<Self, serde_json::Error> {
        let text = text.into();
        let envelope = Envelope::from_json(&text)?;

        Ok(Self {
            envelope,
            text: Some(text),
        })
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn kind(&self) -> &'static str {
        self.envelope.kind()
    }

    /// Wire text: the original text for parsed frames, a fresh encoding for
    /// relay-built ones.
    pub fn to_text(&self) -> Result<Cow<'_, str>, serde_json::Error> {
        match &self.text {
            Some(text) => Ok(Cow::Borrowed(text)),
            None => self.envelope.to_json().map(Cow::Owned),
        }
    }

    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }
}

impl From<Envelope> for Frame {
    fn from(envelope: Envelope) -> Self {
        Self {
            envelope,
            text: None,
        }
    }
}
