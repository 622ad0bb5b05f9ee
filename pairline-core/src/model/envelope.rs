use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One signaling frame exchanged between a client and the relay.
///
/// Negotiation payloads (`offer`, `answer`, `candidate`) are produced by the
/// clients' own peer-connection stacks and are carried as raw JSON values.
/// The relay never looks inside them; forwarding goes through
/// [`Frame`](crate::Frame), which keeps the original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Client is available and wants a partner.
    Ready,
    Offer {
        offer: Value,
    },
    Answer {
        answer: Value,
    },
    Candidate {
        candidate: Value,
    },
    /// Client ends its session or search. Also sent by the relay to the
    /// remaining side when a pairing is torn down.
    Leave,
    /// Relay-originated: the receiver is the initiator of a new pairing.
    StartOffer,
}

impl Envelope {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire tag of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Ready => "ready",
            Envelope::Offer { .. } => "offer",
            Envelope::Answer { .. } => "answer",
            Envelope::Candidate { .. } => "candidate",
            Envelope::Leave => "leave",
            Envelope::StartOffer => "start_offer",
        }
    }

    /// Offer, answer and candidate frames are forwarded to the partner as-is.
    pub fn is_negotiation(&self) -> bool {
        matches!(
            self,
            Envelope::Offer { .. } | Envelope::Answer { .. } | Envelope::Candidate { .. }
        )
    }

    /// Frames only the relay may emit.
    pub fn is_relay_only(&self) -> bool {
        matches!(self, Envelope::StartOffer)
    }
}
