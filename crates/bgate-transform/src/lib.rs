pub mod chat;
pub mod params;

pub use params::SamplingParams;

/// Per-response metadata the transforms stamp onto the external wire shape.
///
/// Generated fresh by the caller for every response; never derived from the
/// native reply. `model` is the external name the caller originally asked
/// for, not the Bedrock id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub id: String,
    pub created: i64,
    pub model: String,
}
