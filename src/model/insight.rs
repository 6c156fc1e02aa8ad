use crate::model::placement::Placement;

/// Generated commentary for one placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight<'a> {
    pub placement: &'a Placement,
    pub text: String,
    /// Set when `text` is a substituted error or "not configured" message.
    pub fallback: bool,
}
