use std::fmt;

/// Pseudo-entry the ephemeris service returns alongside real bodies.
pub const AYANAMSA: &str = "ayanamsa";

/// One body's sign and house in the natal chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub body: String,
    pub sign: Option<String>,
    pub house: Option<u32>,
}

/// Placements in the order the service returned them.
pub type PlacementList = Vec<Placement>;

impl Placement {
    pub fn sign_label(&self) -> &str {
        self.sign.as_deref().unwrap_or("Unknown")
    }

    pub fn house_label(&self) -> String {
        self.house
            .map(|h| h.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Section header: `Sun in Sign 8 (House 1)`.
    pub fn header(&self) -> String {
        format!(
            "{} in Sign {} (House {})",
            self.body,
            self.sign_label(),
            self.house_label()
        )
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())
    }
}
