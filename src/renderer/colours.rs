use crate::models::Level;

/// Hex colours used by the HTML report.
pub(crate) struct Colours {
    pub header: &'static str,
    pub text: &'static str,
    pub background: &'static str,
    pub border: &'static str,
    pub ok: &'static str,
    pub warn: &'static str,
    pub crit: &'static str,
    pub muted: &'static str,
}

impl Default for Colours {
    fn default() -> Self {
        Self {
            header: "#729fcf",     // Steel blue - for headers
            text: "#2e3436",       // Charcoal - for general text
            background: "#f6f6f4", // Off-white - page background
            border: "#d3d7cf",     // Light gray - table rules
            ok: "#57ae24",         // Vibrant green - healthy
            warn: "#f57900",       // Burnt orange - warning
            crit: "#cc0000",       // Crimson - critical / unreachable
            muted: "#888a85",      // Silver gray - timestamps and notes
        }
    }
}

impl Colours {
    pub fn for_level(&self, level: Level) -> &'static str {
        match level {
            Level::Ok => self.ok,
            Level::Warn => self.warn,
            Level::Crit => self.crit,
        }
    }
}

/// CSS class carried by every severity-tagged cell.
pub fn css_class(level: Level) -> &'static str {
    level.as_str()
}
