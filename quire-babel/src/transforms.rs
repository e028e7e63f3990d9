//! Round-trip helpers over the render/serialize pair
//!
//! Markdown this crate produced must survive render → serialize unchanged.
//! These helpers run that cycle and report whether a given input is already
//! at its fixed point, which is what the CLI `check` command prints.

/// Render Markdown to editor HTML and serialize it straight back.
///
/// # Example
///
/// ```ignore
/// use quire_babel::transforms::roundtrip;
///
/// assert_eq!(roundtrip("[X] done"), "- [x] done");
/// ```
pub fn roundtrip(markdown: &str) -> String {
    crate::serialize_html(&crate::render(markdown))
}

/// Outcome of running the round trip twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityReport {
    /// Serializer output for the source
    pub first: String,
    /// Serializer output for `first`
    pub second: String,
}

impl StabilityReport {
    /// The serializer output is a fixed point.
    pub fn is_stable(&self) -> bool {
        self.first == self.second
    }

    /// The source was already in canonical form.
    pub fn is_canonical(&self, source: &str) -> bool {
        self.first == source.trim()
    }

    /// Line pairs where the two passes disagree, 1-based.
    pub fn differences(&self) -> Vec<(usize, String, String)> {
        let first: Vec<&str> = self.first.lines().collect();
        let second: Vec<&str> = self.second.lines().collect();
        (0..first.len().max(second.len()))
            .filter_map(|i| {
                let a = first.get(i).copied().unwrap_or_default();
                let b = second.get(i).copied().unwrap_or_default();
                (a != b).then(|| (i + 1, a.to_string(), b.to_string()))
            })
            .collect()
    }
}

/// Run render → serialize twice and compare the passes.
pub fn check_stability(markdown: &str) -> StabilityReport {
    let first = roundtrip(markdown);
    let second = roundtrip(&first);
    StabilityReport { first, second }
}
