//! A handful of built-in probe definitions, keyed by name.
//!
//! Spec §1 excludes device discovery and probe-file loading from scope; a
//! complete `session_open(probeName, ...)` still needs *some* source of
//! `n_elem`/`pitch` to resolve a name into a [`ProbeDef`], so this is a small
//! hardcoded catalog rather than a file format. Swapping it for a real
//! catalog loader later does not change [`crate::session::Session`]'s API.

use usq_core::ProbeDef;

const CATALOG: &[(&str, usize, f64)] = &[
    ("L7-4", 128, 0.3e-3),
    ("L11-4v", 192, 0.2e-3),
    ("C5-2v", 128, 0.49e-3),
];

/// Looks up a probe definition by name. Returns `None` for any name not in
/// the built-in catalog.
pub fn probe_by_name(name: &str) -> Option<ProbeDef> {
    CATALOG.iter().find(|(n, _, _)| *n == name).map(|(name, n_elem, pitch)| ProbeDef {
        name: name.to_string(),
        n_elem: *n_elem,
        pitch: *pitch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_probe_resolves() {
        let probe = probe_by_name("L11-4v").unwrap();
        assert_eq!(probe.n_elem, 192);
    }

    #[test]
    fn unknown_probe_is_none() {
        assert!(probe_by_name("not-a-real-probe").is_none());
    }
}
