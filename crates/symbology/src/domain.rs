use std::collections::BTreeMap;

/// Lower quantile anchor of the color ramp.
pub const DOMAIN_Q_LO: f64 = 0.80;
/// Upper quantile anchor of the color ramp.
pub const DOMAIN_Q_HI: f64 = 0.95;
/// Rows below this region relevance are excluded from domain computation.
pub const WEIGHT_FLOOR: f64 = 0.2;

/// One observation feeding domain computation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    /// Region relevance in [0, 1].
    pub weight: f64,
}

impl Sample {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Three-point color ramp anchors: [min, mid quantile, high quantile].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub mid: f64,
    pub high: f64,
}

impl ColorDomain {
    pub const fn new(min: f64, mid: f64, high: f64) -> Self {
        Self { min, mid, high }
    }

    /// Placeholder domain used before any data has loaded.
    pub const UNIT: Self = Self::new(0.0, 0.5, 1.0);
}

/// Linear-interpolation quantile over ascending-sorted values.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    let a = sorted[lo];
    if frac == 0.0 || lo + 1 >= sorted.len() {
        return Some(a);
    }
    Some(a + (sorted[lo + 1] - a) * frac)
}

fn domain_from_values(mut values: Vec<f64>) -> Option<ColorDomain> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = quantile_sorted(&values, DOMAIN_Q_LO)?;
    let high = quantile_sorted(&values, DOMAIN_Q_HI)?;
    Some(ColorDomain::new(0.0, mid, high))
}

/// Computes the active color domain for one snapshot.
///
/// A supplied fixed domain wins unmodified. Otherwise values are filtered to
/// positive with region weight above `WEIGHT_FLOOR`; if that leaves nothing,
/// the filter widens to positive-only, and if nothing survives even that, the
/// previous domain is returned unchanged.
pub fn resolve_domain(
    samples: &[Sample],
    fixed: Option<ColorDomain>,
    previous: ColorDomain,
) -> ColorDomain {
    if let Some(domain) = fixed {
        return domain;
    }

    let weighted: Vec<f64> = samples
        .iter()
        .filter(|s| s.value > 0.0 && s.weight > WEIGHT_FLOOR)
        .map(|s| s.value)
        .collect();
    if let Some(domain) = domain_from_values(weighted) {
        return domain;
    }

    let positive: Vec<f64> = samples
        .iter()
        .filter(|s| s.value > 0.0)
        .map(|s| s.value)
        .collect();
    domain_from_values(positive).unwrap_or(previous)
}

/// Session-lifetime cache of per-step fixed domains.
///
/// A fixed domain merges region-relevant values across every sub-snapshot of
/// a narrative step, so the colors stay comparable when the step flips
/// between its datasets. Once computed for a step it is never recomputed.
#[derive(Debug, Default)]
pub struct DomainCache {
    entries: BTreeMap<String, ColorDomain>,
}

impl DomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step_id: &str) -> Option<ColorDomain> {
        self.entries.get(step_id).copied()
    }

    pub fn resolve_fixed(
        &mut self,
        step_id: &str,
        snapshots: &[&[Sample]],
        previous: ColorDomain,
    ) -> ColorDomain {
        if let Some(domain) = self.entries.get(step_id) {
            return *domain;
        }

        let merged: Vec<Sample> = snapshots
            .iter()
            .flat_map(|s| s.iter().copied())
            .collect();
        let domain = resolve_domain(&merged, None, previous);
        self.entries.insert(step_id.to_string(), domain);
        domain
    }
}
