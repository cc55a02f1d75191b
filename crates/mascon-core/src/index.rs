// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Harmonic Index
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear enumeration of (kind, l, m) triples over a truncated triangle.
//!
//! Ordering: every cosine term first, then every sine term; inside each half
//! ascending degree, then ascending order. Sine terms start at m = 1.
//! Example for LMIN=2, LMAX=2: [C20, C21, C22, S21, S22].

use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::CoefficientKind;

/// One entry of the enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HarmonicTerm {
    pub kind: CoefficientKind,
    pub l: usize,
    pub m: usize,
}

/// Bidirectional (kind, l, m) <-> i mapping for LMIN <= l <= LMAX,
/// m <= min(l, MMAX).
#[derive(Debug, Clone)]
pub struct HarmonicIndex {
    lmin: usize,
    lmax: usize,
    mmax: usize,
    /// First cosine index of each degree, indexed by l - LMIN.
    cos_start: Vec<usize>,
    /// First sine index of each degree, indexed by l - LMIN.
    sin_start: Vec<usize>,
    terms: Vec<HarmonicTerm>,
}

impl HarmonicIndex {
    pub fn new(lmin: usize, lmax: usize, mmax: usize) -> MasconResult<Self> {
        if lmin > lmax || mmax > lmax {
            return Err(MasconError::InvalidRange { lmin, lmax, mmax });
        }

        let n_deg = lmax - lmin + 1;
        let mut cos_start = Vec::with_capacity(n_deg);
        let mut terms = Vec::new();

        for l in lmin..=lmax {
            cos_start.push(terms.len());
            for m in 0..=l.min(mmax) {
                terms.push(HarmonicTerm {
                    kind: CoefficientKind::Cosine,
                    l,
                    m,
                });
            }
        }

        let mut sin_start = Vec::with_capacity(n_deg);
        for l in lmin..=lmax {
            sin_start.push(terms.len());
            for m in 1..=l.min(mmax) {
                terms.push(HarmonicTerm {
                    kind: CoefficientKind::Sine,
                    l,
                    m,
                });
            }
        }

        Ok(HarmonicIndex {
            lmin,
            lmax,
            mmax,
            cos_start,
            sin_start,
            terms,
        })
    }

    pub fn lmin(&self) -> usize {
        self.lmin
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn mmax(&self) -> usize {
        self.mmax
    }

    /// Number of harmonic terms (n_harm).
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Linear index of (kind, l, m), or `None` when outside the triangle.
    pub fn index(&self, kind: CoefficientKind, l: usize, m: usize) -> Option<usize> {
        if l < self.lmin || l > self.lmax || m > l.min(self.mmax) {
            return None;
        }
        let row = l - self.lmin;
        match kind {
            CoefficientKind::Cosine => Some(self.cos_start[row] + m),
            CoefficientKind::Sine if m >= 1 => Some(self.sin_start[row] + m - 1),
            CoefficientKind::Sine => None,
        }
    }

    /// Term at linear index `i`, or `None` when `i >= len()`.
    pub fn invert(&self, i: usize) -> Option<HarmonicTerm> {
        self.terms.get(i).copied()
    }

    /// All terms in index order.
    pub fn terms(&self) -> &[HarmonicTerm] {
        &self.terms
    }
}

/// Closed-form n_harm: (LMAX+1)² − LMIN² − (LMAX−MMAX)(LMAX−MMAX+1).
///
/// Exact whenever LMIN <= MMAX + 1; otherwise the order truncation removes
/// fewer terms than the formula assumes and the enumeration count differs.
/// Signed, as the formula goes negative for some of those ranges.
pub fn closed_form_count(lmin: usize, lmax: usize, mmax: usize) -> i64 {
    let (lmin, lmax, mmax) = (lmin as i64, lmax as i64, mmax as i64);
    let d = lmax - mmax;
    (lmax + 1) * (lmax + 1) - lmin * lmin - d * (d + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CoefficientKind::{Cosine, Sine};

    #[test]
    fn test_degree_two_only() {
        let idx = HarmonicIndex::new(2, 2, 2).unwrap();
        assert_eq!(idx.len(), 5);
        let expected = [
            (Cosine, 2, 0),
            (Cosine, 2, 1),
            (Cosine, 2, 2),
            (Sine, 2, 1),
            (Sine, 2, 2),
        ];
        for (i, (kind, l, m)) in expected.into_iter().enumerate() {
            assert_eq!(idx.invert(i), Some(HarmonicTerm { kind, l, m }));
            assert_eq!(idx.index(kind, l, m), Some(i));
        }
    }

    #[test]
    fn test_full_triangle_from_zero() {
        let idx = HarmonicIndex::new(0, 3, 3).unwrap();
        assert_eq!(idx.len(), 16);
        assert_eq!(idx.index(Cosine, 0, 0), Some(0));
        assert_eq!(idx.index(Cosine, 3, 3), Some(9));
        assert_eq!(idx.index(Sine, 1, 1), Some(10));
        assert_eq!(idx.index(Sine, 3, 3), Some(15));
    }

    #[test]
    fn test_order_truncated() {
        let idx = HarmonicIndex::new(1, 4, 2).unwrap();
        // cos: l=1:2, l=2:3, l=3:3, l=4:3 = 11; sin: 1+2+2+2 = 7
        assert_eq!(idx.len(), 18);
        assert_eq!(idx.len() as i64, closed_form_count(1, 4, 2));
        assert_eq!(idx.index(Cosine, 4, 3), None);
        assert_eq!(idx.index(Sine, 4, 2), Some(17));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let idx = HarmonicIndex::new(2, 5, 5).unwrap();
        assert_eq!(idx.index(Cosine, 1, 0), None);
        assert_eq!(idx.index(Cosine, 6, 0), None);
        assert_eq!(idx.index(Sine, 3, 0), None);
        assert_eq!(idx.index(Cosine, 3, 4), None);
        assert_eq!(idx.invert(idx.len()), None);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            HarmonicIndex::new(5, 4, 4),
            Err(MasconError::InvalidRange { lmin: 5, .. })
        ));
        assert!(matches!(
            HarmonicIndex::new(0, 4, 5),
            Err(MasconError::InvalidRange { mmax: 5, .. })
        ));
    }

    #[test]
    fn test_closed_form_gap_above_mmax() {
        // LMIN > MMAX + 1: enumeration is authoritative.
        let idx = HarmonicIndex::new(5, 6, 1).unwrap();
        // l=5: C50,C51,S51; l=6: C60,C61,S61
        assert_eq!(idx.len(), 6);
        assert_ne!(idx.len() as i64, closed_form_count(5, 6, 1));
    }
}
