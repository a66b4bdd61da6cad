//! Composite scoring of candidate models against a routing profile
//!
//! Latency and cost are min-max normalized over the available candidates of
//! the current call and inverted so the fastest and cheapest score 1.0.
//! Candidates that violate a hard constraint are excluded from the ranking,
//! never down-weighted.

use super::candidate::ModelCandidate;
use super::profiles::{NormalizedWeights, RoutingProfile};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Why a candidate was left out of the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ConstraintViolation {
    Unavailable,
    BelowMinQuality { quality: f64, min: f64 },
    AboveMaxLatency { latency_ms: f64, max: f64 },
    AboveMaxCost { cost_per_million: f64, max: f64 },
    BelowMinContext { context_window: u32, min: u32 },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Unavailable => write!(f, "unavailable"),
            ConstraintViolation::BelowMinQuality { quality, min } => {
                write!(f, "quality {:.2} below minimum {:.2}", quality, min)
            }
            ConstraintViolation::AboveMaxLatency { latency_ms, max } => {
                write!(f, "latency {}ms above maximum {}ms", latency_ms, max)
            }
            ConstraintViolation::AboveMaxCost {
                cost_per_million,
                max,
            } => write!(f, "cost {} above maximum {}", cost_per_million, max),
            ConstraintViolation::BelowMinContext {
                context_window,
                min,
            } => write!(f, "context window {} below minimum {}", context_window, min),
        }
    }
}

/// A candidate excluded from ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub model_id: String,
    #[serde(flatten)]
    pub violation: ConstraintViolation,
}

/// Normalized per-dimension scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub quality: f64,
    pub latency: f64,
    pub cost: f64,
    pub context: f64,
}

/// A ranked candidate with its composite score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredModel {
    pub candidate: ModelCandidate,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Output of one scoring call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringOutcome {
    /// Best first
    pub ranked: Vec<ScoredModel>,
    pub excluded: Vec<Exclusion>,
}

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc: Option<Range>, v| {
            Some(match acc {
                None => Range { min: v, max: v },
                Some(r) => Range {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
    }

    /// Position of `v` in the range, 0.0 at min and 1.0 at max.
    /// A degenerate range maps everything to 1.0.
    fn position(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }

    /// Inverted position: lower values score higher.
    fn inverted(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 1.0;
        }
        ((self.max - v) / span).clamp(0.0, 1.0)
    }
}

/// Check a candidate against the profile's hard constraints.
///
/// A candidate with an unknown context window passes the context check.
pub fn check_constraints(
    candidate: &ModelCandidate,
    profile: &RoutingProfile,
) -> Option<ConstraintViolation> {
    if !candidate.available {
        return Some(ConstraintViolation::Unavailable);
    }
    if let Some(min) = profile.min_quality {
        if candidate.quality < min {
            return Some(ConstraintViolation::BelowMinQuality {
                quality: candidate.quality,
                min,
            });
        }
    }
    if let Some(max) = profile.max_latency_ms {
        if candidate.latency_ms > max {
            return Some(ConstraintViolation::AboveMaxLatency {
                latency_ms: candidate.latency_ms,
                max,
            });
        }
    }
    if let Some(max) = profile.max_cost_per_million {
        if candidate.cost_per_million > max {
            return Some(ConstraintViolation::AboveMaxCost {
                cost_per_million: candidate.cost_per_million,
                max,
            });
        }
    }
    if let (Some(min), Some(window)) = (profile.min_context_window, candidate.context_window) {
        if window < min {
            return Some(ConstraintViolation::BelowMinContext {
                context_window: window,
                min,
            });
        }
    }
    None
}

/// Score and rank candidates for a profile.
///
/// An empty result is not an error; deciding that no model is eligible is
/// left to the router.
pub fn score_candidates(candidates: &[ModelCandidate], profile: &RoutingProfile) -> ScoringOutcome {
    let mut outcome = ScoringOutcome::default();

    let available: Vec<&ModelCandidate> = candidates.iter().filter(|c| c.available).collect();
    for c in candidates.iter().filter(|c| !c.available) {
        outcome.excluded.push(Exclusion {
            model_id: c.id.clone(),
            violation: ConstraintViolation::Unavailable,
        });
    }

    let latency = Range::of(available.iter().map(|c| c.latency_ms));
    let cost = Range::of(available.iter().map(|c| c.cost_per_million));
    let context = Range::of(
        available
            .iter()
            .filter_map(|c| c.context_window.map(f64::from)),
    );
    let weights = profile.normalized_weights();

    for candidate in available {
        if let Some(violation) = check_constraints(candidate, profile) {
            outcome.excluded.push(Exclusion {
                model_id: candidate.id.clone(),
                violation,
            });
            continue;
        }

        let breakdown = ScoreBreakdown {
            quality: candidate.quality.clamp(0.0, 1.0),
            latency: latency.map_or(1.0, |r| r.inverted(candidate.latency_ms)),
            cost: cost.map_or(1.0, |r| r.inverted(candidate.cost_per_million)),
            context: match (candidate.context_window, context) {
                (Some(w), Some(r)) => r.position(f64::from(w)),
                _ => 0.0,
            },
        };
        outcome.ranked.push(ScoredModel {
            candidate: candidate.clone(),
            score: composite(&breakdown, &weights),
            breakdown,
        });
    }

    outcome.ranked.sort_by(rank_order);
    outcome
}

fn composite(b: &ScoreBreakdown, w: &NormalizedWeights) -> f64 {
    (b.quality * w.quality + b.latency * w.latency + b.cost * w.cost + b.context * w.context)
        .clamp(0.0, 1.0)
}

/// Score descending, then lower latency, lower cost, and id.
fn rank_order(a: &ScoredModel, b: &ScoredModel) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.latency_ms.total_cmp(&b.candidate.latency_ms))
        .then_with(|| {
            a.candidate
                .cost_per_million
                .total_cmp(&b.candidate.cost_per_million)
        })
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}
