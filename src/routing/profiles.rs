//! Routing profiles: weight tables plus hard constraints
//!
//! The profile set is closed. Five built-in profiles exist and configuration
//! may only override their fields, never add new names.

use super::complexity::ComplexityTier;
use super::error::RoutingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the built-in routing profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    Quality,
    Balanced,
    Speed,
    Budget,
    LongContext,
}

impl ProfileName {
    pub const ALL: [ProfileName; 5] = [
        ProfileName::Quality,
        ProfileName::Balanced,
        ProfileName::Speed,
        ProfileName::Budget,
        ProfileName::LongContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Quality => "quality",
            ProfileName::Balanced => "balanced",
            ProfileName::Speed => "speed",
            ProfileName::Budget => "budget",
            ProfileName::LongContext => "long_context",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProfileName::Quality => "Prioritize response quality over latency and cost",
            ProfileName::Balanced => "Even trade-off between quality, latency and cost",
            ProfileName::Speed => "Prioritize low latency",
            ProfileName::Budget => "Prioritize low cost",
            ProfileName::LongContext => "Prefer models with large context windows",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quality" => Ok(ProfileName::Quality),
            "balanced" => Ok(ProfileName::Balanced),
            "speed" => Ok(ProfileName::Speed),
            "budget" => Ok(ProfileName::Budget),
            "long_context" => Ok(ProfileName::LongContext),
            _ => Err(RoutingError::UnknownProfile {
                profile: s.to_string(),
            }),
        }
    }
}

/// Weights normalized to sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedWeights {
    pub quality: f64,
    pub latency: f64,
    pub cost: f64,
    pub context: f64,
}

/// Weight table and hard constraints for one profile.
///
/// Weights are each in [0, 1] and need not sum to 1; they are normalized
/// before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingProfile {
    pub quality_weight: f64,
    pub latency_weight: f64,
    pub cost_weight: f64,
    #[serde(default)]
    pub context_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost_per_million: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_context_window: Option<u32>,
}

impl RoutingProfile {
    pub fn weighted(quality: f64, latency: f64, cost: f64) -> Self {
        Self {
            quality_weight: quality,
            latency_weight: latency,
            cost_weight: cost,
            context_weight: 0.0,
            min_quality: None,
            max_latency_ms: None,
            max_cost_per_million: None,
            min_context_window: None,
        }
    }

    pub fn quality() -> Self {
        Self::weighted(0.8, 0.1, 0.1)
    }

    pub fn balanced() -> Self {
        Self::weighted(0.4, 0.3, 0.3)
    }

    pub fn speed() -> Self {
        Self {
            max_latency_ms: Some(1000.0),
            ..Self::weighted(0.2, 0.6, 0.2)
        }
    }

    pub fn budget() -> Self {
        Self::weighted(0.1, 0.1, 0.8)
    }

    pub fn long_context() -> Self {
        Self {
            context_weight: 0.3,
            min_context_window: Some(100_000),
            ..Self::weighted(0.3, 0.2, 0.2)
        }
    }

    /// Weights scaled to sum to 1.0. All-zero weights fall back to an even
    /// split over quality, latency and cost.
    pub fn normalized_weights(&self) -> NormalizedWeights {
        let q = self.quality_weight.max(0.0);
        let l = self.latency_weight.max(0.0);
        let c = self.cost_weight.max(0.0);
        let x = self.context_weight.max(0.0);
        let total = q + l + c + x;
        if total <= f64::EPSILON {
            let third = 1.0 / 3.0;
            return NormalizedWeights {
                quality: third,
                latency: third,
                cost: third,
                context: 0.0,
            };
        }
        NormalizedWeights {
            quality: q / total,
            latency: l / total,
            cost: c / total,
            context: x / total,
        }
    }

    /// Effective profile for a request of the given complexity.
    ///
    /// Only `complex` requests shift weight toward quality; constraints are
    /// never touched.
    pub fn adjusted_for(&self, tier: ComplexityTier) -> Self {
        let mut adjusted = self.clone();
        if tier == ComplexityTier::Complex {
            adjusted.quality_weight = (adjusted.quality_weight + 0.15).min(1.0);
            adjusted.latency_weight = (adjusted.latency_weight - 0.1).max(0.0);
        }
        adjusted
    }

    /// Check weight ranges and constraint signs
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("quality_weight", self.quality_weight),
            ("latency_weight", self.latency_weight),
            ("cost_weight", self.cost_weight),
            ("context_weight", self.context_weight),
        ];
        for (name, w) in weights {
            if !(0.0..=1.0).contains(&w) {
                return Err(format!("{} must be within [0, 1], got {}", name, w));
            }
        }
        if weights.iter().all(|(_, w)| *w == 0.0) {
            return Err("at least one weight must be non-zero".to_string());
        }
        if let Some(q) = self.min_quality {
            if !(0.0..=1.0).contains(&q) {
                return Err(format!("min_quality must be within [0, 1], got {}", q));
            }
        }
        if matches!(self.max_latency_ms, Some(l) if l <= 0.0) {
            return Err("max_latency_ms must be positive".to_string());
        }
        if matches!(self.max_cost_per_million, Some(c) if c < 0.0) {
            return Err("max_cost_per_million must be non-negative".to_string());
        }
        Ok(())
    }

    fn apply(&mut self, o: &ProfileOverride) {
        if let Some(v) = o.quality_weight {
            self.quality_weight = v;
        }
        if let Some(v) = o.latency_weight {
            self.latency_weight = v;
        }
        if let Some(v) = o.cost_weight {
            self.cost_weight = v;
        }
        if let Some(v) = o.context_weight {
            self.context_weight = v;
        }
        if o.min_quality.is_some() {
            self.min_quality = o.min_quality;
        }
        if o.max_latency_ms.is_some() {
            self.max_latency_ms = o.max_latency_ms;
        }
        if o.max_cost_per_million.is_some() {
            self.max_cost_per_million = o.max_cost_per_million;
        }
        if o.min_context_window.is_some() {
            self.min_context_window = o.min_context_window;
        }
    }
}

/// Partial profile read from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverride {
    pub quality_weight: Option<f64>,
    pub latency_weight: Option<f64>,
    pub cost_weight: Option<f64>,
    pub context_weight: Option<f64>,
    pub min_quality: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub max_cost_per_million: Option<f64>,
    pub min_context_window: Option<u32>,
}

/// `[profiles.*]` configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<ProfileOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balanced: Option<ProfileOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<ProfileOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<ProfileOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_context: Option<ProfileOverride>,
}

impl ProfileOverrides {
    pub fn get(&self, name: ProfileName) -> Option<&ProfileOverride> {
        match name {
            ProfileName::Quality => self.quality.as_ref(),
            ProfileName::Balanced => self.balanced.as_ref(),
            ProfileName::Speed => self.speed.as_ref(),
            ProfileName::Budget => self.budget.as_ref(),
            ProfileName::LongContext => self.long_context.as_ref(),
        }
    }
}

/// The five profiles, loaded once at startup and read-only afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSet {
    quality: RoutingProfile,
    balanced: RoutingProfile,
    speed: RoutingProfile,
    budget: RoutingProfile,
    long_context: RoutingProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            quality: RoutingProfile::quality(),
            balanced: RoutingProfile::balanced(),
            speed: RoutingProfile::speed(),
            budget: RoutingProfile::budget(),
            long_context: RoutingProfile::long_context(),
        }
    }
}

impl ProfileSet {
    /// Built-in profiles with configured overrides applied
    pub fn with_overrides(overrides: &ProfileOverrides) -> Self {
        let mut set = Self::default();
        for name in ProfileName::ALL {
            if let Some(o) = overrides.get(name) {
                set.get_mut(name).apply(o);
            }
        }
        set
    }

    pub fn get(&self, name: ProfileName) -> &RoutingProfile {
        match name {
            ProfileName::Quality => &self.quality,
            ProfileName::Balanced => &self.balanced,
            ProfileName::Speed => &self.speed,
            ProfileName::Budget => &self.budget,
            ProfileName::LongContext => &self.long_context,
        }
    }

    fn get_mut(&mut self, name: ProfileName) -> &mut RoutingProfile {
        match name {
            ProfileName::Quality => &mut self.quality,
            ProfileName::Balanced => &mut self.balanced,
            ProfileName::Speed => &mut self.speed,
            ProfileName::Budget => &mut self.budget,
            ProfileName::LongContext => &mut self.long_context,
        }
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::UnknownProfile` for names outside the set.
    pub fn resolve(&self, name: &str) -> Result<(ProfileName, &RoutingProfile), RoutingError> {
        let parsed: ProfileName = name.parse()?;
        Ok((parsed, self.get(parsed)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileName, &RoutingProfile)> {
        ProfileName::ALL.into_iter().map(move |n| (n, self.get(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_names() {
        for name in ProfileName::ALL {
            assert_eq!(name.as_str().parse::<ProfileName>().unwrap(), name);
        }
        assert_eq!(
            "LONG_CONTEXT".parse::<ProfileName>().unwrap(),
            ProfileName::LongContext
        );
    }

    #[test]
    fn parse_unknown_is_error() {
        let err = "nonexistent".parse::<ProfileName>().unwrap_err();
        assert!(matches!(err, RoutingError::UnknownProfile { profile } if profile == "nonexistent"));
    }

    #[test]
    fn builtin_weights() {
        let set = ProfileSet::default();
        let q = set.get(ProfileName::Quality);
        assert_eq!(
            (q.quality_weight, q.latency_weight, q.cost_weight),
            (0.8, 0.1, 0.1)
        );
        let b = set.get(ProfileName::Budget);
        assert_eq!(
            (b.quality_weight, b.latency_weight, b.cost_weight),
            (0.1, 0.1, 0.8)
        );
        assert_eq!(set.get(ProfileName::Speed).max_latency_ms, Some(1000.0));
        assert_eq!(
            set.get(ProfileName::LongContext).min_context_window,
            Some(100_000)
        );
    }

    #[test]
    fn builtins_validate() {
        for (_, profile) in ProfileSet::default().iter() {
            assert!(profile.validate().is_ok());
        }
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        let p = RoutingProfile::weighted(0.5, 0.5, 1.0);
        let w = p.normalized_weights();
        assert!((w.quality + w.latency + w.cost + w.context - 1.0).abs() < 1e-9);
        assert!((w.cost - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_weights_normalize_to_even_split() {
        let w = RoutingProfile::weighted(0.0, 0.0, 0.0).normalized_weights();
        assert!((w.quality - w.latency).abs() < 1e-9);
        assert!((w.latency - w.cost).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(RoutingProfile::weighted(1.5, 0.0, 0.0).validate().is_err());
        assert!(RoutingProfile::weighted(0.0, 0.0, 0.0).validate().is_err());
        let p = RoutingProfile {
            max_latency_ms: Some(0.0),
            ..RoutingProfile::balanced()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn complex_tier_shifts_toward_quality() {
        let base = RoutingProfile::balanced();
        let adjusted = base.adjusted_for(ComplexityTier::Complex);
        assert!(adjusted.quality_weight > base.quality_weight);
        assert!(adjusted.latency_weight < base.latency_weight);
        assert_eq!(adjusted.cost_weight, base.cost_weight);
    }

    #[test]
    fn simple_and_moderate_tiers_leave_weights() {
        let base = RoutingProfile::speed();
        assert_eq!(base.adjusted_for(ComplexityTier::Simple), base);
        assert_eq!(base.adjusted_for(ComplexityTier::Moderate), base);
    }

    #[test]
    fn overrides_apply_per_profile() {
        let overrides: ProfileOverrides = toml::from_str(
            r#"
            [speed]
            max_latency_ms = 500.0

            [budget]
            cost_weight = 0.9
            max_cost_per_million = 2.0
            "#,
        )
        .unwrap();
        let set = ProfileSet::with_overrides(&overrides);
        assert_eq!(set.get(ProfileName::Speed).max_latency_ms, Some(500.0));
        assert_eq!(set.get(ProfileName::Budget).cost_weight, 0.9);
        assert_eq!(
            set.get(ProfileName::Budget).max_cost_per_million,
            Some(2.0)
        );
        assert_eq!(set.get(ProfileName::Quality), &RoutingProfile::quality());
    }

    #[test]
    fn overrides_reject_unknown_profile_name() {
        let result: Result<ProfileOverrides, _> = toml::from_str(
            r#"
            [turbo]
            quality_weight = 1.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn resolve_returns_profile() {
        let set = ProfileSet::default();
        let (name, profile) = set.resolve("speed").unwrap();
        assert_eq!(name, ProfileName::Speed);
        assert_eq!(profile, &RoutingProfile::speed());
        assert!(set.resolve("fastest").is_err());
    }
}
