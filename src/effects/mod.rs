// Effect units built from declarative descriptors
//
// A track carries a list of EffectDescriptors. For every triggered note the
// voice engine instantiates a fresh chain from that list, so each voice owns
// its own effect state. Units are variants of a closed enum; parameters can
// be updated live through set_param without rebuilding the unit (except
// distortion drive, which recomputes its transfer curve).

pub mod chorus;
pub mod delay;
pub mod distortion;
pub mod reverb;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use chorus::Chorus;
pub use delay::Delay;
pub use distortion::Distortion;
pub use reverb::Reverb;

/// The effect kinds the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Reverb,
    Delay,
    Distortion,
    Chorus,
}

/// Declarative description of one effect: a kind plus named parameters.
/// Unknown parameter names are ignored; missing ones take unit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub kind: EffectKind,
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl EffectDescriptor {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: f32) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Read a parameter, falling back to the given default.
    pub fn param(&self, name: &str, default: f32) -> f32 {
        self.params.get(name).copied().unwrap_or(default)
    }
}

/// Constant-sum wet/dry crossfade: wet = mix, dry = 1 - mix.
#[derive(Debug, Clone, Copy)]
pub struct WetDry {
    wet: f32,
}

impl WetDry {
    pub fn new(mix: f32) -> Self {
        Self {
            wet: mix.clamp(0.0, 1.0),
        }
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.wet = mix.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn wet(&self) -> f32 {
        self.wet
    }

    #[inline]
    pub fn dry(&self) -> f32 {
        1.0 - self.wet
    }

    #[inline]
    pub fn blend(&self, dry: f32, wet: f32) -> f32 {
        dry * self.dry() + wet * self.wet
    }
}

/// A single effect unit. Stereo in, stereo out, one sample at a time.
pub enum EffectUnit {
    Reverb(Reverb),
    Delay(Delay),
    Distortion(Distortion),
    Chorus(Chorus),
}

impl EffectUnit {
    /// Instantiate a unit from its descriptor.
    pub fn from_descriptor(desc: &EffectDescriptor, sample_rate: f32) -> Self {
        match desc.kind {
            EffectKind::Reverb => EffectUnit::Reverb(Reverb::from_descriptor(desc, sample_rate)),
            EffectKind::Delay => EffectUnit::Delay(Delay::from_descriptor(desc, sample_rate)),
            EffectKind::Distortion => {
                EffectUnit::Distortion(Distortion::from_descriptor(desc, sample_rate))
            }
            EffectKind::Chorus => EffectUnit::Chorus(Chorus::from_descriptor(desc, sample_rate)),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectUnit::Reverb(_) => EffectKind::Reverb,
            EffectUnit::Delay(_) => EffectKind::Delay,
            EffectUnit::Distortion(_) => EffectKind::Distortion,
            EffectUnit::Chorus(_) => EffectKind::Chorus,
        }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        match self {
            EffectUnit::Reverb(fx) => fx.process(left, right),
            EffectUnit::Delay(fx) => fx.process(left, right),
            EffectUnit::Distortion(fx) => fx.process(left, right),
            EffectUnit::Chorus(fx) => fx.process(left, right),
        }
    }

    /// Update a named parameter live. Unknown names are ignored.
    pub fn set_param(&mut self, name: &str, value: f32) {
        match self {
            EffectUnit::Reverb(fx) => fx.set_param(name, value),
            EffectUnit::Delay(fx) => fx.set_param(name, value),
            EffectUnit::Distortion(fx) => fx.set_param(name, value),
            EffectUnit::Chorus(fx) => fx.set_param(name, value),
        }
    }

    /// Current wet/dry mix of the unit.
    pub fn mix(&self) -> WetDry {
        match self {
            EffectUnit::Reverb(fx) => fx.mix(),
            EffectUnit::Delay(fx) => fx.mix(),
            EffectUnit::Distortion(fx) => fx.mix(),
            EffectUnit::Chorus(fx) => fx.mix(),
        }
    }
}

/// An ordered list of effect units. The chain input is the voice's raw
/// signal; the output feeds the track gain stage.
pub struct EffectChain {
    units: Vec<EffectUnit>,
}

impl EffectChain {
    /// Instantiate every descriptor in list order.
    pub fn build(descriptors: &[EffectDescriptor], sample_rate: f32) -> Self {
        let units = descriptors
            .iter()
            .map(|d| EffectUnit::from_descriptor(d, sample_rate))
            .collect();
        Self { units }
    }

    pub fn empty() -> Self {
        Self { units: Vec::new() }
    }

    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mut signal = (left, right);
        for unit in &mut self.units {
            signal = unit.process(signal.0, signal.1);
        }
        signal
    }

    pub fn units(&self) -> &[EffectUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [EffectUnit] {
        &mut self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wet_dry_sums_to_one() {
        for mix in [0.0, 0.25, 0.5, 0.77, 1.0, -3.0, 42.0] {
            let wd = WetDry::new(mix);
            assert!((wd.wet() + wd.dry() - 1.0).abs() < 1e-6, "mix {}", mix);
        }
    }

    #[test]
    fn test_wet_dry_sums_to_one_after_set_param() {
        let descs = [
            EffectDescriptor::new(EffectKind::Reverb),
            EffectDescriptor::new(EffectKind::Delay),
            EffectDescriptor::new(EffectKind::Distortion),
            EffectDescriptor::new(EffectKind::Chorus),
        ];
        for desc in &descs {
            let mut unit = EffectUnit::from_descriptor(desc, 44100.0);
            for mix in [0.0, 0.3, 0.9, 1.0, 7.0] {
                unit.set_param("mix", mix);
                let wd = unit.mix();
                assert!(
                    (wd.wet() + wd.dry() - 1.0).abs() < 1e-6,
                    "{:?} mix {}",
                    desc.kind,
                    mix
                );
            }
        }
    }

    #[test]
    fn test_chain_builds_in_order() {
        let descs = vec![
            EffectDescriptor::new(EffectKind::Distortion),
            EffectDescriptor::new(EffectKind::Delay),
        ];
        let chain = EffectChain::build(&descs, 44100.0);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.units()[0].kind(), EffectKind::Distortion);
        assert_eq!(chain.units()[1].kind(), EffectKind::Delay);
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let mut chain = EffectChain::empty();
        assert_eq!(chain.process(0.3, -0.3), (0.3, -0.3));
    }

    #[test]
    fn test_descriptor_serde_round_trip() {
        let desc = EffectDescriptor::new(EffectKind::Delay)
            .with_param("time", 0.4)
            .with_param("feedback", 0.3)
            .with_param("mix", 0.5);
        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains("\"delay\""));
        let back: EffectDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn test_unknown_param_ignored() {
        let mut unit = EffectUnit::from_descriptor(&EffectDescriptor::new(EffectKind::Chorus), 44100.0);
        unit.set_param("does_not_exist", 1.0);
        let (l, r) = unit.process(0.1, 0.1);
        assert!(l.is_finite() && r.is_finite());
    }
}
