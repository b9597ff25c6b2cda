//! Typed power and frequency for reports.

use uom::si::f64::{Frequency as UomFrequency, Power as UomPower};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Power = UomPower;

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

/// Engine power values are in megawatts.
#[inline]
pub fn mw(v: f64) -> Power {
    use uom::si::power::megawatt;
    Power::new::<megawatt>(v)
}

#[inline]
pub fn as_hz(f: Frequency) -> f64 {
    use uom::si::frequency::hertz;
    f.get::<hertz>()
}

#[inline]
pub fn as_mw(p: Power) -> f64 {
    use uom::si::power::megawatt;
    p.get::<megawatt>()
}

pub mod constants {
    use super::*;

    /// Nominal system frequency for North American grids.
    pub const BASE_FREQUENCY_HZ: f64 = 60.0;

    #[inline]
    pub fn base_frequency() -> Frequency {
        hz(BASE_FREQUENCY_HZ)
    }
}
