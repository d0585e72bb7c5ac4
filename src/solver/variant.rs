//! Variant selection for the pipelined engines.
//!
//! A variant is two independent switches: whether `w` (and its shadow) is recomputed
//! from a fresh operator application each iteration, and whether the predicted `ν`
//! drops the cross term (Meurant's formula). The engines read the flags once per run;
//! tags like `pr_m` only exist at the API boundary.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::PipeError;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Variant: u8 {
        /// Recompute `w = A r` every iteration (predict-and-recompute).
        const RECOMPUTE         = 0b01;
        /// Predict `ν` as `−ν + α²γ` instead of `ν − 2αδ + α²γ`.
        const MEURANT           = 0b10;
        const RECOMPUTE_MEURANT = Self::RECOMPUTE.bits() | Self::MEURANT.bits();
    }
}

impl Variant {
    /// Plain predict: `w` advanced by recurrence only, standard `ν` update.
    pub fn predict() -> Self {
        Self::empty()
    }

    pub fn recomputes(self) -> bool {
        self.contains(Self::RECOMPUTE)
    }

    pub fn meurant(self) -> bool {
        self.contains(Self::MEURANT)
    }

    /// Short tag: `p`, `pr`, `p_m` or `pr_m`.
    pub fn tag(self) -> &'static str {
        match (self.recomputes(), self.meurant()) {
            (false, false) => "p",
            (true, false) => "pr",
            (false, true) => "p_m",
            (true, true) => "pr_m",
        }
    }

    /// All four combinations, in tag order.
    pub fn all_variants() -> [Self; 4] {
        [
            Self::predict(),
            Self::RECOMPUTE,
            Self::MEURANT,
            Self::RECOMPUTE_MEURANT,
        ]
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::RECOMPUTE
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Variant {
    type Err = PipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "p" => Ok(Self::predict()),
            "pr" => Ok(Self::RECOMPUTE),
            "p_m" => Ok(Self::MEURANT),
            "pr_m" => Ok(Self::RECOMPUTE_MEURANT),
            other => Err(PipeError::UnknownVariant(other.to_string())),
        }
    }
}
