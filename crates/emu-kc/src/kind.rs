//! The machine tag from `jkcemu.system`.

use emu_ac1::Ac1Config;
use emu_bcs3::Bcs3Config;
use emu_core::Profile;
use emu_llc2::Llc2;
use emu_z1013::Z1013Config;
use emu_z9001::Z9001Config;
use log::warn;

use crate::MachineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineKind {
    Z1013,
    Ac1,
    Llc2,
    Bcs3,
    Z9001,
}

impl MachineKind {
    pub const ALL: [Self; 5] = [Self::Z1013, Self::Ac1, Self::Llc2, Self::Bcs3, Self::Z9001];

    /// Parse the system tag. An empty tag selects the Z1013.
    pub fn from_profile(profile: &Profile) -> Result<Self, MachineError> {
        if Z1013Config::from_profile(profile).is_some() {
            Ok(Self::Z1013)
        } else if Ac1Config::from_profile(profile).is_some() {
            Ok(Self::Ac1)
        } else if Llc2::handles(profile) {
            Ok(Self::Llc2)
        } else if Bcs3Config::from_profile(profile).is_some() {
            Ok(Self::Bcs3)
        } else if Z9001Config::from_profile(profile).is_some() {
            Ok(Self::Z9001)
        } else {
            Err(MachineError::UnknownSystem(
                profile.get_str("jkcemu.system").to_owned(),
            ))
        }
    }

    /// Like [`MachineKind::from_profile`], falling back to the Z1013 for
    /// an unknown tag.
    #[must_use]
    pub fn from_profile_or_default(profile: &Profile) -> Self {
        Self::from_profile(profile).unwrap_or_else(|e| {
            warn!("{e}, using Z1013");
            Self::Z1013
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Z1013 => "Z1013",
            Self::Ac1 => "AC1",
            Self::Llc2 => "LLC2",
            Self::Bcs3 => "BCS3",
            Self::Z9001 => "Z9001",
        }
    }
}
