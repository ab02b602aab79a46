use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CourtId);

/// Drinks the dispenser can pour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beverage {
    Water,
    Fanta,
    Cola,
    Sprite,
}

impl Beverage {
    /// Sodas live behind the soda sub-menu; water has its own button.
    pub const SODAS: [Beverage; 3] = [Beverage::Fanta, Beverage::Cola, Beverage::Sprite];

    pub fn display_name(self) -> &'static str {
        match self {
            Beverage::Water => "Water",
            Beverage::Fanta => "Fanta",
            Beverage::Cola => "Coca Cola",
            Beverage::Sprite => "Sprite",
        }
    }

    pub fn has_bubbles(self) -> bool {
        Beverage::SODAS.contains(&self)
    }
}

impl fmt::Display for Beverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown beverage '{0}'")]
pub struct UnknownBeverage(pub String);

impl FromStr for Beverage {
    type Err = UnknownBeverage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(Beverage::Water),
            "fanta" => Ok(Beverage::Fanta),
            "cola" | "coca" | "coca cola" | "coca-cola" => Ok(Beverage::Cola),
            "sprite" => Ok(Beverage::Sprite),
            _ => Err(UnknownBeverage(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}
