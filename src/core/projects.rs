//! Standard projects: fixed-cost actions available to every player

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StandardProject {
    SellPatents,
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
}

impl StandardProject {
    pub const ALL: [StandardProject; 6] = [
        StandardProject::SellPatents,
        StandardProject::PowerPlant,
        StandardProject::Asteroid,
        StandardProject::Aquifer,
        StandardProject::Greenery,
        StandardProject::City,
    ];

    /// Credit cost of the project
    pub fn cost(&self) -> i32 {
        match self {
            StandardProject::SellPatents => 0,
            StandardProject::PowerPlant => 11,
            StandardProject::Asteroid => 14,
            StandardProject::Aquifer => 18,
            StandardProject::Greenery => 23,
            StandardProject::City => 25,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StandardProject::SellPatents => "sell-patents",
            StandardProject::PowerPlant => "power-plant",
            StandardProject::Asteroid => "asteroid",
            StandardProject::Aquifer => "aquifer",
            StandardProject::Greenery => "greenery",
            StandardProject::City => "city",
        }
    }
}

impl fmt::Display for StandardProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
