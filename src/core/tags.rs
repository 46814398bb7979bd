//! Card tags

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Space,
    Earth,
    Science,
    Power,
    Building,
    Microbe,
    Animal,
    Plant,
    Event,
    City,
    Venus,
    Jovian,
    Wildlife,
    Wild,
}

/// Most cards carry at most three tags
pub type TagList = SmallVec<[Tag; 4]>;

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Space => "space",
            Tag::Earth => "earth",
            Tag::Science => "science",
            Tag::Power => "power",
            Tag::Building => "building",
            Tag::Microbe => "microbe",
            Tag::Animal => "animal",
            Tag::Plant => "plant",
            Tag::Event => "event",
            Tag::City => "city",
            Tag::Venus => "venus",
            Tag::Jovian => "jovian",
            Tag::Wildlife => "wildlife",
            Tag::Wild => "wild",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
