use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Issue category inferred from a roadside-assistance report.
///
/// Declaration order matters: when two skill categories receive the same
/// number of keyword hits, the one declared first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Flat or dead battery, no-start conditions.
    Battery,
    /// Puncture, blowout, low pressure.
    Tyre,
    /// Engine failure, smoke, overheating.
    Engine,
    /// No recognisable signal in the description.
    General,
    /// Collision or injury. Always takes priority.
    Accident,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 5] = [
        Self::Battery,
        Self::Tyre,
        Self::Engine,
        Self::General,
        Self::Accident,
    ];

    /// Returns the mechanic skill that must match exactly for this category,
    /// or `None` for categories that do not narrow by skill.
    #[must_use]
    pub fn required_skill(self) -> Option<Skill> {
        match self {
            Self::Battery => Some(Skill::Battery),
            Self::Tyre => Some(Skill::Tyre),
            Self::Engine => Some(Skill::Engine),
            Self::General | Self::Accident => None,
        }
    }

    /// Returns `true` for the emergency category.
    #[must_use]
    pub fn is_emergency(self) -> bool {
        matches!(self, Self::Accident)
    }

    /// Canonical name, as stored and accepted on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Battery => "Battery",
            Self::Tyre => "Tyre",
            Self::Engine => "Engine",
            Self::General => "General",
            Self::Accident => "Accident",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Accident => "Accident / Emergency",
            other => other
                .required_skill()
                .unwrap_or(Skill::General)
                .label(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accident" | "emergency" => Ok(Self::Accident),
            other => other
                .parse::<Skill>()
                .map(Self::from)
                .map_err(|_| DispatchError::UnknownCategory(s.to_string())),
        }
    }
}

impl From<Skill> for Category {
    fn from(skill: Skill) -> Self {
        match skill {
            Skill::Battery => Self::Battery,
            Skill::Tyre => Self::Tyre,
            Skill::Engine => Self::Engine,
            Skill::General => Self::General,
        }
    }
}

/// A mechanic's declared specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Battery,
    Tyre,
    Engine,
    General,
}

impl Skill {
    /// Every skill, in declaration order.
    pub const ALL: [Skill; 4] = [Self::Battery, Self::Tyre, Self::Engine, Self::General];

    /// Canonical name, as stored and accepted on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Battery => "Battery",
            Self::Tyre => "Tyre",
            Self::Engine => "Engine",
            Self::General => "General",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Battery => "Battery Problem",
            Self::Tyre => "Tyre Puncture",
            Self::Engine => "Engine Failure",
            Self::General => "General Help",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "battery" => Ok(Self::Battery),
            "tyre" | "tire" => Ok(Self::Tyre),
            "engine" => Ok(Self::Engine),
            "general" => Ok(Self::General),
            _ => Err(DispatchError::UnknownSkill(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_skill_only_for_specialised_categories() {
        assert_eq!(Category::Battery.required_skill(), Some(Skill::Battery));
        assert_eq!(Category::Tyre.required_skill(), Some(Skill::Tyre));
        assert_eq!(Category::Engine.required_skill(), Some(Skill::Engine));
        assert_eq!(Category::General.required_skill(), None);
        assert_eq!(Category::Accident.required_skill(), None);
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("tyre".parse::<Category>().unwrap(), Category::Tyre);
        assert_eq!("TIRE".parse::<Category>().unwrap(), Category::Tyre);
        assert_eq!(" Accident ".parse::<Category>().unwrap(), Category::Accident);
        assert_eq!("emergency".parse::<Category>().unwrap(), Category::Accident);
        assert!(matches!(
            "flood".parse::<Category>(),
            Err(DispatchError::UnknownCategory(s)) if s == "flood"
        ));
    }

    #[test]
    fn skill_rejects_accident() {
        assert!(matches!(
            "Accident".parse::<Skill>(),
            Err(DispatchError::UnknownSkill(_))
        ));
    }

    #[test]
    fn display_matches_canonical_name() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
        for skill in Skill::ALL {
            assert_eq!(skill.to_string().parse::<Skill>().unwrap(), skill);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Category::Tyre.label(), "Tyre Puncture");
        assert_eq!(Category::General.label(), "General Help");
        assert_eq!(Category::Accident.label(), "Accident / Emergency");
    }
}
