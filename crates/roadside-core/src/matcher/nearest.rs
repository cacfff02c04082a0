use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;
use crate::types::{Category, MechanicRecord, Skill};

/// Which filter produced the final candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateTier {
    /// Available mechanics whose skill equals the issue category.
    SkillMatch,
    /// No specialist was available; available `General` mechanics instead.
    GeneralFallback,
    /// Every available mechanic. Used for `General` and `Accident` issues,
    /// which never filter by skill.
    AnySkill,
}

/// Filtered candidates for one dispatch decision, ordered by mechanic id.
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    pub tier: CandidateTier,
    pub mechanics: Vec<&'a MechanicRecord>,
}

/// Runs the candidate selection pipeline over a snapshot.
///
/// Stages, in order:
/// 1. keep available mechanics;
/// 2. Battery/Tyre/Engine narrow to that exact skill;
/// 3. if that is empty, re-query the available set for `General` mechanics;
/// 4. `General` and `Accident` keep every available mechanic.
///
/// Returns `None` when the final set is empty.
#[must_use]
pub fn candidates(category: Category, mechanics: &[MechanicRecord]) -> Option<Candidates<'_>> {
    let mut available: Vec<&MechanicRecord> = mechanics.iter().filter(|m| m.available).collect();
    available.sort_by_key(|m| m.id);

    let with_skill = |skill: Skill| {
        available
            .iter()
            .copied()
            .filter(|m| m.skill == skill)
            .collect::<Vec<_>>()
    };

    let (tier, selected) = match category.required_skill() {
        Some(skill) => {
            let exact = with_skill(skill);
            if exact.is_empty() {
                (CandidateTier::GeneralFallback, with_skill(Skill::General))
            } else {
                (CandidateTier::SkillMatch, exact)
            }
        }
        None => (CandidateTier::AnySkill, available.clone()),
    };

    if selected.is_empty() {
        debug!(%category, available = available.len(), "no candidates");
        return None;
    }

    debug!(%category, ?tier, candidates = selected.len(), "candidate set");
    Some(Candidates {
        tier,
        mechanics: selected,
    })
}

/// Picks the closest mechanic from a candidate set.
///
/// Candidates are scanned in id order with a strict `<`, so the lowest id
/// wins on equal distance and a NaN distance never wins.
#[must_use]
pub fn closest<'a>(
    point: &GeoPoint,
    candidates: &[&'a MechanicRecord],
) -> Option<(&'a MechanicRecord, f64)> {
    let mut best: Option<(&'a MechanicRecord, f64)> = None;
    let mut min_dist = f64::INFINITY;

    for &mechanic in candidates {
        let dist = mechanic.distance_to(point);
        if dist < min_dist {
            min_dist = dist;
            best = Some((mechanic, dist));
        }
    }

    best
}

/// Finds the nearest available mechanic able to handle `category`.
///
/// The snapshot is only read; returns a clone of the selected record.
#[must_use]
pub fn find_nearest(
    user_lat: f64,
    user_lon: f64,
    category: Category,
    mechanics: &[MechanicRecord],
) -> Option<MechanicRecord> {
    find_nearest_with_distance(&GeoPoint::unchecked(user_lat, user_lon), category, mechanics)
        .map(|(mechanic, _)| mechanic.clone())
}

/// Like [`find_nearest`], but borrows the selected record and also returns
/// its distance in kilometres.
#[must_use]
pub fn find_nearest_with_distance<'a>(
    point: &GeoPoint,
    category: Category,
    mechanics: &'a [MechanicRecord],
) -> Option<(&'a MechanicRecord, f64)> {
    let candidates = candidates(category, mechanics)?;
    let found = closest(point, &candidates.mechanics);

    if let Some((mechanic, dist)) = found {
        debug!(
            mechanic_id = mechanic.id,
            skill = %mechanic.skill,
            distance_km = dist,
            tier = ?candidates.tier,
            "selected nearest mechanic"
        );
    }

    found
}
