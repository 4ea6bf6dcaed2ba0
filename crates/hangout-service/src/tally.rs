//! Vote tally over positional vote vectors.

use hangout_core::model::UserVotes;

/// Winning candidate indices. `None` means that candidate list was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyOutcome {
    pub location_index: Option<usize>,
    pub time_index: Option<usize>,
}

/// Sums one column of weights. Short vectors count as zeros; excess entries are ignored.
fn column_totals<'a>(vectors: impl Iterator<Item = &'a [u32]>, candidates: usize) -> Vec<u64> {
    let mut totals = vec![0u64; candidates];
    for vector in vectors {
        for (total, weight) in totals.iter_mut().zip(vector) {
            *total += u64::from(*weight);
        }
    }
    totals
}

/// First index holding the maximum total.
fn first_max(totals: &[u64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, total) in totals.iter().enumerate() {
        if best.is_none_or(|best| *total > totals[best]) {
            best = Some(index);
        }
    }
    best
}

/// ## Summary
/// Elementwise-sums every participant's vectors and picks the earliest index with the highest
/// total for locations and for times.
///
/// Returns `None` when nobody voted.
#[must_use]
pub fn tally_votes<'a>(
    votes: impl IntoIterator<Item = &'a UserVotes>,
    location_count: usize,
    time_count: usize,
) -> Option<TallyOutcome> {
    let votes: Vec<&UserVotes> = votes.into_iter().collect();
    if votes.is_empty() {
        return None;
    }

    let locations = column_totals(
        votes.iter().map(|vote| vote.location_votes.as_slice()),
        location_count,
    );
    let times = column_totals(
        votes.iter().map(|vote| vote.time_votes.as_slice()),
        time_count,
    );

    Some(TallyOutcome {
        location_index: first_max(&locations),
        time_index: first_max(&times),
    })
}
