//! Weighted entry selection with constraint relaxation.

use crowd_runner_core::{EntryTable, PoolEntry, UnitCategory};
use log::warn;
use rand::Rng;

/// Selects the next entry index from the weighted pool, or `None` when the
/// pool is exhausted.
///
/// Candidates must have positive weight and a definition. An entry that
/// forbids immediate repeats is excluded while it was the previous pick,
/// except when it is the only selectable entry in the whole pool; excluding
/// it then would stall generation forever, so the repeat is allowed and a
/// warning is reported. Entries whose category already ran to its
/// `max_consecutive_category` cap are excluded on the first pass; if that
/// empties the candidate set, a second pass drops only the category rule.
///
/// The weighted draw walks candidates in table order accumulating weight and
/// picks the first whose cumulative weight reaches the draw, so ties break
/// toward earlier entries. The caller owns the run-state updates.
pub fn select_entry(
    rng: &mut impl Rng,
    table: &EntryTable,
    last_entry: Option<usize>,
    last_category: UnitCategory,
    consecutive_category: u32,
) -> Option<usize> {
    let entries = &table.entries;
    let lone_no_repeat = lone_no_repeat_index(entries);
    let forced_repeat = lone_no_repeat.is_some() && lone_no_repeat == last_entry;
    if forced_repeat {
        warn!("the only selectable entry forbids repeats; allowing the repeat to avoid a stall");
    }

    let mut candidates = collect_candidates(
        entries,
        last_entry,
        last_category,
        consecutive_category,
        forced_repeat,
        true,
    );
    if candidates.is_empty() {
        candidates = collect_candidates(
            entries,
            last_entry,
            last_category,
            consecutive_category,
            forced_repeat,
            false,
        );
    }
    if candidates.is_empty() {
        return None;
    }

    let total_weight: f32 = candidates.iter().map(|&index| entries[index].weight).sum();
    weighted_pick(rng, entries, &candidates, total_weight)
}

/// Index of the pool's only selectable entry when that entry forbids repeats.
fn lone_no_repeat_index(entries: &[PoolEntry]) -> Option<usize> {
    let mut selectable = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_selectable());
    let (index, entry) = selectable.next()?;
    if selectable.next().is_some() || entry.allow_immediate_repeat {
        return None;
    }
    Some(index)
}

fn collect_candidates(
    entries: &[PoolEntry],
    last_entry: Option<usize>,
    last_category: UnitCategory,
    consecutive_category: u32,
    forced_repeat: bool,
    enforce_category_rule: bool,
) -> Vec<usize> {
    let mut candidates = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(definition) = entry.definition.as_ref() else {
            continue;
        };
        if entry.weight <= 0.0 {
            continue;
        }

        let forbid_immediate = !entry.allow_immediate_repeat && !forced_repeat;
        if forbid_immediate && Some(index) == last_entry {
            continue;
        }

        if enforce_category_rule
            && entry.max_consecutive_category > 0
            && definition.category == last_category
            && consecutive_category >= entry.max_consecutive_category
        {
            continue;
        }

        candidates.push(index);
    }
    candidates
}

fn weighted_pick(
    rng: &mut impl Rng,
    entries: &[PoolEntry],
    candidates: &[usize],
    total_weight: f32,
) -> Option<usize> {
    let first = candidates.first().copied()?;
    let draw = rng.gen::<f32>() * total_weight;
    let mut accumulated = 0.0;
    for &index in candidates {
        accumulated += entries[index].weight;
        if draw <= accumulated {
            return Some(index);
        }
    }
    // Float round-off can leave the draw above the final accumulator.
    Some(first)
}
