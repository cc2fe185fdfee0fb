//! Scavenger: the sweep that physically removes slots whose keys are dead.

use crate::table::{unlink, Table};
use crate::weak_handle::WeakHandle;
use log::debug;
use slotmap::DefaultKey;

/// Remove every slot whose key has been dropped. Returns the number removed.
///
/// One pass over the slots finds the dead ones using `is_expired`, so no
/// strong reference to a live key is ever created. Each dead slot is then
/// unlinked through its cached hash. Live slots are not touched or rehashed.
/// The removed values are dropped after the table is consistent again.
pub(crate) fn scavenge<W, V, C>(table: &mut Table<W, V, C>) -> usize
where
    W: WeakHandle,
{
    let reclaimed = {
        let _g = table.reentrancy.enter("scavenge");
        let dead: Vec<(DefaultKey, u64)> = table
            .slots
            .iter()
            .filter(|(_, s)| s.entry.is_dead())
            .map(|(k, s)| (k, s.entry.hash()))
            .collect();

        let mut reclaimed = Vec::with_capacity(dead.len());
        for (slot, hash) in dead {
            let unlinked = unlink(&mut table.index, slot, hash);
            debug_assert!(unlinked, "dead slot missing from its bucket");
            if let Some(s) = table.slots.remove(slot) {
                reclaimed.push(s.value);
            }
        }
        reclaimed
    };

    let removed = reclaimed.len();
    if removed > 0 {
        debug!(
            "scavenged {} dead entries, {} remain",
            removed,
            table.len()
        );
    }
    drop(reclaimed);
    removed
}
