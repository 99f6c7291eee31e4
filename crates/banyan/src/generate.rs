use crate::error::{Error, Result};
use crate::rng::XorShift64Star;
use crate::tree::Record;

/// Random tree records for experiments and benchmarks.
///
/// Node `0` is the root. Every later node `i` attaches to a uniformly chosen earlier node that
/// still has fewer than `max_children` children. Ids are decimal strings.
pub fn random_records(node_count: usize, max_children: usize, seed: u64) -> Result<Vec<Record>> {
    if node_count > 1 && max_children == 0 {
        return Err(Error::InvalidConfig {
            field: "maxChildren",
            reason: "must be at least 1 to attach more than one node".to_string(),
        });
    }

    let mut rng = XorShift64Star::new(seed);
    let mut records = Vec::with_capacity(node_count);
    let mut child_counts: Vec<usize> = Vec::with_capacity(node_count);
    // Nodes that can still take a child; keeps sampling uniform without rejection loops.
    let mut open: Vec<usize> = Vec::with_capacity(node_count);

    for i in 0..node_count {
        if i == 0 {
            records.push(Record::root("0"));
        } else {
            let slot = rng.next_usize(open.len());
            let parent = open[slot];
            records.push(Record::child(i.to_string(), parent.to_string()));
            child_counts[parent] += 1;
            if child_counts[parent] >= max_children {
                open.swap_remove(slot);
            }
        }
        child_counts.push(0);
        open.push(i);
    }

    Ok(records)
}
