//! The lock plan: which cell format index realizes "locked" or "unlocked"
//! for each original format.
//!
//! Cell-level protection is a style property, so locking a cell means
//! pointing its `s` attribute at a format that is identical to its current
//! one except for the locked flag. The plan synthesizes that twin for every
//! original format, reusing an existing record when one already matches so
//! repeated runs keep the style table stable.

use std::collections::HashMap;

use crate::parser::styles::XfRecord;

#[derive(Debug)]
pub(crate) struct StylePlan {
    /// Original records followed by any synthesized twins, in emit order.
    records: Vec<XfRecord>,
    /// Per original record: index of its unlocked twin.
    unlocked_of: Vec<usize>,
    /// Per original record: index of its locked twin.
    locked_of: Vec<usize>,
    /// How many records the stylesheet originally had.
    original_len: usize,
}

impl StylePlan {
    pub fn build(originals: Vec<XfRecord>) -> Self {
        let original_len = originals.len();
        let mut records = originals;

        // Index every record by its protection-independent identity so twin
        // lookups can reuse records that already exist (including twins
        // appended by a previous run).
        let mut index: HashMap<_, usize> = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry((record.twin_key(), record.locked)).or_insert(i);
        }

        let mut unlocked_of = Vec::with_capacity(original_len);
        let mut locked_of = Vec::with_capacity(original_len);

        for i in 0..original_len {
            let mut twin = |target: bool, records: &mut Vec<XfRecord>| -> usize {
                let (key, flipped) = {
                    let Some(record) = records.get(i) else {
                        return 0;
                    };
                    if record.locked == target {
                        return i;
                    }
                    ((record.twin_key(), target), record.flipped())
                };
                if let Some(&existing) = index.get(&key) {
                    return existing;
                }
                records.push(flipped);
                let new_idx = records.len() - 1;
                index.insert(key, new_idx);
                new_idx
            };
            let unlocked = twin(false, &mut records);
            let locked = twin(true, &mut records);
            unlocked_of.push(unlocked);
            locked_of.push(locked);
        }

        Self {
            records,
            unlocked_of,
            locked_of,
            original_len,
        }
    }

    /// Map an original style index to the index carrying the target state.
    ///
    /// Returns `None` for indices the stylesheet never declared.
    pub fn map(&self, style_idx: usize, locked: bool) -> Option<usize> {
        if style_idx >= self.original_len {
            return None;
        }
        let table = if locked {
            &self.locked_of
        } else {
            &self.unlocked_of
        };
        table.get(style_idx).copied()
    }

    /// All records (originals plus twins) in emit order.
    pub fn records(&self) -> &[XfRecord] {
        &self.records
    }
}
