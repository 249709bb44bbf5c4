use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::{Address, ContentHash, FileEntry, FileRecord};
use crate::error::ReadError;
use crate::selection::SelectionStore;
use crate::source::RawOrderFiles;

/// Contributor -> files. Key order is first appearance in the raw read,
/// file order is scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContributionGroup {
    by_contributor: IndexMap<Address, Vec<FileEntry>>,
}

impl ContributionGroup {
    pub fn contributors(&self) -> impl Iterator<Item = &Address> {
        self.by_contributor.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &[FileEntry])> {
        self.by_contributor.iter().map(|(a, f)| (a, f.as_slice()))
    }

    pub fn files(&self, address: &Address) -> Option<&[FileEntry]> {
        self.by_contributor.get(address).map(Vec::as_slice)
    }

    pub fn contains(&self, address: &Address, hash: &ContentHash) -> bool {
        self.files(address)
            .is_some_and(|files| files.iter().any(|f| &f.content_hash == hash))
    }

    /// Position of `address` in first-seen order.
    pub fn first_seen(&self, address: &Address) -> Option<usize> {
        self.by_contributor.get_index_of(address)
    }

    pub fn len(&self) -> usize {
        self.by_contributor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_contributor.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.by_contributor.values().map(Vec::len).sum()
    }
}

/// Single pass over the records; the map remembers first-seen order.
pub fn aggregate(records: &[FileRecord]) -> ContributionGroup {
    let mut by_contributor: IndexMap<Address, Vec<FileEntry>> = IndexMap::new();
    for r in records {
        by_contributor
            .entry(r.contributor.clone())
            .or_default()
            .push(FileEntry {
                content_hash: r.content_hash.clone(),
                timestamp: r.timestamp,
            });
    }
    ContributionGroup { by_contributor }
}

/// Turn an upstream read into a group with a matching, empty selection.
/// Never fails: errors are logged and yield empty structures.
pub fn from_read(read: Result<RawOrderFiles, ReadError>) -> SelectionStore {
    let group = match read.and_then(|raw| raw.records()) {
        Ok(records) => aggregate(&records),
        Err(e) => {
            tracing::error!(error = %e, "order files read failed; showing no contributions");
            ContributionGroup::default()
        }
    };
    SelectionStore::new(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;

    fn addr(tag: u8) -> String {
        format!("0x{}", hex::encode([tag; 20]))
    }

    fn raw(entries: &[(&str, u8, u64)]) -> RawOrderFiles {
        RawOrderFiles {
            hashes: entries.iter().map(|e| e.0.to_string()).collect(),
            addresses: entries.iter().map(|e| addr(e.1)).collect(),
            timestamps: entries.iter().map(|e| Timestamp(e.2)).collect(),
        }
    }

    #[test]
    fn groups_by_first_appearance() {
        let records = raw(&[("f1", 0xa, 1), ("f2", 0xb, 2), ("f3", 0xa, 3)])
            .records()
            .unwrap();
        let g = aggregate(&records);

        let a = Address::parse(&addr(0xa)).unwrap();
        let b = Address::parse(&addr(0xb)).unwrap();
        assert_eq!(g.contributors().collect::<Vec<_>>(), vec![&a, &b]);

        let a_files: Vec<_> = g
            .files(&a)
            .unwrap()
            .iter()
            .map(|f| (f.content_hash.as_str(), f.timestamp.0))
            .collect();
        assert_eq!(a_files, vec![("f1", 1), ("f3", 3)]);
        assert_eq!(g.files(&b).unwrap().len(), 1);
        assert_eq!(g.file_count(), 3);
        assert_eq!(g.first_seen(&b), Some(1));
    }

    #[test]
    fn duplicate_files_stay_distinct() {
        let records = raw(&[("f1", 0xa, 1), ("f1", 0xa, 9)]).records().unwrap();
        let g = aggregate(&records);
        assert_eq!(g.len(), 1);
        assert_eq!(g.file_count(), 2);
    }

    #[test]
    fn read_error_degrades_to_empty() {
        let store = from_read(Err(ReadError::Unavailable("node down".into())));
        assert!(store.group().is_empty());
        assert!(store.state().is_empty());
    }

    #[test]
    fn malformed_read_degrades_to_empty() {
        let mut r = raw(&[("f1", 0xa, 1)]);
        r.timestamps.clear();
        let store = from_read(Ok(r));
        assert!(store.group().is_empty());
    }

    #[test]
    fn successful_read_has_matching_empty_selection() {
        let store = from_read(Ok(raw(&[("f1", 0xa, 1), ("f2", 0xb, 2)])));
        assert_eq!(store.group().len(), 2);
        assert_eq!(
            store.state().contributors().collect::<Vec<_>>(),
            store.group().contributors().collect::<Vec<_>>()
        );
        assert_eq!(store.selected_count(), 0);
    }
}
