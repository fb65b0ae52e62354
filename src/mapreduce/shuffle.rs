//! Grouping map output by key.
//!
//! The shuffle is the barrier between the map and reduce phases: every pair
//! is pushed before any group is handed out, and groups come back in
//! ascending key order.
//!
//! With a spill threshold, buffered groups are written to anonymous temp
//! files as sorted runs whenever the threshold is reached. Each run is a
//! sequence of frames, a little-endian `u32` length followed by a postcard
//! encoded `(key, values)` tuple. [`ShuffleBuffer::finish`] then merges the
//! runs, concatenating the values of keys that appear in more than one run.

use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{btree_map, BTreeMap, BinaryHeap};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpillSettings {
    /// Buffered pairs that trigger a spill
    pub threshold: usize,
    /// Where run files are created; `None` uses the system temp dir
    pub dir: Option<PathBuf>,
}

pub struct ShuffleBuffer<K, V> {
    groups: BTreeMap<K, Vec<V>>,
    buffered: usize,
    spill: Option<SpillSettings>,
    runs: Vec<File>,
}

impl<K, V> ShuffleBuffer<K, V>
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    pub fn new(spill: Option<SpillSettings>) -> Self {
        Self {
            groups: BTreeMap::new(),
            buffered: 0,
            spill,
            runs: Vec::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn push(&mut self, key: K, value: V) -> Result<()> {
        self.groups.entry(key).or_default().push(value);
        self.buffered += 1;

        let threshold = self.spill.as_ref().map(|s| s.threshold.max(1));
        if threshold.is_some_and(|limit| self.buffered >= limit) {
            self.spill_run()?;
        }
        Ok(())
    }

    /// Number of runs written to disk so far.
    pub fn spilled_runs(&self) -> usize {
        self.runs.len()
    }

    fn create_run_file(&self) -> io::Result<File> {
        match self.spill.as_ref().and_then(|s| s.dir.as_ref()) {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
    }

    fn spill_run(&mut self) -> Result<()> {
        if self.groups.is_empty() {
            return Ok(());
        }

        let file = self
            .create_run_file()
            .map_err(|e| Error::Spill(format!("failed to create spill file: {e}")))?;
        let mut writer = BufWriter::new(file);
        for group in std::mem::take(&mut self.groups) {
            write_frame(&mut writer, &group)?;
        }
        let mut file = writer.into_inner().map_err(|e| e.into_error())?;
        file.seek(SeekFrom::Start(0))?;

        tracing::debug!(
            "Spilled run {} with {} buffered pairs",
            self.runs.len() + 1,
            self.buffered
        );
        self.runs.push(file);
        self.buffered = 0;
        Ok(())
    }

    /// Close the buffer and iterate over the groups in key order.
    pub fn finish(mut self) -> Result<Groups<K, V>> {
        if self.runs.is_empty() {
            return Ok(Groups::Memory(self.groups.into_iter()));
        }

        self.spill_run()?;
        let merger = RunMerger::new(std::mem::take(&mut self.runs))?;
        Ok(Groups::Merged(merger))
    }
}

fn write_frame<T: Serialize, W: Write>(writer: &mut W, value: &T) -> Result<()> {
    let frame = postcard::to_allocvec(value)?;
    let len = u32::try_from(frame.len())
        .map_err(|_| Error::Spill(format!("frame of {} bytes is too large", frame.len())))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&frame)?;
    Ok(())
}

/// Read the next frame, or `None` at a clean end of file.
fn read_frame<T: DeserializeOwned, R: Read>(reader: &mut R) -> Result<Option<T>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let mut frame = vec![0u8; u32::from_le_bytes(len_bytes) as usize];
    reader
        .read_exact(&mut frame)
        .map_err(|e| Error::Spill(format!("truncated spill frame: {e}")))?;
    Ok(Some(postcard::from_bytes(&frame)?))
}

/// Key groups produced by a finished shuffle.
pub enum Groups<K, V> {
    Memory(btree_map::IntoIter<K, Vec<V>>),
    Merged(RunMerger<K, V>),
}

impl<K, V> Iterator for Groups<K, V>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    type Item = Result<(K, Vec<V>)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Groups::Memory(groups) => groups.next().map(Ok),
            Groups::Merged(merger) => merger.next(),
        }
    }
}

/// K-way merge over sorted spill runs.
pub struct RunMerger<K, V> {
    readers: Vec<BufReader<File>>,
    heads: Vec<Option<Vec<V>>>,
    heap: BinaryHeap<Reverse<(K, usize)>>,
    failed: bool,
}

impl<K, V> RunMerger<K, V>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    fn new(runs: Vec<File>) -> Result<Self> {
        let mut merger = Self {
            heads: runs.iter().map(|_| None).collect(),
            readers: runs.into_iter().map(BufReader::new).collect(),
            heap: BinaryHeap::new(),
            failed: false,
        };
        for index in 0..merger.readers.len() {
            merger.advance(index)?;
        }
        Ok(merger)
    }

    /// Load the next group of run `index` into its head slot.
    fn advance(&mut self, index: usize) -> Result<()> {
        if let Some((key, values)) = read_frame::<(K, Vec<V>), _>(&mut self.readers[index])? {
            self.heads[index] = Some(values);
            self.heap.push(Reverse((key, index)));
        }
        Ok(())
    }

    fn take_head(&mut self, index: usize) -> Result<Vec<V>> {
        let values = self.heads[index].take().unwrap_or_default();
        self.advance(index)?;
        Ok(values)
    }

    fn collect_key(&mut self, key: K, index: usize) -> Result<(K, Vec<V>)> {
        let mut values = self.take_head(index)?;
        while self
            .heap
            .peek()
            .is_some_and(|Reverse((next, _))| next == &key)
        {
            if let Some(Reverse((_, next_index))) = self.heap.pop() {
                values.extend(self.take_head(next_index)?);
            }
        }
        Ok((key, values))
    }
}

impl<K, V> Iterator for RunMerger<K, V>
where
    K: Ord + DeserializeOwned,
    V: DeserializeOwned,
{
    type Item = Result<(K, Vec<V>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let Reverse((key, index)) = self.heap.pop()?;
        let group = self.collect_key(key, index);
        self.failed = group.is_err();
        Some(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn collect(groups: Groups<String, u64>) -> Vec<(String, Vec<u64>)> {
        groups
            .map(|group| {
                let (key, mut values) = group.unwrap();
                values.sort_unstable();
                (key, values)
            })
            .collect()
    }

    fn pairs() -> Vec<(String, u64)> {
        vec![
            ("eggs".into(), 1),
            ("chocolates".into(), 2),
            ("pumpkins".into(), 3),
            ("eggs".into(), 4),
            ("candy corn".into(), 5),
            ("chocolates".into(), 6),
            ("eggs".into(), 7),
        ]
    }

    #[test]
    fn test_in_memory_groups_in_key_order() {
        let mut shuffle = ShuffleBuffer::in_memory();
        for (key, value) in pairs() {
            shuffle.push(key, value).unwrap();
        }
        assert_eq!(shuffle.spilled_runs(), 0);

        let groups = collect(shuffle.finish().unwrap());
        assert_eq!(
            groups,
            vec![
                ("candy corn".to_string(), vec![5]),
                ("chocolates".to_string(), vec![2, 6]),
                ("eggs".to_string(), vec![1, 4, 7]),
                ("pumpkins".to_string(), vec![3]),
            ]
        );
    }

    #[test]
    fn test_in_memory_keeps_push_order_within_key() {
        let mut shuffle = ShuffleBuffer::in_memory();
        for value in [3u64, 1, 2] {
            shuffle.push("k".to_string(), value).unwrap();
        }
        let (_, values) = shuffle.finish().unwrap().next().unwrap().unwrap();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_spilling_matches_in_memory() {
        let mut memory = ShuffleBuffer::in_memory();
        let mut spilling = ShuffleBuffer::new(Some(SpillSettings {
            threshold: 2,
            dir: None,
        }));
        for (key, value) in pairs() {
            memory.push(key.clone(), value).unwrap();
            spilling.push(key, value).unwrap();
        }
        assert_eq!(spilling.spilled_runs(), 3);

        assert_eq!(
            collect(spilling.finish().unwrap()),
            collect(memory.finish().unwrap())
        );
    }

    #[test]
    fn test_spill_into_configured_dir() {
        let temp = TempDir::new().unwrap();
        let mut shuffle = ShuffleBuffer::new(Some(SpillSettings {
            threshold: 1,
            dir: Some(temp.path().to_path_buf()),
        }));
        for (key, value) in pairs() {
            shuffle.push(key, value).unwrap();
        }
        assert_eq!(shuffle.spilled_runs(), pairs().len());
        assert_eq!(collect(shuffle.finish().unwrap()).len(), 4);
    }

    #[test]
    fn test_spill_to_missing_dir_fails() {
        let mut shuffle: ShuffleBuffer<String, u64> = ShuffleBuffer::new(Some(SpillSettings {
            threshold: 1,
            dir: Some(PathBuf::from("/definitely/not/a/dir")),
        }));
        let err = shuffle.push("k".into(), 1).unwrap_err();
        assert_eq!(err.category(), "Spill");
    }

    #[test]
    fn test_empty_shuffle() {
        let shuffle: ShuffleBuffer<String, u64> = ShuffleBuffer::in_memory();
        assert_eq!(shuffle.finish().unwrap().count(), 0);
    }

    #[test]
    fn test_frame_round_trip_and_eof() {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &("eggs".to_string(), vec![1u64, 2])).unwrap();

        let mut reader = Cursor::new(bytes);
        let frame: Option<(String, Vec<u64>)> = read_frame(&mut reader).unwrap();
        assert_eq!(frame, Some(("eggs".to_string(), vec![1, 2])));
        let end: Option<(String, Vec<u64>)> = read_frame(&mut reader).unwrap();
        assert_eq!(end, None);
    }

    #[test]
    fn test_truncated_frame_is_an_error() {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, &("eggs".to_string(), vec![1u64])).unwrap();
        bytes.truncate(bytes.len() - 1);

        let result: Result<Option<(String, Vec<u64>)>> = read_frame(&mut Cursor::new(bytes));
        assert!(result.is_err());
    }
}
