use lexime_trie::{DoubleArray, TrieSearch};
use tracing::debug;

use super::{DictEntry, DictError, Dictionary, SearchResult};

/// In-memory dictionary over a double-array trie keyed by reading bytes.
pub struct TrieDictionary {
    trie: DoubleArray<u8>,
    values: Vec<Vec<DictEntry>>,
}

impl TrieDictionary {
    /// Build from `(reading, entries)` pairs. Repeated readings are merged and
    /// every entry list is sorted by cost.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<DictEntry>)>) -> Self {
        let mut pairs: Vec<(String, Vec<DictEntry>)> = entries
            .into_iter()
            .filter(|(reading, _)| !reading.is_empty())
            .collect();
        pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let mut merged: Vec<(String, Vec<DictEntry>)> = Vec::with_capacity(pairs.len());
        for (reading, candidates) in pairs {
            match merged.last_mut() {
                Some((last, acc)) if *last == reading => acc.extend(candidates),
                _ => merged.push((reading, candidates)),
            }
        }
        for (_, candidates) in &mut merged {
            candidates.sort_by_key(|e| e.cost);
        }

        let keys: Vec<&[u8]> = merged.iter().map(|(r, _)| r.as_bytes()).collect();
        let trie = DoubleArray::<u8>::build(&keys);
        let values: Vec<Vec<DictEntry>> = merged.into_iter().map(|(_, v)| v).collect();

        Self { trie, values }
    }

    /// Parse Mozc-style text: `reading\tleft_id\tright_id\tcost\tsurface` per line.
    ///
    /// Empty lines and lines starting with `#` are skipped.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut entries: Vec<(String, Vec<DictEntry>)> = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                return Err(DictError::InvalidLine {
                    line: i + 1,
                    reason: format!("expected 5 tab-separated fields, got {}", fields.len()),
                });
            }
            let (left_id, right_id, cost) =
                parse_id_cost(&fields).ok_or_else(|| DictError::InvalidLine {
                    line: i + 1,
                    reason: "left_id, right_id and cost must be integers".to_string(),
                })?;
            if fields[0].is_empty() {
                return Err(DictError::InvalidLine {
                    line: i + 1,
                    reason: "empty reading".to_string(),
                });
            }
            entries.push((
                fields[0].to_string(),
                vec![DictEntry {
                    surface: fields[4].to_string(),
                    cost,
                    left_id,
                    right_id,
                }],
            ));
        }
        let dict = Self::from_entries(entries);
        debug!(readings = dict.len(), "dictionary parsed");
        Ok(dict)
    }

    /// Number of distinct readings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse fields `[1]`, `[2]`, `[3]` as `(left_id, right_id, cost)`.
fn parse_id_cost(fields: &[&str]) -> Option<(u16, u16, i16)> {
    let left_id: u16 = fields.get(1)?.parse().ok()?;
    let right_id: u16 = fields.get(2)?.parse().ok()?;
    let cost: i16 = fields.get(3)?.parse().ok()?;
    Some((left_id, right_id, cost))
}

impl Dictionary for TrieDictionary {
    fn lookup(&self, reading: &str) -> Vec<DictEntry> {
        self.trie
            .exact_match(reading.as_bytes())
            .map(|id| self.values[id as usize].clone())
            .unwrap_or_default()
    }

    fn common_prefix_search(&self, query: &str) -> Vec<SearchResult> {
        let query_bytes = query.as_bytes();
        self.trie
            .common_prefix_search(query_bytes)
            .filter_map(|m| {
                let reading = std::str::from_utf8(&query_bytes[..m.len]).ok()?;
                Some(SearchResult {
                    reading: reading.to_string(),
                    entries: self.values[m.value_id as usize].clone(),
                })
            })
            .collect()
    }
}
