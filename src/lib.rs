use std::{fmt, num::ParseIntError, ops, slice, str::FromStr, vec};

use thiserror::Error;

/// inclusive
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Span {
    start: i64,
    last: i64,
}

impl Span {
    #[inline]
    pub fn new(start: i64, last: i64) -> Self {
        debug_assert!(start <= last);
        Span { start, last }
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[inline]
    pub fn last(&self) -> i64 {
        self.last
    }

    /// Number of integers covered, saturating for `i64::MIN..=i64::MAX`.
    #[inline]
    pub fn len(&self) -> u64 {
        self.last.abs_diff(self.start).saturating_add(1)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        self.start == self.last
    }
}

impl From<(i64, i64)> for Span {
    #[inline]
    fn from(rng: (i64, i64)) -> Self {
        Span::new(rng.0, rng.1)
    }
}

impl IntoIterator for Span {
    type Item = i64;
    type IntoIter = ops::RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..=self.last
    }
}

/// `2018` for a single value, `2018-2022` otherwise.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.last)
        } else {
            write!(f, "{}-{}", self.start, self.last)
        }
    }
}

/// A bag of integers kept in insertion order.
///
/// Nothing is deduplicated or sorted on the way in: `add` appends and `parse` appends every
/// value a segment expands to, in segment order. Ordering only shows up when the set is
/// rendered, and rendering works on a sorted copy so the insertion order survives.
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct IntSet(Vec<i64>);

impl fmt::Debug for IntSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl IntSet {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn add(&mut self, n: i64) {
        self.0.push(n);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, i64> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }

    /// Sorts the values ascending in place. Rendering never does this for you.
    pub fn sort(&mut self) {
        self.0.sort_unstable();
    }

    /// Collapses a sorted snapshot of the values into maximal runs.
    ///
    /// Neighbours that differ by at most one stay in the same run, so duplicates neither
    /// split a run nor widen it. A gap of two or more closes the run.
    pub fn runs(&self) -> Vec<Span> {
        let mut sorted = self.0.clone();
        sorted.sort_unstable();

        let mut runs = Vec::new();
        let mut cur_run: Option<Span> = None;
        for n in sorted {
            match cur_run.as_mut() {
                None => {
                    cur_run = Some(Span::from((n, n)));
                }
                Some(run) if n.abs_diff(run.last) <= 1 => {
                    run.last = n;
                }
                Some(run) => {
                    runs.push(*run);
                    *run = Span::from((n, n));
                }
            }
        }
        if let Some(last_run) = cur_run {
            runs.push(last_run);
        }
        runs
    }

    /// The compressed notation, e.g. `{2012,2013,2017,2018,2019,2022}` gives
    /// `2012-2013,2017-2019,2022`. An empty set renders as an empty string.
    ///
    /// # Notes
    ///
    /// The output only parses back when every value is non-negative: `[-3, -2]` renders as
    /// `-3--2`, which [`IntSet::parse`] rejects.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Parses the compressed notation back into values, e.g. `2012-2014,2020` gives
    /// `[2012, 2013, 2014, 2020]`.
    ///
    /// Segments are split on `,` and trimmed. Values come out in segment order, spans expanded
    /// ascending, with no sorting across segments and no deduplication. A reversed span such as
    /// `5-2` contributes nothing. Blank input is a single empty segment and fails like any other
    /// non-integer. The first bad segment aborts the whole parse, as does a span too large to
    /// hold in memory.
    pub fn parse(input: &str) -> Result<IntSet, Error> {
        let mut set = IntSet::new();
        for segment in input.split(',') {
            let segment = segment.trim();
            tracing::trace!(segment, "parsing segment");

            if segment.contains('-') {
                let parts: Vec<&str> = segment.split('-').collect();
                let &[start, last] = parts.as_slice() else {
                    return Err(Error::MalformedSpan(segment.into()));
                };
                let start = parse_int(start)?;
                let last = parse_int(last)?;
                if start > last {
                    tracing::debug!(segment, "reversed span contributes no values");
                    continue;
                }
                let span = Span::from((start, last));
                let reserved = usize::try_from(span.len())
                    .ok()
                    .and_then(|len| set.0.try_reserve(len).ok());
                if reserved.is_none() {
                    return Err(Error::MalformedSpan(segment.into()));
                }
                set.0.extend(span);
                continue;
            }

            set.add(parse_int(segment)?);
        }
        Ok(set)
    }

    /// Parses notation that is known to be valid, such as a constant in source code.
    ///
    /// # Panics
    ///
    /// Panics with the parse error if `input` is malformed. Use [`IntSet::parse`] for anything
    /// a user typed.
    #[track_caller]
    pub fn from_literal(input: &str) -> IntSet {
        match IntSet::parse(input) {
            Ok(set) => set,
            Err(err) => panic!("invalid int set literal {input:?}: {err}"),
        }
    }
}

fn parse_int(text: &str) -> Result<i64, Error> {
    text.parse().map_err(|source| Error::InvalidInteger {
        text: text.into(),
        source,
    })
}

impl fmt::Display for IntSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.runs().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{run}")?;
        }
        Ok(())
    }
}

impl FromStr for IntSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntSet::parse(s)
    }
}

impl FromIterator<i64> for IntSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        IntSet(iter.into_iter().collect())
    }
}

impl Extend<i64> for IntSet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<Vec<i64>> for IntSet {
    #[inline]
    fn from(values: Vec<i64>) -> Self {
        IntSet(values)
    }
}

impl IntoIterator for IntSet {
    type Item = i64;
    type IntoIter = vec::IntoIter<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntSet {
    type Item = &'a i64;
    type IntoIter = slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<Vec<i64>> for IntSet {
    fn eq(&self, other: &Vec<i64>) -> bool {
        self.0 == *other
    }
}

impl PartialEq<[i64]> for IntSet {
    fn eq(&self, other: &[i64]) -> bool {
        self.0 == other
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid int span: {0}")]
    MalformedSpan(Box<str>),
    #[error("could not convert {text:?} to int")]
    InvalidInteger {
        text: Box<str>,
        #[source]
        source: ParseIntError,
    },
}

// Stored as the rendered string so a set reads naturally inside a config file.
#[cfg(feature = "serde")]
impl serde::Serialize for IntSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IntSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        IntSet::parse(&text).map_err(serde::de::Error::custom)
    }
}
