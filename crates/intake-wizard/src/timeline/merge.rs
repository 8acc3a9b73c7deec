use super::DateRange;

/// Collapse ranges into the minimal ordered set of non-overlapping ranges.
///
/// A range that starts on or before the previous range's end is folded into it.
pub fn merge_ranges<I>(ranges: I) -> Vec<DateRange>
where
    I: IntoIterator<Item = DateRange>,
{
    let mut sorted: Vec<DateRange> = ranges.into_iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut merged: Vec<DateRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }

    merged
}
