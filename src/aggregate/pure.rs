//! Pure functions behind the per-cell computation
//!
//! Nothing here touches shared state: given a read-only table and a
//! candidate list, these compute one cell's neighbour sums.

use crate::table::{CellId, CellTable};

/// Reduce a raw grid disk to the neighbours that count
///
/// Drops the origin, null placeholders, repeats and any cell the
/// membership test rejects. The result is sorted ascending so that
/// summation order never depends on the grid library or on scheduling.
pub fn qualifying_neighbors<F>(origin: CellId, candidates: Vec<CellId>, is_member: F) -> Vec<CellId>
where
    F: Fn(CellId) -> bool,
{
    let mut neighbors: Vec<CellId> = candidates
        .into_iter()
        .filter(|c| *c != origin && !c.is_null() && is_member(*c))
        .collect();
    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}

/// Sum every source attribute over `neighbors`
///
/// Returns one sum per schema attribute; an empty neighbour list yields
/// all zeros. Neighbours missing from the table contribute nothing.
pub fn accumulate(table: &CellTable, neighbors: &[CellId]) -> Vec<f64> {
    let mut sums = vec![0.0; table.schema().width()];
    for record in neighbors.iter().filter_map(|n| table.get(*n)) {
        for (sum, value) in sums.iter_mut().zip(record.values()) {
            *sum += *value;
        }
    }
    sums
}

/// Position and value of the first sum that is NaN or infinite
pub fn first_non_finite(sums: &[f64]) -> Option<(usize, f64)> {
    sums.iter()
        .copied()
        .enumerate()
        .find(|(_, sum)| !sum.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;

    fn ids(raw: &[u64]) -> Vec<CellId> {
        raw.iter().copied().map(CellId::new).collect()
    }

    #[test]
    fn test_qualifying_neighbors_filters_and_sorts() {
        let origin = CellId::new(5);
        let members = ids(&[1, 2, 3, 5]);
        let candidates = ids(&[5, 3, 0, 9, 1, 3, 2]);

        let result = qualifying_neighbors(origin, candidates, |c| members.contains(&c));
        assert_eq!(result, ids(&[1, 2, 3]));
    }

    #[test]
    fn test_qualifying_neighbors_empty() {
        let origin = CellId::new(5);
        let result = qualifying_neighbors(origin, ids(&[5]), |_| true);
        assert!(result.is_empty());
    }

    #[test]
    fn test_accumulate_sums_per_attribute() {
        let schema = Schema::new("cell_id", vec!["bar".into(), "cafe".into()]).unwrap();
        let mut table = CellTable::new(schema);
        table.insert(CellId::new(1), vec![1.0, 10.0]).unwrap();
        table.insert(CellId::new(2), vec![2.0, 20.0]).unwrap();
        table.insert(CellId::new(3), vec![4.0, 40.0]).unwrap();

        assert_eq!(accumulate(&table, &ids(&[2, 3])), vec![6.0, 60.0]);
        assert_eq!(accumulate(&table, &ids(&[2, 99])), vec![2.0, 20.0]);
        assert_eq!(accumulate(&table, &[]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_finite_inputs_can_overflow() {
        let schema = Schema::new("cell_id", vec!["bar".into(), "cafe".into()]).unwrap();
        let mut table = CellTable::new(schema);
        table.insert(CellId::new(1), vec![1.0, 1.7e308]).unwrap();
        table.insert(CellId::new(2), vec![2.0, 1.7e308]).unwrap();

        let sums = accumulate(&table, &ids(&[1, 2]));
        assert_eq!(first_non_finite(&sums), Some((1, f64::INFINITY)));
        assert_eq!(first_non_finite(&[0.0, -3.5]), None);
    }
}
