use crate::loyalty::loyalty_union;
use crate::model::{Cluster, Field, Record, RecordStore};

/// Merge one cluster into a single record.
///
/// `loyalty_pairs` becomes the sorted union of every member's tokens. Every
/// other field takes the value of the lowest-index member that has one.
pub fn aggregate_cluster(store: &RecordStore, cluster: &Cluster) -> Record {
    let mut members = cluster.members.clone();
    members.sort_unstable();

    let mut merged = Record::new();
    for field in Field::ALL {
        let value = if field == Field::LoyaltyPairs {
            loyalty_union(members.iter().map(|&i| store.get(i).get(field)))
        } else {
            first_non_empty(members.iter().map(|&i| store.get(i).get(field))).to_string()
        };
        merged.set(field, value);
    }
    merged
}

/// First value that is non-empty after trimming, trimmed; empty if none.
pub fn first_non_empty<'a, I>(values: I) -> &'a str
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_wins() {
        assert_eq!(first_non_empty(["", " ", "B", "C"]), "B");
        assert_eq!(first_non_empty(["", ""]), "");
        assert_eq!(first_non_empty(std::iter::empty::<&str>()), "");
    }

    #[test]
    fn merge_follows_member_index_order() {
        let store = RecordStore::new(vec![
            Record::new().with(Field::RealLastName, "SMITH").with(Field::Seat, "12A"),
            Record::new().with(Field::RealFirstName, "JOHN").with(Field::Seat, "14C"),
            Record::new()
                .with(Field::RealFirstName, "JON")
                .with(Field::Meal, "VGML")
                .with(Field::LoyaltyPairs, "SU:1|LH:2"),
            Record::new().with(Field::LoyaltyPairs, "AF:3|SU:1"),
        ]);
        // Member order given out of order on purpose.
        let cluster = Cluster { members: vec![3, 2, 1, 0] };
        let merged = aggregate_cluster(&store, &cluster);
        assert_eq!(merged.get(Field::RealLastName), "SMITH");
        assert_eq!(merged.get(Field::RealFirstName), "JOHN");
        assert_eq!(merged.get(Field::Seat), "12A");
        assert_eq!(merged.get(Field::Meal), "VGML");
        assert_eq!(merged.get(Field::LoyaltyPairs), "AF:3|LH:2|SU:1");
        assert_eq!(merged.get(Field::Docs), "");
    }

    #[test]
    fn singleton_cluster_is_identity() {
        let record = Record::new()
            .with(Field::FlightNo, "LH400")
            .with(Field::LoyaltyPairs, "LH:2|SU:1");
        let store = RecordStore::new(vec![record.clone()]);
        let merged = aggregate_cluster(&store, &Cluster { members: vec![0] });
        assert_eq!(merged, record);
    }
}
