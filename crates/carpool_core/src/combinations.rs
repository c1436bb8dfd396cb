//! Driver-group enumeration.
//!
//! Emits every subset of the attending users of size `1..=max_size`,
//! preserving the relative order of the input (combinations, not
//! permutations: order within a group carries no driver priority, it only
//! keeps the enumeration deterministic for caching and tests).

use itertools::Itertools;

use crate::model::User;

/// Enumerate all candidate driver groups up to `max_size` members.
///
/// Total count is `sum_{s=1}^{max_size} C(n, s)`.
pub fn generate_driver_groups(users: &[User], max_size: usize) -> Vec<Vec<User>> {
    let cap = max_size.min(users.len());
    let mut groups = Vec::new();
    for size in 1..=cap {
        groups.extend(users.iter().cloned().combinations(size));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use std::collections::BTreeSet;
    use std::collections::HashSet;

    fn users(n: u64) -> Vec<User> {
        (1..=n)
            .map(|id| User::new(id, format!("user{}", id), None))
            .collect()
    }

    fn choose(n: u64, k: u64) -> u64 {
        (1..=k).fold(1, |acc, i| acc * (n - i + 1) / i)
    }

    #[test]
    fn three_users_yield_seven_groups() {
        let groups = generate_driver_groups(&users(3), 3);
        assert_eq!(groups.len(), 7);

        let compositions: Vec<Vec<UserId>> = groups
            .iter()
            .map(|g| g.iter().map(|u| u.id).collect())
            .collect();
        assert_eq!(
            compositions,
            vec![
                vec![1],
                vec![2],
                vec![3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
                vec![1, 2, 3],
            ]
        );
    }

    #[test]
    fn count_matches_binomial_sum() {
        let n = 6;
        let groups = generate_driver_groups(&users(n), 3);
        let expected = choose(n, 1) + choose(n, 2) + choose(n, 3);
        assert_eq!(groups.len() as u64, expected);
    }

    #[test]
    fn compositions_are_distinct_and_duplicate_free() {
        let groups = generate_driver_groups(&users(6), 3);
        let mut seen: HashSet<BTreeSet<UserId>> = HashSet::new();
        for group in &groups {
            let ids: BTreeSet<UserId> = group.iter().map(|u| u.id).collect();
            assert_eq!(ids.len(), group.len(), "duplicate member within a group");
            assert!(seen.insert(ids), "duplicate group composition");
        }
    }

    #[test]
    fn max_size_is_clamped_to_user_count() {
        let groups = generate_driver_groups(&users(2), 3);
        // C(2,1) + C(2,2)
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(generate_driver_groups(&[], 3).is_empty());
    }
}
