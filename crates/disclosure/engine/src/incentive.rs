//! IncentiveCalculator: split a policy's reward across contributors
//!
//! Internal contributors share the incentive equally. Points go only to
//! internal staff and faculty. External contributors receive nothing.
//! Each eligible share is rounded half to even on the second decimal
//! place, so every eligible contributor receives the same amount.

use disclosure_types::{Contributor, ContributorAward, IncentiveCredit, IncentivePolicy, Money, Points};
use chrono::{DateTime, Utc};

/// Headcounts the split divides by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    /// Internal contributors, at least 1
    pub for_incentive: u64,
    /// Internal non-students, at least 1
    pub for_points: u64,
}

impl Eligibility {
    pub fn of(contributors: &[Contributor]) -> Self {
        let internal = contributors.iter().filter(|c| c.is_internal());
        let for_incentive = internal.clone().count() as u64;
        let for_points = internal.filter(|c| !c.is_student()).count() as u64;
        Self {
            for_incentive: for_incentive.max(1),
            for_points: for_points.max(1),
        }
    }
}

/// Pure reward computation
#[derive(Clone, Copy, Debug, Default)]
pub struct IncentiveCalculator;

impl IncentiveCalculator {
    /// Compute the credit for a published disclosure
    pub fn calculate(
        policy: &IncentivePolicy,
        contributors: &[Contributor],
        credited_at: DateTime<Utc>,
    ) -> IncentiveCredit {
        let eligibility = Eligibility::of(contributors);
        let per_person_incentive = policy.base_incentive.share(eligibility.for_incentive);
        let per_person_points = policy.base_points().share(eligibility.for_points);

        let awards: Vec<ContributorAward> = contributors
            .iter()
            .map(|contributor| {
                let (incentive, points) = if !contributor.is_internal() {
                    (Money::zero(), Points::zero())
                } else if contributor.is_student() {
                    (per_person_incentive, Points::zero())
                } else {
                    (per_person_incentive, per_person_points)
                };
                ContributorAward {
                    identity: contributor.identity.clone(),
                    incentive,
                    points,
                }
            })
            .collect();

        let total_incentive = awards
            .iter()
            .fold(Money::zero(), |sum, a| sum.saturating_add(a.incentive));
        let total_points = awards
            .iter()
            .fold(Points::zero(), |sum, a| sum.saturating_add(a.points));

        IncentiveCredit {
            total_incentive,
            total_points,
            awards,
            credited_at,
            used_default_policy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disclosure_types::{ContributorIdentity, EmployeeType, IprType};
    use proptest::prelude::*;

    fn patent_policy() -> IncentivePolicy {
        IncentivePolicy::new(IprType::Patent, 50, Money::from_major(50_000))
    }

    fn internal(uid: &str, employee_type: EmployeeType) -> Contributor {
        Contributor::internal(ContributorIdentity::Uid(uid.into()), employee_type, "inventor")
    }

    #[test]
    fn test_two_staff_split_evenly() {
        let credit = IncentiveCalculator::calculate(
            &patent_policy(),
            &[internal("a", EmployeeType::Staff), internal("b", EmployeeType::Staff)],
            Utc::now(),
        );
        for award in &credit.awards {
            assert_eq!(award.incentive, Money::from_major(25_000));
            assert_eq!(award.points, Points::whole(25));
        }
        assert_eq!(credit.total_incentive, Money::from_major(50_000));
        assert_eq!(credit.total_points, Points::whole(50));
    }

    #[test]
    fn test_student_gets_incentive_but_no_points() {
        let credit = IncentiveCalculator::calculate(
            &patent_policy(),
            &[internal("s", EmployeeType::Student), internal("t", EmployeeType::Staff)],
            Utc::now(),
        );
        assert_eq!(credit.awards[0].incentive, Money::from_major(25_000));
        assert_eq!(credit.awards[0].points, Points::zero());
        assert_eq!(credit.awards[1].incentive, Money::from_major(25_000));
        assert_eq!(credit.awards[1].points, Points::whole(50));
    }

    #[test]
    fn test_external_receives_nothing() {
        let credit = IncentiveCalculator::calculate(
            &patent_policy(),
            &[
                internal("f", EmployeeType::Faculty),
                Contributor::external(
                    ContributorIdentity::Email("partner@example.org".into()),
                    "industry partner",
                ),
            ],
            Utc::now(),
        );
        assert_eq!(credit.awards[0].incentive, Money::from_major(50_000));
        assert_eq!(credit.awards[0].points, Points::whole(50));
        assert_eq!(credit.awards[1].incentive, Money::zero());
        assert_eq!(credit.awards[1].points, Points::zero());
    }

    #[test]
    fn test_only_students_earn_no_points() {
        let credit = IncentiveCalculator::calculate(
            &patent_policy(),
            &[internal("s1", EmployeeType::Student), internal("s2", EmployeeType::Student)],
            Utc::now(),
        );
        assert_eq!(credit.total_points, Points::zero());
        assert_eq!(credit.total_incentive, Money::from_major(50_000));
    }

    #[test]
    fn test_three_way_split_rounds_half_even() {
        let credit = IncentiveCalculator::calculate(
            &patent_policy(),
            &[
                internal("a", EmployeeType::Staff),
                internal("b", EmployeeType::Staff),
                internal("c", EmployeeType::Staff),
            ],
            Utc::now(),
        );
        // 50000.00 / 3 = 16666.666..., 50 / 3 = 16.666...
        assert_eq!(credit.awards[0].incentive, Money::new(1_666_667));
        assert_eq!(credit.awards[0].points, Points::new(1_667));
        assert_eq!(credit.total_incentive, Money::new(5_000_001));
    }

    #[test]
    fn test_empty_roster() {
        let credit = IncentiveCalculator::calculate(&patent_policy(), &[], Utc::now());
        assert!(credit.awards.is_empty());
        assert!(credit.total_incentive.is_zero());
        assert_eq!(
            Eligibility::of(&[]),
            Eligibility {
                for_incentive: 1,
                for_points: 1
            }
        );
    }

    fn roster_strategy() -> impl Strategy<Value = Vec<Contributor>> {
        prop::collection::vec(0u8..4, 0..12).prop_map(|kinds| {
            kinds
                .into_iter()
                .enumerate()
                .map(|(i, kind)| {
                    let identity = ContributorIdentity::Uid(format!("u-{i}"));
                    match kind {
                        0 => Contributor::internal(identity, EmployeeType::Staff, "inventor"),
                        1 => Contributor::internal(identity, EmployeeType::Faculty, "inventor"),
                        2 => Contributor::internal(identity, EmployeeType::Student, "inventor"),
                        _ => Contributor::external(identity, "collaborator"),
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_split_is_equal_and_conserved(
            roster in roster_strategy(),
            base_points in 0u64..1_000,
            base_rupees in 0u64..10_000_000,
        ) {
            let policy = IncentivePolicy::new(IprType::Design, base_points, Money::from_major(base_rupees));
            let at = Utc::now();
            let credit = IncentiveCalculator::calculate(&policy, &roster, at);
            let eligibility = Eligibility::of(&roster);

            let paid: Vec<_> = credit.awards.iter().filter(|a| !a.incentive.is_zero()).collect();
            if let Some(first) = paid.first() {
                prop_assert!(paid.iter().all(|a| a.incentive == first.incentive));
            }

            let internal = roster.iter().filter(|c| c.is_internal()).count() as u64;
            if internal > 0 {
                // Rounding moves each share by at most half a paisa
                let exact = policy.base_incentive.minor() as i128;
                let total = credit.total_incentive.minor() as i128;
                prop_assert!((total - exact).abs() * 2 <= internal as i128);
                prop_assert_eq!(eligibility.for_incentive, internal);
            } else {
                prop_assert!(credit.total_incentive.is_zero());
            }

            for (contributor, award) in roster.iter().zip(&credit.awards) {
                if !contributor.is_internal() {
                    prop_assert!(award.incentive.is_zero() && award.points.is_zero());
                }
                if contributor.is_student() {
                    prop_assert!(award.points.is_zero());
                }
            }

            // Deterministic
            prop_assert_eq!(IncentiveCalculator::calculate(&policy, &roster, at), credit);
        }
    }
}
