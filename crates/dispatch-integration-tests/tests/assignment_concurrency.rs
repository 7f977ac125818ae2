//! # Assignment Concurrency
//!
//! The registry serializes every two-entity mutation on one write lock,
//! so two simultaneous assignment attempts against the same transporter
//! must resolve to exactly one winner, with the loser observing the
//! availability check — never a transporter carrying two packages, never
//! a half-applied pair.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Utc;

use dispatch_api::state::{AssignError, Registry};
use dispatch_core::{AccountId, PackageId};
use dispatch_state::assignment::AssignmentError;
use dispatch_state::{Account, Availability, Package, PackageKind, PackageStatus, Specialty};

fn standard_package() -> Package {
    Package::new(
        PackageId::new(),
        PackageKind::Standard,
        3.0,
        "61 Freight Terminal Road, Gdansk".to_string(),
        None,
        None,
        None,
        Utc::now(),
    )
}

fn transporter(login: &str) -> Account {
    Account::new_transporter(
        AccountId::new(),
        login.to_string(),
        "digest".to_string(),
        Specialty::Standard,
        Utc::now(),
    )
}

#[test]
fn concurrent_assignments_to_one_transporter_have_exactly_one_winner() {
    // Repeat to give an interleaving bug a real chance to show up.
    for round in 0..50 {
        let registry = Registry::new();
        let t = transporter(&format!("carrier_{round}"));
        let tid = t.id;
        registry.create_account(t).unwrap();

        let p1 = standard_package();
        let p2 = standard_package();
        let (pid1, pid2) = (p1.id, p2.id);
        registry.insert_package(p1);
        registry.insert_package(p2);

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [pid1, pid2]
            .into_iter()
            .map(|pid| {
                let registry = registry.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.assign_package(&pid, &tid, Utc::now())
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("assignment thread panicked"))
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "round {round}: expected exactly one winner");

        let loss = results
            .into_iter()
            .find(|r| r.is_err())
            .unwrap()
            .unwrap_err();
        assert!(
            matches!(
                loss,
                AssignError::Rule(AssignmentError::TransporterUnavailable { .. })
            ),
            "round {round}: loser failed with {loss:?}"
        );

        // Post-state is consistent: the transporter is on delivery and
        // exactly one package references it.
        let t = registry.account(&tid).unwrap();
        assert_eq!(t.availability, Some(Availability::OnDelivery));

        let referencing: Vec<_> = registry
            .list_packages()
            .into_iter()
            .filter(|p| p.transporter_id == Some(tid))
            .collect();
        assert_eq!(referencing.len(), 1, "round {round}");
        assert_eq!(referencing[0].status, PackageStatus::InTransit);
    }
}

#[test]
fn concurrent_assignment_and_release_never_corrupt_the_pair() {
    // One thread finishes the first delivery while another races to win
    // the freed transporter for a second package. Whatever the order, the
    // end state must be one of the two consistent outcomes.
    for round in 0..50 {
        let registry = Registry::new();
        let t = transporter(&format!("carrier_r{round}"));
        let tid = t.id;
        registry.create_account(t).unwrap();

        let first = standard_package();
        let second = standard_package();
        let (pid1, pid2) = (first.id, second.id);
        registry.insert_package(first);
        registry.insert_package(second);
        registry.assign_package(&pid1, &tid, Utc::now()).unwrap();

        let barrier = Arc::new(Barrier::new(2));

        let deliver = {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.change_package_status(&pid1, PackageStatus::Delivered, Utc::now())
            })
        };
        let grab = {
            let registry = registry.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.assign_package(&pid2, &tid, Utc::now())
            })
        };

        deliver.join().expect("deliver thread panicked").unwrap();
        let grab_result = grab.join().expect("grab thread panicked");

        let t = registry.account(&tid).unwrap();
        let second_pkg = registry.package(&pid2).unwrap();

        match grab_result {
            // Release happened first: the transporter carries the second
            // package now.
            Ok(_) => {
                assert_eq!(t.availability, Some(Availability::OnDelivery));
                assert_eq!(second_pkg.transporter_id, Some(tid));
            }
            // Assignment lost the race: transporter ended up released and
            // the second package is untouched.
            Err(AssignError::Rule(AssignmentError::TransporterUnavailable { .. })) => {
                assert_eq!(t.availability, Some(Availability::Available));
                assert!(second_pkg.is_pending());
                assert!(second_pkg.transporter_id.is_none());
            }
            Err(other) => panic!("round {round}: unexpected failure {other:?}"),
        }
    }
}
