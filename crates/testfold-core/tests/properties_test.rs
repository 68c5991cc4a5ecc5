//! Generated reports: grouping and counting hold for any shape of input.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

use proptest::prelude::*;
use testfold_core::{ReportParser, ReportSource, TestStatus};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct Case {
    fixture: String,
    method: String,
    executed: bool,
    success: bool,
    millis: u32,
    asserts: u8,
}

fn case() -> impl Strategy<Value = Case> {
    (
        prop::sample::select(vec!["Foo.Bar", "Foo.Baz", "Qux", "A.B.C"]),
        "[A-Z][a-z]{1,6}",
        any::<bool>(),
        any::<bool>(),
        0u32..5_000,
        0u8..20,
    )
        .prop_map(|(fixture, method, executed, success, millis, asserts)| Case {
            fixture: fixture.to_string(),
            method,
            executed,
            success,
            millis,
            asserts,
        })
}

fn nunit_document(cases: &[Case]) -> String {
    let mut xml = String::from(
        r#"<test-results name="suite.dll"><environment nunit-version="2.6.4"/><test-suite name="suite.dll"><results>"#,
    );
    for case in cases {
        let _ = write!(
            xml,
            r#"<test-case name="{}.{}" executed="{}" success="{}" time="{}.{:03}" asserts="{}"/>"#,
            case.fixture,
            case.method,
            if case.executed { "True" } else { "False" },
            if case.success { "True" } else { "False" },
            case.millis / 1000,
            case.millis % 1000,
            case.asserts,
        );
    }
    xml.push_str("</results></test-suite></test-results>");
    xml
}

proptest! {
    #[test]
    fn nunit_cases_land_in_exactly_their_fixture(cases in prop::collection::vec(case(), 0..40)) {
        init_tracing();
        let xml = nunit_document(&cases);
        let reports = ReportParser::default().parse(&ReportSource::from(xml.as_str())).unwrap();

        let expected: BTreeSet<&str> = cases.iter().map(|c| c.fixture.as_str()).collect();
        let keys: Vec<&str> = reports.iter().map(|r| r.source_key()).collect();
        prop_assert_eq!(keys, expected.into_iter().collect::<Vec<_>>());

        let total: usize = reports.iter().map(|r| r.tests()).sum();
        prop_assert_eq!(total, cases.len());

        for report in &reports {
            let members: Vec<&Case> = cases.iter().filter(|c| c.fixture == report.source_key()).collect();
            prop_assert_eq!(report.tests(), members.len());
            prop_assert_eq!(report.time_ms(), members.iter().map(|c| u64::from(c.millis)).sum::<u64>());
            prop_assert_eq!(report.asserts(), members.iter().map(|c| u64::from(c.asserts)).sum::<u64>());
            prop_assert_eq!(report.skipped(), members.iter().filter(|c| !c.executed).count());
            prop_assert_eq!(report.failures(), members.iter().filter(|c| c.executed && !c.success).count());
            prop_assert_eq!(report.assembly_name(), Some("suite.dll"));
        }
    }

    #[test]
    fn gallio_details_match_resolvable_results(
        known in prop::collection::btree_set(0u8..30, 0..15),
        results in prop::collection::vec((0u8..40, prop::sample::select(vec!["passed", "failed", "skipped", "inconclusive"])), 0..30),
    ) {
        init_tracing();
        let mut xml = String::from(r#"<report xmlns="http://www.gallio.org/"><testModel>"#);
        for id in &known {
            let _ = write!(
                xml,
                r#"<test id="t{id}" name="M{id}" isTestCase="true"><codeReference assembly="Gen.Tests" namespace="Gen" type="Gen.Fixture{}" member="M{id}"/><codeLocation path="Fixture{}.cs" line="{id}"/></test>"#,
                id % 3,
                id % 3,
            );
        }
        xml.push_str("</testModel><testPackageRun>");
        for (id, status) in &results {
            let _ = write!(
                xml,
                r#"<testStepRun><testStep testId="t{id}" isTestCase="true"/><result assertCount="1" duration="0.001"><outcome status="{status}"/></result></testStepRun>"#,
            );
        }
        xml.push_str("</testPackageRun></report>");

        // Later results for the same id replace earlier ones.
        let mut last: HashMap<u8, &str> = HashMap::new();
        for (id, status) in &results {
            last.insert(*id, status);
        }
        let resolvable: Vec<(u8, &str)> = last
            .into_iter()
            .filter(|(id, _)| known.contains(id))
            .collect();

        let reports = ReportParser::default().parse(&ReportSource::from(xml.as_str())).unwrap();
        let details: Vec<_> = reports.iter().flat_map(|r| r.details()).collect();
        prop_assert_eq!(details.len(), resolvable.len());

        let mut seen = BTreeSet::new();
        for report in &reports {
            for detail in report.details() {
                prop_assert_eq!(detail.source_key(), report.source_key());
                prop_assert!(seen.insert(detail.name.clone()), "detail in two reports");
            }
        }

        let failed = resolvable.iter().filter(|(_, s)| *s == "failed").count();
        let counted: usize = reports.iter().map(|r| r.failures()).sum();
        prop_assert_eq!(counted, failed);
        prop_assert!(details.iter().all(|d| d.status != TestStatus::Error));
    }
}
