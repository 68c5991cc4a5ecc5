//! Correlation of execution details with test identities, and folding of
//! details into per-source-key reports.

use std::collections::{BTreeMap, HashMap};

use crate::model::{TestCaseDetail, TestDescription, UnitTestReport};

/// Execution details keyed by test id, in first-seen order. Recording a second
/// detail for an id replaces the first in place.
#[derive(Debug, Default)]
pub struct DetailsById {
    order: Vec<String>,
    by_id: HashMap<String, TestCaseDetail>,
}

impl DetailsById {
    pub fn insert(&mut self, test_id: String, detail: TestCaseDetail) {
        if self.by_id.insert(test_id.clone(), detail).is_some() {
            tracing::debug!(test_id = %test_id, "replacing earlier result for test");
        } else {
            self.order.push(test_id);
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl IntoIterator for DetailsById {
    type Item = (String, TestCaseDetail);
    type IntoIter = std::vec::IntoIter<(String, TestCaseDetail)>;

    fn into_iter(mut self) -> Self::IntoIter {
        self.order
            .into_iter()
            .filter_map(|id| self.by_id.remove(&id).map(|detail| (id, detail)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Resolve each detail's identity. Details without a description are dropped
/// with a diagnostic; the rest inherit the identity fields they lack.
pub fn correlate(
    descriptions: &HashMap<String, TestDescription>,
    details: DetailsById,
) -> Vec<TestCaseDetail> {
    let total = details.len();
    let mut resolved = Vec::with_capacity(total);
    for (test_id, mut detail) in details {
        match descriptions.get(&test_id) {
            Some(description) => {
                detail.merge(description);
                resolved.push(detail);
            }
            None => {
                tracing::warn!(
                    test_id = %test_id,
                    "result has no matching test case in the test model, skipping"
                );
            }
        }
    }
    tracing::debug!(
        total,
        resolved = resolved.len(),
        dropped = total - resolved.len(),
        "correlated test results"
    );
    resolved
}

/// Group details by source key. The first detail of a group seeds the
/// report's assembly name and source file; every detail is appended in order.
pub fn fold_by_key<I, F>(details: I, mut key_of: F) -> Vec<UnitTestReport>
where
    I: IntoIterator<Item = TestCaseDetail>,
    F: FnMut(&TestCaseDetail) -> String,
{
    let mut reports: BTreeMap<String, UnitTestReport> = BTreeMap::new();
    for detail in details {
        let key = key_of(&detail);
        reports
            .entry(key)
            .or_insert_with_key(|key| {
                tracing::debug!(source_key = %key, "new unit test report");
                UnitTestReport::new(key.clone())
                    .with_assembly_name(detail.assembly_name.clone())
                    .with_source_file(detail.source_file.clone())
            })
            .add_detail(detail);
    }
    reports.into_values().collect()
}
