use crate::normalize::NormalizedRequest;
use crate::stats;
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Demand statistics for one (avatar item, target item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandMetric {
    pub avatar_item_id: Option<String>,
    pub item_item_id: Option<String>,
    pub request_count: usize,
    pub unique_requesters: usize,
    pub median_price: f64,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub price_std: Option<f64>,
    pub potential_sales: f64,
}

type GroupKey<'a> = (Option<&'a str>, Option<&'a str>);

/// A group is created with its first member, so it is never empty.
struct Group<'a> {
    key: GroupKey<'a>,
    first: &'a NormalizedRequest,
    rest: Vec<&'a NormalizedRequest>,
}

impl<'a> Group<'a> {
    fn members(&self) -> impl Iterator<Item = &'a NormalizedRequest> + '_ {
        std::iter::once(self.first).chain(self.rest.iter().copied())
    }
}

/// Group requests by identifier pair and rank by potential sales.
///
/// Missing identifiers are part of the key, so every request lacking a
/// target item id lands in one group per avatar id. Ties in
/// `potential_sales` keep first-encounter order.
pub fn aggregate(requests: &[NormalizedRequest]) -> Vec<DemandMetric> {
    if requests.is_empty() {
        tracing::info!("no requests to aggregate");
        return Vec::new();
    }

    let mut index: AHashMap<GroupKey<'_>, usize> = AHashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();
    for req in requests {
        let key = (req.avatar_item_id.as_deref(), req.item_item_id.as_deref());
        match index.get(&key) {
            Some(&slot) => groups[slot].rest.push(req),
            None => {
                index.insert(key, groups.len());
                groups.push(Group { key, first: req, rest: Vec::new() });
            }
        }
    }

    let mut metrics: Vec<DemandMetric> = groups.iter().map(summarize_group).collect();
    metrics.sort_by(|a, b| b.potential_sales.total_cmp(&a.potential_sales));

    tracing::info!(groups = metrics.len(), requests = requests.len(), "aggregated demand metrics");
    metrics
}

fn summarize_group(group: &Group<'_>) -> DemandMetric {
    let rest: Vec<f64> = group.rest.iter().map(|r| r.desired_price as f64).collect();
    let prices = stats::Summary::of(group.first.desired_price as f64, &rest);
    let request_count = rest.len() + 1;

    DemandMetric {
        avatar_item_id: group.key.0.map(str::to_string),
        item_item_id: group.key.1.map(str::to_string),
        request_count,
        unique_requesters: group.members().map(|r| r.requester_id.as_str()).unique().count(),
        median_price: prices.median,
        mean_price: prices.mean,
        min_price: prices.min,
        max_price: prices.max,
        price_std: prices.sample_std,
        potential_sales: request_count as f64 * prices.median,
    }
}
