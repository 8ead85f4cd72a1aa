use demandscope::aggregate::DemandMetric;
use demandscope::serve::metrics_response;
use demandscope::snapshot::{MemorySnapshotStore, SnapshotStore};

fn metric(avatar: &str, sales: f64) -> DemandMetric {
    DemandMetric {
        avatar_item_id: Some(avatar.to_string()),
        item_item_id: None,
        request_count: 1,
        unique_requesters: 1,
        median_price: sales,
        mean_price: sales,
        min_price: sales,
        max_price: sales,
        price_std: None,
        potential_sales: sales,
    }
}

#[test]
fn no_snapshot_is_a_structured_404() {
    let store = MemorySnapshotStore::<DemandMetric>::new();
    let resp = metrics_response(&store, None).unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body["error"], "No metrics data found");
}

#[test]
fn serves_sorted_metrics_with_exact_field_names() {
    let store = MemorySnapshotStore::<DemandMetric>::new();
    store.publish(&[metric("low", 100.0), metric("high", 900.0), metric("mid", 400.0)]).unwrap();

    let resp = metrics_response(&store, None).unwrap();
    assert_eq!(resp.status, 200);
    let data = resp.body["data"].as_array().unwrap();
    let order: Vec<&str> = data.iter().map(|m| m["avatar_item_id"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["high", "mid", "low"]);
    assert!(resp.body["timestamp"].is_string());
    assert!(resp.body["filename"].is_string());

    let keys: Vec<&String> = data[0].as_object().unwrap().keys().collect();
    for k in [
        "avatar_item_id", "item_item_id", "request_count", "unique_requesters", "median_price",
        "mean_price", "min_price", "max_price", "price_std", "potential_sales",
    ] {
        assert!(keys.iter().any(|x| x.as_str() == k), "missing {k}");
    }
    assert_eq!(keys.len(), 10);

    let top = metrics_response(&store, Some(1)).unwrap();
    assert_eq!(top.body["data"].as_array().unwrap().len(), 1);
}
