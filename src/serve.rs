use crate::aggregate::DemandMetric;
use crate::snapshot::{SnapshotStore, StoreError};
use serde::Serialize;
use serde_json::{json, Value};

/// Status and JSON body the read API answers with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServeResponse {
    pub status: u16,
    pub body: Value,
}

/// Build the demand-metrics read response from the latest published snapshot.
///
/// `top` truncates the ranked list when set.
pub fn metrics_response<S>(store: &S, top: Option<usize>) -> Result<ServeResponse, StoreError>
where
    S: SnapshotStore<DemandMetric> + ?Sized,
{
    let Some(snapshot) = store.latest()? else {
        return Ok(ServeResponse { status: 404, body: json!({ "error": "No metrics data found" }) });
    };

    let mut data = snapshot.records;
    data.sort_by(|a, b| b.potential_sales.total_cmp(&a.potential_sales));
    if let Some(n) = top {
        data.truncate(n);
    }

    Ok(ServeResponse {
        status: 200,
        body: json!({
            "data": data,
            "timestamp": snapshot.published_at,
            "filename": snapshot.name,
        }),
    })
}
