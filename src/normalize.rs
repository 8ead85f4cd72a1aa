use crate::booth_url;
use crate::columns::{CanonicalField, ColumnMap};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One survey submission keyed by its header labels.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    pub timestamp: String,
    pub avatar_url: String,
    pub item_url: String,
    pub requester_id: String,
    pub desired_price: u64,
    pub preferred_worker: Option<String>,
    pub avatar_shop_id: Option<String>,
    pub avatar_item_id: Option<String>,
    pub item_shop_id: Option<String>,
    pub item_item_id: Option<String>,
    pub is_avatar_marker: bool,
}

impl NormalizedRequest {
    /// Render back into a row keyed by canonical names.
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert(CanonicalField::Timestamp.name().to_string(), self.timestamp.clone());
        row.insert(CanonicalField::AvatarUrl.name().to_string(), self.avatar_url.clone());
        row.insert(CanonicalField::ItemUrl.name().to_string(), self.item_url.clone());
        row.insert(CanonicalField::RequesterId.name().to_string(), self.requester_id.clone());
        row.insert(CanonicalField::DesiredPrice.name().to_string(), self.desired_price.to_string());
        if let Some(w) = &self.preferred_worker {
            row.insert(CanonicalField::PreferredWorker.name().to_string(), w.clone());
        }
        row
    }
}

/// Counters for one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub retained: usize,
    pub rejected_missing_ids: usize,
    pub unparsed_urls: usize,
    pub zero_priced: usize,
}

static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// First run of decimal digits in `raw`, or 0 when there is none.
///
/// An unspecified price counts as zero rather than an error.
pub fn parse_price(raw: Option<&str>) -> u64 {
    raw.and_then(|s| RE_DIGITS.find(s))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}

pub fn normalize(rows: &[RawRow]) -> Vec<NormalizedRequest> {
    normalize_with_report(rows, &ColumnMap::default()).0
}

pub fn normalize_with_report(
    rows: &[RawRow],
    columns: &ColumnMap,
) -> (Vec<NormalizedRequest>, NormalizeReport) {
    let mut report = NormalizeReport { input_rows: rows.len(), ..Default::default() };
    if rows.is_empty() {
        tracing::info!("no rows to normalize");
        return (Vec::new(), report);
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = map_columns(row, columns);
        match normalize_fields(&fields, &mut report) {
            Some(req) => out.push(req),
            None => report.rejected_missing_ids += 1,
        }
    }
    report.retained = out.len();
    tracing::info!(
        input = report.input_rows,
        retained = report.retained,
        rejected = report.rejected_missing_ids,
        "normalized survey rows"
    );
    (out, report)
}

fn map_columns<'a>(row: &'a RawRow, columns: &ColumnMap) -> HashMap<CanonicalField, &'a str> {
    let mut fields = HashMap::new();
    for (label, value) in row {
        if let Some(field) = columns.resolve(label) {
            fields.insert(field, value.as_str());
        }
    }
    fields
}

fn normalize_fields(
    fields: &HashMap<CanonicalField, &str>,
    report: &mut NormalizeReport,
) -> Option<NormalizedRequest> {
    let text = |f: CanonicalField| fields.get(&f).copied().unwrap_or_default().to_string();

    let avatar_url = text(CanonicalField::AvatarUrl);
    let item_url = text(CanonicalField::ItemUrl);
    let avatar = booth_url::extract(&avatar_url);
    let item = booth_url::extract(&item_url);
    for (url, ids) in [(&avatar_url, &avatar), (&item_url, &item)] {
        if !url.trim().is_empty() && ids.is_empty() {
            report.unparsed_urls += 1;
        }
    }

    if avatar.item_id.is_none() && item.item_id.is_none() {
        tracing::debug!(avatar_url = %avatar_url, item_url = %item_url, "dropping row without item ids");
        return None;
    }

    let desired_price = parse_price(fields.get(&CanonicalField::DesiredPrice).copied());
    if desired_price == 0 {
        report.zero_priced += 1;
    }

    let preferred_worker = fields
        .get(&CanonicalField::PreferredWorker)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(NormalizedRequest {
        timestamp: text(CanonicalField::Timestamp),
        avatar_url,
        item_url,
        requester_id: text(CanonicalField::RequesterId),
        desired_price,
        preferred_worker,
        avatar_shop_id: avatar.shop_id,
        avatar_item_id: avatar.item_id,
        item_shop_id: item.shop_id,
        item_item_id: item.item_id,
        is_avatar_marker: true,
    })
}
