use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Canonical fields a survey row is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Timestamp,
    AvatarUrl,
    ItemUrl,
    RequesterId,
    DesiredPrice,
    PreferredWorker,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Timestamp,
        CanonicalField::AvatarUrl,
        CanonicalField::ItemUrl,
        CanonicalField::RequesterId,
        CanonicalField::DesiredPrice,
        CanonicalField::PreferredWorker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Timestamp => "timestamp",
            CanonicalField::AvatarUrl => "avatar_url",
            CanonicalField::ItemUrl => "item_url",
            CanonicalField::RequesterId => "requester_id",
            CanonicalField::DesiredPrice => "desired_price",
            CanonicalField::PreferredWorker => "preferred_worker",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown canonical field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for CanonicalField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Survey question labels as they appear in the form's header row.
pub const FORM_COLUMNS: [(&str, CanonicalField); 6] = [
    ("タイムスタンプ", CanonicalField::Timestamp),
    (
        "非対応改変したいアバターのBooth URLを入れてください。(https://booth.pm/{language}/items/{item_id})",
        CanonicalField::AvatarUrl,
    ),
    (
        "非対応改変したい衣装のBooth URLを入れてください。(https://booth.pm/{language}/items/{item_id})",
        CanonicalField::ItemUrl,
    ),
    (
        "あなたのTwitter IDを書いてください。非対応改変が確定した際の連絡にのみ使用します。（https://x.com/{twitter_id}）",
        CanonicalField::RequesterId,
    ),
    (
        "参考に、希望改変価格を書いてください。非対応改変作業者とのマッチング率に影響します。",
        CanonicalField::DesiredPrice,
    ),
    ("参考に、希望する非対応改変作業者を書いてください。", CanonicalField::PreferredWorker),
];

/// Label → field translation applied once at the ingestion boundary.
///
/// Canonical names always resolve to themselves, so rows read back from a
/// published record set map the same way as fresh survey rows.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    labels: HashMap<String, CanonicalField>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        let mut map = Self { labels: HashMap::new() };
        for (label, field) in FORM_COLUMNS {
            map.insert(label, field);
        }
        map
    }
}

impl ColumnMap {
    pub fn insert(&mut self, label: &str, field: CanonicalField) {
        self.labels.insert(label.trim().to_string(), field);
    }

    pub fn resolve(&self, label: &str) -> Option<CanonicalField> {
        let label = label.trim();
        self.labels
            .get(label)
            .copied()
            .or_else(|| label.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
