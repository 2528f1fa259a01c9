use std::fmt;

use crate::{ItemId, SelectableItem};

/// One concrete way to obtain an item's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// `GET /files/{id}/watermarked` with the bearer credential.
    Watermark { item_id: ItemId },
    /// Anonymous GET of the item's direct locator.
    Direct { url: String },
    /// `GET /files/{id}/download` with the bearer credential.
    Api { item_id: ItemId },
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Watermark { .. } => "watermark",
            Strategy::Direct { .. } => "direct",
            Strategy::Api { .. } => "api",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fallback chain for one item, in the order strategies must be attempted.
///
/// The authenticated API download is always last and always present.
pub fn resolve_strategies(item: &SelectableItem, watermark: bool) -> Vec<Strategy> {
    let mut chain = Vec::with_capacity(3);
    if watermark && item.is_image() && item.fingerprint().is_some() {
        chain.push(Strategy::Watermark {
            item_id: item.id.clone(),
        });
    }
    if let Some(url) = item.direct_url() {
        chain.push(Strategy::Direct {
            url: url.to_string(),
        });
    }
    chain.push(Strategy::Api {
        item_id: item.id.clone(),
    });
    chain
}
