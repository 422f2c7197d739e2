use crate::document::output::OutputItem;

/// Hook for a model-backed acceptance check on a produced item.
///
/// A judge can only veto an item that already passed the pixel gate; it never rescues a
/// failed comparison.
pub trait Judge: Send + Sync {
    /// Return `false` to reject `item`.
    fn judge(&self, item: &OutputItem) -> bool;
}

/// Accepts every item.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl Judge for AcceptAll {
    fn judge(&self, _item: &OutputItem) -> bool {
        true
    }
}
