/// Per-command sort key.
///
/// Lower keys execute first. [`CommandBuffer::sort`](super::CommandBuffer::sort)
/// is stable, so commands sharing a key keep their insertion order; with the
/// default key everywhere, execution order is push order.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SortKey(pub i32);

impl SortKey {
    pub const DEFAULT: Self = Self(0);

    #[inline]
    pub const fn layer(layer: i32) -> Self {
        Self(layer)
    }
}
