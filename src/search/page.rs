//! Count-query avoidance for paginated searches.

use crate::models::PageRequest;

/// Total row count implied by the content of a page, if the content alone
/// proves it.
///
/// On the first page a short result is the whole result set. On a later page
/// a short, non-empty result means the page is the last one, so the total is
/// `offset + content_len`. Anything else (a full page, or an empty page past
/// the first) needs a count query.
pub fn known_total(content_len: usize, request: &PageRequest) -> Option<u64> {
    let content_len = content_len as u64;
    let size = u64::from(request.size);
    let offset = request.offset();

    if offset == 0 {
        return (content_len < size).then_some(content_len);
    }
    (content_len != 0 && content_len < size).then_some(offset + content_len)
}
