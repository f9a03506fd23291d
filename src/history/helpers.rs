//! History query validation and pagination helpers.

use super::models::{HistoryParams, HistoryQuery, HistorySort, HistoryView, SortOrder};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in query-string values.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'?');

/// Validate raw history query parameters, applying defaults.
pub fn validate_params(query: HistoryQuery) -> Result<HistoryParams, String> {
    let view = HistoryView::parse(query.view.as_deref().unwrap_or("my_items"))?;
    let sort_by = HistorySort::parse(query.sort_by.as_deref().unwrap_or("purchase_date"))?;
    let sort_order = SortOrder::parse(query.sort_order.as_deref().unwrap_or("asc"))?;

    let page = match query.page.as_deref() {
        None => 1,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| "Page and page_size must be integers.".to_string())?,
    };
    let page_size = match query.page_size.as_deref() {
        None => 20,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| "Page and page_size must be integers.".to_string())?,
    };

    if page < 1 {
        return Err("Page number must be at least 1.".to_string());
    }
    if !(1..=100).contains(&page_size) {
        return Err("Page size must be between 1 and 100.".to_string());
    }

    let search = query.search.filter(|s| !s.is_empty());
    let category_id = query.category_id.filter(|s| !s.is_empty());

    Ok(HistoryParams {
        view,
        search,
        category_id,
        sort_by,
        sort_order,
        page,
        page_size,
    })
}

/// Number of pages a listing spans. An empty listing still has one page.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    ((total_items + page_size - 1) / page_size).max(1)
}

/// Relative URL for a given page of the same listing.
pub fn page_url(room_id: &str, params: &HistoryParams, page: i64) -> String {
    let mut url = format!("/rooms/{room_id}/history?view={}", params.view.as_str());
    if let Some(search) = &params.search {
        url.push_str("&search=");
        url.push_str(&utf8_percent_encode(search, QUERY_VALUE).to_string());
    }
    if let Some(category_id) = &params.category_id {
        url.push_str("&category_id=");
        url.push_str(&utf8_percent_encode(category_id, QUERY_VALUE).to_string());
    }
    url.push_str(&format!(
        "&sort_by={}&sort_order={}&page={page}&page_size={}",
        params.sort_by.as_str(),
        params.sort_order.as_str(),
        params.page_size
    ));
    url
}
