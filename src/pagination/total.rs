//! Collection size from the `last` relation

use super::links::{page_from_endpoint, per_page_from_endpoint, query_value};
use super::rest::RestPager;
use crate::error::{Error, Result};
use crate::http::RequestOptions;
use tracing::debug;

/// Sizes a collection with at most two requests.
///
/// The first request asks for one item per page, so the `last` link's page
/// number is the item count minus the final page. The estimate assumes every
/// page but the last is full.
#[derive(Clone, Copy)]
pub struct TotalEstimator<'a> {
    pager: RestPager<'a>,
}

impl<'a> TotalEstimator<'a> {
    /// Create an estimator on top of a pager
    pub fn new(pager: RestPager<'a>) -> Self {
        Self { pager }
    }

    /// Number of items behind `endpoint`.
    ///
    /// `endpoint` must not carry `per_page`; that parameter is set here.
    pub async fn estimate(&self, endpoint: &str) -> Result<u64> {
        if query_value(endpoint, "per_page").is_some() {
            return Err(Error::invalid_endpoint(
                endpoint,
                "per_page is set by the estimator and must not be supplied",
            ));
        }

        let first = self
            .pager
            .get(endpoint, &RequestOptions::new().query("per_page", "1"))
            .await?;

        let Some(last) = self.pager.links().resolve_last(&first.links)? else {
            let total = first.into_batch().len() as u64;
            debug!("{endpoint} fits on one page: {total} items");
            return Ok(total);
        };

        let page = page_from_endpoint(&last)
            .filter(|page| *page > 0)
            .ok_or_else(|| Error::UnparsableLastPage { link: last.clone() })?;
        let per_page = per_page_from_endpoint(&last);
        let before_last = per_page
            .checked_mul(page - 1)
            .ok_or_else(|| Error::UnparsableLastPage { link: last.clone() })?;

        let on_last_page = self
            .pager
            .get(&last, &RequestOptions::new())
            .await?
            .into_batch()
            .len() as u64;

        let total = before_last
            .checked_add(on_last_page)
            .ok_or_else(|| Error::UnparsableLastPage { link: last.clone() })?;
        debug!("{endpoint}: {page} pages of {per_page}, {on_last_page} on the last, total {total}");
        Ok(total)
    }
}
