use castwatch_core::release::MediaKind;

use crate::{
  Result, TmdbClient,
  models::{Paginated, RawWork},
};

impl TmdbClient {
  /// Every page of `/discover/{movie,tv}?with_cast=<cast_id>`, newest first.
  ///
  /// Stops after the last page reported by `total_pages` (a response without
  /// it counts as the last page), on the first empty page, or at
  /// `max_pages`, whichever comes first.
  pub async fn discover_with_cast(
    &self,
    kind: MediaKind,
    cast_id: u64,
  ) -> Result<Vec<RawWork>> {
    let (path, sort_by) = match kind {
      MediaKind::Movie => ("/discover/movie", "release_date.desc"),
      MediaKind::Show => ("/discover/tv", "first_air_date.desc"),
    };

    let mut works = Vec::new();
    let mut page: u32 = 1;
    let mut total_pages: u32 = 1;

    while page <= total_pages && page <= self.config.max_pages {
      let resp: Paginated<RawWork> = self
        .get(path, &[
          ("with_cast", cast_id.to_string()),
          ("sort_by", sort_by.to_string()),
          ("page", page.to_string()),
        ])
        .await?;

      let exhausted = resp.results.is_empty();
      works.extend(resp.results);
      total_pages = resp.total_pages.unwrap_or(page);
      page += 1;

      if exhausted {
        break;
      }
    }

    tracing::debug!(path, cast_id, pages = page - 1, works = works.len(), "discover finished");
    Ok(works)
  }
}
