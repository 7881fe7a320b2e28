use log::warn;
use crate::document::{page_id, Document, Visibility, CONTENT_PAGE_CLASS};
use crate::errors::DocumentError;

/// Hides all content pages and shows the named one.
///
/// Returns false if there is no such page, in which case all pages are left hidden.
///
/// # Arguments
///
/// * 'document' - the document holding the pages
/// * 'page' - name of the page to show, the container id is `page-<name>`
pub fn show_page(document: &mut Document, page: &str) -> Result<bool, DocumentError> {
    for id in document.ids_by_class(CONTENT_PAGE_CLASS) {
        document.set_visibility(&id, Visibility::Hidden)?;
    }

    let target = page_id(page);
    if !document.contains(&target) {
        warn!("no content page '{}'", target);
        return Ok(false);
    }
    document.set_visibility(&target, Visibility::Flex)?;

    Ok(true)
}
