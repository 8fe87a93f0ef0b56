pub mod analytics_service;
pub mod catalog_service;
pub mod catalog_view;
pub mod sale_editor;
pub mod sale_service;

#[cfg(test)]
pub(crate) mod test_support;
