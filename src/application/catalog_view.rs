use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::catalog::{ArticleFilter, ArticleView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::realtime::{ChangeFeed, Subscription, ARTICLES};

/// Cached, unfiltered article list that refetches after any article change.
pub struct CatalogView<R> {
    repo: R,
    stale: Arc<AtomicBool>,
    articles: Mutex<Vec<ArticleView>>,
    _subscription: Subscription,
}

impl<R: CatalogRepository> CatalogView<R> {
    pub fn new(repo: R, feed: &ChangeFeed) -> Self {
        let stale = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stale);
        let subscription = feed.subscribe(ARTICLES, move |_| flag.store(true, Ordering::SeqCst));
        Self {
            repo,
            stale,
            articles: Mutex::new(Vec::new()),
            _subscription: subscription,
        }
    }

    pub fn articles(&self) -> Result<Vec<ArticleView>, DomainError> {
        let mut articles = self.articles.lock().unwrap_or_else(PoisonError::into_inner);
        if self.stale.swap(false, Ordering::SeqCst) {
            match self.repo.list_articles(&ArticleFilter::default()) {
                Ok(fresh) => *articles = fresh,
                Err(e) => {
                    self.stale.store(true, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }
        Ok(articles.clone())
    }
}
