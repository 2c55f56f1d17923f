//! Screen-level intent handling on top of the list service.
//!
//! # Responsibility
//! - Translate UI intents (`add`, `rename`, `delete`, `toggle`, `search`)
//!   into list service calls for the current screen.
//! - Push exactly one refreshed snapshot per successful mutation.
//!
//! # Invariants
//! - Validation, reference and persistence failures deliver nothing; the UI
//!   keeps its last known-good snapshot and the presenter keeps its screen
//!   and filter.
//! - A committed mutation reports success even when the follow-up refresh
//!   fails.
//! - `NotFound` still delivers a refreshed snapshot so the stale row drops.
//! - A screen whose category disappeared falls back to the category list.

use crate::delivery::{ListView, RefreshSink, SearchSequencer};
use crate::model::list::{CategoryId, RecordRef};
use crate::repo::list_repo::ListRepository;
use crate::search::fold::fold_needle;
use crate::service::list_service::{ListService, ListServiceError, ListServiceResult};
use log::{debug, warn};

/// Screen currently bound to the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Categories,
    Items(CategoryId),
    /// Pending/done split of one category.
    Split(CategoryId),
}

impl Screen {
    fn category_id(self) -> Option<CategoryId> {
        match self {
            Self::Categories => None,
            Self::Items(id) | Self::Split(id) => Some(id),
        }
    }
}

/// Presenter binding one list service to one refresh sink.
pub struct ListPresenter<R: ListRepository, S: RefreshSink> {
    service: ListService<R>,
    sink: S,
    screen: Screen,
    query: Option<String>,
    sequencer: SearchSequencer,
}

impl<R: ListRepository, S: RefreshSink> ListPresenter<R, S> {
    /// Creates a presenter showing the category list. Nothing is delivered
    /// until the first `show` or intent.
    pub fn new(service: ListService<R>, sink: S) -> Self {
        Self {
            service,
            sink,
            screen: Screen::Categories,
            query: None,
            sequencer: SearchSequencer::new(),
        }
    }

    pub fn service(&self) -> &ListService<R> {
        &self.service
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Active item filter, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Shared sequencer for searches run off the presenter thread.
    pub fn sequencer(&self) -> SearchSequencer {
        self.sequencer.clone()
    }

    /// Switches screens, clears the filter and delivers the new screen.
    ///
    /// On failure the presenter stays on the previous screen.
    pub fn show(&mut self, screen: Screen) -> ListServiceResult<()> {
        let view = self.resolve_view(screen, None)?;
        self.sink.deliver(view);
        Ok(())
    }

    /// Re-queries the current screen and delivers it.
    pub fn refresh(&mut self) -> ListServiceResult<()> {
        let view = self.resolve_view(self.screen, self.query.clone())?;
        self.sink.deliver(view);
        Ok(())
    }

    /// Adds a category on the category screen, or an item under the shown
    /// category otherwise.
    pub fn add(&mut self, name: &str) -> ListServiceResult<RecordRef> {
        let result = match self.screen.category_id() {
            None => self
                .service
                .create_category(name)
                .map(|category| RecordRef::Category(category.id)),
            Some(category_id) => self
                .service
                .create_item(name, category_id)
                .map(|item| RecordRef::Item(item.id)),
        };
        self.after_mutation(result)
    }

    pub fn rename(&mut self, record: RecordRef, new_name: &str) -> ListServiceResult<()> {
        let result = match record {
            RecordRef::Category(id) => self.service.rename_category(id, new_name).map(|_| ()),
            RecordRef::Item(id) => self.service.rename_item(id, new_name).map(|_| ()),
        };
        self.after_mutation(result)
    }

    pub fn delete(&mut self, record: RecordRef) -> ListServiceResult<()> {
        let result = match record {
            RecordRef::Category(id) => self.service.delete_category(id),
            RecordRef::Item(id) => self.service.delete_item(id),
        };
        self.after_mutation(result)
    }

    /// Flips `done` and returns the new value.
    pub fn toggle(&mut self, record: RecordRef) -> ListServiceResult<bool> {
        let result = self.service.toggle_done(record);
        self.after_mutation(result)
    }

    /// Filters the item screen by `text`; blank text clears the filter.
    ///
    /// The category and split screens carry no filter: `text` is dropped and
    /// the screen is re-delivered. When the filtered view cannot be built the
    /// previous filter stays in place.
    pub fn search(&mut self, text: &str) -> ListServiceResult<()> {
        let ticket = self.sequencer.issue();
        let query = match self.screen {
            Screen::Items(_) => fold_needle(text).map(|_| text.to_string()),
            Screen::Categories | Screen::Split(_) => None,
        };
        let view = self.resolve_view(self.screen, query)?;
        if !self.sequencer.deliver_if_current(ticket, &self.sink, view) {
            debug!(
                "event=search_deliver module=presenter status=dropped ticket={}",
                ticket.value()
            );
        }
        Ok(())
    }

    fn after_mutation<T>(&mut self, result: ListServiceResult<T>) -> ListServiceResult<T> {
        match result {
            Ok(value) => {
                // The write is committed; a failed refresh leaves the last snapshot.
                if let Err(refresh_err) = self.refresh() {
                    warn!(
                        "event=refresh module=presenter status=error after=mutation error_code={} error={refresh_err}",
                        refresh_err.code()
                    );
                }
                Ok(value)
            }
            Err(err) if err.is_not_found() => {
                if let Err(refresh_err) = self.refresh() {
                    warn!(
                        "event=refresh module=presenter status=error after=not_found error={refresh_err}"
                    );
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Builds the view for `screen` + `query` and commits both only once the
    /// view exists. A screen whose category vanished resolves to the
    /// category list.
    fn resolve_view(
        &mut self,
        screen: Screen,
        query: Option<String>,
    ) -> ListServiceResult<ListView> {
        match self.build_view(screen, query.as_deref()) {
            Ok(view) => {
                self.screen = screen;
                self.query = query;
                Ok(view)
            }
            Err(ListServiceError::CategoryNotFound(id)) if screen != Screen::Categories => {
                debug!("event=screen_fallback module=presenter status=ok category_id={id}");
                let view = self.build_view(Screen::Categories, None)?;
                self.screen = Screen::Categories;
                self.query = None;
                Ok(view)
            }
            Err(err) => Err(err),
        }
    }

    fn build_view(&self, screen: Screen, query: Option<&str>) -> ListServiceResult<ListView> {
        match screen {
            Screen::Categories => Ok(ListView::Categories {
                categories: self.service.list_categories()?,
            }),
            Screen::Items(category_id) => {
                let category = self
                    .service
                    .get_category(category_id)?
                    .ok_or(ListServiceError::CategoryNotFound(category_id))?;
                match query {
                    Some(query) => {
                        let items = self.service.search_items(category_id, query)?;
                        Ok(ListView::Search {
                            category,
                            query: query.to_string(),
                            items,
                        })
                    }
                    None => Ok(ListView::Items {
                        items: self.service.list_items(category_id)?,
                        category,
                    }),
                }
            }
            Screen::Split(category_id) => {
                let category = self
                    .service
                    .get_category(category_id)?
                    .ok_or(ListServiceError::CategoryNotFound(category_id))?;
                Ok(ListView::Split {
                    partition: self.service.partition_items(category_id)?,
                    category,
                })
            }
        }
    }
}
